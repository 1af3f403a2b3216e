use crate::state::ChatMessage;

/// Build the message list sent to the completion endpoint.
///
/// A non-empty `instruction` becomes a leading system message, followed by the
/// last `context_length` pairs of `history` and finally the new user message.
pub fn assemble(
    instruction: &str,
    history: &[ChatMessage],
    context_length: usize,
    new_user_text: &str,
) -> Vec<ChatMessage> {
    let window = context_length.saturating_mul(2).min(history.len());
    let recent = &history[history.len() - window..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    if !instruction.is_empty() {
        messages.push(ChatMessage::system(instruction));
    }
    messages.extend_from_slice(recent);
    messages.push(ChatMessage::user(new_user_text));
    messages
}
