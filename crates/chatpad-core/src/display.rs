use crate::state::ChatMessage;

/// Pair the log two messages at a time for the chat view.
///
/// Pairing is positional: whatever sits at an odd index is shown as the reply,
/// including synthetic system errors. A trailing unpaired message is dropped.
pub fn to_display_pairs(messages: &[ChatMessage]) -> Vec<(String, String)> {
    messages
        .chunks_exact(2)
        .map(|pair| (pair[0].content.clone(), pair[1].content.clone()))
        .collect()
}

pub fn token_usage_line(total_tokens: u64) -> String {
    format!("Total tokens used: {}", total_tokens)
}
