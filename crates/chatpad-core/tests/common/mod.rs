use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chatpad_core::{ChatMessage, Completion, CompletionGateway, GatewayError, RequestParameters};

/// Gateway that replays canned results and records every request it sees.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<Completion, GatewayError>>>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<Completion, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(content: &str, usage_tokens: u64) -> Self {
        Self::new(vec![Ok(Completion { content: content.to_string(), usage_tokens })])
    }

    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(GatewayError::Transport(message.to_string()))])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Vec<ChatMessage> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _params: &RequestParameters,
    ) -> Result<Completion, GatewayError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Transport("no scripted reply left".to_string())))
    }
}
