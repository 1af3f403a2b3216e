pub mod openai;

pub use openai::OpenAIClient;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::params::RequestParameters;
use crate::state::ChatMessage;

/// An assistant reply and the tokens the provider charged for producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage_tokens: u64,
}

/// The boundary to an external chat-completion API.
///
/// One call is one request: implementors must not retry, stream, or back off.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &RequestParameters,
    ) -> Result<Completion, GatewayError>;

    /// Send a single pre-rendered prompt as the only user message.
    async fn complete_text(
        &self,
        prompt: &str,
        params: &RequestParameters,
    ) -> Result<Completion, GatewayError> {
        self.complete(&[ChatMessage::user(prompt)], params).await
    }
}
