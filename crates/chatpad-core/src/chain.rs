//! Chain variant of the turn pipeline
//!
//! Instead of sending a message list, the chain renders one text prompt from a
//! fixed template, the window memory, and the new input. The memory belongs to
//! the session that owns the chain, so two sessions never share history.

use tracing::warn;

use crate::ai::CompletionGateway;
use crate::error::{ChatError, GatewayError};
use crate::memory::WindowMemory;
use crate::params::RequestParameters;
use crate::presets::ASSISTANT_INSTRUCTION;
use crate::session::error_reply;

#[derive(Debug, Clone)]
pub struct ConversationChain {
    instruction: String,
}

impl Default for ConversationChain {
    fn default() -> Self {
        Self::new(ASSISTANT_INSTRUCTION)
    }
}

impl ConversationChain {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self { instruction: instruction.into() }
    }

    pub fn render(&self, memory: &WindowMemory, input: &str) -> String {
        format!(
            "{}\n\n{}\nHuman: {}\nAssistant:",
            self.instruction,
            memory.render(),
            input
        )
    }

    /// Ask the model for a reply to `input` given the current window.
    ///
    /// Memory is left untouched, so the call can run against a snapshot.
    pub async fn call(
        &self,
        gateway: &dyn CompletionGateway,
        memory: &WindowMemory,
        input: &str,
        params: &RequestParameters,
    ) -> Result<String, GatewayError> {
        let prompt = self.render(memory, input);
        let completion = gateway.complete_text(&prompt, params).await?;
        Ok(completion.content)
    }

    /// Ask the model for a reply and remember the exchange if one came back.
    pub async fn predict(
        &self,
        gateway: &dyn CompletionGateway,
        memory: &mut WindowMemory,
        input: &str,
        params: &RequestParameters,
    ) -> Result<String, GatewayError> {
        memory.set_k(params.context_length);
        let reply = self.call(gateway, memory, input, params).await?;
        memory.save(input, reply.clone());
        Ok(reply)
    }
}

/// Session state for the chain variant: display pairs plus the window memory.
///
/// Token usage is not tracked here.
#[derive(Debug, Clone, Default)]
pub struct ChainSession {
    chain: ConversationChain,
    memory: WindowMemory,
    pairs: Vec<(String, String)>,
}

impl ChainSession {
    pub fn new(chain: ConversationChain, memory: WindowMemory) -> Self {
        Self { chain, memory, pairs: Vec::new() }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn memory(&self) -> &WindowMemory {
        &self.memory
    }

    pub fn chain(&self) -> &ConversationChain {
        &self.chain
    }

    /// Memory as the next call should see it: current exchanges, window of
    /// `context_length`.
    pub fn snapshot(&self, params: &RequestParameters) -> WindowMemory {
        let mut memory = self.memory.clone();
        memory.set_k(params.context_length);
        memory
    }

    pub fn record_missing_credential(&mut self, text: &str) {
        self.pairs.push((text.to_string(), error_reply(&ChatError::MissingCredential)));
    }

    /// Fold a chain call's outcome into the pairs, and into memory on success.
    pub fn finish_turn(&mut self, text: &str, result: Result<String, GatewayError>) {
        let reply = match result {
            Ok(reply) => {
                self.memory.save(text, reply.clone());
                reply
            }
            Err(e) => {
                warn!("Conversation chain failed: {}", e);
                error_reply(&ChatError::Gateway(e))
            }
        };
        self.pairs.push((text.to_string(), reply));
    }

    pub async fn submit(
        &mut self,
        gateway: &dyn CompletionGateway,
        credential: &str,
        text: &str,
        params: &RequestParameters,
    ) -> &[(String, String)] {
        if text.is_empty() {
            return &self.pairs;
        }
        if credential.is_empty() {
            self.record_missing_credential(text);
            return &self.pairs;
        }

        self.memory.set_k(params.context_length);
        let result = self.chain.call(gateway, &self.memory, text, params).await;
        self.finish_turn(text, result);
        &self.pairs
    }

    pub fn clear(&mut self) {
        self.memory.clear();
        self.pairs.clear();
    }
}
