//! Turn processing for the direct variant
//!
//! A turn is split in two so a UI can run the network call in the background:
//! [`ChatSession::prepare_turn`] decides what to do with a submission, and
//! [`ChatSession::finish_turn`] folds the gateway's answer back into the log.
//! [`ChatSession::submit`] chains both for callers that can simply await.

use tracing::warn;

use crate::ai::{Completion, CompletionGateway};
use crate::display::{to_display_pairs, token_usage_line};
use crate::error::{ChatError, GatewayError};
use crate::params::RequestParameters;
use crate::prompt::assemble;
use crate::state::{ChatMessage, ConversationState};

/// A submission that needs a round trip to the provider.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub user_text: String,
    pub messages: Vec<ChatMessage>,
    pub params: RequestParameters,
}

#[derive(Debug, Clone)]
pub enum TurnPlan {
    /// Nothing was typed; leave everything as it is.
    Skip,
    /// No credential configured; record the error without calling out.
    MissingCredential { user_text: String },
    Request(PendingTurn),
}

/// What the UI needs to re-render after a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub pairs: Vec<(String, String)>,
    pub token_line: String,
}

/// Reply text shown in place of an assistant answer.
pub fn error_reply(err: &ChatError) -> String {
    format!("Error: {}", err)
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    state: ConversationState,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn total_tokens(&self) -> u64 {
        self.state.total_tokens
    }

    pub fn report(&self) -> TurnReport {
        TurnReport {
            pairs: to_display_pairs(&self.state.messages),
            token_line: token_usage_line(self.state.total_tokens),
        }
    }

    pub fn prepare_turn(
        &self,
        credential: &str,
        text: &str,
        instruction: &str,
        params: &RequestParameters,
    ) -> TurnPlan {
        if text.is_empty() {
            return TurnPlan::Skip;
        }
        if credential.is_empty() {
            return TurnPlan::MissingCredential { user_text: text.to_string() };
        }
        TurnPlan::Request(PendingTurn {
            user_text: text.to_string(),
            messages: assemble(instruction, &self.state.messages, params.context_length, text),
            params: *params,
        })
    }

    pub fn record_missing_credential(&mut self, user_text: &str) {
        self.state.push_turn(
            ChatMessage::user(user_text),
            ChatMessage::system(error_reply(&ChatError::MissingCredential)),
            0,
        );
    }

    pub fn finish_turn(&mut self, pending: PendingTurn, result: Result<Completion, GatewayError>) {
        let user = ChatMessage::user(pending.user_text);
        match result {
            Ok(completion) => {
                self.state.push_turn(
                    user,
                    ChatMessage::assistant(completion.content),
                    completion.usage_tokens,
                );
            }
            Err(e) => {
                warn!("Chat completion failed: {}", e);
                let reply = error_reply(&ChatError::Gateway(e));
                self.state.push_turn(user, ChatMessage::system(reply), 0);
            }
        }
    }

    /// Run a whole turn, awaiting the gateway if a request is needed.
    pub async fn submit(
        &mut self,
        gateway: &dyn CompletionGateway,
        credential: &str,
        text: &str,
        instruction: &str,
        params: &RequestParameters,
    ) -> TurnReport {
        match self.prepare_turn(credential, text, instruction, params) {
            TurnPlan::Skip => {}
            TurnPlan::MissingCredential { user_text } => self.record_missing_credential(&user_text),
            TurnPlan::Request(pending) => {
                let result = gateway.complete(&pending.messages, &pending.params).await;
                self.finish_turn(pending, result);
            }
        }
        self.report()
    }

    pub fn clear(&mut self) {
        self.state.reset();
    }
}
