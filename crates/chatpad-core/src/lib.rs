pub mod ai;
pub mod chain;
pub mod config;
pub mod display;
pub mod error;
pub mod memory;
pub mod params;
pub mod presets;
pub mod prompt;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{Completion, CompletionGateway, OpenAIClient};
pub use chain::{ChainSession, ConversationChain};
pub use config::Config;
pub use display::{to_display_pairs, token_usage_line};
pub use error::{ChatError, GatewayError};
pub use memory::WindowMemory;
pub use params::RequestParameters;
pub use presets::PresetStore;
pub use prompt::assemble;
pub use session::{ChatSession, PendingTurn, TurnPlan, TurnReport};
pub use state::{ChatMessage, ChatRole, ConversationState};
