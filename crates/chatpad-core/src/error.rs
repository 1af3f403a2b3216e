use thiserror::Error;

/// Failure of a single call to the completion endpoint.
///
/// The `Display` text is what the user sees in the chat log, so variants carry
/// the provider's own wording where there is one.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(String),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("OpenAI API Key is not set.")]
    MissingCredential,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Preset download failed: {0}")]
    PresetFetch(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    pub fn preset_fetch(msg: impl Into<String>) -> Self {
        Self::PresetFetch(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_unknown_preset(&self) -> bool {
        matches!(self, Self::UnknownPreset(_))
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
