use serde::{Deserialize, Serialize};

/// Coarse classification carried alongside a failed job, so the history view
/// can tell a rejected prompt from a dropped connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Network,
    RemoteRejected,
    MissingField,
    Decode,
    Internal,
}

/// All errors that can occur while generating or downloading a mod.
#[derive(Debug, thiserror::Error)]
pub enum ModcraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid payload encoding: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("{0}")]
    Validation(String),

    #[error("A mod is already being generated")]
    Busy,

    #[error("{stage} failed with HTTP {status}: {message}")]
    Remote {
        stage: &'static str,
        status: u16,
        message: String,
    },

    #[error("{stage} response is missing `{field}`")]
    MissingField {
        stage: &'static str,
        field: &'static str,
    },

    #[error("No job with handle {0}")]
    JobNotFound(u64),

    #[error("Cannot move job from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{0}")]
    Custom(String),
}

impl ModcraftError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Busy => ErrorKind::Validation,
            Self::Network(_) | Self::Io(_) => ErrorKind::Network,
            Self::Remote { .. } => ErrorKind::RemoteRejected,
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::Decode(_) | Self::Json(_) => ErrorKind::Decode,
            Self::JobNotFound(_) | Self::InvalidTransition { .. } | Self::Custom(_) => {
                ErrorKind::Internal
            }
        }
    }
}

// Tauri requires error types to implement Serialize for IPC transport.
impl Serialize for ModcraftError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ModcraftError>;
