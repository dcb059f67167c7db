#![forbid(unsafe_code)]

use crate::model::StepAction;

/// Failure reported by a host collaborator (navigation, click, hook).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A step action could not be carried out.
///
/// Returned from [`TourEngine::next_step`](crate::engine::TourEngine::next_step);
/// the run stays on the current step so the user can retry or skip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("step `{step_id}` {action} action failed: {source}")]
pub struct TourError {
    pub step_id: String,
    pub action: StepAction,
    #[source]
    pub source: HostError,
}

/// Failure in a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid store key: {key}")]
    InvalidKey { key: String },

    #[error("stored value for {key} is not valid UTF-8: {source}")]
    Encoding {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl StoreError {
    /// The stored bytes are unreadable as text and will never parse.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}
