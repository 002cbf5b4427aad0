use reqwest::StatusCode;
use thiserror::Error;

/// Why a controller call failed. Reads and writes both report through this so a caller can tell
/// a missing resource from bad credentials from an unreachable controller.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("resource not found at {url}")]
    NotFound { url: String },

    #[error("controller rejected the credentials for {url} ({status})")]
    Unauthorized { url: String, status: StatusCode },

    #[error("controller returned {status} for {url}: {body}")]
    Status { url: String, status: StatusCode, body: String },

    #[error("could not reach controller: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("flow id '{path_id}' does not match the flow ids {body_ids:?} in the flow body")]
    FlowIdMismatch { path_id: String, body_ids: Vec<String> },

    #[error("invalid controller endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl ControllerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ControllerError::NotFound { .. })
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ControllerError::Unauthorized { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ControllerError::Transport(_))
    }

    /// Map a non-2xx status onto the matching variant
    pub(crate) fn from_status(url: &str, status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => ControllerError::NotFound { url: url.to_string() },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ControllerError::Unauthorized {
                url: url.to_string(),
                status,
            },
            _ => ControllerError::Status {
                url: url.to_string(),
                status,
                body,
            },
        }
    }
}
