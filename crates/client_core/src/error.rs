use thiserror::Error;

/// How a failure surfaces to the user. All three end up as a dismissible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received.
    Network,
    /// A response arrived but reported failure or could not be understood.
    Application,
    /// The operation was refused locally before any request was made.
    Precondition,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Application { status: Option<u16>, message: String },
    #[error("{0}")]
    Precondition(String),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self::Application {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(err) if err.is_decode() => ErrorKind::Application,
            ClientError::Transport(_) => ErrorKind::Network,
            ClientError::Application { .. } | ClientError::Decode(_) => ErrorKind::Application,
            ClientError::Precondition(_) | ClientError::InvalidUrl(_) => ErrorKind::Precondition,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Application { status, .. } => *status,
            ClientError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
