/// Failure reported by the transport collaborator feeding raw bytes.
///
/// Mid-stream read failures are normalized into the session as an error event
/// so partial content survives; see the answer stream driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The answer stream could not be opened at all.
    #[error("transport connect failed: {message}")]
    Connect { message: String },
    /// The byte stream failed mid-flight.
    #[error("transport read failed: {message}")]
    Read { message: String },
}

impl TransportError {
    /// Creates a connect-phase error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates a mid-stream read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Connect { message } | Self::Read { message } => message,
        }
    }
}

/// Errors returned when asking a question, before a live stream exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AskError {
    /// Invalid request input, for example an empty question.
    #[error("validation error: {0}")]
    Validation(String),
    /// The transport failed before the stream was established.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
