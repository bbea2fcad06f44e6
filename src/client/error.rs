/// Failure taxonomy for every backend interaction.
///
/// Page controllers catch these at their boundary and turn them into
/// banners; nothing here is allowed to escape a user action.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// The request never completed (connect, DNS, timeout, broken stream).
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("{reason} (HTTP {status})")]
    RemoteRejection {
        status: u16,
        /// HTTP status text, e.g. `"Internal Server Error"`.
        reason: String,
        /// Backend-supplied error text, when the body carried one.
        message: Option<String>,
    },

    /// The response completed but its body could not be decoded.
    #[error("{0}")]
    MalformedResponse(String),

    /// Client-side validation rejected the content; no request was sent.
    #[error("{0}")]
    LocalValidation(String),
}

impl ConsoleError {
    /// Text to show the operator.
    ///
    /// Backend-supplied text wins verbatim. A rejection without a message
    /// falls back to `fallback`, which receives the HTTP status text.
    pub fn describe_or(&self, fallback: impl FnOnce(&str) -> String) -> String {
        match self {
            Self::RemoteRejection {
                message: Some(message),
                ..
            } => message.clone(),
            Self::RemoteRejection { reason, .. } => fallback(reason),
            Self::Transport(message)
            | Self::MalformedResponse(message)
            | Self::LocalValidation(message) => message.clone(),
        }
    }

    /// Short machine-friendly label used in the activity log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::RemoteRejection { .. } => "rejected",
            Self::MalformedResponse(_) => "malformed",
            Self::LocalValidation(_) => "invalid",
        }
    }

    /// Whether a request reached the backend at all.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalValidation(_))
    }
}
