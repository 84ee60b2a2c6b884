/// Failures surfaced by a [`TextGenerator`](crate::provider::TextGenerator).
///
/// None of these are retried inside a generator. Callers that want to retry
/// repeat the whole operation; [`ClientError::is_retryable`] says whether that
/// is worth trying.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No access credential is configured. Raised before any network attempt.
    #[error("no access credential configured")]
    CredentialMissing,

    /// Transport failure, timeout, or non-2xx response from the provider.
    /// `status` is `None` when no HTTP response was received.
    #[error("upstream error: {message}")]
    Upstream { status: Option<u16>, message: String },

    /// The output does not parse into the requested structure.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The provider returned no text.
    #[error("empty response")]
    EmptyResponse,
}

impl ClientError {
    /// Transport-level failure with no HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// Failure tied to an HTTP response status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Whether repeating the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status: None, .. } => true,
            Self::Upstream {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            Self::CredentialMissing | Self::MalformedResponse(_) | Self::EmptyResponse => false,
        }
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::CredentialMissing => "credential_missing",
            Self::Upstream { .. } => "upstream_error",
            Self::MalformedResponse(_) => "malformed_response",
            Self::EmptyResponse => "empty_response",
        }
    }
}
