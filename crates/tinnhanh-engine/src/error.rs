use tinnhanh_core::errors::ClientError;

/// Failures of the generative pipelines.
///
/// Credential and upstream failures keep their identity so callers can tell
/// "configure a key" from "try again later". Everything else is folded into
/// the per-operation catch-all ([`DraftError::Unknown`] for synthesis,
/// [`DraftError::RewriteFailed`] for rewrites).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("no access credential configured")]
    CredentialMissing,

    #[error("upstream error: {message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("the model returned no text")]
    EmptyResponse,

    #[error("rewrite failed: {0}")]
    RewriteFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),

    /// Another pipeline call on the same session has not finished.
    #[error("another request is still in progress")]
    Busy,

    #[error("the brief is empty")]
    BlankBrief,

    #[error("there is no article to rewrite")]
    NoArticle,

    /// An article handed to the session has a blank title or content.
    #[error("the article title and content must not be empty")]
    BlankArticle,
}

impl DraftError {
    /// Classification used by article synthesis.
    pub fn from_synthesis(err: ClientError) -> Self {
        match err {
            ClientError::CredentialMissing => Self::CredentialMissing,
            ClientError::Upstream { status, message } => Self::Upstream { status, message },
            ClientError::EmptyResponse => Self::EmptyResponse,
            ClientError::MalformedResponse(detail) => Self::Unknown(detail),
        }
    }

    /// Classification used by the rewrite pipeline.
    pub fn from_rewrite(err: ClientError) -> Self {
        match err {
            ClientError::CredentialMissing => Self::CredentialMissing,
            ClientError::Upstream { status, message } => Self::Upstream { status, message },
            ClientError::EmptyResponse => Self::RewriteFailed("empty response".into()),
            ClientError::MalformedResponse(detail) => Self::RewriteFailed(detail),
        }
    }

    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::CredentialMissing => "credential_missing",
            Self::Upstream { .. } => "upstream_error",
            Self::EmptyResponse => "empty_response",
            Self::RewriteFailed(_) => "rewrite_failed",
            Self::Unknown(_) => "unknown_error",
            Self::Busy => "busy",
            Self::BlankBrief => "blank_brief",
            Self::NoArticle => "no_article",
            Self::BlankArticle => "blank_article",
        }
    }

    /// Message suitable for showing to the journalist.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CredentialMissing => "Chưa cấu hình khóa API Gemini.",
            Self::Upstream { .. } => "Dịch vụ AI đang gặp sự cố, vui lòng thử lại sau.",
            Self::EmptyResponse | Self::Unknown(_) => "Đã xảy ra lỗi khi tạo bài viết.",
            Self::RewriteFailed(_) => "Đã xảy ra lỗi khi viết lại bài báo.",
            Self::Busy => "Đang xử lý yêu cầu trước, vui lòng chờ.",
            Self::BlankBrief => "Chưa có dữ liệu thô.",
            Self::NoArticle => "Chưa có bài viết để viết lại.",
            Self::BlankArticle => "Tiêu đề và nội dung bài viết không được để trống.",
        }
    }
}
