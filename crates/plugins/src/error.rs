use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Execute or subscribe was handed a context value this bridge never
    /// produced (foreign, fabricated, or already released).
    #[error("illegal invocation: context value was not created by this bridge")]
    IllegalInvocation,

    #[error("no raw request recorded for request {request}")]
    MissingRequest { request: u64 },

    #[error("{component} used before it was initialised")]
    NotReady { component: &'static str },

    #[error(transparent)]
    Host(#[from] anyhow::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] http::Error),

    #[error("failed to render viewer page: {0}")]
    Render(#[from] askama::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn not_ready(component: &'static str) -> Self {
        Self::NotReady { component }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl sofa_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

sofa_common::impl_context!();
