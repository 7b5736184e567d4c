use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no schema has been set")]
    NoSchema,

    /// The context value handed to execute was built by another envelope.
    #[error("context value is not a request context")]
    ForeignContext,
}

pub type Result<T> = std::result::Result<T, Error>;
