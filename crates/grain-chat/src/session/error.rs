use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// A command was recognised but its arguments were not.
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Console error: {0}")]
    Io(#[from] std::io::Error),
}
