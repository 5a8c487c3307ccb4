/// Errors that can occur in host transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Waiting for input readiness failed.
    #[error("failed to poll host input: {0}")]
    Poll(std::io::Error),

    /// Querying the host stream failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
