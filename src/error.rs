use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// IO failure on the output stream.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A buffer or offset-table size exceeded what the writer can address.
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(&'static str),
    /// A child encoder failed mid-stream. The output is left truncated and
    /// invalid; callers must discard the file.
    #[error("{filter} encoder failed: {reason}")]
    Coder { filter: &'static str, reason: String },
    /// A frame was constructed with inconsistent dimensions, sample buffers
    /// or colormap, or the frame list is empty.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
