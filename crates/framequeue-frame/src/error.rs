/// Errors that can occur while framing a byte stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The framing policy was constructed with unusable parameters.
    #[error("invalid framing configuration: {0}")]
    InvalidConfig(String),

    /// The length function rejected a header.
    #[error("invalid frame length: {0}")]
    InvalidLength(String),

    /// The frame exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading the stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reported end-of-stream.
    #[error("stream closed")]
    StreamClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
