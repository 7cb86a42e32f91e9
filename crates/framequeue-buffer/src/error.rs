use std::time::Duration;

/// Errors that can occur while receiving from a frame buffer.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// No frame arrived before the deadline. The caller may retry.
    #[error("receive timed out after {0:?}")]
    Timeout(Duration),

    /// The reader thread has stopped and every queued frame was consumed.
    #[error("reader stopped: {0}")]
    Closed(String),

    /// Framing policy construction failed.
    #[error("frame error: {0}")]
    Frame(#[from] framequeue_frame::FrameError),

    /// The reader thread could not be started.
    #[error("failed to spawn reader thread: {0}")]
    Spawn(std::io::Error),
}

impl BufferError {
    /// Returns true for [`BufferError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, BufferError>;
