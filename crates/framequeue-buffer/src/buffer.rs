use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use framequeue_frame::{Delimited, Frame, Framing, LengthPrefixed};
use tracing::debug;

use crate::error::{BufferError, Result};
use crate::reader;
use crate::state::{ReaderState, Shared};

/// Default wait for [`FrameBuffer::receive`].
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(3);

/// Default name for reader threads.
pub const DEFAULT_THREAD_NAME: &str = "framequeue-reader";

/// Configuration for a frame buffer.
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Wait used by [`FrameBuffer::receive`]. Default: 3 seconds.
    pub receive_timeout: Duration,
    /// Name given to the reader thread.
    pub thread_name: String,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

/// A frame queue fed by a background reader thread.
///
/// Construction starts the reader immediately. Handles are cheap to clone
/// and can be shared across threads; each queued frame is delivered to
/// exactly one `receive` call, in the order the reader completed them.
///
/// The queue is unbounded: if nobody receives, frames accumulate.
#[derive(Clone)]
pub struct FrameBuffer {
    shared: Arc<Shared>,
    config: BufferConfig,
}

impl FrameBuffer {
    /// Start reading `stream` with the given framing policy.
    pub fn spawn<R, F>(stream: R, framing: F) -> Result<Self>
    where
        R: Read + Send + 'static,
        F: Framing,
    {
        Self::with_config(stream, framing, BufferConfig::default())
    }

    /// Start reading `stream` with explicit buffer configuration.
    pub fn with_config<R, F>(stream: R, framing: F, config: BufferConfig) -> Result<Self>
    where
        R: Read + Send + 'static,
        F: Framing,
    {
        let shared = Arc::new(Shared::new());
        debug!(
            framing = framing.name(),
            thread = %config.thread_name,
            "starting frame buffer"
        );
        reader::spawn(stream, framing, Arc::downgrade(&shared), &config.thread_name)
            .map_err(BufferError::Spawn)?;

        Ok(Self { shared, config })
    }

    /// Newline-delimited lines with the separator stripped.
    pub fn lines<R>(stream: R) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        Self::spawn(stream, Delimited::new())
    }

    /// Packets of `header_length` header bytes followed by
    /// `length_fn(header)` payload bytes.
    pub fn packets<R, L>(stream: R, header_length: usize, length_fn: L) -> Result<Self>
    where
        R: Read + Send + 'static,
        L: Fn(&[u8]) -> usize + Send + Sync + 'static,
    {
        Self::spawn(stream, LengthPrefixed::new(header_length, length_fn)?)
    }

    /// Number of frames ready to receive. Never blocks.
    ///
    /// The count may be stale by the time the caller acts on it, but only in
    /// the direction of more frames having arrived.
    pub fn available(&self) -> usize {
        self.shared.len()
    }

    /// Receive the oldest frame, waiting up to the configured timeout.
    pub fn receive(&self) -> Result<Frame> {
        self.receive_timeout(self.config.receive_timeout)
    }

    /// Receive the oldest frame, waiting up to `timeout`.
    ///
    /// Returns `BufferError::Timeout` if nothing arrived in time, and
    /// `BufferError::Closed` once the reader has stopped and the queue is
    /// drained. A zero timeout checks the queue once without waiting.
    pub fn receive_timeout(&self, timeout: Duration) -> Result<Frame> {
        self.shared.pop_timeout(timeout)
    }

    /// Receive the oldest frame if one is queued.
    pub fn try_receive(&self) -> Option<Frame> {
        self.shared.try_pop()
    }

    /// Current reader thread state.
    pub fn state(&self) -> ReaderState {
        self.shared.reader_state()
    }

    /// Returns true once the reader has stopped. Queued frames may remain.
    pub fn is_closed(&self) -> bool {
        !self.state().is_running()
    }

    /// Current buffer configuration.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("available", &self.available())
            .field("state", &self.state())
            .field("config", &self.config)
            .finish()
    }
}
