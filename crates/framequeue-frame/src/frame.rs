use std::borrow::Cow;
use std::ops::Deref;
use std::str::Utf8Error;
use std::time::Duration;

use bytes::Bytes;

/// One complete unit produced by a framing policy.
///
/// For delimiter framing this is a line (separator stripped unless
/// configured otherwise); for length-prefixed framing it is the header
/// followed by the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The frame contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes in the frame.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for a zero-length frame (e.g. an empty line).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// View the frame as UTF-8 text.
    pub fn to_str(&self) -> std::result::Result<&str, Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }

    /// View the frame as text, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Consume the frame and return the underlying bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Bytes> for Frame {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// How a zero-byte read from the stream is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofPolicy {
    /// A zero-byte read is end-of-stream. The policy reports
    /// [`FrameError::StreamClosed`](crate::FrameError::StreamClosed).
    #[default]
    Close,
    /// A zero-byte read means "no data yet". Sleep for `interval` and read
    /// again. `WouldBlock` and `TimedOut` errors are treated the same way,
    /// which suits serial-like handles configured with a read timeout.
    Retry { interval: Duration },
}

impl EofPolicy {
    /// Retry with a short poll interval.
    pub const fn retry() -> Self {
        Self::Retry {
            interval: Duration::from_millis(10),
        }
    }
}

/// Configuration shared by all framing policies.
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    /// Maximum frame content size in bytes. `None` means unbounded.
    ///
    /// Delimiter framing applies it to the content before the separator;
    /// length-prefixed framing applies it to the payload length.
    pub max_frame_size: Option<usize>,
    /// Interpretation of zero-byte reads.
    pub eof: EofPolicy,
}
