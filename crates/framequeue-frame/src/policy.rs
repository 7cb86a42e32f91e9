use std::io::Read;

use bytes::BytesMut;

use crate::error::Result;
use crate::frame::Frame;

/// A rule deciding where one frame ends within a continuous byte stream.
///
/// Implementations hold no state between frames: every call starts from an
/// empty accumulator.
pub trait Framing: Send + 'static {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Read exactly one frame from a blocking stream.
    ///
    /// Never reads past the end of the frame, so the stream is positioned
    /// at the start of the next frame on return.
    fn read_frame<R: Read + ?Sized>(&mut self, src: &mut R) -> Result<Frame>;

    /// Split one complete frame off the front of a buffer.
    ///
    /// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
    fn split_frame(&mut self, src: &mut BytesMut) -> Result<Option<Frame>>;
}
