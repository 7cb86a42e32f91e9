//! `tokio_util` decoders for the framing policies.
//!
//! The same policy values drive both the blocking reader thread and a
//! `FramedRead` over any `AsyncRead`.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::delimited::Delimited;
use crate::error::FrameError;
use crate::frame::Frame;
use crate::length::LengthPrefixed;
use crate::policy::Framing;

impl Decoder for Delimited {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.split_frame(src)
    }
}

impl Decoder for LengthPrefixed {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.split_frame(src)
    }
}
