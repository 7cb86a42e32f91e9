use std::fmt;
use std::io::Read;
use std::sync::Arc;

use bytes::BytesMut;

use crate::error::{FrameError, Result};
use crate::frame::{Frame, FrameConfig};
use crate::io::{fill, fill_append, READ_CHUNK};
use crate::policy::Framing;

/// Maps a complete header to the number of payload bytes that follow it.
pub type LengthFn = dyn Fn(&[u8]) -> Result<usize> + Send + Sync;

/// Length-prefixed framing: a fixed-size header, then a payload whose length
/// is computed from the header.
///
/// Returned frames contain the header followed by the payload:
/// ```text
/// ┌────────────────────────┬───────────────────────────────┐
/// │ Header                 │ Payload                       │
/// │ (header_length bytes)  │ (length_fn(header) bytes)     │
/// └────────────────────────┴───────────────────────────────┘
/// ```
#[derive(Clone)]
pub struct LengthPrefixed {
    header_length: usize,
    length_fn: Arc<LengthFn>,
    config: FrameConfig,
}

impl LengthPrefixed {
    /// Create a policy from an infallible length function.
    pub fn new<F>(header_length: usize, length_fn: F) -> Result<Self>
    where
        F: Fn(&[u8]) -> usize + Send + Sync + 'static,
    {
        Self::with_checked_length(header_length, move |header| Ok(length_fn(header)))
    }

    /// Create a policy from a length function that may reject a header.
    ///
    /// A rejected header terminates framing with the returned error.
    pub fn with_checked_length<F>(header_length: usize, length_fn: F) -> Result<Self>
    where
        F: Fn(&[u8]) -> Result<usize> + Send + Sync + 'static,
    {
        if header_length == 0 {
            return Err(FrameError::InvalidConfig(
                "header length must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            header_length,
            length_fn: Arc::new(length_fn),
            config: FrameConfig::default(),
        })
    }

    /// Create a policy whose length is an integer field inside the header.
    pub fn with_field(header_length: usize, field: LengthField) -> Result<Self> {
        field.validate(header_length)?;
        Self::with_checked_length(header_length, move |header| field.decode(header))
    }

    /// Override the shared framing configuration.
    pub fn with_config(mut self, config: FrameConfig) -> Self {
        self.config = config;
        self
    }

    /// Fixed header size in bytes.
    pub fn header_length(&self) -> usize {
        self.header_length
    }

    /// Current framing configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Total frame length (header + payload) announced by `header`.
    ///
    /// Frames larger than `isize::MAX` bytes can never be allocated and are
    /// rejected as `InvalidLength`.
    fn frame_length(&self, header: &[u8]) -> Result<usize> {
        let len = (self.length_fn)(header)?;
        if let Some(max) = self.config.max_frame_size {
            if len > max {
                return Err(FrameError::FrameTooLarge { size: len, max });
            }
        }
        match self.header_length.checked_add(len) {
            Some(total) if total <= isize::MAX as usize => Ok(total),
            _ => Err(FrameError::InvalidLength(format!(
                "payload length {len} overflows frame size"
            ))),
        }
    }
}

impl fmt::Debug for LengthPrefixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LengthPrefixed")
            .field("header_length", &self.header_length)
            .field("length_fn", &format_args!("<fn>"))
            .field("config", &self.config)
            .finish()
    }
}

impl Framing for LengthPrefixed {
    fn name(&self) -> &'static str {
        "length-prefixed"
    }

    fn read_frame<R: Read + ?Sized>(&mut self, src: &mut R) -> Result<Frame> {
        let eof = self.config.eof;
        let mut frame = BytesMut::zeroed(self.header_length);
        fill(src, &mut frame, eof)?;

        let total = self.frame_length(&frame)?;
        fill_append(src, &mut frame, total - self.header_length, eof)?;

        Ok(Frame::new(frame.freeze()))
    }

    fn split_frame(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if src.len() < self.header_length {
            return Ok(None); // Need more data
        }

        let total = self.frame_length(&src[..self.header_length])?;
        if src.len() < total {
            src.reserve((total - src.len()).min(READ_CHUNK));
            return Ok(None); // Need more data
        }

        Ok(Some(Frame::new(src.split_to(total).freeze())))
    }
}

/// Byte order of a header length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// An unsigned integer inside the header that encodes the payload length.
///
/// `adjustment` is added to the decoded value, for protocols whose length
/// field counts the header itself or a trailing checksum. A result below
/// zero is rejected with `FrameError::InvalidLength`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthField {
    pub offset: usize,
    /// Field width in bytes: 1, 2, 4 or 8.
    pub width: usize,
    pub endian: Endian,
    pub adjustment: i64,
}

impl LengthField {
    pub const fn new(offset: usize, width: usize, endian: Endian) -> Self {
        Self {
            offset,
            width,
            endian,
            adjustment: 0,
        }
    }

    pub const fn u8(offset: usize) -> Self {
        Self::new(offset, 1, Endian::Big)
    }

    pub const fn u16_be(offset: usize) -> Self {
        Self::new(offset, 2, Endian::Big)
    }

    pub const fn u16_le(offset: usize) -> Self {
        Self::new(offset, 2, Endian::Little)
    }

    pub const fn u32_be(offset: usize) -> Self {
        Self::new(offset, 4, Endian::Big)
    }

    pub const fn u32_le(offset: usize) -> Self {
        Self::new(offset, 4, Endian::Little)
    }

    pub const fn with_adjustment(mut self, adjustment: i64) -> Self {
        self.adjustment = adjustment;
        self
    }

    /// Check that the field is a supported width and fits inside the header.
    pub fn validate(&self, header_length: usize) -> Result<()> {
        if !matches!(self.width, 1 | 2 | 4 | 8) {
            return Err(FrameError::InvalidConfig(format!(
                "length field width must be 1, 2, 4 or 8 bytes (got {})",
                self.width
            )));
        }
        match self.offset.checked_add(self.width) {
            Some(end) if end <= header_length => Ok(()),
            _ => Err(FrameError::InvalidConfig(format!(
                "length field at offset {} (width {}) does not fit in a {}-byte header",
                self.offset, self.width, header_length
            ))),
        }
    }

    /// Decode the payload length from a header.
    pub fn decode(&self, header: &[u8]) -> Result<usize> {
        let field = self
            .offset
            .checked_add(self.width)
            .and_then(|end| header.get(self.offset..end))
            .ok_or_else(|| {
                FrameError::InvalidLength(format!(
                    "header too short for length field ({} bytes)",
                    header.len()
                ))
            })?;

        let fold = |acc: u64, byte: &u8| (acc << 8) | u64::from(*byte);
        let raw = match self.endian {
            Endian::Big => field.iter().fold(0, fold),
            Endian::Little => field.iter().rev().fold(0, fold),
        };

        let adjusted = i128::from(raw) + i128::from(self.adjustment);
        usize::try_from(adjusted).map_err(|_| {
            FrameError::InvalidLength(format!(
                "length {raw} with adjustment {} is out of range",
                self.adjustment
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BufMut;

    use super::*;

    fn be_u32_length(header: &[u8]) -> usize {
        u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize
    }

    #[test]
    fn reads_header_and_payload() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&3u32.to_be_bytes());
        wire.extend_from_slice(b"abc");

        let mut framing = LengthPrefixed::new(4, be_u32_length).unwrap();
        let frame = framing.read_frame(&mut Cursor::new(wire)).unwrap();

        assert_eq!(frame.len(), 7);
        assert_eq!(frame.as_bytes(), b"\x00\x00\x00\x03abc");
    }

    #[test]
    fn reads_consecutive_packets() {
        let mut wire = BytesMut::new();
        wire.put_u16_le(2);
        wire.put_slice(b"hi");
        wire.put_u16_le(0);
        wire.put_u16_le(5);
        wire.put_slice(b"there");

        let mut framing = LengthPrefixed::with_field(2, LengthField::u16_le(0)).unwrap();
        let mut src = Cursor::new(wire.to_vec());

        assert_eq!(framing.read_frame(&mut src).unwrap().as_bytes(), b"\x02\x00hi");
        assert_eq!(framing.read_frame(&mut src).unwrap().as_bytes(), b"\x00\x00");
        assert_eq!(
            framing.read_frame(&mut src).unwrap().as_bytes(),
            b"\x05\x00there"
        );
    }

    #[test]
    fn truncated_payload_is_not_returned() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&10u32.to_be_bytes());
        wire.extend_from_slice(b"short");

        let mut framing = LengthPrefixed::new(4, be_u32_length).unwrap();
        let err = framing.read_frame(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, FrameError::StreamClosed));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn huge_announced_length_on_short_stream_closes() {
        let mut wire = vec![0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];
        wire.extend_from_slice(b"abc");

        let mut framing =
            LengthPrefixed::with_field(8, LengthField::new(0, 8, Endian::Big)).unwrap();
        let err = framing.read_frame(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, FrameError::StreamClosed));
    }

    #[test]
    fn unallocatable_length_rejected() {
        let header = [0x80, 0, 0, 0, 0, 0, 0, 0];
        let mut framing =
            LengthPrefixed::with_field(8, LengthField::new(0, 8, Endian::Big)).unwrap();

        let err = framing
            .read_frame(&mut Cursor::new(header.to_vec()))
            .unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength(_)));

        let mut buf = BytesMut::from(&header[..]);
        let err = framing.split_frame(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength(_)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn split_frame_reserves_in_bounded_steps() {
        let mut framing = LengthPrefixed::with_field(4, LengthField::u32_be(0)).unwrap();
        let mut buf = BytesMut::from(&[0xff, 0xff, 0xff, 0xff][..]);

        assert!(framing.split_frame(&mut buf).unwrap().is_none());
        assert!(buf.capacity() < 2 * READ_CHUNK);
    }

    #[test]
    fn zero_header_length_rejected() {
        let err = LengthPrefixed::new(0, |_| 0).unwrap_err();
        assert!(matches!(err, FrameError::InvalidConfig(_)));
    }

    #[test]
    fn field_must_fit_header() {
        let err = LengthPrefixed::with_field(3, LengthField::u32_be(0)).unwrap_err();
        assert!(matches!(err, FrameError::InvalidConfig(_)));

        let err = LengthPrefixed::with_field(8, LengthField::new(0, 3, Endian::Big)).unwrap_err();
        assert!(matches!(err, FrameError::InvalidConfig(_)));
    }

    #[test]
    fn field_decoding_and_adjustment() {
        let header = [0xAA, 0x01, 0x02, 0x00, 0x00];

        assert_eq!(LengthField::u8(1).decode(&header).unwrap(), 1);
        assert_eq!(LengthField::u16_be(1).decode(&header).unwrap(), 0x0102);
        assert_eq!(LengthField::u16_le(1).decode(&header).unwrap(), 0x0201);
        assert_eq!(
            LengthField::u16_be(1)
                .with_adjustment(-2)
                .decode(&header)
                .unwrap(),
            0x0100
        );
    }

    #[test]
    fn negative_adjusted_length_rejected_at_first_use() {
        // Length field counts the 2-byte header, so a raw value of 1 is bogus.
        let field = LengthField::u8(0).with_adjustment(-2);
        let mut framing = LengthPrefixed::with_field(2, field).unwrap();

        let err = framing
            .read_frame(&mut Cursor::new(vec![0x01u8, 0x00]))
            .unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength(_)));
    }

    #[test]
    fn max_frame_size_applies_to_payload() {
        let cfg = FrameConfig {
            max_frame_size: Some(4),
            ..FrameConfig::default()
        };
        let mut framing = LengthPrefixed::with_field(1, LengthField::u8(0))
            .unwrap()
            .with_config(cfg);

        let err = framing
            .read_frame(&mut Cursor::new(vec![0x05u8, 1, 2, 3, 4, 5]))
            .unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 5, max: 4 }));
    }

    #[test]
    fn split_frame_waits_for_full_packet() {
        let mut framing = LengthPrefixed::with_field(4, LengthField::u32_be(0)).unwrap();
        let mut buf = BytesMut::new();

        buf.put_slice(&[0, 0]);
        assert!(framing.split_frame(&mut buf).unwrap().is_none());

        buf.put_slice(&[0, 3, b'a']);
        assert!(framing.split_frame(&mut buf).unwrap().is_none());

        buf.put_slice(b"bc\x00\x00");
        let frame = framing.split_frame(&mut buf).unwrap().unwrap();
        assert_eq!(frame.as_bytes(), b"\x00\x00\x00\x03abc");
        assert_eq!(&buf[..], b"\x00\x00");
    }

    #[test]
    fn debug_hides_length_function() {
        let framing = LengthPrefixed::new(2, |_| 0).unwrap();
        let debug = format!("{framing:?}");
        assert!(debug.contains("header_length: 2"));
        assert!(debug.contains("<fn>"));
    }
}
