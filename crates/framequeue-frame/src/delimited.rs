use std::io::Read;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::frame::{Frame, FrameConfig};
use crate::io::fill;
use crate::policy::Framing;

/// Default line separator.
pub const DEFAULT_SEPARATOR: &[u8] = b"\n";

const INITIAL_LINE_CAPACITY: usize = 128;

/// Delimiter framing: a frame ends when the accumulated bytes end with the
/// separator.
///
/// The blocking reader reads one byte at a time so that nothing past the
/// separator is ever consumed from the stream.
#[derive(Debug, Clone)]
pub struct Delimited {
    separator: Bytes,
    strip: bool,
    config: FrameConfig,
    /// Offset in the split buffer below which no separator can start.
    next_index: usize,
}

impl Default for Delimited {
    fn default() -> Self {
        Self {
            separator: Bytes::from_static(DEFAULT_SEPARATOR),
            strip: true,
            config: FrameConfig::default(),
            next_index: 0,
        }
    }
}

impl Delimited {
    /// Newline-delimited framing with the separator stripped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Framing on an arbitrary separator sequence.
    ///
    /// Returns `FrameError::InvalidConfig` for an empty separator.
    pub fn with_separator(separator: impl Into<Bytes>) -> Result<Self> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(FrameError::InvalidConfig(
                "separator must not be empty".to_string(),
            ));
        }
        Ok(Self {
            separator,
            ..Self::default()
        })
    }

    /// Whether the separator is removed from returned frames.
    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Override the shared framing configuration.
    pub fn with_config(mut self, config: FrameConfig) -> Self {
        self.config = config;
        self
    }

    /// The configured separator.
    pub fn separator(&self) -> &[u8] {
        &self.separator
    }

    /// Returns true if the separator is stripped from frames.
    pub fn strips_separator(&self) -> bool {
        self.strip
    }

    /// Current framing configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn finish(&self, mut line: BytesMut) -> Frame {
        if self.strip {
            line.truncate(line.len() - self.separator.len());
        }
        Frame::new(line.freeze())
    }

    /// `pending` bytes are buffered and still contain no separator.
    fn check_pending(&self, pending: usize) -> Result<()> {
        match self.config.max_frame_size {
            Some(max) if pending >= max.saturating_add(self.separator.len()) => {
                Err(FrameError::FrameTooLarge { size: pending, max })
            }
            _ => Ok(()),
        }
    }
}

impl Framing for Delimited {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn read_frame<R: Read + ?Sized>(&mut self, src: &mut R) -> Result<Frame> {
        let mut line = BytesMut::with_capacity(INITIAL_LINE_CAPACITY);
        let mut byte = [0u8; 1];
        loop {
            fill(src, &mut byte, self.config.eof)?;
            line.put_u8(byte[0]);

            if line.ends_with(&self.separator) {
                return Ok(self.finish(line));
            }
            self.check_pending(line.len())?;
        }
    }

    fn split_frame(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        let sep_len = self.separator.len();
        let from = self.next_index.min(src.len());
        let found = src[from..]
            .windows(sep_len)
            .position(|window| window == &self.separator[..])
            .map(|offset| from + offset);

        match found {
            Some(start) => {
                self.next_index = 0;
                let line = src.split_to(start + sep_len);
                Ok(Some(self.finish(line)))
            }
            None => {
                // A separator split across reads can still start in the tail.
                self.next_index = (src.len() + 1).saturating_sub(sep_len);
                self.check_pending(src.len())?;
                Ok(None)
            }
        }
    }
}
