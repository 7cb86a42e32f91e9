use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;

use crate::error::{FrameError, Result};
use crate::frame::EofPolicy;

/// Fill `buf` completely from `src`.
///
/// Short reads are looped over; a single `read` call is never trusted to
/// return the full amount.
pub(crate) fn fill<R: Read + ?Sized>(src: &mut R, buf: &mut [u8], eof: EofPolicy) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => idle(eof, filled, buf.len())?,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err)
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
                    && matches!(eof, EofPolicy::Retry { .. }) =>
            {
                idle(eof, filled, buf.len())?
            }
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

/// Largest step a frame buffer grows by while its payload is read.
pub(crate) const READ_CHUNK: usize = 64 * 1024;

/// Append exactly `len` bytes from `src` to `buf`.
///
/// `len` comes off the wire, so the buffer grows in `READ_CHUNK` steps as
/// bytes arrive instead of being sized up front.
pub(crate) fn fill_append<R: Read + ?Sized>(
    src: &mut R,
    buf: &mut BytesMut,
    len: usize,
    eof: EofPolicy,
) -> Result<()> {
    let mut remaining = len;
    while remaining > 0 {
        let step = remaining.min(READ_CHUNK);
        let start = buf.len();
        buf.resize(start + step, 0);
        fill(src, &mut buf[start..], eof)?;
        remaining -= step;
    }
    Ok(())
}

fn idle(eof: EofPolicy, filled: usize, wanted: usize) -> Result<()> {
    match eof {
        EofPolicy::Close => Err(FrameError::StreamClosed),
        EofPolicy::Retry { interval } => {
            trace!(filled, wanted, "no data yet; polling again");
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use super::*;

    struct ZeroThenData {
        zeros: usize,
        data: Cursor<Vec<u8>>,
    }

    impl Read for ZeroThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.zeros > 0 {
                self.zeros -= 1;
                return Ok(0);
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn fills_across_short_reads() {
        let mut src = Cursor::new(b"abcdef".to_vec());
        let mut buf = [0u8; 4];
        fill(&mut src, &mut buf, EofPolicy::Close).unwrap();
        assert_eq!(&buf, b"abcd");
    }

    #[test]
    fn zero_read_closes_by_default() {
        let mut src = Cursor::new(b"ab".to_vec());
        let mut buf = [0u8; 4];
        let err = fill(&mut src, &mut buf, EofPolicy::Close).unwrap_err();
        assert!(matches!(err, FrameError::StreamClosed));
    }

    #[test]
    fn zero_read_retries_when_configured() {
        let mut src = ZeroThenData {
            zeros: 3,
            data: Cursor::new(b"xyz".to_vec()),
        };
        let mut buf = [0u8; 3];
        let eof = EofPolicy::Retry {
            interval: Duration::from_millis(1),
        };
        fill(&mut src, &mut buf, eof).unwrap();
        assert_eq!(&buf, b"xyz");
    }

    #[test]
    fn append_grows_in_bounded_steps() {
        let data = vec![7u8; READ_CHUNK * 2 + 3];
        let mut src = Cursor::new(data.clone());
        let mut buf = BytesMut::from(&b"hdr"[..]);

        fill_append(&mut src, &mut buf, data.len(), EofPolicy::Close).unwrap();
        assert_eq!(&buf[..3], b"hdr");
        assert_eq!(&buf[3..], &data[..]);
    }

    #[test]
    fn append_stops_at_end_of_stream_without_sizing_to_len() {
        let mut src = Cursor::new(b"abc".to_vec());
        let mut buf = BytesMut::new();

        let err = fill_append(&mut src, &mut buf, usize::MAX / 2, EofPolicy::Close).unwrap_err();
        assert!(matches!(err, FrameError::StreamClosed));
        assert!(buf.len() <= READ_CHUNK);
    }

    #[test]
    fn would_block_is_an_error_unless_retrying() {
        struct WouldBlock;
        impl Read for WouldBlock {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::WouldBlock))
            }
        }

        let mut buf = [0u8; 1];
        let err = fill(&mut WouldBlock, &mut buf, EofPolicy::Close).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }
}
