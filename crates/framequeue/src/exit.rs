use std::fmt;
use std::io;

use framequeue_buffer::{BufferError, FailureKind};
use framequeue_frame::FrameError;

// 124 and 125 follow timeout(1); 64 is EX_USAGE.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::InvalidConfig(_) => CliError::new(USAGE, format!("{context}: {err}")),
        FrameError::InvalidLength(_) | FrameError::FrameTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::StreamClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn buffer_error(context: &str, err: BufferError) -> CliError {
    match err {
        BufferError::Frame(err) => frame_error(context, err),
        BufferError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        BufferError::Closed(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        BufferError::Spawn(source) => io_error(context, source),
    }
}

/// Exit for a reader that stopped before the stream closed cleanly.
pub fn reader_failure(kind: FailureKind, reason: &str) -> CliError {
    let code = match kind {
        FailureKind::Io => FAILURE,
        FailureKind::InvalidData => DATA_INVALID,
        FailureKind::Panicked => INTERNAL,
    };
    CliError::new(code, format!("reader stopped: {reason}"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timeout_maps_to_timeout_code() {
        let err = buffer_error("receive failed", BufferError::Timeout(Duration::from_secs(1)));
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("receive failed: "));
    }

    #[test]
    fn config_errors_are_usage_errors() {
        let err = buffer_error(
            "invalid framing",
            BufferError::Frame(FrameError::InvalidConfig("separator must not be empty".into())),
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn oversized_frames_are_data_errors() {
        let err = frame_error("read failed", FrameError::FrameTooLarge { size: 9, max: 4 });
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn reader_failures_keep_their_kind() {
        assert_eq!(reader_failure(FailureKind::InvalidData, "bad").code, DATA_INVALID);
        assert_eq!(reader_failure(FailureKind::Io, "gone").code, FAILURE);
        let err = reader_failure(FailureKind::Panicked, "reader thread panicked");
        assert_eq!(err.code, INTERNAL);
        assert_eq!(err.message, "reader stopped: reader thread panicked");
    }

    #[test]
    fn permission_denied_io() {
        let err = io_error(
            "open failed",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
