//! Non-blocking, timeout-bounded frame queues over blocking streams.
//!
//! framequeue turns a blocking, non-seekable byte stream (a pipe, FIFO,
//! child process stdout or serial-like handle) into a frame queue that can be
//! polled without ever blocking on the stream itself.
//!
//! # Crate Structure
//!
//! - [`frame`]: Framing policies (delimiter, length-prefixed)
//! - [`buffer`]: Background reader thread and the timed receive queue

/// Re-export frame types.
pub mod frame {
    pub use framequeue_frame::*;
}

/// Re-export buffer types.
pub mod buffer {
    pub use framequeue_buffer::*;
}

pub use framequeue_buffer::{BufferError, FrameBuffer};
pub use framequeue_frame::{Delimited, Frame, LengthPrefixed};
