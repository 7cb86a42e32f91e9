//! Background-reader frame queue for blocking, non-seekable streams.
//!
//! A [`FrameBuffer`] owns a dedicated reader thread that performs blocking
//! reads, frames the bytes with a [`Framing`](framequeue_frame::Framing)
//! policy and queues each completed frame. Consumers never touch the stream:
//! they poll [`FrameBuffer::available`] or wait for the next frame with a
//! bounded [`FrameBuffer::receive_timeout`].

pub mod buffer;
pub mod error;
pub mod state;

mod reader;

pub use buffer::{BufferConfig, FrameBuffer, DEFAULT_RECEIVE_TIMEOUT, DEFAULT_THREAD_NAME};
pub use error::{BufferError, Result};
pub use state::{FailureKind, ReaderState};
