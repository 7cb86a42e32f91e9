//! Framing policies for blocking, non-seekable byte streams.
//!
//! A framing policy decides where one frame ends inside a continuous stream:
//! - [`Delimited`] reads until a separator suffix (default `\n`) is seen
//! - [`LengthPrefixed`] reads a fixed-size header, then a payload whose length
//!   is computed from that header
//!
//! Policies never read past the end of the frame they are building, so a
//! stream can be handed to a dedicated reader thread without losing bytes
//! between frames.

pub mod delimited;
pub mod error;
pub mod frame;
pub mod length;
pub mod policy;

mod io;

#[cfg(feature = "async")]
pub mod codec;

pub use delimited::{Delimited, DEFAULT_SEPARATOR};
pub use error::{FrameError, Result};
pub use frame::{EofPolicy, Frame, FrameConfig};
pub use length::{Endian, LengthField, LengthFn, LengthPrefixed};
pub use policy::Framing;
