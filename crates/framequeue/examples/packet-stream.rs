//! Length-prefixed packets over a socket pair.
//!
//! Each packet is a 1-byte type, a 2-byte big-endian payload length, then
//! the payload.
//!
//! Run with:
//!   cargo run --example packet-stream

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::thread;
use std::time::Duration;

use framequeue::frame::{LengthField, LengthPrefixed};
use framequeue::{BufferError, FrameBuffer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (mut device, host) = UnixStream::pair()?;

    let framing = LengthPrefixed::with_field(3, LengthField::u16_be(1))?;
    let buffer = FrameBuffer::spawn(host, framing)?;

    let device_thread = thread::spawn(move || -> std::io::Result<()> {
        for (kind, payload) in [(1u8, &b"boot"[..]), (2, &b"temp=21.5"[..]), (3, &b""[..])] {
            let len = payload.len() as u16;
            device.write_all(&[kind])?;
            device.write_all(&len.to_be_bytes())?;
            device.write_all(payload)?;
            thread::sleep(Duration::from_millis(100));
        }
        Ok(())
    });

    loop {
        match buffer.receive() {
            Ok(packet) => {
                let (header, payload) = packet.split_at(3);
                println!(
                    "type={} payload={:?}",
                    header[0],
                    String::from_utf8_lossy(payload)
                );
            }
            Err(BufferError::Closed(_)) => break,
            Err(err) => return Err(err.into()),
        }
    }

    device_thread
        .join()
        .map_err(|_| "device thread panicked")??;
    Ok(())
}
