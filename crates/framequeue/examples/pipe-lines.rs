//! Read a child process's stdout line by line without blocking forever.
//!
//! Run with:
//!   cargo run --example pipe-lines

use std::process::{Command, Stdio};
use std::time::Duration;

use framequeue::{BufferError, FrameBuffer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg("for i in 1 2 3; do echo line-$i; sleep 0.5; done")
        .stdout(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take().ok_or("child stdout not captured")?;
    let buffer = FrameBuffer::lines(stdout)?;

    loop {
        match buffer.receive_timeout(Duration::from_millis(200)) {
            Ok(line) => println!("got: {}", line.to_string_lossy()),
            Err(BufferError::Timeout(_)) => eprintln!("(waiting, {} queued)", buffer.available()),
            Err(BufferError::Closed(reason)) => {
                eprintln!("done: {reason}");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    child.wait()?;
    Ok(())
}
