use framequeue_buffer::FrameBuffer;
use framequeue_frame::Delimited;

use crate::cmd::receive::{frame_config, open_stream, pump};
use crate::cmd::LinesArgs;
use crate::exit::{buffer_error, frame_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub fn run(args: LinesArgs, format: OutputFormat) -> CliResult<i32> {
    let separator = parse_separator(&args.separator)?;
    let framing = Delimited::with_separator(separator)
        .map_err(|err| frame_error("invalid separator", err))?
        .strip(!args.keep_separator)
        .with_config(frame_config(&args.receive)?);

    let stream = open_stream(&args.path)?;
    let buffer = FrameBuffer::spawn(stream, framing)
        .map_err(|err| buffer_error("failed to start reader", err))?;

    pump(&buffer, &args.receive, "line", format)
}

/// Decode the escapes accepted by `--separator`.
fn parse_separator(input: &str) -> CliResult<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();

    while let Some(byte) = bytes.next() {
        if byte != b'\\' {
            out.push(byte);
            continue;
        }
        let escaped = match bytes.next() {
            Some(b'n') => b'\n',
            Some(b'r') => b'\r',
            Some(b't') => b'\t',
            Some(b'0') => 0,
            Some(b'\\') => b'\\',
            Some(b'x') => {
                let hi = bytes.next().and_then(hex_digit);
                let lo = bytes.next().and_then(hex_digit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => (hi << 4) | lo,
                    _ => {
                        return Err(CliError::new(
                            USAGE,
                            format!("invalid \\x escape in separator: {input}"),
                        ))
                    }
                }
            }
            _ => {
                return Err(CliError::new(
                    USAGE,
                    format!("unsupported escape in separator: {input}"),
                ))
            }
        };
        out.push(escaped);
    }

    Ok(out)
}

fn hex_digit(byte: u8) -> Option<u8> {
    char::from(byte).to_digit(16).map(|d| d as u8)
}
