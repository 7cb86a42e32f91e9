use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use framequeue_buffer::{BufferError, FrameBuffer};
use framequeue_frame::{EofPolicy, FrameConfig};
use tracing::{debug, info};

use crate::cmd::ReceiveArgs;
use crate::exit::{
    buffer_error, io_error, reader_failure, CliError, CliResult, SUCCESS, TIMEOUT, USAGE,
};
use crate::output::{print_frame, OutputFormat};

/// Open the stream a command reads from. `-` is stdin.
pub fn open_stream(path: &Path) -> CliResult<Box<dyn Read + Send>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(std::io::stdin()));
    }
    let file = File::open(path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    Ok(Box::new(file))
}

pub fn frame_config(args: &ReceiveArgs) -> CliResult<FrameConfig> {
    let eof = if args.retry_on_eof {
        EofPolicy::Retry {
            interval: parse_duration(&args.poll_interval)?,
        }
    } else {
        EofPolicy::Close
    };
    Ok(FrameConfig {
        max_frame_size: args.max_frame_size,
        eof,
    })
}

/// Receive and print frames until the count is reached, the stream closes,
/// or Ctrl-C is pressed.
pub fn pump(
    buffer: &FrameBuffer,
    args: &ReceiveArgs,
    kind: &str,
    format: OutputFormat,
) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut received = 0usize;

    while running.load(Ordering::SeqCst) {
        if args.count.is_some_and(|count| received >= count) {
            return Ok(SUCCESS);
        }

        match buffer.receive_timeout(timeout) {
            Ok(frame) => {
                print_frame(&frame, received, kind, format);
                received = received.saturating_add(1);
            }
            Err(BufferError::Timeout(waited)) => {
                if args.idle_exit {
                    return Err(CliError::new(
                        TIMEOUT,
                        format!("no frame received within {waited:?}"),
                    ));
                }
                debug!(?waited, "no frame yet");
            }
            Err(BufferError::Closed(reason)) => {
                return match buffer.state().failure_kind() {
                    Some(kind) => Err(reader_failure(kind, &reason)),
                    None => {
                        info!(received, "stream closed");
                        Ok(SUCCESS)
                    }
                };
            }
            Err(err) => return Err(buffer_error("receive failed", err)),
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}
