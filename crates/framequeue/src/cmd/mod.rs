use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod lines;
pub mod packets;
pub mod receive;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read delimiter-separated lines and print each one.
    Lines(LinesArgs),
    /// Read length-prefixed packets and print each one.
    Packets(PacketsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Lines(args) => lines::run(args, format),
        Command::Packets(args) => packets::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Options shared by every receiving command.
#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Maximum wait for each frame (e.g. 3s, 500ms).
    #[arg(long, default_value = "3s", env = "FRAMEQUEUE_TIMEOUT")]
    pub timeout: String,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Exit with a timeout status when no frame arrives within --timeout.
    #[arg(long)]
    pub idle_exit: bool,
    /// Reject frames whose content exceeds this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_frame_size: Option<usize>,
    /// Treat zero-byte reads as "no data yet" instead of end-of-stream.
    #[arg(long)]
    pub retry_on_eof: bool,
    /// Poll interval between zero-byte reads with --retry-on-eof.
    #[arg(long, default_value = "10ms")]
    pub poll_interval: String,
}

#[derive(Args, Debug)]
pub struct LinesArgs {
    /// File or FIFO to read; `-` reads stdin.
    #[arg(default_value = "-")]
    pub path: PathBuf,
    /// Line separator. Escapes: \n \r \t \0 \\ \xNN.
    #[arg(long, default_value = "\\n")]
    pub separator: String,
    /// Keep the separator at the end of each frame.
    #[arg(long)]
    pub keep_separator: bool,
    #[command(flatten)]
    pub receive: ReceiveArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum EndianArg {
    Big,
    Little,
}

#[derive(Args, Debug)]
pub struct PacketsArgs {
    /// File or FIFO to read; `-` reads stdin.
    #[arg(default_value = "-")]
    pub path: PathBuf,
    /// Fixed header size in bytes.
    #[arg(long)]
    pub header_length: usize,
    /// Offset of the length field inside the header.
    #[arg(long, default_value_t = 0)]
    pub length_offset: usize,
    /// Width of the length field in bytes (1, 2, 4 or 8).
    #[arg(long, default_value_t = 4)]
    pub length_width: usize,
    /// Byte order of the length field.
    #[arg(long, value_enum, default_value_t = EndianArg::Big)]
    pub endian: EndianArg,
    /// Value added to the decoded length, e.g. -4 when the field counts the header.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub length_adjust: i64,
    #[command(flatten)]
    pub receive: ReceiveArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
