use framequeue_buffer::FrameBuffer;
use framequeue_frame::{Endian, LengthField, LengthPrefixed};

use crate::cmd::receive::{frame_config, open_stream, pump};
use crate::cmd::{EndianArg, PacketsArgs};
use crate::exit::{buffer_error, frame_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: PacketsArgs, format: OutputFormat) -> CliResult<i32> {
    let field = length_field(&args);
    let framing = LengthPrefixed::with_field(args.header_length, field)
        .map_err(|err| frame_error("invalid packet layout", err))?
        .with_config(frame_config(&args.receive)?);

    let stream = open_stream(&args.path)?;
    let buffer = FrameBuffer::spawn(stream, framing)
        .map_err(|err| buffer_error("failed to start reader", err))?;

    pump(&buffer, &args.receive, "packet", format)
}

fn length_field(args: &PacketsArgs) -> LengthField {
    let endian = match args.endian {
        EndianArg::Big => Endian::Big,
        EndianArg::Little => Endian::Little,
    };
    LengthField::new(args.length_offset, args.length_width, endian)
        .with_adjustment(args.length_adjust)
}
