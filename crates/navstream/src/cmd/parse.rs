use navstream_frame::{is_valid_header, FrameParser};

use crate::cmd::{load_schema, ParseArgs};
use crate::exit::{rejection, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ParseArgs, format: OutputFormat) -> CliResult<i32> {
    if !is_valid_header(args.header) {
        return Err(CliError::new(
            USAGE,
            format!("header {:?} must be a printable ASCII character", args.header),
        ));
    }
    let parser = FrameParser::new(load_schema(args.schema.as_deref())?, args.header);

    // Same trailing trim the line reader applies to wire input.
    let line = args.line.trim_end();
    if !parser.accepts(line) {
        return Err(CliError::new(
            DATA_INVALID,
            format!("line does not start with header {:?}", args.header),
        ));
    }

    let frame = parser
        .parse(line)
        .map_err(|err| rejection("line rejected", err))?;
    print_frame(1, &frame, &parser, format);
    Ok(SUCCESS)
}
