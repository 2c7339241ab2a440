use crate::cmd::{load_schema, SchemaArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_schema, OutputFormat};

pub fn run(args: SchemaArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = load_schema(args.schema.as_deref())?;
    print_schema(&schema, args.header, format);
    Ok(SUCCESS)
}
