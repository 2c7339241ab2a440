use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use navstream_frame::{FrameParser, Schema, TelemetryFrame};
use navstream_pipeline::{PipelineReport, StatsSnapshot};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    seq: u64,
    fields: &'a TelemetryFrame,
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    reader: &'a str,
    consumer: &'a str,
    stats: &'a StatsSnapshot,
}

#[derive(Serialize)]
struct SchemaOutput<'a> {
    version: u32,
    header: char,
    fields: Vec<FieldOutput<'a>>,
}

#[derive(Serialize)]
struct FieldOutput<'a> {
    position: usize,
    name: &'a str,
    unit: &'a str,
}

/// Print one received frame. `seq` counts frames from 1.
pub fn print_frame(seq: u64, frame: &TelemetryFrame, parser: &FrameParser, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput { seq, fields: frame }),
        OutputFormat::Table => {
            let fields = parser.schema().fields();
            let mut header = vec!["SEQ".to_string()];
            header.extend(fields.iter().map(|f| f.name().to_ascii_uppercase()));
            let mut row = vec![seq.to_string()];
            row.extend(
                fields
                    .iter()
                    .map(|f| frame.get(*f).map(format_value).unwrap_or_default()),
            );

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(header)
                .add_row(row);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!("#{seq}");
            for (field, value) in frame.iter() {
                line.push_str(&format!(" {}={}", field, format_value(value)));
            }
            println!("{line}");
        }
        OutputFormat::Raw => {
            let mut line = parser.format(frame);
            line.push('\n');
            print_raw(line.as_bytes());
        }
    }
}

/// Print the end-of-run counters.
///
/// Raw output keeps stdout a clean record stream, so the summary goes to
/// stderr there.
pub fn print_summary(report: &PipelineReport, format: OutputFormat) {
    let summary = SummaryOutput {
        reader: report.reader.as_str(),
        consumer: report.consumer.as_str(),
        stats: &report.stats,
    };
    match format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COUNTER", "VALUE"]);
            for (name, value) in summary_rows(&summary) {
                table.add_row(vec![name.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line: Vec<String> = summary_rows(&summary)
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            println!("{}", line.join(" "));
        }
        OutputFormat::Raw => {
            let line: Vec<String> = summary_rows(&summary)
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            eprintln!("{}", line.join(" "));
        }
    }
}

pub fn print_schema(schema: &Schema, header: char, format: OutputFormat) {
    let out = SchemaOutput {
        version: schema.version(),
        header,
        fields: schema
            .fields()
            .iter()
            .enumerate()
            .map(|(position, f)| FieldOutput {
                position,
                name: f.name(),
                unit: f.unit(),
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "FIELD", "UNIT"]);
            for field in &out.fields {
                table.add_row(vec![
                    field.position.to_string(),
                    field.name.to_string(),
                    field.unit.to_string(),
                ]);
            }
            println!("schema v{} (header {:?})", out.version, out.header);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for field in &out.fields {
                println!("{}\t{}\t{}", field.position, field.name, field.unit);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn summary_rows(summary: &SummaryOutput<'_>) -> Vec<(&'static str, String)> {
    let s = summary.stats;
    vec![
        ("reader", summary.reader.to_string()),
        ("consumer", summary.consumer.to_string()),
        ("lines_read", s.lines_read.to_string()),
        ("lines_filtered", s.lines_filtered.to_string()),
        ("lines_enqueued", s.lines_enqueued.to_string()),
        ("lines_dropped", s.lines_dropped.to_string()),
        ("lines_oversized", s.lines_oversized.to_string()),
        ("decode_replacements", s.decode_replacements.to_string()),
        ("read_timeouts", s.read_timeouts.to_string()),
        ("frames_parsed", s.frames_parsed.to_string()),
        ("frames_rejected_arity", s.frames_rejected_arity.to_string()),
        ("frames_rejected_numeric", s.frames_rejected_numeric.to_string()),
    ]
}

fn format_value(value: f64) -> String {
    format!("{value:.2}")
}
