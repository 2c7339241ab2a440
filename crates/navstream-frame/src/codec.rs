use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Rejection;
use crate::schema::{Field, Schema};

/// Header byte the logger firmware prints before every record.
pub const DEFAULT_HEADER: char = '$';

/// Returns true if `c` can serve as a record header marker.
pub fn is_valid_header(c: char) -> bool {
    c.is_ascii_graphic()
}

/// One parsed telemetry record.
///
/// Holds one optional value per [`Field`]; a frame produced by the parser
/// has every field of its schema set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryFrame {
    values: [Option<f64>; Field::COUNT],
}

impl TelemetryFrame {
    /// An empty frame with every field absent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: f64) {
        self.values[field.index()] = Some(value);
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.values[field.index()].is_some()
    }

    /// Present fields in canonical field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL
            .iter()
            .filter_map(|f| self.values[f.index()].map(|v| (*f, v)))
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for TelemetryFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.name(), &value)?;
        }
        map.end()
    }
}

/// Parse one telemetry line against `schema`.
///
/// Every leading `header` character is stripped, the rest is split on
/// whitespace and assigned to schema fields by position. Any arity mismatch
/// or non-numeric token rejects the whole line.
pub fn parse_line(
    line: &str,
    schema: &Schema,
    header: char,
) -> std::result::Result<TelemetryFrame, Rejection> {
    let body = line.trim_start_matches(header);
    let tokens: Vec<&str> = body.split_whitespace().collect();

    if tokens.len() != schema.len() {
        return Err(Rejection::Arity {
            expected: schema.len(),
            found: tokens.len(),
        });
    }

    let mut frame = TelemetryFrame::new();
    for (index, (field, token)) in schema.fields().iter().zip(tokens).enumerate() {
        let value: f64 = token.parse().map_err(|_| Rejection::InvalidNumber {
            index,
            field: *field,
            token: token.to_string(),
        })?;
        frame.set(*field, value);
    }

    Ok(frame)
}

/// Render a frame in the wire format, in schema order.
///
/// Fields missing from the frame are written as `NaN`.
pub fn format_line(frame: &TelemetryFrame, schema: &Schema, header: char) -> String {
    let mut line = String::new();
    line.push(header);
    for (i, field) in schema.fields().iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        match frame.get(*field) {
            Some(v) => line.push_str(&v.to_string()),
            None => line.push_str("NaN"),
        }
    }
    line
}

/// Parser bound to one schema and header marker.
#[derive(Debug, Clone)]
pub struct FrameParser {
    schema: Schema,
    header: char,
}

impl FrameParser {
    pub fn new(schema: Schema, header: char) -> Self {
        Self { schema, header }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn header(&self) -> char {
        self.header
    }

    /// True if `line` starts with this parser's header marker.
    pub fn accepts(&self, line: &str) -> bool {
        line.starts_with(self.header)
    }

    pub fn parse(&self, line: &str) -> std::result::Result<TelemetryFrame, Rejection> {
        parse_line(line, &self.schema, self.header)
    }

    pub fn format(&self, frame: &TelemetryFrame) -> String {
        format_line(frame, &self.schema, self.header)
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new(Schema::default(), DEFAULT_HEADER)
    }
}
