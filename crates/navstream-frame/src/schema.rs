//! Telemetry fields and the ordered schema shared with the sensor firmware.
//!
//! The firmware prints one token per active field, in a fixed order. The
//! schema here must list the same fields in the same order; only the token
//! count is checked at runtime.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Version stamped on schemas that don't declare one.
pub const SCHEMA_VERSION: u32 = 1;

/// Maximum size of a schema document loaded from disk.
pub const MAX_SCHEMA_FILE_SIZE: u64 = 64 * 1024;

/// A value the sensor can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Timestamp,
    Yaw,
    Pitch,
    Roll,
    GyroX,
    GyroY,
    GyroZ,
    AccelX,
    AccelY,
    AccelZ,
}

impl Field {
    /// Number of distinct fields.
    pub const COUNT: usize = 10;

    /// Every field in canonical order.
    pub const ALL: [Field; Field::COUNT] = [
        Field::Timestamp,
        Field::Yaw,
        Field::Pitch,
        Field::Roll,
        Field::GyroX,
        Field::GyroY,
        Field::GyroZ,
        Field::AccelX,
        Field::AccelY,
        Field::AccelZ,
    ];

    /// Slot index of this field inside a frame.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire/config name.
    pub fn name(self) -> &'static str {
        match self {
            Field::Timestamp => "timestamp",
            Field::Yaw => "yaw",
            Field::Pitch => "pitch",
            Field::Roll => "roll",
            Field::GyroX => "gyro_x",
            Field::GyroY => "gyro_y",
            Field::GyroZ => "gyro_z",
            Field::AccelX => "accel_x",
            Field::AccelY => "accel_y",
            Field::AccelZ => "accel_z",
        }
    }

    /// Physical unit the firmware reports this field in.
    pub fn unit(self) -> &'static str {
        match self {
            Field::Timestamp => "s",
            Field::Yaw | Field::Pitch | Field::Roll => "deg",
            Field::GyroX | Field::GyroY | Field::GyroZ => "rad/s",
            Field::AccelX | Field::AccelY | Field::AccelZ => "m/s^2",
        }
    }

    /// Look a field up by its wire name.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_name(s.trim()).ok_or_else(|| SchemaError::UnknownField(s.to_string()))
    }
}

/// Ordered list of active fields, versioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    version: u32,
    fields: Vec<Field>,
}

#[derive(Deserialize)]
struct SchemaDocument {
    #[serde(default = "default_version")]
    version: u32,
    fields: Vec<String>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

impl Schema {
    /// Build a schema from an ordered field list.
    pub fn new(fields: Vec<Field>) -> Result<Self, SchemaError> {
        Self::with_version(SCHEMA_VERSION, fields)
    }

    /// Build a schema with an explicit version.
    pub fn with_version(version: u32, fields: Vec<Field>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = [false; Field::COUNT];
        for field in &fields {
            if std::mem::replace(&mut seen[field.index()], true) {
                return Err(SchemaError::DuplicateField(*field));
            }
        }
        Ok(Self { version, fields })
    }

    /// Parse a schema document: `{"version": 1, "fields": ["timestamp", ...]}`.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument = serde_json::from_str(json)?;
        let fields = doc
            .fields
            .iter()
            .map(|name| name.parse())
            .collect::<Result<Vec<Field>, _>>()?;
        Self::with_version(doc.version, fields)
    }

    /// Load a schema document from disk.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let file = std::fs::File::open(path)?;
        let size = file.metadata()?.len();
        if size > MAX_SCHEMA_FILE_SIZE {
            return Err(SchemaError::TooLarge {
                size,
                max: MAX_SCHEMA_FILE_SIZE,
            });
        }

        let mut json = String::with_capacity(size as usize);
        file.take(MAX_SCHEMA_FILE_SIZE).read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of tokens expected per line.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for Schema {
    /// The ten-field layout the stock logger firmware prints.
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            fields: Field::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_matches_firmware_order() {
        let schema = Schema::default();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            [
                "timestamp", "yaw", "pitch", "roll", "gyro_x", "gyro_y", "gyro_z", "accel_x",
                "accel_y", "accel_z"
            ]
        );
        assert_eq!(schema.version(), SCHEMA_VERSION);
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
        assert!(Field::from_name("heading").is_none());
    }

    #[test]
    fn empty_schema_is_rejected() {
        assert!(matches!(Schema::new(vec![]), Err(SchemaError::Empty)));
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let err = Schema::new(vec![Field::Yaw, Field::Pitch, Field::Yaw]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField(Field::Yaw)));
    }

    #[test]
    fn subset_schema_keeps_order() {
        let schema = Schema::new(vec![Field::Roll, Field::Timestamp]).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields(), &[Field::Roll, Field::Timestamp]);
        assert!(!schema.fields().contains(&Field::Yaw));
    }

    #[test]
    fn from_json_reads_fields_and_version() {
        let schema =
            Schema::from_json(r#"{"version": 3, "fields": ["timestamp", "yaw", "accel_z"]}"#)
                .unwrap();
        assert_eq!(schema.version(), 3);
        assert_eq!(
            schema.fields(),
            &[Field::Timestamp, Field::Yaw, Field::AccelZ]
        );
    }

    #[test]
    fn from_json_defaults_version() {
        let schema = Schema::from_json(r#"{"fields": ["pitch"]}"#).unwrap();
        assert_eq!(schema.version(), SCHEMA_VERSION);
    }

    #[test]
    fn from_json_reports_unknown_field() {
        let err = Schema::from_json(r#"{"fields": ["yaw", "mag_x"]}"#).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField(name) if name == "mag_x"));
    }

    #[test]
    fn from_json_rejects_malformed_document() {
        let err = Schema::from_json(r#"{"fields": "yaw"}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }

    #[test]
    fn from_path_loads_document() {
        let dir = std::env::temp_dir().join(format!("navstream-schema-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("schema.json");
        std::fs::write(&path, r#"{"fields": ["gyro_x", "gyro_y", "gyro_z"]}"#).unwrap();

        let schema = Schema::from_path(&path).unwrap();
        assert_eq!(schema.len(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn from_path_rejects_oversized_document() {
        let dir = std::env::temp_dir().join(format!(
            "navstream-schema-large-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("schema.json");
        std::fs::write(&path, vec![b' '; (MAX_SCHEMA_FILE_SIZE + 1) as usize]).unwrap();

        let err = Schema::from_path(&path).unwrap_err();
        assert!(matches!(err, SchemaError::TooLarge { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
