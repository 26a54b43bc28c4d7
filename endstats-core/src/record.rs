//! Loosely-typed views over host records.
//!
//! Host data structures change shape between game versions, so the core never
//! binds to a fixed layout for them. Adapters expose each record as a set of
//! named fields and each array-like container as a [`Frame`]; readers look
//! fields up by name and treat anything missing as a default.

use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::error::RecordError;
use crate::numbers::{fixed_raw_to_f64, parse_scalar_text};

/// Host fixed-point scalar, either as its raw bits or its textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixedScalar<'a> {
    Raw(i64),
    Text(Cow<'a, str>),
}

impl FixedScalar<'_> {
    /// Convert to floating point; unparseable values become 0.0.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Raw(raw) => fixed_raw_to_f64(*raw),
            Self::Text(text) => parse_scalar_text(text),
        }
    }
}

/// Value of one named field.
pub enum FieldValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Fixed(FixedScalar<'a>),
    /// Interned key (faction, definition or element name).
    Identifier(Cow<'a, str>),
    Text(Cow<'a, str>),
    Record(&'a dyn Record),
    Frame(&'a dyn Frame),
}

impl std::fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(value) => write!(f, "Bool({value})"),
            Self::Int(value) => write!(f, "Int({value})"),
            Self::Float(value) => write!(f, "Float({value})"),
            Self::Fixed(value) => write!(f, "Fixed({value:?})"),
            Self::Identifier(value) => write!(f, "Identifier({value:?})"),
            Self::Text(value) => write!(f, "Text({value:?})"),
            Self::Record(_) => write!(f, "Record(..)"),
            Self::Frame(frame) => write!(f, "Frame(len {})", frame.len()),
        }
    }
}

impl<'a> FieldValue<'a> {
    /// Numeric value of any scalar field. Never fails: text is parsed and
    /// anything else becomes 0.0.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let value = match self {
            Self::Int(value) => crate::numbers::i64_to_f64(*value),
            Self::Float(value) => *value,
            Self::Fixed(fixed) => fixed.to_f64(),
            Self::Bool(flag) => f64::from(u8::from(*flag)),
            Self::Identifier(text) | Self::Text(text) => parse_scalar_text(text),
            Self::Null | Self::Record(_) | Self::Frame(_) => 0.0,
        };
        if value.is_finite() { value } else { 0.0 }
    }

    #[must_use]
    pub fn to_i64(&self) -> i64 {
        match self {
            Self::Int(value) => *value,
            _ => i64::from(crate::numbers::round_f64_to_i32(self.to_f64())),
        }
    }

    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Identifier(text) | Self::Text(text) => text.eq_ignore_ascii_case("true"),
            Self::Null | Self::Record(_) | Self::Frame(_) => false,
            Self::Int(_) | Self::Float(_) | Self::Fixed(_) => self.to_f64() != 0.0,
        }
    }

    /// String content of identifier and text fields.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Identifier(text) | Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&'a dyn Record> {
        match self {
            Self::Record(record) => Some(*record),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_frame(&self) -> Option<&'a dyn Frame> {
        match self {
            Self::Frame(frame) => Some(*frame),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A host record exposing named fields.
pub trait Record {
    /// Declared field names, in declaration order.
    fn field_names(&self) -> Vec<Cow<'_, str>>;

    /// Read one field; `Ok(None)` when the record has no such field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field exists but cannot be read.
    fn field(&self, name: &str) -> Result<Option<FieldValue<'_>>, RecordError>;
}

/// A host array of records with a valid-length count.
pub trait Frame {
    /// Number of valid entries (may be less than the backing capacity).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record at `index`; `Ok(None)` for empty slots.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    fn record(&self, index: usize) -> Result<Option<&dyn Record>, RecordError>;
}

/// First non-null field among `names`.
///
/// # Errors
///
/// Returns the first read error encountered.
pub fn lookup<'r>(
    record: &'r dyn Record,
    names: &[&str],
) -> Result<Option<FieldValue<'r>>, RecordError> {
    for name in names {
        if let Some(value) = record.field(name)? {
            if !value.is_null() {
                return Ok(Some(value));
            }
        }
    }
    Ok(None)
}

/// Numeric field with a zero default.
///
/// # Errors
///
/// Returns an error if a candidate field cannot be read.
pub fn lookup_f64(record: &dyn Record, names: &[&str]) -> Result<f64, RecordError> {
    Ok(lookup(record, names)?.map_or(0.0, |value| value.to_f64()))
}

/// Integer field with a zero default.
///
/// # Errors
///
/// Returns an error if a candidate field cannot be read.
pub fn lookup_i64(record: &dyn Record, names: &[&str]) -> Result<i64, RecordError> {
    Ok(lookup(record, names)?.map_or(0, |value| value.to_i64()))
}

/// Boolean field with a `false` default.
///
/// # Errors
///
/// Returns an error if a candidate field cannot be read.
pub fn lookup_bool(record: &dyn Record, names: &[&str]) -> Result<bool, RecordError> {
    Ok(lookup(record, names)?.is_some_and(|value| value.to_bool()))
}

/// String field with an empty default.
///
/// # Errors
///
/// Returns an error if a candidate field cannot be read.
pub fn lookup_string(record: &dyn Record, names: &[&str]) -> Result<String, RecordError> {
    Ok(lookup(record, names)?
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default())
}

// JSON adapter ---------------------------------------------------------------
//
// Encoding used by recorded sessions:
//   string                      -> Text
//   {"id": "Key"}               -> Identifier
//   {"fixed": 65536 | "1.0"}    -> Fixed
//   [..] / {"data": [..], "length": n} -> Frame (valid length n)
//   other objects               -> Record

const JSON_IDENTIFIER_KEY: &str = "id";
const JSON_FIXED_KEY: &str = "fixed";
const JSON_FRAME_DATA_KEY: &str = "data";
const JSON_FRAME_LENGTH_KEY: &str = "length";

fn single_entry<'v>(map: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    if map.len() == 1 { map.get(key) } else { None }
}

fn is_framed_object(map: &Map<String, Value>) -> bool {
    map.len() == 2
        && map.get(JSON_FRAME_DATA_KEY).is_some_and(Value::is_array)
        && map.contains_key(JSON_FRAME_LENGTH_KEY)
}

fn json_field_value(value: &Value) -> FieldValue<'_> {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(flag) => FieldValue::Bool(*flag),
        Value::Number(number) => number
            .as_i64()
            .map_or_else(|| FieldValue::Float(number.as_f64().unwrap_or(0.0)), FieldValue::Int),
        Value::String(text) => FieldValue::Text(Cow::Borrowed(text)),
        Value::Array(_) => FieldValue::Frame(value),
        Value::Object(map) => {
            if let Some(Value::String(key)) = single_entry(map, JSON_IDENTIFIER_KEY) {
                return FieldValue::Identifier(Cow::Borrowed(key));
            }
            if let Some(fixed) = single_entry(map, JSON_FIXED_KEY) {
                return FieldValue::Fixed(match fixed {
                    Value::Number(number) => number.as_i64().map_or_else(
                        || FixedScalar::Text(Cow::Owned(number.to_string())),
                        FixedScalar::Raw,
                    ),
                    Value::String(text) => FixedScalar::Text(Cow::Borrowed(text)),
                    other => FixedScalar::Text(Cow::Owned(other.to_string())),
                });
            }
            if is_framed_object(map) {
                return FieldValue::Frame(value);
            }
            FieldValue::Record(value)
        }
    }
}

impl Record for Value {
    fn field_names(&self) -> Vec<Cow<'_, str>> {
        self.as_object()
            .map(|map| map.keys().map(|key| Cow::Borrowed(key.as_str())).collect())
            .unwrap_or_default()
    }

    fn field(&self, name: &str) -> Result<Option<FieldValue<'_>>, RecordError> {
        let Some(map) = self.as_object() else {
            return Err(RecordError::Shape {
                field: name.to_string(),
                detail: format!("record is not an object: {self}"),
            });
        };
        Ok(map.get(name).map(json_field_value))
    }
}

impl Frame for Value {
    fn len(&self) -> usize {
        match self {
            Self::Array(items) => items.len(),
            Self::Object(map) if is_framed_object(map) => {
                let capacity = map
                    .get(JSON_FRAME_DATA_KEY)
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                let declared = map
                    .get(JSON_FRAME_LENGTH_KEY)
                    .and_then(Value::as_u64)
                    .and_then(|len| usize::try_from(len).ok())
                    .unwrap_or(0);
                declared.min(capacity)
            }
            _ => 0,
        }
    }

    fn record(&self, index: usize) -> Result<Option<&dyn Record>, RecordError> {
        if index >= Frame::len(self) {
            return Ok(None);
        }
        let items = match self {
            Self::Array(items) => items,
            Self::Object(map) => map
                .get(JSON_FRAME_DATA_KEY)
                .and_then(Value::as_array)
                .ok_or_else(|| RecordError::Access("frame data missing".to_string()))?,
            _ => return Ok(None),
        };
        Ok(items
            .get(index)
            .filter(|item| !item.is_null())
            .map(|item| item as &dyn Record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_fields_map_to_tagged_values() {
        let record = json!({
            "Name": "Ashen",
            "FactionName": { "id": "Faction_Necrophage" },
            "Stock": { "fixed": 3 << 16 },
            "Cost": { "fixed": "12.5" },
            "Count": 4,
            "Ratio": 0.5,
            "Flag": true,
            "Nested": { "Name": "inner" },
            "Items": [1, 2]
        });

        assert!(matches!(record.field("Name").unwrap(), Some(FieldValue::Text(_))));
        assert!(matches!(
            record.field("FactionName").unwrap(),
            Some(FieldValue::Identifier(ref key)) if key == "Faction_Necrophage"
        ));
        assert!((lookup_f64(&record, &["Stock"]).unwrap() - 3.0).abs() < f64::EPSILON);
        assert!((lookup_f64(&record, &["Cost"]).unwrap() - 12.5).abs() < f64::EPSILON);
        assert_eq!(lookup_i64(&record, &["Count"]).unwrap(), 4);
        assert!(lookup_bool(&record, &["Flag"]).unwrap());
        assert!(record.field("Nested").unwrap().unwrap().as_record().is_some());
        assert_eq!(
            record.field("Items").unwrap().unwrap().as_frame().map(Frame::len),
            Some(2)
        );
        assert!(record.field("Missing").unwrap().is_none());
    }

    #[test]
    fn lookup_tries_names_in_order() {
        let record = json!({ "Old": 1, "New": null, "Other": 7 });
        assert_eq!(lookup_i64(&record, &["New", "Other", "Old"]).unwrap(), 7);
        assert_eq!(lookup_i64(&record, &["Absent"]).unwrap(), 0);
        assert_eq!(lookup_string(&record, &["Absent"]).unwrap(), "");
    }

    #[test]
    fn framed_object_respects_valid_length() {
        let frame = json!({ "data": [{ "A": 1 }, { "A": 2 }, { "A": 3 }], "length": 2 });
        assert_eq!(Frame::len(&frame), 2);
        assert!(frame.record(1).unwrap().is_some());
        assert!(frame.record(2).unwrap().is_none());
    }

    #[test]
    fn fixed_text_parsing_is_tolerant() {
        let record = json!({ "Value": { "fixed": "n/a" } });
        assert!(lookup_f64(&record, &["Value"]).unwrap().abs() < f64::EPSILON);
        let record = json!({ "Value": { "fixed": "12,5" } });
        assert!((lookup_f64(&record, &["Value"]).unwrap() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_object_records_report_shape_errors() {
        let record = json!(12);
        assert!(matches!(
            record.field("Any"),
            Err(RecordError::Shape { .. })
        ));
    }
}
