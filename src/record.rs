//! Decoded records (spec §3).

use crate::value::FieldValue;
use crate::FlexString;

/// A single decoded record: an ordered, flat sequence of `(field name,
/// value)` pairs plus the synthetic `mavpackettype` field, matching
/// insertion order to the layout's declared field order with
/// `mavpackettype` appended last.
///
/// A flat `Vec` rather than a `HashMap` follows the teacher crate's
/// "dynamic mapping → ordered small mapping" shape (spec §9): the field set
/// per layout is small and fixed, so linear lookup is both simpler and
/// cache-friendlier than hashing.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// Byte offset in the source file where this record begins.
    pub offset: usize,
    fields: Vec<(FlexString, FieldValue)>,
}

impl DecodedRecord {
    pub(crate) fn new(offset: usize, capacity: usize) -> Self {
        DecodedRecord {
            offset,
            fields: Vec::with_capacity(capacity + 1),
        }
    }

    pub(crate) fn push(&mut self, name: FlexString, value: FieldValue) {
        self.fields.push((name, value));
    }

    /// The record's type name — equal to `mavpackettype` and to the FMT
    /// `Name` field that defined this record's layout.
    pub fn record_name(&self) -> &str {
        self.fields
            .iter()
            .find(|(name, _)| name.as_str() == "mavpackettype")
            .and_then(|(_, value)| match value {
                FieldValue::Ascii(s) => Some(s.as_str()),
                _ => None,
            })
            .unwrap_or("")
    }

    pub fn get(&self, field_name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name.as_str() == field_name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
