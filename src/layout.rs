//! Record layouts — the resolved schema for one type code (spec §3, §4.2).

use crate::consts::{FMT_LENGTH, FMT_TYPE_CODE};
use crate::type_mapping::{lookup, FieldKind, Scale};
use crate::FlexString;

/// One field's position within a record's byte payload, precompiled at FMT
/// registration time so the block decoder does no string-level format
/// interpretation on the hot path (spec §9, "dynamic unpack descriptor →
/// precompiled codec").
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Byte offset of this field relative to the start of the payload (i.e.
    /// relative to `record_start + 3`).
    pub offset: usize,
    pub name: FlexString,
    pub code: char,
    pub kind: FieldKind,
    pub scale: Scale,
}

/// A record layout: the name, total wire length, and ordered field
/// descriptors for one type code.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub type_code: u8,
    pub name: FlexString,
    /// Total on-wire length including the 3-byte header.
    pub length: usize,
    pub fields: Vec<FieldDescriptor>,
}

impl Layout {
    /// Build a layout from a FMT record's raw `Format` and `Columns`
    /// strings.
    ///
    /// `field_names` and `field_codes` are expected to be parallel
    /// (spec §3 invariant `|field_names| == |field_codes|`); where a FMT
    /// record declares mismatched counts, the descriptor list is built from
    /// as many pairs as both sequences provide rather than rejecting the
    /// whole record — the record already passed the name/length validity
    /// checks in the FMT prepass, and a short descriptor list still unpacks
    /// correctly for every field before the mismatch.
    ///
    /// A field whose type code is unknown (see [`crate::type_mapping`])
    /// contributes no descriptor: no bytes, no name, no offset advance.
    pub fn from_fmt_fields(
        type_code: u8,
        length: usize,
        name: FlexString,
        field_codes: &str,
        columns: &str,
    ) -> Self {
        let names: Vec<&str> = columns.split(',').map(str::trim).collect();

        let mut fields = Vec::new();
        let mut offset = 0usize;

        for (code, name_str) in field_codes.chars().zip(names.into_iter()) {
            if let Some((kind, scale)) = lookup(code) {
                fields.push(FieldDescriptor {
                    offset,
                    name: FlexString::from(name_str),
                    code,
                    kind,
                    scale,
                });
                offset += kind.byte_size();
            }
        }

        Layout {
            type_code,
            name,
            length,
            fields,
        }
    }

    /// The canonical layout for the FMT record itself: `<u8,u8,char[4],
    /// char[16],char[64]>` (spec §3).
    pub fn fmt_self() -> Self {
        use FieldKind::*;

        let mut fields = Vec::new();
        let mut offset = 0usize;
        for (name, kind) in [
            ("Type", U8),
            ("Length", U8),
            ("Name", Ascii(4)),
            ("Format", Ascii(16)),
            ("Columns", Ascii(64)),
        ] {
            fields.push(FieldDescriptor {
                offset,
                name: FlexString::from(name),
                code: '\0',
                kind,
                scale: Scale::None,
            });
            offset += kind.byte_size();
        }

        Layout {
            type_code: FMT_TYPE_CODE,
            name: FlexString::from("FMT"),
            length: FMT_LENGTH,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_self_matches_wire_layout() {
        let layout = Layout::fmt_self();
        assert_eq!(layout.type_code, FMT_TYPE_CODE);
        assert_eq!(layout.length, FMT_LENGTH);
        let payload_bytes: usize = layout.fields.iter().map(|f| f.kind.byte_size()).sum();
        assert_eq!(payload_bytes + 3, FMT_LENGTH);
    }

    #[test]
    fn unknown_code_drops_field_without_shifting_offsets() {
        let layout = Layout::from_fmt_fields(
            1,
            3 + 4 + 2,
            FlexString::from("XYZ"),
            "i?h",
            "First,Second,Third",
        );
        assert_eq!(layout.fields.len(), 2);
        assert_eq!(layout.fields[0].name, FlexString::from("First"));
        assert_eq!(layout.fields[0].offset, 0);
        assert_eq!(layout.fields[1].name, FlexString::from("Third"));
        assert_eq!(layout.fields[1].offset, 4);
    }
}
