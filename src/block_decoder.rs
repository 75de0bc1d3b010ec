//! Block Decoder (spec §4.4): the SCAN / TYPE / FILTER / UNPACK / POSTPROCESS
//! / EMIT state machine that turns one `[start, end)` byte range into an
//! ordered list of decoded records.

use crate::consts::{FMT_TYPE_CODE, RESERVED_BINARY_FIELDS};
use crate::layout::{FieldDescriptor, Layout};
use crate::registry::FormatRegistry;
use crate::sync_scan::find_sync_marker;
use crate::type_mapping::{FieldKind, Scale};
use crate::value::FieldValue;
use crate::{ascii, FlexString};
use crate::record::DecodedRecord;

/// Decode every record whose starting offset lies in `[start, end)`.
///
/// `data` is the full mapped file: a record found near the end of the block
/// may read payload bytes that physically live past `end` (block boundaries
/// only bound where a new record may *start*, per spec §4.3), so all reads
/// are checked against `data.len()`, not `end`.
pub fn decode_block(
    data: &[u8],
    start: usize,
    end: usize,
    registry: &FormatRegistry,
    wanted_type: Option<u8>,
) -> Vec<DecodedRecord> {
    let mut records = Vec::new();
    let mut pos = start;

    loop {
        // SCAN
        let marker_pos = match find_sync_marker(data, pos, end) {
            Some(p) => p,
            None => break,
        };

        // TYPE
        if marker_pos + 2 >= data.len() {
            break;
        }
        let type_code = data[marker_pos + 2];
        let layout = match registry.get(type_code) {
            Some(layout) => layout,
            None => {
                pos = marker_pos + 1;
                continue;
            }
        };

        // FMT records are metadata fully consumed by the FMT prepass
        // (spec §4.2); they are never themselves decoded into output, so
        // skip the whole record without emitting anything.
        if type_code == FMT_TYPE_CODE {
            pos = marker_pos + layout.length;
            continue;
        }

        // FILTER
        if let Some(wanted) = wanted_type {
            if wanted != type_code {
                pos = marker_pos + layout.length;
                continue;
            }
        }

        // UNPACK
        let payload_start = marker_pos + 3;
        let payload_end = marker_pos + layout.length;
        if payload_end > data.len() || payload_start > payload_end {
            pos = marker_pos + 1;
            continue;
        }

        // POSTPROCESS + EMIT
        let mut record = DecodedRecord::new(marker_pos, layout.fields.len() + 1);
        for field in &layout.fields {
            let value = match decode_field(data, payload_start, field) {
                Some(v) => v,
                None => {
                    // A field descriptor's bytes run past this record's own
                    // declared length: treat as an unpack failure.
                    record = DecodedRecord::new(marker_pos, 0);
                    break;
                }
            };
            record.push(field.name.clone(), value);
        }
        if record.is_empty() && !layout.fields.is_empty() {
            pos = marker_pos + 1;
            continue;
        }
        record.push(FlexString::from("mavpackettype"), FieldValue::Ascii(layout.name.as_str().to_owned()));

        records.push(record);
        pos = marker_pos + layout.length;
    }

    records
}

/// Unpack and post-process one field (spec §4.4 steps 4-5).
fn decode_field(data: &[u8], payload_start: usize, field: &FieldDescriptor) -> Option<FieldValue> {
    let start = payload_start + field.offset;
    let size = field.kind.byte_size();
    let bytes = data.get(start..start + size)?;

    let value = match field.kind {
        FieldKind::I8 => FieldValue::I8(bytes[0] as i8),
        FieldKind::U8 => FieldValue::U8(bytes[0]),
        FieldKind::I16 => FieldValue::I16(i16::from_le_bytes(bytes.try_into().ok()?)),
        FieldKind::U16 => FieldValue::U16(u16::from_le_bytes(bytes.try_into().ok()?)),
        FieldKind::I32 => FieldValue::I32(i32::from_le_bytes(bytes.try_into().ok()?)),
        FieldKind::U32 => FieldValue::U32(u32::from_le_bytes(bytes.try_into().ok()?)),
        FieldKind::I64 => FieldValue::I64(i64::from_le_bytes(bytes.try_into().ok()?)),
        FieldKind::U64 => FieldValue::U64(u64::from_le_bytes(bytes.try_into().ok()?)),
        FieldKind::F32 => FieldValue::F32(f32::from_le_bytes(bytes.try_into().ok()?)),
        FieldKind::F64 => FieldValue::F64(f64::from_le_bytes(bytes.try_into().ok()?)),
        FieldKind::Ascii(_) => {
            if RESERVED_BINARY_FIELDS.contains(&field.name.as_str()) {
                FieldValue::Raw(bytes.to_vec())
            } else {
                FieldValue::Ascii(ascii::decode(bytes))
            }
        }
        FieldKind::Int16Array => {
            let mut values = [0i16; 32];
            for (i, slot) in values.iter_mut().enumerate() {
                let chunk = bytes.get(i * 2..i * 2 + 2)?;
                *slot = i16::from_le_bytes(chunk.try_into().ok()?);
            }
            FieldValue::Int16Array(values)
        }
    };

    Some(apply_scale(value, field.scale))
}

fn apply_scale(value: FieldValue, scale: Scale) -> FieldValue {
    let divisor = match scale {
        Scale::None => return value,
        Scale::Div100 => 100.0,
        Scale::Div1e7 => 1e7,
    };

    if !value.is_numeric() {
        return value;
    }

    let raw: f64 = match value {
        FieldValue::I8(v) => v as f64,
        FieldValue::U8(v) => v as f64,
        FieldValue::I16(v) => v as f64,
        FieldValue::U16(v) => v as f64,
        FieldValue::I32(v) => v as f64,
        FieldValue::U32(v) => v as f64,
        FieldValue::I64(v) => v as f64,
        FieldValue::U64(v) => v as f64,
        FieldValue::F32(v) => v as f64,
        FieldValue::F64(v) => v,
        FieldValue::Scaled(v) => v,
        FieldValue::Ascii(_) | FieldValue::Raw(_) | FieldValue::Int16Array(_) => {
            unreachable!("is_numeric guard above excludes these variants")
        }
    };

    FieldValue::Scaled(raw / divisor)
}
