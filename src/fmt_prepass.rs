//! FMT Prepass (spec §4.2): a single pass over the whole file that discovers
//! record layouts before any block is dispatched.

use crate::ascii;
use crate::consts::{FMT_LENGTH, FMT_TYPE_CODE};
use crate::layout::Layout;
use crate::registry::FormatRegistry;
use crate::sync_scan::find_sync_marker;
use crate::FlexString;

/// Byte length of a FMT record's body (everything after the 3-byte header):
/// `u8 Type, u8 Length, char[4] Name, char[16] Format, char[64] Columns`.
const FMT_BODY_LEN: usize = 1 + 1 + 4 + 16 + 64;

/// Scan `data` end to end for FMT records and build the resulting
/// [`FormatRegistry`]. FMT records may appear anywhere in the file, not only
/// at the head (spec §4.2 contract).
pub fn run(data: &[u8]) -> FormatRegistry {
    let mut registry = FormatRegistry::new();
    let len = data.len();
    let mut pos = 0usize;
    let mut discovered = 0usize;
    let mut rejected = 0usize;

    while let Some(marker_pos) = find_sync_marker(data, pos, len) {
        if marker_pos + 2 >= len {
            break;
        }
        if data[marker_pos + 2] != FMT_TYPE_CODE {
            pos = marker_pos + 1;
            continue;
        }

        let body_start = marker_pos + 3;
        if body_start + FMT_BODY_LEN > len {
            // Unpack failure on short input: resync by one byte (spec §4.2).
            rejected += 1;
            pos = marker_pos + 1;
            continue;
        }

        let type_code = data[body_start];
        let declared_length = data[body_start + 1] as usize;
        let name_bytes = &data[body_start + 2..body_start + 6];
        let format_bytes = &data[body_start + 6..body_start + 22];
        let columns_bytes = &data[body_start + 22..body_start + 86];

        let name = ascii::decode(name_bytes);
        if !ascii::is_alphanumeric_name(&name) {
            rejected += 1;
            log::trace!(
                "fmt prepass: rejected candidate at offset {} (name {:?} not alphanumeric)",
                marker_pos,
                name
            );
            pos = marker_pos + 1;
            continue;
        }

        let format_str = ascii::decode(format_bytes);
        let columns_str = ascii::decode(columns_bytes);

        let layout = Layout::from_fmt_fields(
            type_code,
            declared_length,
            FlexString::from(name.as_str()),
            &format_str,
            &columns_str,
        );
        log::trace!(
            "fmt prepass: registered type {} ({:?}, {} fields) at offset {}",
            type_code,
            name,
            layout.fields.len(),
            marker_pos
        );
        registry.register(layout);
        discovered += 1;

        pos = marker_pos + FMT_LENGTH;
    }

    registry.ensure_fmt_self_entry();
    log::debug!(
        "fmt prepass: {} layouts discovered, {} candidates rejected, registry holds {} entries",
        discovered,
        rejected,
        registry.len()
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_fmt_record(type_code: u8, length: u8, name: &str, format: &str, columns: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FMT_LENGTH);
        buf.extend_from_slice(&crate::consts::SYNC_MARKER);
        buf.push(FMT_TYPE_CODE);
        buf.push(type_code);
        buf.push(length);

        let mut name_field = [0u8; 4];
        name_field[..name.len()].copy_from_slice(name.as_bytes());
        buf.extend_from_slice(&name_field);

        let mut format_field = [0u8; 16];
        format_field[..format.len()].copy_from_slice(format.as_bytes());
        buf.extend_from_slice(&format_field);

        let mut columns_field = [0u8; 64];
        columns_field[..columns.len()].copy_from_slice(columns.as_bytes());
        buf.extend_from_slice(&columns_field);

        assert_eq!(buf.len(), FMT_LENGTH);
        buf
    }

    #[test]
    fn minimal_fmt_only_registers_self() {
        let data = build_fmt_record(128, 89, "FMT", "BB4sN4s16s64s", "Type,Length,Name,Format,Columns");
        let registry = run(&data);
        assert_eq!(registry.len(), 1);
        let layout = registry.get(128).unwrap();
        assert_eq!(layout.name, FlexString::from("FMT"));
    }

    #[test]
    fn discovers_gps_fmt_anywhere_in_file() {
        let mut data = vec![0u8; 17]; // garbage prefix
        data.extend(build_fmt_record(3, 20, "GPS", "BIL", "Status,TimeMS,Lat"));
        let registry = run(&data);
        assert_eq!(registry.resolve_name("GPS"), Some(3));
        let layout = registry.get(3).unwrap();
        assert_eq!(layout.length, 20);
        assert_eq!(layout.fields.len(), 3);
    }

    #[test]
    fn rejects_non_alphanumeric_name_and_resyncs() {
        let mut data = build_fmt_record(5, 10, "FOO", "B", "Val");
        // Corrupt only the name bytes of a second, bogus candidate placed right after.
        let mut bogus = build_fmt_record(6, 10, "BA_", "B", "Val");
        data.append(&mut bogus);
        let registry = run(&data);
        assert_eq!(registry.resolve_name("FOO"), Some(5));
        assert_eq!(registry.get(6), None);
    }

    #[test]
    fn last_definition_wins_on_duplicate_type_code() {
        let mut data = build_fmt_record(9, 10, "OLD", "B", "Val");
        data.extend(build_fmt_record(9, 14, "NEW", "BI", "A,B"));
        let registry = run(&data);
        let layout = registry.get(9).unwrap();
        assert_eq!(layout.name, FlexString::from("NEW"));
        assert_eq!(registry.resolve_name("OLD"), None);
    }
}
