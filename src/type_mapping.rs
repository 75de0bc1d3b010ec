//! The static table mapping autopilot type characters to binary field shapes
//! and scaling rules (spec §4.1).
//!
//! Unlike the teacher crate's `RecordData`/`BinRecord`, which carry growable
//! `Vec<T>` payloads sized at parse time, a field here has a fixed on-wire
//! size known purely from its type character — so the table is a plain
//! match, not a registry of its own.

/// The binary shape a single field occupies on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Fixed-width NUL-padded ASCII of the given byte length (4, 16, or 64).
    Ascii(u8),
    /// 32 little-endian `i16` values packed back to back.
    Int16Array,
}

impl FieldKind {
    pub fn byte_size(self) -> usize {
        match self {
            FieldKind::I8 | FieldKind::U8 => 1,
            FieldKind::I16 | FieldKind::U16 => 2,
            FieldKind::I32 | FieldKind::U32 | FieldKind::F32 => 4,
            FieldKind::I64 | FieldKind::U64 | FieldKind::F64 => 8,
            FieldKind::Ascii(len) => len as usize,
            FieldKind::Int16Array => 32 * 2,
        }
    }
}

/// Floating-point scaling applied after integer unpack (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    None,
    /// Divide by 100.0 (`c`, `C`, `e`, `E`).
    Div100,
    /// Divide by 1e7 (`L`).
    Div1e7,
}

/// Resolve a single autopilot type character to its binary shape and scaling
/// rule. Returns `None` for an unknown code, which contributes no bytes and
/// no field (spec §4.1).
pub fn lookup(code: char) -> Option<(FieldKind, Scale)> {
    use FieldKind::*;
    use Scale::*;

    Some(match code {
        'b' => (I8, None),
        'B' | 'M' => (U8, None),
        'h' => (I16, None),
        'H' => (U16, None),
        'i' => (I32, None),
        'L' => (I32, Div1e7),
        'e' => (I32, Div100),
        'I' => (U32, None),
        'E' => (U32, Div100),
        'f' => (F32, None),
        'd' => (F64, None),
        'q' => (I64, None),
        'Q' => (U64, None),
        'c' => (I16, Div100),
        'C' => (U16, Div100),
        'n' => (Ascii(4), None),
        'N' => (Ascii(16), None),
        'Z' => (Ascii(64), None),
        'a' => (Int16Array, None),
        _ => return None,
    })
}
