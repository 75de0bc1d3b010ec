//! Wire-format constants for the DataFlash / ".bin" record stream.

/// Two-byte sequence that precedes every record's type byte.
pub const SYNC_MARKER: [u8; 2] = [0xA3, 0x95];

/// Type code reserved for FMT records, which describe the layout of other
/// record types.
pub const FMT_TYPE_CODE: u8 = 128;

/// Total on-wire length of a FMT record, header included.
pub const FMT_LENGTH: usize = 89;

/// Field names that are preserved as raw bytes rather than ASCII-decoded,
/// regardless of their declared type code.
pub const RESERVED_BINARY_FIELDS: [&str; 3] = ["Data", "Data0", "Data1"];

/// Default block-planner target size (see [`crate::block_planner`]).
pub const DEFAULT_BLOCK_SIZE: usize = 12 * 1024 * 1024;

/// Default worker cap, independent of `hardware_parallelism`.
pub const DEFAULT_MAX_WORKERS: usize = 6;
