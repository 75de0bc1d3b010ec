//! This crate provides a parallel, streaming reader for autopilot DataFlash
//! (`.bin`) binary flight logs: the self-describing record format ArduPilot
//! and compatible autopilots write during flight.

mod ascii;
mod block_decoder;
mod block_planner;
mod consts;
mod driver;
mod fmt_prepass;
mod options;
mod record;
mod sync_scan;
mod type_mapping;
mod value;

pub mod error;
pub mod layout;
pub mod reader;
pub mod registry;

use smallstr::SmallString;

/// Convenience type alias for a string with the SSO, following the same
/// small-string convention as the `FIXED_STRING_LENGTH = 8` used throughout
/// field- and record-name handling.
const FIXED_STRING_LENGTH: usize = 8;
pub type FlexString = SmallString<[u8; FIXED_STRING_LENGTH]>;

/// Crate's `Result` type.
pub(crate) type Result<T> = std::result::Result<T, error::LogError>;

pub use block_planner::Block;
pub use error::LogError;
pub use layout::{FieldDescriptor, Layout};
pub use options::ReaderOptions;
pub use reader::{LogReader, RecordStream};
pub use record::DecodedRecord;
pub use registry::FormatRegistry;
pub use type_mapping::{FieldKind, Scale};
pub use value::FieldValue;
