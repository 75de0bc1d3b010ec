//! Streaming API (spec §4.6): the single entry point consumers use.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use memmap2::Mmap;

use crate::block_planner;
use crate::driver;
use crate::error::LogError;
use crate::fmt_prepass;
use crate::options::ReaderOptions;
use crate::record::DecodedRecord;
use crate::registry::FormatRegistry;

/// An open DataFlash log: a memory-mapped file plus the [`FormatRegistry`]
/// discovered by the FMT prepass at construction time.
///
/// Construction runs the whole-file FMT prepass once; [`LogReader::iterate`]
/// may then be called any number of times, each call planning blocks and
/// dispatching a fresh parallel decode session (spec §4.6: the returned
/// sequence itself is not restartable, but the reader is reusable).
pub struct LogReader {
    mapping: Arc<Mmap>,
    registry: Arc<FormatRegistry>,
    options: ReaderOptions,
}

impl LogReader {
    /// Open `path`, memory-map it, and run the FMT prepass. This is the only
    /// fallible operation in the crate's public surface — every parsing
    /// failure after this point is handled locally (spec §7).
    pub fn open(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self, LogError> {
        Self::open_impl(path.as_ref(), options)
    }

    fn open_impl(path: &Path, options: ReaderOptions) -> Result<Self, LogError> {
        let file = File::open(path).map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: the mapping is read-only and the backing file is not
        // truncated or modified for the lifetime of this `LogReader`; that
        // is an external-file-system contract the caller is responsible
        // for, exactly as for any other mmap-based reader.
        let mapping = unsafe { Mmap::map(&file) }.map_err(|source| LogError::Map {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("opened {}: {} bytes", path.display(), mapping.len());

        let registry = fmt_prepass::run(&mapping);
        log::info!(
            "{}: format registry has {} entries after prepass",
            path.display(),
            registry.len()
        );

        Ok(LogReader {
            mapping: Arc::new(mapping),
            registry: Arc::new(registry),
            options,
        })
    }

    /// The discovered record layouts, available for inspection before or
    /// between calls to [`iterate`](Self::iterate).
    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn file_size(&self) -> usize {
        self.mapping.len()
    }

    /// Start a new streaming session. If `name` is given and does not
    /// resolve to a known type code, the returned sequence is empty (spec
    /// §4.6) rather than an error.
    pub fn iterate(&self, name: Option<&str>) -> RecordStream {
        let wanted_type = match name {
            None => None,
            Some(name) => match self.registry.resolve_name(name) {
                Some(type_code) => Some(type_code),
                None => {
                    log::debug!(
                        "iterate: name {:?} does not resolve to a known type, yielding nothing",
                        name
                    );
                    return RecordStream::empty();
                }
            },
        };

        let blocks = block_planner::plan(&self.mapping, self.options.block_size());
        log::info!(
            "iterate: {} blocks planned (target size {}), {} workers",
            blocks.len(),
            self.options.block_size(),
            self.options.workers()
        );

        let receiver = driver::spawn(
            Arc::clone(&self.mapping),
            Arc::clone(&self.registry),
            blocks,
            wanted_type,
            self.options.workers(),
        );

        RecordStream {
            receiver: Some(receiver),
        }
    }
}

/// A lazy, finite, non-restartable sequence of decoded records in
/// byte-offset order (spec §4.6).
pub struct RecordStream {
    receiver: Option<Receiver<DecodedRecord>>,
}

impl RecordStream {
    fn empty() -> Self {
        RecordStream { receiver: None }
    }
}

impl Iterator for RecordStream {
    type Item = DecodedRecord;

    fn next(&mut self) -> Option<DecodedRecord> {
        self.receiver.as_ref()?.recv().ok()
    }
}

impl LogError {
    pub fn path(&self) -> &PathBuf {
        match self {
            LogError::Open { path, .. } | LogError::Map { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn fmt_record(type_code: u8, length: u8, name: &str, format: &str, columns: &str) -> Vec<u8> {
        let mut buf = vec![0xA3, 0x95, 128, type_code, length];
        let mut name_field = [0u8; 4];
        name_field[..name.len()].copy_from_slice(name.as_bytes());
        buf.extend_from_slice(&name_field);
        let mut format_field = [0u8; 16];
        format_field[..format.len()].copy_from_slice(format.as_bytes());
        buf.extend_from_slice(&format_field);
        let mut columns_field = [0u8; 64];
        columns_field[..columns.len()].copy_from_slice(columns.as_bytes());
        buf.extend_from_slice(&columns_field);
        buf
    }

    fn gps_record(lat: i32) -> Vec<u8> {
        let mut buf = vec![0xA3, 0x95, 3];
        buf.extend_from_slice(&lat.to_le_bytes());
        buf
    }

    #[test]
    fn open_nonexistent_file_is_a_fatal_open_error() {
        let result = LogReader::open("/no/such/path/for/this/test", ReaderOptions::new());
        assert!(matches!(result, Err(LogError::Open { .. })));
    }

    #[test]
    fn empty_file_yields_empty_sequence() {
        let file = write_log(&[]);
        let reader = LogReader::open(file.path(), ReaderOptions::new()).unwrap();
        assert_eq!(reader.registry().len(), 1); // canonical FMT self-entry only
        assert_eq!(reader.iterate(None).count(), 0);
    }

    #[test]
    fn fmt_only_file_yields_empty_sequence() {
        let data = fmt_record(128, 89, "FMT", "BB4sN4s16s64s", "Type,Length,Name,Format,Columns");
        let file = write_log(&data);
        let reader = LogReader::open(file.path(), ReaderOptions::new()).unwrap();
        assert_eq!(reader.iterate(None).count(), 0);
    }

    #[test]
    fn filter_equivalence_unresolved_name_yields_empty_sequence() {
        let mut data = fmt_record(3, 7, "GPS", "i", "Lat");
        data.extend(gps_record(10));
        let file = write_log(&data);
        let reader = LogReader::open(file.path(), ReaderOptions::new()).unwrap();
        assert_eq!(reader.iterate(Some("NOSUCHTYPE")).count(), 0);
        assert_eq!(reader.iterate(Some("GPS")).count(), 1);
    }

    #[test]
    fn end_to_end_order_and_round_trip_of_mavpackettype() {
        let mut data = fmt_record(3, 7, "GPS", "i", "Lat");
        for lat in [1, 2, 3] {
            data.extend(gps_record(lat));
        }
        let file = write_log(&data);
        let reader = LogReader::open(
            file.path(),
            ReaderOptions::new().with_block_size(8).with_workers(3),
        )
        .unwrap();

        let records: Vec<_> = reader.iterate(None).collect();
        assert_eq!(records.len(), 3);
        for (record, expected_offset) in records.iter().zip([89, 96, 103]) {
            assert_eq!(record.offset, expected_offset);
            assert_eq!(record.record_name(), "GPS");
        }
    }
}
