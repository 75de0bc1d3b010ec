//! Parallel Driver & Gather (spec §4.5): submits blocks to a worker pool and
//! streams decoded records to the consumer in strictly increasing
//! byte-offset order, regardless of worker completion order.
//!
//! Grounded in two corpus idioms: the teacher crate's
//! `thread::spawn` + `crossbeam_channel` worker/receiver pattern
//! (`summary_manager.rs`), and the out-of-order-buffer-then-drain idiom from
//! `other_examples/jafreck-lz4r`'s `WriteRegister` (a `BTreeMap` keyed by
//! sequence id, drained as the next id becomes available).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use memmap2::Mmap;

use crate::block_decoder::decode_block;
use crate::block_planner::Block;
use crate::record::DecodedRecord;
use crate::registry::FormatRegistry;

/// Spawn the worker pool and gather stage for one streaming session.
///
/// Returns a channel the consumer reads decoded records from, in
/// byte-offset order. Dropping the receiver before it is exhausted signals
/// cancellation: the driver stops submitting new blocks promptly, and
/// in-flight workers finish their current block (whose result is then
/// discarded) rather than being interrupted mid-block (spec §5).
pub fn spawn(
    mapping: Arc<Mmap>,
    registry: Arc<FormatRegistry>,
    blocks: Vec<Block>,
    wanted_type: Option<u8>,
    workers: usize,
) -> Receiver<DecodedRecord> {
    let workers = workers.max(1);
    let (task_tx, task_rx) = bounded::<Block>(blocks.len().max(1));
    let (result_tx, result_rx) = bounded::<(usize, Vec<DecodedRecord>)>(workers * 2);
    let (out_tx, out_rx) = bounded::<DecodedRecord>(workers * 64);

    let cancelled = Arc::new(AtomicBool::new(false));
    let total_blocks = blocks.len();

    for block in &blocks {
        // The channel is sized to hold every block up front, so this never
        // blocks; it exists so workers can `recv()` in a simple loop.
        let _ = task_tx.send(*block);
    }
    drop(task_tx);

    log::debug!(
        "driver: dispatching {} blocks to {} workers",
        total_blocks,
        workers
    );

    for worker_id in 0..workers {
        let task_rx = task_rx.clone();
        let result_tx = result_tx.clone();
        let mapping = Arc::clone(&mapping);
        let registry = Arc::clone(&registry);
        let cancelled = Arc::clone(&cancelled);

        thread::spawn(move || {
            while let Ok(block) = task_rx.recv() {
                if cancelled.load(Ordering::Relaxed) {
                    break;
                }
                let records =
                    decode_block(&mapping[..], block.start, block.end, &registry, wanted_type);
                log::debug!(
                    "worker {}: block {} decoded {} records",
                    worker_id,
                    block.index,
                    records.len()
                );
                if result_tx.send((block.index, records)).is_err() {
                    break;
                }
            }
        });
    }
    drop(result_tx);

    thread::spawn(move || {
        let mut waiting: BTreeMap<usize, Vec<DecodedRecord>> = BTreeMap::new();
        let mut expected = 0usize;

        for (index, records) in result_rx.iter() {
            waiting.insert(index, records);

            while let Some(records) = waiting.remove(&expected) {
                for record in records {
                    if out_tx.send(record).is_err() {
                        // Consumer dropped the receiver: stop submitting
                        // further work and let in-flight workers finish.
                        cancelled.store(true, Ordering::Relaxed);
                        log::debug!("driver: consumer abandoned iteration, cancelling");
                        return;
                    }
                }
                expected += 1;
            }

            if cancelled.load(Ordering::Relaxed) {
                return;
            }
        }

        log::debug!(
            "driver: gather complete, {} of {} blocks delivered",
            expected,
            total_blocks
        );
    });

    out_rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::FlexString;

    fn build_mapping(bytes: Vec<u8>) -> Arc<Mmap> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();
        let mapping = unsafe { Mmap::map(file.as_file()).unwrap() };
        // Keep the tempfile alive for the duration of the mapping by leaking
        // it within the test process; tests are short-lived.
        std::mem::forget(file);
        Arc::new(mapping)
    }

    fn gps_record(lat: i32) -> Vec<u8> {
        let mut buf = vec![0xA3, 0x95, 3];
        buf.extend_from_slice(&lat.to_le_bytes());
        buf
    }

    #[test]
    fn emits_all_blocks_in_order_regardless_of_completion_order() {
        let mut registry = FormatRegistry::new();
        registry.register(Layout::from_fmt_fields(3, 7, FlexString::from("GPS"), "i", "Lat"));
        let registry = Arc::new(registry);

        let mut data = Vec::new();
        let mut offsets = Vec::new();
        for i in 0..20 {
            offsets.push(data.len());
            data.extend(gps_record(i));
        }
        let mapping = build_mapping(data.clone());

        let blocks = crate::block_planner::plan(&data, 14); // roughly 2 records/block
        let rx = spawn(mapping, registry, blocks, None, 4);

        let received: Vec<DecodedRecord> = rx.iter().collect();
        assert_eq!(received.len(), 20);
        let received_offsets: Vec<usize> = received.iter().map(|r| r.offset).collect();
        assert_eq!(received_offsets, offsets);
    }

    #[test]
    fn dropping_receiver_does_not_hang() {
        let mut registry = FormatRegistry::new();
        registry.register(Layout::from_fmt_fields(3, 7, FlexString::from("GPS"), "i", "Lat"));
        let registry = Arc::new(registry);

        let mut data = Vec::new();
        for i in 0..200 {
            data.extend(gps_record(i));
        }
        let mapping = build_mapping(data.clone());
        let blocks = crate::block_planner::plan(&data, 20);
        let rx = spawn(mapping, registry, blocks, None, 4);

        // Take one record, then drop the receiver.
        let _ = rx.recv();
        drop(rx);
    }
}
