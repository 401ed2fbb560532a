//! Block records and the positional epoch wire format.
//!
//! An epoch file is a JSON array whose first element is the list of blocks.
//! Every block is itself a sparse tuple of single-key objects:
//!
//! ```text
//! [ [ {"height":..}, {"time":..}, {"nTx":..}, _, _, {"size":..}, _, _, {"time_difference":..} ], ... ]
//! ```
//!
//! Decoding never fails on a single record: missing or non-numeric fields
//! fall back to fixed defaults and are counted in a [`ParseReport`].

use serde_json::Value;

/// Number of blocks between two difficulty retargets.
pub const BLOCKS_PER_EPOCH: u64 = 2016;

/// Fallback inter-block time (seconds) for a record without `time_difference`.
pub const DEFAULT_TIME_DIFFERENCE: i64 = 600;
/// Fallback block size (bytes), the size of an empty early block.
pub const DEFAULT_BLOCK_SIZE: u64 = 216;

const IDX_HEIGHT: usize = 0;
const IDX_TIME: usize = 1;
const IDX_N_TX: usize = 2;
const IDX_SIZE: usize = 5;
const IDX_TIME_DIFFERENCE: usize = 8;

/// One block of an epoch batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRecord {
    pub height: u64,
    /// Unix timestamp (seconds)
    pub time: i64,
    pub n_tx: u64,
    /// Serialized size in bytes
    pub size: u64,
    /// Seconds since the previous block. May be negative (miner clock skew).
    pub time_difference: i64,
}

impl BlockRecord {
    /// A record made only of fallbacks, for position `index` in its batch.
    pub fn fallback(index: usize) -> Self {
        Self {
            height: index as u64,
            time: 0,
            n_tx: 0,
            size: DEFAULT_BLOCK_SIZE,
            time_difference: DEFAULT_TIME_DIFFERENCE,
        }
    }
}

/// How many fields had to be replaced by fallbacks while decoding a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub records: usize,
    pub missing_height: usize,
    pub missing_time: usize,
    pub missing_n_tx: usize,
    pub missing_size: usize,
    pub missing_time_difference: usize,
}

impl ParseReport {
    /// Total number of substituted fields.
    pub fn fallbacks(&self) -> usize {
        self.missing_height
            + self.missing_time
            + self.missing_n_tx
            + self.missing_size
            + self.missing_time_difference
    }

    pub fn is_clean(&self) -> bool {
        self.fallbacks() == 0
    }
}

/// Decoded epoch batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpochBatch {
    pub records: Vec<BlockRecord>,
    pub report: ParseReport,
}

/// Highest epoch whose heights all fit in a `u64`.
pub const MAX_EPOCH: u64 = u64::MAX / BLOCKS_PER_EPOCH - 1;

/// Whether `epoch` can be displayed (its heights do not overflow).
pub fn is_valid_epoch(epoch: u64) -> bool {
    epoch <= MAX_EPOCH
}

/// First block height of an epoch. `epoch` must not exceed [`MAX_EPOCH`].
pub fn epoch_first_height(epoch: u64) -> u64 {
    epoch * BLOCKS_PER_EPOCH
}

/// Last block height of an epoch (inclusive).
pub fn epoch_last_height(epoch: u64) -> u64 {
    epoch_first_height(epoch) + BLOCKS_PER_EPOCH - 1
}

/// Epoch containing `height`.
pub fn epoch_of_height(height: u64) -> u64 {
    height / BLOCKS_PER_EPOCH
}

/// Decode an epoch payload.
///
/// Returns `None` only when the outer structure is absent (not an array, or
/// its first element is not an array); everything below that is recovered.
pub fn parse_epoch_payload(payload: &Value) -> Option<EpochBatch> {
    let blocks = payload.as_array()?.first()?.as_array()?;

    let mut report = ParseReport::default();
    let records = blocks
        .iter()
        .enumerate()
        .map(|(i, tuple)| parse_block_tuple(tuple, i, &mut report))
        .collect::<Vec<_>>();
    report.records = records.len();

    Some(EpochBatch { records, report })
}

/// Decode one positional block tuple, substituting fallbacks as needed.
pub fn parse_block_tuple(tuple: &Value, index: usize, report: &mut ParseReport) -> BlockRecord {
    let mut record = BlockRecord::fallback(index);

    match tuple_field(tuple, IDX_HEIGHT, "height").and_then(as_non_negative) {
        Some(h) => record.height = h,
        None => report.missing_height += 1,
    }
    match tuple_field(tuple, IDX_TIME, "time").and_then(as_integer) {
        Some(t) => record.time = t,
        None => report.missing_time += 1,
    }
    match tuple_field(tuple, IDX_N_TX, "nTx").and_then(as_non_negative) {
        Some(n) => record.n_tx = n,
        None => report.missing_n_tx += 1,
    }
    match tuple_field(tuple, IDX_SIZE, "size").and_then(as_non_negative) {
        Some(s) => record.size = s,
        None => report.missing_size += 1,
    }
    match tuple_field(tuple, IDX_TIME_DIFFERENCE, "time_difference").and_then(as_integer) {
        Some(d) => record.time_difference = d,
        None => report.missing_time_difference += 1,
    }

    record
}

fn tuple_field<'a>(tuple: &'a Value, index: usize, key: &str) -> Option<&'a Value> {
    tuple.as_array()?.get(index)?.get(key)
}

fn as_integer(v: &Value) -> Option<i64> {
    if let Some(i) = v.as_i64() {
        return Some(i);
    }
    let f = v.as_f64()?;
    f.is_finite().then(|| f.round() as i64)
}

fn as_non_negative(v: &Value) -> Option<u64> {
    as_integer(v).and_then(|i| u64::try_from(i).ok())
}
