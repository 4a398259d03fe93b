//! Dataset fingerprint: BLAKE3 over every bar field.
//!
//! Two bar series hash equal iff they have the same length and bit-identical
//! timestamps and values. Reports show the hash so results can be tied to the
//! exact data they were produced from.

use crate::domain::Bar;

pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(bars.len() as u64).to_le_bytes());
    for bar in bars {
        hasher.update(&bar.timestamp.and_utc().timestamp_millis().to_le_bytes());
        for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
            hasher.update(&v.to_bits().to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
