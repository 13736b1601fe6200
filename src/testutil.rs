//! Test and benchmark utilities.
//!
//! This module is only available when the `testutil` feature is enabled.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tempfile::TempDir;

use crate::conf::StorageConfig;
use crate::store::{ConstrainedField, Field, Record, Store};

pub fn plain(value: impl Into<Value>) -> Field {
    Field::Plain(value.into())
}

pub fn constrained(value: impl Into<Value>, dtype: Option<&str>, unique: bool) -> Field {
    Field::Constrained(ConstrainedField {
        value: value.into(),
        dtype: dtype.map(str::to_string),
        unique: unique.then_some(true),
    })
}

pub fn record(fields: &[(&str, Field)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Open a store in a fresh temp directory. Keep the TempDir alive to prevent
/// cleanup.
pub fn temp_store() -> (Store, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Store::open(&StorageConfig {
        directory: dir.path().to_path_buf(),
    })
    .unwrap();
    (store, dir)
}

// Benchmark-specific utilities

/// RNG seed for deterministic record generation
pub const BENCH_RNG_SEED: u64 = 42;

/// Deterministic records for benchmarks: unique numeric id (row index),
/// a name derived from it, and a random score.
pub fn bench_records(num_rows: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(BENCH_RNG_SEED);
    (0..num_rows)
        .map(|i| {
            record(&[
                ("id", constrained(i as i64, Some("number"), true)),
                ("name", plain(format!("row_{i}"))),
                ("score", plain(rng.gen_range(0.0..1.0_f64))),
            ])
        })
        .collect()
}
