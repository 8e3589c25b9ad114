//! Test fixture loading utilities

use std::path::PathBuf;

use bizdir_domain::{parse_batch, Record};

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Load the sample directory batch
pub fn load_seed_sample() -> Vec<Record> {
    parse_batch(&load_fixture("seed_sample.json")).expect("seed_sample.json should parse")
}
