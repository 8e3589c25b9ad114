//! bizdir-dedup: duplicate detection for business directory batches
//!
//! Given an in-memory batch of records, the engine decides which records
//! describe the same business and which one to keep:
//! - Normalization: comparable address and phone forms
//! - Grouping: cheap exact keys that pick candidate pairs
//! - Similarity: sequence-matching ratio over names
//! - Resolution: reasoned findings, survivor choice and optional clustering
//! - Merge: exact-address collapse with contact back-fill
//!
//! Reports, removal logs and batch file helpers sit on top for the
//! `bizdir-dedup` command line tool.

pub mod clustering;
pub mod config;
pub mod error;
pub mod grouping;
pub mod io;
pub mod merge;
pub mod normalization;
pub mod report;
pub mod resolution;
pub mod similarity;

pub use clustering::{cluster_findings, DuplicateCluster};
pub use config::{AbbreviationRule, DedupConfig};
pub use error::{ConfigError, DedupError, Result};
pub use grouping::{CandidateGroup, CandidateGrouper, CandidateGroups, GroupKind, PairKey, SeenPairs};
pub use merge::{merge_exact_address_duplicates, AddressMerge, MergeOutcome};
pub use normalization::{fold_diacritics, normalize_phone, street_number, NormalizedView, Normalizer};
pub use report::{apply_removals, DuplicateReport, RemovalLog};
pub use resolution::{
    choose_survivor, completeness_score, DuplicateFinding, DuplicateResolution,
    DuplicateResolver, MatchReason,
};
pub use similarity::{name_similarity, ratio};
