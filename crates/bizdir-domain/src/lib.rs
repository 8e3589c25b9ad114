//! Business directory domain types
//!
//! This crate provides the record model shared by the bizdir tools:
//! - Record: one business listing (name, address, phone, contact fields)
//! - Ingestion: turning a loosely-typed JSON batch into validated records
//! - Validation: errors and warnings for a single record

pub mod error;
pub mod ingest;
pub mod record;
pub mod validation;

pub use error::*;
pub use ingest::*;
pub use record::*;
pub use validation::*;
