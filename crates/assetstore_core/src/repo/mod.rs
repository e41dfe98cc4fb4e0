//! Repository layer for storage configuration records.
//!
//! # Responsibility
//! - Define the data access contract used by the calling service layer.
//! - Isolate SQLite statement construction from callers.
//!
//! # Invariants
//! - Each repository call runs in exactly one transaction.
//! - Repository APIs return semantic errors (`NotFound`, validation) in
//!   addition to store errors.

mod query;
pub mod storage_repo;
