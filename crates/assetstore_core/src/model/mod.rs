//! Domain model for object-storage configuration records.
//!
//! # Responsibility
//! - Define canonical data structures used by the repository layer.
//!
//! # Invariants
//! - Every storage record is identified by a store-assigned `StorageId`.
//! - Deletion is physical; there are no tombstones.

pub mod storage;
