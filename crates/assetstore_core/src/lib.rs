//! Persistence core for object-storage configuration records.
//! This crate owns the `storage` table and every statement issued against it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::storage::{
    Storage, StorageCreate, StorageDelete, StorageFind, StorageId, StoragePatch,
    StorageValidationError,
};
pub use repo::storage_repo::{
    classify_store_error, ErrorKind, RepoError, RepoResult, SqliteStorageRepository,
    StorageRepository,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
