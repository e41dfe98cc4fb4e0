//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `assetstore_core` linkage.
//! - List storage records of a database file without printing credentials.
//!
//! Usage: `assetstore [DB_PATH]`. Without an argument the path comes from
//! `ASSETSTORE_DB_PATH` or falls back to the temp dir.

use assetstore_core::db::open_db;
use assetstore_core::{
    init_logging, SqliteStorageRepository, StorageFind, StorageRepository, StoreConfig,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("assetstore_core ping={}", assetstore_core::ping());
    println!("assetstore_core version={}", assetstore_core::core_version());

    let mut config = StoreConfig::from_env();
    if let Some(path) = std::env::args().nth(1) {
        config.db_path = PathBuf::from(path);
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &StoreConfig) -> Result<(), String> {
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let conn = open_db(&config.db_path)
        .map_err(|err| format!("failed to open `{}`: {err}", config.db_path.display()))?;
    let repo = SqliteStorageRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let list = repo
        .find_storage_list(&StorageFind::default())
        .map_err(|err| err.to_string())?;

    info!("event=cli_list module=cli status=ok count={}", list.len());
    println!("storage count={}", list.len());
    for storage in &list {
        println!(
            "id={} name={} end_point={} bucket={}",
            storage.id, storage.name, storage.end_point, storage.bucket
        );
    }

    Ok(())
}
