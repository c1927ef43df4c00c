//! Durable key-value storage used to persist the session role across restarts.

use thiserror::Error;

pub mod kv;

pub use kv::{FileKv, KvBackend, MemoryKv, StoreSettings, UnavailableKv};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage snapshot: {0}")]
    Snapshot(String),
}
