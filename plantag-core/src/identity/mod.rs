//! Identity resolution
//!
//! Assigns one stable identifier per logical element across runs, backed by a
//! whole-file JSON snapshot that is loaded once per batch and flushed at a
//! caller-controlled cadence.

pub mod heuristics;
pub mod record;
pub mod resolver;
pub mod store;

pub use record::{GeometryKind, IdentityRecord, ResolutionKey};
pub use resolver::{
    CatalogEntry, CatalogLookup, IdentityContext, IdentityResolution, IdentityResolver,
    KnownCatalog,
};
pub use store::IdentityStore;

use thiserror::Error;

/// Identity store failures; fatal for identity resolution only
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Identity store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Unsupported identity store version {0}")]
    UnsupportedVersion(u32),

    #[error("Identity store lock poisoned")]
    LockPoisoned,

    #[error("Identity store path not configured")]
    MissingStorePath,

    #[error("Identity store persist failed: {0}")]
    Persist(#[from] plantag_common::Error),
}

pub type IdentityResult<T> = Result<T, IdentityError>;
