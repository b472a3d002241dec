pub mod todo_repository;
pub mod user_repository;

/// Failures surfaced by the persistence layer. Everything except
/// `DuplicateEmail` maps to a generic 500 at the handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store failure: {0}")]
    Sled(#[from] sled::Error),

    #[error("encode failure: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode failure: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("email already exists")]
    DuplicateEmail,

    #[error("corrupt index entry: {0}")]
    CorruptIndex(String),
}

/// Shared handle to the embedded document store. `sled::Db` is internally
/// synchronized and cheap to clone, so one handle opened at boot is passed
/// to every repository.
#[derive(Clone)]
pub struct Database {
    pub db: sled::Db,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        Ok(Database { db })
    }

    /// Backing store for tests: lives in a temp location and is removed
    /// when the handle drops.
    #[allow(dead_code)]
    pub fn temporary() -> Result<Self, sled::Error> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Database { db })
    }
}
