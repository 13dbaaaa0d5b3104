use thiserror::Error;

/// Errors that can arise while interacting with the challenge registry and
/// its storage layer.
#[derive(Debug, Error)]
pub enum ChallengesError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, seed files, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// A caller-supplied challenge description failed a precondition.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A bulk save finished with one or more records unsaved. The rest of the
    /// batch was still attempted; `failed` lists the identities that were not
    /// written.
    #[error("save incomplete: {} record(s) failed, first error: {first_error}", .failed.len())]
    SaveIncomplete {
        failed: Vec<String>,
        first_error: String,
    },

    /// Internal error (worker channel breakage, unexpected conditions).
    #[error("internal error: {0}")]
    Internal(String),
}
