//! Error type shared by the dictionaries and the language model.

use std::io;

/// Errors raised while loading dictionaries or writing user phrases.
///
/// Lookups never fail: a reading with no entries yields an empty result.
/// Only I/O against data files and the persistent user store can error.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("fst error: {0}")]
    Fst(#[from] fst::Error),

    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("line {line}: malformed entry {content:?}")]
    Parse { line: usize, content: String },

    #[error("user phrase store lock poisoned")]
    LockPoisoned,

    #[error("invalid phrase: {0}")]
    InvalidPhrase(String),
}
