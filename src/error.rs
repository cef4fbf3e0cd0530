use thiserror::Error;

use crate::storage::HeapPageId;

#[derive(Error, Debug)]
pub enum DbError {
    /// The requested page lies outside the backing file.
    #[error("invalid page {0}")]
    InvalidPage(HeapPageId),

    /// Structural or capacity failure, e.g. no clean page to evict, or
    /// mismatched tuple schemas on insert.
    #[error("{0}")]
    Db(String),

    /// Raised by the deadlock detector; the caller must run abort cleanup
    /// via `transaction_complete(tx, false)`.
    #[error("transaction aborted")]
    TransactionAborted,

    /// Iterator exhausted or name lookup miss.
    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
