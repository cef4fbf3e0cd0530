use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{database::Database, transaction::TransactionID, types::DbResult};

static TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle of one transaction, valid from `new` until `commit` or `abort`.
#[derive(Eq, Hash, PartialEq, Clone, Copy)]
pub struct Transaction {
    // increase monotonically by 1
    id: TransactionID,
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            id: TRANSACTION_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn get_id(&self) -> TransactionID {
        self.id
    }

    pub fn commit(&self) -> DbResult<()> {
        Database::buffer_pool().transaction_complete(self, true)
    }

    pub fn abort(&self) -> DbResult<()> {
        Database::buffer_pool().transaction_complete(self, false)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tx_{}", self.id)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}
