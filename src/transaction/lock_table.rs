use core::fmt;
use std::collections::{HashMap, HashSet};

use crate::{storage::HeapPageId, transaction::TransactionID};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Lock {
    XLock,
    SLock,
}

impl fmt::Display for Lock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

impl Permission {
    pub fn to_lock(&self) -> Lock {
        match self {
            Permission::ReadOnly => Lock::SLock,
            Permission::ReadWrite => Lock::XLock,
        }
    }
}

/// The lock state of one page: a shared/exclusive mode flag plus the set
/// of holders. Exclusive mode implies exactly one holder; an empty holder
/// set means the page is unlocked and the mode resets to shared for the
/// next acquirer.
pub(crate) struct LockSet {
    shared: bool,
    holders: HashSet<TransactionID>,
}

impl LockSet {
    fn new() -> Self {
        Self {
            shared: true,
            holders: HashSet::new(),
        }
    }

    /// Try to take the lock without blocking. Returns whether the request
    /// was granted; a refusal means the caller has to wait.
    pub(crate) fn acquire(&mut self, tid: TransactionID, lock: Lock) -> bool {
        if self.holds(tid) {
            if lock == Lock::XLock {
                if self.shared && self.holders.len() == 1 {
                    // upgrade: sole shared holder becomes exclusive
                    self.shared = false;
                } else {
                    // granted iff already exclusive; blocked while other
                    // shared holders remain
                    return !self.shared;
                }
            }
            return true;
        }

        match lock {
            Lock::SLock if self.shared => {
                self.holders.insert(tid);
                true
            }
            Lock::SLock if self.not_held() => {
                self.holders.insert(tid);
                self.shared = true;
                true
            }
            Lock::XLock if self.not_held() => {
                self.holders.insert(tid);
                self.shared = false;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn release(&mut self, tid: TransactionID) -> bool {
        let was_held = self.holders.remove(&tid);
        if self.holders.is_empty() {
            self.shared = true;
        }
        was_held
    }

    pub(crate) fn holds(&self, tid: TransactionID) -> bool {
        self.holders.contains(&tid)
    }

    pub(crate) fn not_held(&self) -> bool {
        self.holders.is_empty()
    }

    pub(crate) fn holders(&self) -> &HashSet<TransactionID> {
        &self.holders
    }
}

/// Per-page reader-writer locks keyed by page id. Every operation runs
/// under the buffer pool's monitor; nothing here synchronizes on its own.
pub(crate) struct LockTable {
    locks: HashMap<HeapPageId, LockSet>,
}

impl LockTable {
    pub(crate) fn new() -> Self {
        Self {
            locks: HashMap::new(),
        }
    }

    pub(crate) fn acquire(&mut self, tid: TransactionID, pid: &HeapPageId, lock: Lock) -> bool {
        self.locks
            .entry(*pid)
            .or_insert_with(LockSet::new)
            .acquire(tid, lock)
    }

    pub(crate) fn release(&mut self, tid: TransactionID, pid: &HeapPageId) -> bool {
        match self.locks.get_mut(pid) {
            Some(lock_set) => lock_set.release(tid),
            None => false,
        }
    }

    /// Release `tid` from every lock set.
    pub(crate) fn clear_transaction(&mut self, tid: TransactionID) {
        for lock_set in self.locks.values_mut() {
            lock_set.release(tid);
        }
    }

    /// The pages on which `tid` currently appears as a holder, in page-id
    /// order.
    pub(crate) fn transaction_pages(&self, tid: TransactionID) -> Vec<HeapPageId> {
        let mut pages: Vec<HeapPageId> = self
            .locks
            .iter()
            .filter(|(_, lock_set)| lock_set.holds(tid))
            .map(|(pid, _)| *pid)
            .collect();
        pages.sort();
        pages
    }

    pub(crate) fn holders(&self, pid: &HeapPageId) -> HashSet<TransactionID> {
        match self.locks.get(pid) {
            Some(lock_set) => lock_set.holders().clone(),
            None => HashSet::new(),
        }
    }

    pub(crate) fn holds_lock(&self, tid: TransactionID, pid: &HeapPageId) -> bool {
        self.locks
            .get(pid)
            .map_or(false, |lock_set| lock_set.holds(tid))
    }

    pub(crate) fn is_locked(&self, pid: &HeapPageId) -> bool {
        self.locks
            .get(pid)
            .map_or(false, |lock_set| !lock_set.not_held())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_acquires_stack() {
        let mut set = LockSet::new();
        assert!(set.acquire(1, Lock::SLock));
        assert!(set.acquire(2, Lock::SLock));
        // re-request is a no-op success
        assert!(set.acquire(1, Lock::SLock));
        assert_eq!(set.holders().len(), 2);
    }

    #[test]
    fn test_exclusive_excludes() {
        let mut set = LockSet::new();
        assert!(set.acquire(1, Lock::XLock));
        assert!(!set.acquire(2, Lock::SLock));
        assert!(!set.acquire(2, Lock::XLock));
        // the holder itself may re-request either mode
        assert!(set.acquire(1, Lock::SLock));
        assert!(set.acquire(1, Lock::XLock));
    }

    #[test]
    fn test_upgrade_only_for_sole_holder() {
        let mut set = LockSet::new();
        assert!(set.acquire(1, Lock::SLock));
        assert!(set.acquire(2, Lock::SLock));
        // blocked: another shared holder exists
        assert!(!set.acquire(1, Lock::XLock));

        set.release(2);
        assert!(set.acquire(1, Lock::XLock));
        assert!(!set.acquire(2, Lock::SLock));
    }

    #[test]
    fn test_release_resets_mode() {
        let mut set = LockSet::new();
        assert!(set.acquire(1, Lock::XLock));
        assert!(set.release(1));
        assert!(!set.release(1));
        assert!(set.acquire(2, Lock::SLock));
    }

    #[test]
    fn test_clear_transaction() {
        let mut table = LockTable::new();
        let p0 = HeapPageId::new(1, 0);
        let p1 = HeapPageId::new(1, 1);

        assert!(table.acquire(1, &p0, Lock::XLock));
        assert!(table.acquire(1, &p1, Lock::SLock));
        assert_eq!(table.transaction_pages(1), vec![p0, p1]);

        table.clear_transaction(1);
        assert!(table.transaction_pages(1).is_empty());
        assert!(!table.is_locked(&p0));
        assert!(table.acquire(2, &p0, Lock::XLock));
    }
}
