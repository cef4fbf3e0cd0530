use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Condvar, Mutex, RwLock,
    },
};

use log::debug;

use crate::{
    database::Database,
    error::DbError,
    storage::{page::HeapPage, page_id::HeapPageId, tuple::Tuple},
    transaction::{
        lock_table::LockTable, wait_for_graph::WaitForGraph, Permission, Transaction,
        TransactionID,
    },
    types::{DbResult, Pod, ResultPod},
    utils::HandyRwLock,
};

pub const DEFAULT_PAGE_SIZE: usize = 4096;
static PAGE_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_PAGE_SIZE);

/// Default number of pages passed to the constructor.
pub const DEFAULT_PAGES: usize = 50;

/// The single entry point through which executors and heap files obtain
/// pages, and the authority that commits or aborts transactions.
///
/// The pool owns a bounded page cache, the per-page lock table and the
/// waits-for graph. All three live behind one mutex (the monitor); a
/// blocked `get_page` suspends on the condition variable and every
/// release, commit or abort broadcasts to all waiters.
pub struct BufferPool {
    state: Mutex<PoolState>,
    waiters: Condvar,
    max_capacity: usize,
}

struct PoolState {
    cache: BTreeMap<HeapPageId, Pod<HeapPage>>,
    lock_table: LockTable,
    wait_for: WaitForGraph,
    // the page each suspended transaction is currently blocked on
    blocked: HashMap<TransactionID, HeapPageId>,
}

impl BufferPool {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            state: Mutex::new(PoolState {
                cache: BTreeMap::new(),
                lock_table: LockTable::new(),
                wait_for: WaitForGraph::new(),
                blocked: HashMap::new(),
            }),
            waiters: Condvar::new(),
            max_capacity,
        }
    }

    pub fn get_page_size() -> usize {
        PAGE_SIZE.load(Ordering::Relaxed)
    }

    /// Only for tests, and only before a buffer pool is constructed.
    pub fn set_page_size(page_size: usize) {
        PAGE_SIZE.store(page_size, Ordering::Relaxed);
    }

    /// Retrieve the specified page with the associated permissions. Will
    /// acquire a lock and may block if that lock is held by another
    /// transaction.
    ///
    /// The retrieved page should be looked up in the buffer pool. If it
    /// is present, it should be returned. If it is not present, it should
    /// be added to the buffer pool and returned. If there is insufficient
    /// space in the buffer pool, a page should be evicted and the new
    /// page should be added in its place.
    pub fn get_page(
        &self,
        tx: &Transaction,
        pid: &HeapPageId,
        perm: Permission,
    ) -> ResultPod<HeapPage> {
        let tid = tx.get_id();
        let lock = perm.to_lock();
        let mut state = self.state.lock().unwrap();

        // Tentative waits-for edges: this transaction waits for every
        // current holder, and every transaction already queued on this
        // page waits for this one (it will either hold or queue ahead).
        for holder in state.lock_table.holders(pid) {
            if holder != tid {
                state.wait_for.add_edge(tid, holder);
            }
        }
        let co_waiters: Vec<TransactionID> = state
            .blocked
            .iter()
            .filter(|(waiter, waited_pid)| **waiter != tid && **waited_pid == *pid)
            .map(|(waiter, _)| *waiter)
            .collect();
        for waiter in co_waiters {
            state.wait_for.add_edge(waiter, tid);
        }
        state.blocked.insert(tid, *pid);

        loop {
            if state.lock_table.acquire(tid, pid, lock) {
                break;
            }
            if state.wait_for.has_cycle_from(tid) {
                debug!("deadlock detected, {} gives up on {}", tx, pid);
                Self::clear_wait(&mut state, tid, pid);
                return Err(DbError::TransactionAborted);
            }
            state = self.waiters.wait(state).unwrap();
        }
        Self::clear_wait(&mut state, tid, pid);

        if !state.cache.contains_key(pid) {
            if state.cache.len() >= self.max_capacity {
                Self::evict_page(&mut state)?;
            }
            let table_rc = Database::catalog().get_table(pid.table_id)?;
            let page = table_rc.rl().read_page(pid)?;
            state.cache.insert(*pid, Arc::new(RwLock::new(page)));
        }
        Ok(state.cache.get(pid).unwrap().clone())
    }

    /// Drop the waits-for bookkeeping of `tid`'s attempt on `pid`: its
    /// outgoing edges and the edges other waiters on the same page carry
    /// towards it.
    fn clear_wait(state: &mut PoolState, tid: TransactionID, pid: &HeapPageId) {
        state.blocked.remove(&tid);
        state.wait_for.remove_waiter(tid);

        let co_waiters: Vec<TransactionID> = state
            .blocked
            .iter()
            .filter(|(_, waited_pid)| **waited_pid == *pid)
            .map(|(waiter, _)| *waiter)
            .collect();
        for waiter in co_waiters {
            state.wait_for.remove_edge(waiter, tid);
        }
    }

    /// Release the lock on a page unconditionally.
    ///
    /// Calling this is very risky, and may result in wrong behavior. Think
    /// hard about who needs to call this and why, and why they can run the
    /// risk of calling it.
    pub fn release_page(&self, tx: &Transaction, pid: &HeapPageId) {
        let mut state = self.state.lock().unwrap();
        let tid = tx.get_id();

        Self::clear_wait(&mut state, tid, pid);
        state.lock_table.release(tid, pid);
        self.waiters.notify_all();
    }

    /// Return true if the specified transaction has a lock on the
    /// specified page.
    pub fn holds_lock(&self, tx: &Transaction, pid: &HeapPageId) -> bool {
        let state = self.state.lock().unwrap();
        state.lock_table.holds_lock(tx.get_id(), pid)
    }

    /// Add a tuple to the specified table on behalf of the transaction.
    /// Acquires a write lock on the page the tuple lands on (and any other
    /// page the file store touches while searching). Every dirtied page is
    /// marked dirty under the transaction and its cache entry replaced so
    /// future requests see the up-to-date page.
    pub fn insert_tuple(&self, tx: &Transaction, table_id: u32, tuple: &Tuple) -> DbResult<()> {
        let table_rc = Database::catalog().get_table(table_id)?;
        let dirty_pages = table_rc.rl().insert_tuple(tx, tuple)?;
        self.mark_dirty(tx, dirty_pages);
        Ok(())
    }

    /// Remove the tuple from the page its record id names. The dirtied
    /// page is handled like in `insert_tuple`.
    pub fn delete_tuple(&self, tx: &Transaction, tuple: &Tuple) -> DbResult<()> {
        let rid = tuple
            .get_rid()
            .ok_or_else(|| DbError::Db("tuple has no record id".to_string()))?;
        let table_rc = Database::catalog().get_table(rid.pid.table_id)?;
        let dirty_pages = table_rc.rl().delete_tuple(tx, tuple)?;
        self.mark_dirty(tx, dirty_pages);
        Ok(())
    }

    fn mark_dirty(&self, tx: &Transaction, dirty_pages: Vec<Pod<HeapPage>>) {
        let mut state = self.state.lock().unwrap();
        for page_rc in dirty_pages {
            let pid = {
                let mut page = page_rc.wl();
                page.set_dirty(Some(tx.get_id()));
                page.get_pid()
            };
            state.cache.insert(pid, page_rc);
        }
    }

    /// Commit or abort the transaction and release all locks it holds.
    ///
    /// On commit every page it dirtied is flushed (force); a flush failure
    /// surfaces before any lock is released so the caller can retry. On
    /// abort every page it holds is re-read from disk and reinstalled
    /// clean, discarding the in-memory changes. Either way the waits-for
    /// graph forgets the transaction and all waiters are woken.
    pub fn transaction_complete(&self, tx: &Transaction, commit: bool) -> DbResult<()> {
        let tid = tx.get_id();
        let mut state = self.state.lock().unwrap();

        let pages = state.lock_table.transaction_pages(tid);
        if commit {
            for pid in &pages {
                Self::flush_page_locked(&mut state, pid)?;
            }
        } else {
            for pid in &pages {
                if state.cache.contains_key(pid) {
                    let table_rc = Database::catalog().get_table(pid.table_id)?;
                    let page = table_rc.rl().read_page(pid)?;
                    state.cache.insert(*pid, Arc::new(RwLock::new(page)));
                }
            }
        }

        debug!("{} complete, commit: {}", tx, commit);
        state.blocked.remove(&tid);
        state.wait_for.remove_all_mentions(tid);
        state.lock_table.clear_transaction(tid);
        self.waiters.notify_all();
        Ok(())
    }

    /// Write a cached page through to its heap file and clear its dirty
    /// flag. A page that is absent or clean is left alone.
    fn flush_page_locked(state: &mut PoolState, pid: &HeapPageId) -> DbResult<()> {
        if let Some(page_rc) = state.cache.get(pid) {
            if page_rc.rl().is_dirty() {
                let table_rc = Database::catalog().get_table(pid.table_id)?;
                table_rc.rl().write_page(&page_rc.rl())?;
                page_rc.wl().set_dirty(None);
                debug!("flushed {}", pid);
            }
        }
        Ok(())
    }

    /// Make room for one page: evict the first page in iteration order
    /// that is clean and that no transaction holds a lock on. Dirty pages
    /// are never written out here (no-steal); they become evictable only
    /// after their transaction commits.
    fn evict_page(state: &mut PoolState) -> DbResult<()> {
        let mut victim: Option<HeapPageId> = None;
        for (pid, page_rc) in state.cache.iter() {
            if !page_rc.rl().is_dirty() && !state.lock_table.is_locked(pid) {
                victim = Some(*pid);
                break;
            }
        }

        match victim {
            Some(pid) => {
                Self::flush_page_locked(state, &pid)?;
                state.cache.remove(&pid);
                debug!("evicted {}", pid);
                Ok(())
            }
            None => Err(DbError::Db("no clean pages to evict".to_string())),
        }
    }

    /// Flush all dirty pages to disk.
    ///
    /// NB: Be careful using this routine -- it writes dirty data to disk
    /// so will break the no-steal contract if a transaction later aborts.
    pub fn flush_all_pages(&self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        let pids: Vec<HeapPageId> = state.cache.keys().cloned().collect();
        for pid in pids {
            Self::flush_page_locked(&mut state, &pid)?;
        }
        Ok(())
    }

    /// Write-through for a single page.
    pub fn flush_page(&self, pid: &HeapPageId) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::flush_page_locked(&mut state, pid)
    }

    /// Remove the specific page id from the buffer pool without flushing
    /// it, so a rolled back page cannot linger in the cache.
    pub fn discard_page(&self, pid: &HeapPageId) {
        let mut state = self.state.lock().unwrap();
        state.cache.remove(pid);
    }

    pub fn is_cached(&self, pid: &HeapPageId) -> bool {
        let state = self.state.lock().unwrap();
        state.cache.contains_key(pid)
    }

    pub fn cached_pages_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.cache.len()
    }
}
