use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::OnceCell;

use crate::{
    buffer_pool::{BufferPool, DEFAULT_PAGES, DEFAULT_PAGE_SIZE},
    catalog::Catalog,
    types::Pod,
    utils::HandyRwLock,
};

static DB: OnceCell<Database> = OnceCell::new();

/// We collect all global variables here: the catalog and the buffer pool.
/// Every executor thread reaches them through this singleton.
pub struct Database {
    catalog: Pod<Catalog>,
    buffer_pool: RwLock<Arc<BufferPool>>,
}

impl Database {
    fn new() -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Catalog::new())),
            buffer_pool: RwLock::new(Arc::new(BufferPool::new(DEFAULT_PAGES))),
        }
    }

    pub fn global() -> &'static Self {
        DB.get_or_init(Database::new)
    }

    pub fn catalog() -> RwLockReadGuard<'static, Catalog> {
        Self::global().catalog.rl()
    }

    pub fn mut_catalog() -> RwLockWriteGuard<'static, Catalog> {
        Self::global().catalog.wl()
    }

    pub fn buffer_pool() -> Arc<BufferPool> {
        Self::global().buffer_pool.rl().clone()
    }

    /// Reset the in-memory state of the database, used by tests mostly.
    /// The catalog is emptied, the page size returns to its default, and
    /// a fresh buffer pool replaces the old one (cache, locks and
    /// waits-for graph all start empty).
    pub fn reset() {
        BufferPool::set_page_size(DEFAULT_PAGE_SIZE);
        Self::mut_catalog().clear();
        *Self::global().buffer_pool.wl() = Arc::new(BufferPool::new(DEFAULT_PAGES));
    }

    /// Replace the buffer pool with one of the given capacity, used by
    /// tests that exercise eviction.
    pub fn reset_buffer_pool(max_capacity: usize) {
        *Self::global().buffer_pool.wl() = Arc::new(BufferPool::new(max_capacity));
    }
}
