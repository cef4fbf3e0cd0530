use std::{
    collections::hash_map::DefaultHasher,
    fs::{File, OpenOptions},
    hash::{Hash, Hasher},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use log::{debug, error};

use crate::{
    buffer_pool::BufferPool,
    database::Database,
    error::DbError,
    execution::op_iterator::OpIterator,
    storage::{
        page::HeapPage,
        page_id::HeapPageId,
        schema::Schema,
        tuple::Tuple,
    },
    transaction::{Permission, Transaction},
    types::{DbResult, Pod},
    utils::HandyRwLock,
};

/// A table stored as a contiguous sequence of fixed-size pages in a single
/// backing file, in no particular tuple order. Page `i` occupies bytes
/// `[i * page_size, (i + 1) * page_size)`.
///
/// All page access on behalf of a transaction goes through the buffer
/// pool; the file itself is only touched by `read_page`/`write_page` and
/// the append path of `insert_tuple`.
pub struct HeapFile {
    file: Mutex<File>,
    path: PathBuf,
    table_id: u32,
    schema: Schema,
}

impl HeapFile {
    /// Open (or create) the backing file in read-write mode. The handle is
    /// held for the lifetime of the table and closed when it drops.
    pub fn new<P: AsRef<Path>>(path: P, schema: Schema) -> DbResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        // Table id derives from the absolute path so the same file always
        // maps to the same id.
        let absolute = std::fs::canonicalize(&path)?;
        let mut hasher = DefaultHasher::new();
        absolute.hash(&mut hasher);
        let table_id = hasher.finish() as u32;

        Ok(Self {
            file: Mutex::new(file),
            path: absolute,
            table_id,
            schema,
        })
    }

    pub fn get_id(&self) -> u32 {
        self.table_id
    }

    pub fn get_schema(&self) -> Schema {
        self.schema.clone()
    }

    pub fn get_path(&self) -> PathBuf {
        self.path.clone()
    }

    fn get_file(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap()
    }

    /// Pages currently in the file; trailing fractional bytes are ignored.
    pub fn num_pages(&self) -> DbResult<usize> {
        let len = self.get_file().metadata()?.len() as usize;
        Ok(len / BufferPool::get_page_size())
    }

    /// Read the page image at the pid's offset straight from disk. This
    /// bypasses the cache and the lock table; it is the buffer pool's
    /// loading primitive, not an access path for executors.
    pub fn read_page(&self, pid: &HeapPageId) -> DbResult<HeapPage> {
        if pid.table_id != self.table_id {
            return Err(DbError::InvalidPage(*pid));
        }
        if pid.page_index as usize >= self.num_pages()? {
            return Err(DbError::InvalidPage(*pid));
        }

        let page_size = BufferPool::get_page_size();
        let mut buf = vec![0u8; page_size];

        let read_result = {
            let mut file = self.get_file();
            file.seek(SeekFrom::Start(
                (pid.page_index as usize * page_size) as u64,
            ))
            .and_then(|_| file.read_exact(&mut buf))
        };
        if let Err(e) = read_result {
            error!("reading {} failed: {}", pid, e);
            return Err(DbError::InvalidPage(*pid));
        }

        debug!("read {} from disk", pid);
        HeapPage::new(pid, &buf, &self.schema)
    }

    /// Write the page's byte image at its offset.
    pub fn write_page(&self, page: &HeapPage) -> DbResult<()> {
        let page_size = BufferPool::get_page_size();
        let pid = page.get_pid();

        let mut file = self.get_file();
        file.seek(SeekFrom::Start(
            (pid.page_index as usize * page_size) as u64,
        ))?;
        file.write_all(&page.get_page_data())?;

        debug!("wrote {} to disk", pid);
        Ok(())
    }

    /// Extend the file by one zero-initialized page.
    fn append_empty_page(&self) -> DbResult<()> {
        let mut file = self.get_file();
        file.seek(SeekFrom::End(0))?;
        file.write_all(&HeapPage::empty_page_data())?;
        Ok(())
    }

    /// Find a page with a free slot, scanning from the start of the file
    /// and locking each visited page exclusively, and insert the tuple
    /// there. When every page is full, append a fresh page and insert into
    /// it. Returns the pages dirtied by the operation.
    pub fn insert_tuple(&self, tx: &Transaction, tuple: &Tuple) -> DbResult<Vec<Pod<HeapPage>>> {
        if tuple.get_schema() != &self.schema {
            return Err(DbError::Db(
                "tuple schema does not match the table".to_string(),
            ));
        }

        for page_index in 0..self.num_pages()? {
            let pid = HeapPageId::new(self.table_id, page_index as u32);
            let page_rc =
                Database::buffer_pool().get_page(tx, &pid, Permission::ReadWrite)?;

            let has_room = page_rc.rl().empty_slots_count() > 0;
            if has_room {
                page_rc.wl().insert_tuple(tuple)?;
                return Ok(vec![page_rc]);
            }
        }

        let new_index = self.num_pages()? as u32;
        self.append_empty_page()?;
        debug!("{} grew to page {}", self.table_id, new_index);

        let pid = HeapPageId::new(self.table_id, new_index);
        let page_rc = Database::buffer_pool().get_page(tx, &pid, Permission::ReadWrite)?;
        page_rc.wl().insert_tuple(tuple)?;
        Ok(vec![page_rc])
    }

    /// Remove the tuple from the page its record id names. Returns the
    /// dirtied page.
    pub fn delete_tuple(&self, tx: &Transaction, tuple: &Tuple) -> DbResult<Vec<Pod<HeapPage>>> {
        let rid = tuple
            .get_rid()
            .ok_or_else(|| DbError::Db("tuple has no record id".to_string()))?;

        let page_rc =
            Database::buffer_pool().get_page(tx, &rid.pid, Permission::ReadWrite)?;
        page_rc.wl().delete_tuple(tuple)?;
        Ok(vec![page_rc])
    }
}

/// Lazy forward scan over every tuple of a table. Pages are acquired
/// through the buffer pool with read permission on every advance, never
/// cached locally, so lock-mode changes and evictions stay visible.
pub struct HeapFileIterator {
    tx: Transaction,
    table_id: u32,
    schema: Schema,
    page_no: u32,
    page: Option<Pod<HeapPage>>,
    slot: usize,
}

impl HeapFileIterator {
    pub fn new(tx: &Transaction, table_id: u32) -> DbResult<Self> {
        let schema = Database::catalog().get_schema(table_id)?;
        Ok(Self {
            tx: *tx,
            table_id,
            schema,
            page_no: 0,
            page: None,
            slot: 0,
        })
    }

    fn num_pages(&self) -> DbResult<usize> {
        let table_rc = Database::catalog().get_table(self.table_id)?;
        let n = table_rc.rl().num_pages()?;
        Ok(n)
    }

    fn fetch_page(&self, page_no: u32) -> DbResult<Pod<HeapPage>> {
        let pid = HeapPageId::new(self.table_id, page_no);
        Database::buffer_pool().get_page(&self.tx, &pid, Permission::ReadOnly)
    }
}

impl OpIterator for HeapFileIterator {
    fn open(&mut self) -> DbResult<()> {
        self.page_no = 0;
        self.slot = 0;
        self.page = if self.num_pages()? > 0 {
            Some(self.fetch_page(0)?)
        } else {
            None
        };
        Ok(())
    }

    fn has_next(&mut self) -> DbResult<bool> {
        loop {
            let page_rc = match &self.page {
                Some(page_rc) => page_rc.clone(),
                None => return Ok(false),
            };

            {
                let page = page_rc.rl();
                while self.slot < page.get_slots_count() {
                    if page.is_slot_used(self.slot) {
                        return Ok(true);
                    }
                    self.slot += 1;
                }
            }

            if self.page_no as usize + 1 >= self.num_pages()? {
                return Ok(false);
            }
            self.page_no += 1;
            self.slot = 0;
            self.page = Some(self.fetch_page(self.page_no)?);
        }
    }

    fn next(&mut self) -> DbResult<Tuple> {
        if !self.has_next()? {
            return Err(DbError::NoSuchElement(
                "heap file scan exhausted".to_string(),
            ));
        }

        let page_rc = match &self.page {
            Some(page_rc) => page_rc.clone(),
            None => {
                return Err(DbError::NoSuchElement(
                    "heap file scan exhausted".to_string(),
                ))
            }
        };
        let tuple = page_rc.rl().tuple_at(self.slot)?;
        self.slot += 1;
        Ok(tuple)
    }

    fn rewind(&mut self) -> DbResult<()> {
        // re-open, re-acquiring every page starting from page 0
        self.open()
    }

    fn close(&mut self) {
        self.page = None;
    }

    fn tuple_desc(&self) -> Schema {
        self.schema.clone()
    }
}
