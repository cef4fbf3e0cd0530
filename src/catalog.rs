use std::collections::HashMap;

use crate::{
    error::DbError,
    storage::{heap_file::HeapFile, schema::Schema},
    types::{DbResult, Pod, ResultPod},
    utils::HandyRwLock,
};

/// Registry of the tables the database knows about, keyed by table id and
/// by name.
pub struct Catalog {
    tables: HashMap<u32, Pod<HeapFile>>,
    names: HashMap<String, u32>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            names: HashMap::new(),
        }
    }

    /// Register a table under the given name. Re-adding a name points it
    /// at the new table.
    pub fn add_table(&mut self, table_rc: Pod<HeapFile>, name: &str) {
        let table_id = table_rc.rl().get_id();
        self.tables.insert(table_id, table_rc);
        self.names.insert(name.to_string(), table_id);
    }

    pub fn get_table(&self, table_id: u32) -> ResultPod<HeapFile> {
        self.tables
            .get(&table_id)
            .cloned()
            .ok_or_else(|| DbError::NoSuchElement(format!("no table with id {}", table_id)))
    }

    pub fn get_table_by_name(&self, name: &str) -> ResultPod<HeapFile> {
        let table_id = self
            .names
            .get(name)
            .ok_or_else(|| DbError::NoSuchElement(format!("no table named {}", name)))?;
        self.get_table(*table_id)
    }

    pub fn get_schema(&self, table_id: u32) -> DbResult<Schema> {
        let table_rc = self.get_table(table_id)?;
        let schema = table_rc.rl().get_schema();
        Ok(schema)
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.names.clear();
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
