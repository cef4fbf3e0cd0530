#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use rand::prelude::*;

use heap_db::{
    execution::OpIterator,
    storage::HeapFileIterator,
    utils::{self, HandyRwLock},
    Database, HeapFile, Pod, Schema, Transaction, Tuple,
};

/// Set up logging and reset the global database state. Every test starts
/// from an empty catalog, a default-sized fresh buffer pool and the
/// default page size.
pub fn setup() {
    utils::init_log();
    Database::reset();
}

/// Create an empty int-column table backed by a unique temp file and
/// register it in the catalog.
pub fn empty_table(columns: usize) -> Pod<HeapFile> {
    let path = tempfile::NamedTempFile::new()
        .unwrap()
        .into_temp_path()
        .keep()
        .unwrap();

    let schema = Schema::int_schema(columns, "col");
    let table = HeapFile::new(&path, schema).unwrap();
    let name = format!("table_{}", table.get_id());

    let table_rc = Arc::new(RwLock::new(table));
    Database::mut_catalog().add_table(Arc::clone(&table_rc), &name);
    table_rc
}

/// Create a table filled with `rows` rows of random data, committed.
pub fn random_table(columns: usize, rows: usize) -> Pod<HeapFile> {
    let table_rc = empty_table(columns);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let mut rng = rand::thread_rng();
    for _ in 0..rows {
        let value = rng.gen_range(0i64..1_000_000);
        insert_row(&tx, table_id, value, columns);
    }
    tx.commit().unwrap();
    table_rc
}

pub fn insert_row(tx: &Transaction, table_id: u32, value: i64, columns: usize) {
    Database::buffer_pool()
        .insert_tuple(tx, table_id, &Tuple::new_int_tuples(value, columns))
        .unwrap();
}

/// Read the whole table through the buffer pool on behalf of `tx`.
pub fn scan_tuples(tx: &Transaction, table_id: u32) -> Vec<Tuple> {
    let mut iter = HeapFileIterator::new(tx, table_id).unwrap();
    iter.open().unwrap();

    let mut tuples = Vec::new();
    while iter.has_next().unwrap() {
        tuples.push(iter.next().unwrap());
    }
    iter.close();
    tuples
}
