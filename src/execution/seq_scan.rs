use crate::{
    database::Database,
    execution::op_iterator::OpIterator,
    storage::{heap_file::HeapFileIterator, Field, Schema, Tuple},
    transaction::Transaction,
    types::DbResult,
};

/// Sequential scan over a table, reading every page through the buffer
/// pool with read permission. Field names in the output schema carry the
/// table alias as a prefix.
pub struct SeqScan {
    tx: Transaction,
    table_id: u32,
    alias: String,
    schema: Schema,
    iter: HeapFileIterator,
}

impl SeqScan {
    pub fn new(tx: &Transaction, table_id: u32, alias: &str) -> DbResult<Self> {
        let schema = Database::catalog().get_schema(table_id)?;
        let iter = HeapFileIterator::new(tx, table_id)?;
        Ok(Self {
            tx: *tx,
            table_id,
            alias: alias.to_string(),
            schema,
            iter,
        })
    }

    pub fn get_table_id(&self) -> u32 {
        self.table_id
    }

    pub fn get_transaction(&self) -> Transaction {
        self.tx
    }
}

impl OpIterator for SeqScan {
    fn open(&mut self) -> DbResult<()> {
        self.iter.open()
    }

    fn has_next(&mut self) -> DbResult<bool> {
        self.iter.has_next()
    }

    fn next(&mut self) -> DbResult<Tuple> {
        self.iter.next()
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.iter.rewind()
    }

    fn close(&mut self) {
        self.iter.close()
    }

    fn tuple_desc(&self) -> Schema {
        let fields = self
            .schema
            .fields
            .iter()
            .map(|f| Field::new(&format!("{}.{}", self.alias, f.name), f.t))
            .collect();
        Schema::new(fields)
    }
}
