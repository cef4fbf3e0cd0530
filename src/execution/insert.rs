use crate::{
    database::Database,
    error::DbError,
    execution::op_iterator::OpIterator,
    storage::{Cell, Schema, Tuple},
    transaction::Transaction,
    types::DbResult,
};

/// Drains its child and inserts every tuple into the target table through
/// the buffer pool, then yields a single one-field tuple holding the
/// number of inserted rows.
pub struct Insert {
    tx: Transaction,
    child: Box<dyn OpIterator>,
    table_id: u32,
    done: bool,
}

impl Insert {
    pub fn new(tx: &Transaction, child: Box<dyn OpIterator>, table_id: u32) -> DbResult<Self> {
        let table_schema = Database::catalog().get_schema(table_id)?;
        if child.tuple_desc() != table_schema {
            return Err(DbError::Db(
                "tuple descriptors do not match on insert".to_string(),
            ));
        }

        Ok(Self {
            tx: *tx,
            child,
            table_id,
            done: false,
        })
    }
}

impl OpIterator for Insert {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()
    }

    fn has_next(&mut self) -> DbResult<bool> {
        Ok(!self.done)
    }

    fn next(&mut self) -> DbResult<Tuple> {
        if self.done {
            return Err(DbError::NoSuchElement("insert already ran".to_string()));
        }

        let mut count: i64 = 0;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            Database::buffer_pool().insert_tuple(&self.tx, self.table_id, &tuple)?;
            count += 1;
        }
        self.done = true;
        Ok(Tuple::new(&self.tuple_desc(), &[Cell::Int64(count)]))
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.child.rewind()?;
        self.done = false;
        Ok(())
    }

    fn close(&mut self) {
        self.child.close();
    }

    fn tuple_desc(&self) -> Schema {
        Schema::int_schema(1, "inserted")
    }
}
