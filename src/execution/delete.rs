use crate::{
    database::Database,
    error::DbError,
    execution::op_iterator::OpIterator,
    storage::{Cell, Schema, Tuple},
    transaction::Transaction,
    types::DbResult,
};

/// Drains its child and deletes every tuple it yields (the tuples must
/// carry record ids, i.e. come from a scan), then yields a single
/// one-field tuple holding the number of deleted rows.
pub struct Delete {
    tx: Transaction,
    child: Box<dyn OpIterator>,
    done: bool,
}

impl Delete {
    pub fn new(tx: &Transaction, child: Box<dyn OpIterator>) -> Self {
        Self {
            tx: *tx,
            child,
            done: false,
        }
    }
}

impl OpIterator for Delete {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()
    }

    fn has_next(&mut self) -> DbResult<bool> {
        Ok(!self.done)
    }

    fn next(&mut self) -> DbResult<Tuple> {
        if self.done {
            return Err(DbError::NoSuchElement("delete already ran".to_string()));
        }

        let mut count: i64 = 0;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            Database::buffer_pool().delete_tuple(&self.tx, &tuple)?;
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
        Schema::int_schema(1, "deleted")
    }
}
