use crate::{
    error::DbError,
    execution::op_iterator::OpIterator,
    operator::Predicate,
    storage::{Schema, Tuple},
    types::DbResult,
};

/// Emits the child's tuples that satisfy the predicate.
pub struct Filter {
    predicate: Predicate,
    child: Box<dyn OpIterator>,
    next_tuple: Option<Tuple>,
}

impl Filter {
    pub fn new(predicate: Predicate, child: Box<dyn OpIterator>) -> Self {
        Self {
            predicate,
            child,
            next_tuple: None,
        }
    }
}

impl OpIterator for Filter {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()
    }

    fn has_next(&mut self) -> DbResult<bool> {
        if self.next_tuple.is_some() {
            return Ok(true);
        }
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            if self
                .predicate
                .matches(&tuple.get_cell(self.predicate.field_index))
            {
                self.next_tuple = Some(tuple);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn next(&mut self) -> DbResult<Tuple> {
        if !self.has_next()? {
            return Err(DbError::NoSuchElement("filter exhausted".to_string()));
        }
        self.next_tuple
            .take()
            .ok_or_else(|| DbError::NoSuchElement("filter exhausted".to_string()))
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.next_tuple = None;
        self.child.rewind()
    }

    fn close(&mut self) {
        self.next_tuple = None;
        self.child.close();
    }

    fn tuple_desc(&self) -> Schema {
        self.child.tuple_desc()
    }
}
