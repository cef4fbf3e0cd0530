use crate::{
    storage::{Schema, Tuple},
    types::DbResult,
};

/// The protocol every operator speaks. `has_next` is idempotent; `next`
/// advances and fails with `NoSuchElement` once the operator is
/// exhausted; `rewind` restarts the sequence from the beginning.
pub trait OpIterator {
    fn open(&mut self) -> DbResult<()>;

    fn has_next(&mut self) -> DbResult<bool>;

    fn next(&mut self) -> DbResult<Tuple>;

    fn rewind(&mut self) -> DbResult<()>;

    fn close(&mut self);

    fn tuple_desc(&self) -> Schema;
}
