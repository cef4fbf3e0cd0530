pub mod cell;
pub mod heap_file;
pub mod page;
pub mod page_id;
pub mod schema;
pub mod tuple;

pub use cell::Cell;
pub use heap_file::{HeapFile, HeapFileIterator};
pub use page::HeapPage;
pub use page_id::HeapPageId;
pub use schema::{Field, Schema, Type};
pub use tuple::{RecordId, Tuple};
