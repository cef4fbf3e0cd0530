pub mod aggregate;
pub mod delete;
pub mod filter;
pub mod insert;
pub mod op_iterator;
pub mod seq_scan;

pub use aggregate::{Aggregate, AggOp, Aggregator, IntegerAggregator, StringAggregator};
pub use delete::Delete;
pub use filter::Filter;
pub use insert::Insert;
pub use op_iterator::OpIterator;
pub use seq_scan::SeqScan;
