use std::fmt;

/// Coordinate of a page: which table it belongs to and where it sits in
/// that table's backing file. Used as the key of the page cache and the
/// lock table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapPageId {
    pub table_id: u32,
    pub page_index: u32,
}

impl HeapPageId {
    pub fn new(table_id: u32, page_index: u32) -> Self {
        Self {
            table_id,
            page_index,
        }
    }
}

impl fmt::Display for HeapPageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "table_{}_page_{}", self.table_id, self.page_index)
    }
}
