use std::{fmt, io::Read};

use crate::{
    io::{ByteWriter, Serializeable},
    storage::{cell::Cell, page_id::HeapPageId, schema::Schema},
};

/// Location of a tuple inside a table: the page that owns it and the slot
/// it occupies there. Assigned when the tuple is read from or inserted
/// into a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub pid: HeapPageId,
    pub slot: usize,
}

impl RecordId {
    pub fn new(pid: HeapPageId, slot: usize) -> Self {
        Self { pid, slot }
    }
}

#[derive(Clone, Debug)]
pub struct Tuple {
    schema: Schema,
    cells: Vec<Cell>,
    rid: Option<RecordId>,
}

impl Tuple {
    pub fn new(schema: &Schema, cells: &[Cell]) -> Self {
        Self {
            schema: schema.clone(),
            cells: cells.to_vec(),
            rid: None,
        }
    }

    /// A tuple of zero values for the given schema, the image an unused
    /// slot decodes to.
    pub fn new_default(schema: &Schema) -> Self {
        let cells = schema
            .fields
            .iter()
            .map(|f| match f.t {
                crate::storage::schema::Type::Int64 => Cell::Int64(0),
                crate::storage::schema::Type::String => Cell::String(String::new()),
            })
            .collect();
        Self {
            schema: schema.clone(),
            cells,
            rid: None,
        }
    }

    /// A tuple of `width` int columns all holding `value`, used by tests.
    pub fn new_int_tuples(value: i64, width: usize) -> Self {
        let schema = Schema::int_schema(width, "");
        let cells = vec![Cell::Int64(value); width];
        Self {
            schema,
            cells,
            rid: None,
        }
    }

    pub fn get_cell(&self, i: usize) -> Cell {
        self.cells[i].clone()
    }

    pub fn set_cell(&mut self, i: usize, c: Cell) {
        self.cells[i] = c;
    }

    pub fn get_cells(&self) -> Vec<Cell> {
        self.cells.clone()
    }

    pub fn get_schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get_rid(&self) -> Option<RecordId> {
        self.rid
    }

    pub fn set_rid(&mut self, rid: Option<RecordId>) {
        self.rid = rid;
    }
}

impl Serializeable for Tuple {
    type Reference = Schema;

    fn encode(&self, writer: &mut ByteWriter, reference: &Self::Reference) {
        for (i, cell) in self.cells.iter().enumerate() {
            let t = reference.get_field_type(i);
            cell.encode(writer, &t);
        }
    }

    fn decode<R: Read>(reader: &mut R, reference: &Self::Reference) -> Self {
        let mut cells: Vec<Cell> = Vec::new();
        for field in &reference.fields {
            cells.push(Cell::decode(reader, &field.t));
        }
        Self {
            schema: reference.clone(),
            cells,
            rid: None,
        }
    }
}

// Tuples compare by content; where they live does not matter.
impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Tuple {}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut content: String = "{".to_owned();
        for cell in &self.cells {
            content.push_str(&format!("{:?}, ", cell));
        }
        if content.len() > 1 {
            content.truncate(content.len() - 2);
        }
        content.push('}');
        write!(f, "{}", content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::{Field, Type};

    #[test]
    fn test_fields_are_assignable() {
        let mut tuple = Tuple::new_int_tuples(1, 3);
        tuple.set_cell(1, Cell::Int64(42));
        assert_eq!(tuple.get_cell(0), Cell::Int64(1));
        assert_eq!(tuple.get_cell(1), Cell::Int64(42));
        assert_eq!(tuple.get_cells().len(), 3);
    }

    #[test]
    fn test_default_tuple_is_zeroed() {
        let schema = Schema::new(vec![
            Field::new("n", Type::Int64),
            Field::new("s", Type::String),
        ]);
        let tuple = Tuple::new_default(&schema);
        assert_eq!(tuple.get_cell(0), Cell::Int64(0));
        assert_eq!(tuple.get_cell(1), Cell::String(String::new()));
        assert!(tuple.get_rid().is_none());
    }
}
