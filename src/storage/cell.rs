use std::io::Read;

use crate::{
    io::{read_exact, ByteWriter, Serializeable},
    storage::schema::{Type, STRING_LEN},
};

/// A single field value. Cells hash and order so they can key aggregation
/// groups and drive predicate comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Int64(i64),
    String(String),
}

impl Cell {
    pub fn get_type(&self) -> Type {
        match self {
            Cell::Int64(_) => Type::Int64,
            Cell::String(_) => Type::String,
        }
    }
}

impl Serializeable for Cell {
    type Reference = Type;

    fn encode(&self, writer: &mut ByteWriter, _reference: &Self::Reference) {
        match self {
            Cell::Int64(v) => {
                writer.write_bytes(&v.to_be_bytes());
            }
            Cell::String(v) => {
                let payload = &v.as_bytes()[..v.len().min(STRING_LEN)];
                writer.write_bytes(&(payload.len() as u32).to_be_bytes());

                let mut buf = [0u8; STRING_LEN];
                buf[..payload.len()].copy_from_slice(payload);
                writer.write_bytes(&buf);
            }
        }
    }

    fn decode<R: Read>(reader: &mut R, reference: &Self::Reference) -> Self {
        match reference {
            Type::Int64 => {
                let bytes = read_exact(reader, 8);
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes);
                Cell::Int64(i64::from_be_bytes(buf))
            }
            Type::String => {
                let bytes = read_exact(reader, 4);
                let mut buf = [0u8; 4];
                buf.copy_from_slice(&bytes);
                let len = (u32::from_be_bytes(buf) as usize).min(STRING_LEN);

                let payload = read_exact(reader, STRING_LEN);
                Cell::String(String::from_utf8_lossy(&payload[..len]).to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn round_trip(cell: Cell, t: Type) -> Cell {
        let mut writer = ByteWriter::new();
        cell.encode(&mut writer, &t);
        assert_eq!(writer.size(), t.size());
        Cell::decode(&mut Cursor::new(writer.to_bytes()), &t)
    }

    #[test]
    fn test_cell_round_trip() {
        assert_eq!(
            round_trip(Cell::Int64(-42), Type::Int64),
            Cell::Int64(-42)
        );
        assert_eq!(
            round_trip(Cell::String("hello".to_string()), Type::String),
            Cell::String("hello".to_string())
        );
        assert_eq!(
            round_trip(Cell::String("".to_string()), Type::String),
            Cell::String("".to_string())
        );
    }
}
