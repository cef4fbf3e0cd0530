use crate::{error::DbError, types::DbResult};

/// Fixed payload capacity of a string field. A string cell is stored as a
/// 4-byte length word followed by this many content bytes.
pub const STRING_LEN: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Type {
    Int64,
    String,
}

impl Type {
    /// Serialized width in bytes.
    pub fn size(&self) -> usize {
        match self {
            Type::Int64 => 8,
            Type::String => 4 + STRING_LEN,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub t: Type,
}

impl Field {
    pub fn new(name: &str, t: Type) -> Self {
        Self {
            name: name.to_string(),
            t,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Schema {
    pub fields: Vec<Field>,
}

// Two schemas are equal when their field types match positionally. Field
// names carry no weight.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.t == b.t)
    }
}

impl Eq for Schema {}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// A schema of `width` int columns, used by tests and count outputs.
    pub fn int_schema(width: usize, name_prefix: &str) -> Self {
        let mut fields: Vec<Field> = Vec::new();
        for i in 0..width {
            fields.push(Field::new(
                &format!("{}-{}", name_prefix, i),
                Type::Int64,
            ));
        }

        Self { fields }
    }

    /// Concatenation of the field lists, the left operand's fields first.
    /// Field-name collisions are permitted.
    pub fn merge(a: &Schema, b: &Schema) -> Schema {
        let mut fields = a.fields.clone();
        fields.extend(b.fields.clone());
        Schema { fields }
    }

    pub fn fields_count(&self) -> usize {
        self.fields.len()
    }

    pub fn get_field_type(&self, i: usize) -> Type {
        self.fields[i].t
    }

    pub fn get_field_name(&self, i: usize) -> String {
        self.fields[i].name.clone()
    }

    pub fn field_name_to_index(&self, name: &str) -> DbResult<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| DbError::NoSuchElement(format!("no field named {}", name)))
    }

    /// Tuple size in bytes.
    pub fn get_size(&self) -> usize {
        self.fields.iter().map(|f| f.t.size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_names() {
        let a = Schema::new(vec![
            Field::new("x", Type::Int64),
            Field::new("y", Type::String),
        ]);
        let b = Schema::new(vec![
            Field::new("foo", Type::Int64),
            Field::new("bar", Type::String),
        ]);
        assert_eq!(a, b);

        let c = Schema::new(vec![Field::new("x", Type::Int64)]);
        assert_ne!(a, c);

        let d = Schema::new(vec![
            Field::new("x", Type::String),
            Field::new("y", Type::Int64),
        ]);
        assert_ne!(a, d);
    }

    #[test]
    fn test_merge() {
        let a = Schema::int_schema(2, "a");
        let b = Schema::int_schema(3, "b");
        let merged = Schema::merge(&a, &b);

        assert_eq!(merged.fields_count(), 5);
        assert_eq!(merged.get_field_name(0), "a-0");
        assert_eq!(merged.get_field_name(2), "b-0");
        assert_eq!(merged.get_size(), a.get_size() + b.get_size());
    }

    #[test]
    fn test_merge_associative_on_types() {
        let a = Schema::int_schema(1, "a");
        let b = Schema::new(vec![Field::new("s", Type::String)]);
        let c = Schema::int_schema(2, "c");

        let left = Schema::merge(&Schema::merge(&a, &b), &c);
        let right = Schema::merge(&a, &Schema::merge(&b, &c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_field_name_to_index() {
        let schema = Schema::int_schema(3, "col");
        assert_eq!(schema.field_name_to_index("col-1").unwrap(), 1);
        assert!(matches!(
            schema.field_name_to_index("missing"),
            Err(crate::error::DbError::NoSuchElement(_))
        ));
    }
}
