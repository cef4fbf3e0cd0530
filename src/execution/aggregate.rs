use core::fmt;
use std::collections::HashMap;

use log::error;

use crate::{
    error::DbError,
    execution::op_iterator::OpIterator,
    storage::{Cell, Field, Schema, Tuple, Type},
    types::DbResult,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggOp {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AggOp::Min => "min",
            AggOp::Max => "max",
            AggOp::Sum => "sum",
            AggOp::Avg => "avg",
            AggOp::Count => "count",
        };
        write!(f, "{}", name)
    }
}

/// Accumulates tuples group by group and hands the results back as an
/// operator. Output rows are `(group_value, aggregate_value)` pairs, or a
/// single `(aggregate_value)` when there is no grouping; group order is
/// unspecified.
pub trait Aggregator {
    fn merge_tuple_into_group(&mut self, tuple: &Tuple);

    fn iterator(&self) -> Box<dyn OpIterator>;
}

fn output_schema(gb_type: Option<Type>) -> Schema {
    match gb_type {
        Some(t) => Schema::new(vec![
            Field::new("groupValue", t),
            Field::new("aggregateVal", Type::Int64),
        ]),
        None => Schema::new(vec![Field::new("aggregateVal", Type::Int64)]),
    }
}

/// Computes MIN/MAX/SUM/AVG/COUNT over an integer column. AVG keeps a
/// running (sum, count) per group and divides at output time, so it is
/// exact under integer division no matter the merge order.
pub struct IntegerAggregator {
    gb_field: Option<usize>,
    gb_type: Option<Type>,
    a_field: usize,
    op: AggOp,
    // per group: the accumulated value and the number of merged tuples
    groups: HashMap<Option<Cell>, (i64, i64)>,
}

impl IntegerAggregator {
    pub fn new(gb_field: Option<usize>, gb_type: Option<Type>, a_field: usize, op: AggOp) -> Self {
        Self {
            gb_field,
            gb_type,
            a_field,
            op,
            groups: HashMap::new(),
        }
    }

    fn initial(op: AggOp) -> i64 {
        match op {
            AggOp::Min => i64::MAX,
            AggOp::Max => i64::MIN,
            AggOp::Sum | AggOp::Avg | AggOp::Count => 0,
        }
    }
}

impl Aggregator for IntegerAggregator {
    fn merge_tuple_into_group(&mut self, tuple: &Tuple) {
        let value = match tuple.get_cell(self.a_field) {
            Cell::Int64(v) => v,
            other => {
                error!("integer aggregator fed a non-integer cell {:?}", other);
                return;
            }
        };
        let key = self.gb_field.map(|i| tuple.get_cell(i));

        let op = self.op;
        let (acc, count) = self
            .groups
            .entry(key)
            .or_insert_with(|| (Self::initial(op), 0));
        *count += 1;
        match op {
            AggOp::Min => *acc = (*acc).min(value),
            AggOp::Max => *acc = (*acc).max(value),
            AggOp::Sum | AggOp::Avg => *acc += value,
            AggOp::Count => *acc += 1,
        }
    }

    fn iterator(&self) -> Box<dyn OpIterator> {
        let schema = output_schema(self.gb_type);
        let mut tuples = Vec::new();
        for (key, (acc, count)) in &self.groups {
            let value = match self.op {
                AggOp::Avg => acc / count,
                _ => *acc,
            };
            let cells = match key {
                Some(group) => vec![group.clone(), Cell::Int64(value)],
                None => vec![Cell::Int64(value)],
            };
            tuples.push(Tuple::new(&schema, &cells));
        }
        Box::new(AggregateIter::new(schema, tuples))
    }
}

/// Counts string values per group. COUNT is the only operator that makes
/// sense over strings; everything else is rejected at construction.
pub struct StringAggregator {
    gb_field: Option<usize>,
    gb_type: Option<Type>,
    a_field: usize,
    counts: HashMap<Option<Cell>, i64>,
}

impl StringAggregator {
    pub fn new(
        gb_field: Option<usize>,
        gb_type: Option<Type>,
        a_field: usize,
        op: AggOp,
    ) -> DbResult<Self> {
        if op != AggOp::Count {
            return Err(DbError::IllegalArgument(format!(
                "string fields only support count, not {}",
                op
            )));
        }
        Ok(Self {
            gb_field,
            gb_type,
            a_field,
            counts: HashMap::new(),
        })
    }
}

impl Aggregator for StringAggregator {
    fn merge_tuple_into_group(&mut self, tuple: &Tuple) {
        if !matches!(tuple.get_cell(self.a_field), Cell::String(_)) {
            error!("string aggregator fed a non-string cell");
            return;
        }
        let key = self.gb_field.map(|i| tuple.get_cell(i));
        *self.counts.entry(key).or_insert(0) += 1;
    }

    fn iterator(&self) -> Box<dyn OpIterator> {
        let schema = output_schema(self.gb_type);
        let mut tuples = Vec::new();
        for (key, count) in &self.counts {
            let cells = match key {
                Some(group) => vec![group.clone(), Cell::Int64(*count)],
                None => vec![Cell::Int64(*count)],
            };
            tuples.push(Tuple::new(&schema, &cells));
        }
        Box::new(AggregateIter::new(schema, tuples))
    }
}

/// Result cursor handed out by the aggregators.
struct AggregateIter {
    schema: Schema,
    tuples: Vec<Tuple>,
    cursor: usize,
    opened: bool,
}

impl AggregateIter {
    fn new(schema: Schema, tuples: Vec<Tuple>) -> Self {
        Self {
            schema,
            tuples,
            cursor: 0,
            opened: false,
        }
    }
}

impl OpIterator for AggregateIter {
    fn open(&mut self) -> DbResult<()> {
        self.opened = true;
        self.cursor = 0;
        Ok(())
    }

    fn has_next(&mut self) -> DbResult<bool> {
        Ok(self.opened && self.cursor < self.tuples.len())
    }

    fn next(&mut self) -> DbResult<Tuple> {
        if !self.has_next()? {
            return Err(DbError::NoSuchElement(
                "aggregate results exhausted".to_string(),
            ));
        }
        let tuple = self.tuples[self.cursor].clone();
        self.cursor += 1;
        Ok(tuple)
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn tuple_desc(&self) -> Schema {
        self.schema.clone()
    }
}

/// The aggregation operator: drains its child at `open`, feeding every
/// tuple to the underlying aggregator, then iterates the per-group
/// results.
pub struct Aggregate {
    child: Box<dyn OpIterator>,
    agg: Box<dyn Aggregator>,
    desc: Schema,
    results: Option<Box<dyn OpIterator>>,
}

impl Aggregate {
    pub fn new(
        child: Box<dyn OpIterator>,
        a_field: usize,
        gb_field: Option<usize>,
        op: AggOp,
    ) -> DbResult<Self> {
        let child_schema = child.tuple_desc();
        let gb_type = gb_field.map(|i| child_schema.get_field_type(i));

        let agg: Box<dyn Aggregator> = match child_schema.get_field_type(a_field) {
            Type::Int64 => Box::new(IntegerAggregator::new(gb_field, gb_type, a_field, op)),
            Type::String => Box::new(StringAggregator::new(gb_field, gb_type, a_field, op)?),
        };

        let agg_name = format!("{}({})", op, child_schema.get_field_name(a_field));
        let desc = match (gb_field, gb_type) {
            (Some(i), Some(t)) => Schema::new(vec![
                Field::new(&child_schema.get_field_name(i), t),
                Field::new(&agg_name, Type::Int64),
            ]),
            _ => Schema::new(vec![Field::new(&agg_name, Type::Int64)]),
        };

        Ok(Self {
            child,
            agg,
            desc,
            results: None,
        })
    }
}

impl OpIterator for Aggregate {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()?;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            self.agg.merge_tuple_into_group(&tuple);
        }

        let mut results = self.agg.iterator();
        results.open()?;
        self.results = Some(results);
        Ok(())
    }

    fn has_next(&mut self) -> DbResult<bool> {
        match &mut self.results {
            Some(results) => results.has_next(),
            None => Ok(false),
        }
    }

    fn next(&mut self) -> DbResult<Tuple> {
        match &mut self.results {
            Some(results) => results.next(),
            None => Err(DbError::NoSuchElement(
                "aggregate results exhausted".to_string(),
            )),
        }
    }

    fn rewind(&mut self) -> DbResult<()> {
        match &mut self.results {
            Some(results) => results.rewind(),
            None => Err(DbError::Db("aggregate is not open".to_string())),
        }
    }

    fn close(&mut self) {
        self.child.close();
        self.results = None;
    }

    fn tuple_desc(&self) -> Schema {
        self.desc.clone()
    }
}
