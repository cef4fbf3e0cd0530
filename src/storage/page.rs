use std::io::Cursor;

use bit_vec::BitVec;

use crate::{
    buffer_pool::BufferPool,
    error::DbError,
    io::{read_exact, ByteWriter, Serializeable},
    storage::{
        page_id::HeapPageId,
        schema::Schema,
        tuple::{RecordId, Tuple},
    },
    transaction::TransactionID,
    types::DbResult,
};

/// A fixed-size page of a heap file: a slot-occupancy bitmap followed by a
/// fixed array of tuple slots, zero padded up to the page size. The page
/// also carries the cache metadata the buffer pool relies on: which
/// transaction, if any, made it dirty.
#[derive(Debug)]
pub struct HeapPage {
    pid: HeapPageId,
    schema: Schema,
    header: BitVec,
    tuples: Vec<Tuple>,
    dirtier: Option<TransactionID>,
}

impl HeapPage {
    pub fn new(pid: &HeapPageId, bytes: &[u8], schema: &Schema) -> DbResult<Self> {
        let page_size = BufferPool::get_page_size();
        if bytes.len() != page_size {
            return Err(DbError::Db(format!(
                "page image of {} has {} bytes, expect {}",
                pid,
                bytes.len(),
                page_size
            )));
        }

        let slots = Self::slots_count(schema);
        let mut reader = Cursor::new(bytes);

        let header = BitVec::from_bytes(&read_exact(&mut reader, Self::header_size(slots)));

        let mut tuples = Vec::with_capacity(slots);
        for slot in 0..slots {
            let mut tuple = Tuple::decode(&mut reader, schema);
            tuple.set_rid(Some(RecordId::new(*pid, slot)));
            tuples.push(tuple);
        }

        Ok(Self {
            pid: *pid,
            schema: schema.clone(),
            header,
            tuples,
            dirtier: None,
        })
    }

    /// The image a freshly appended page starts from.
    pub fn empty_page_data() -> Vec<u8> {
        vec![0; BufferPool::get_page_size()]
    }

    /// Number of tuple slots a page holds: each slot costs its tuple bytes
    /// plus one header bit.
    pub fn slots_count(schema: &Schema) -> usize {
        (BufferPool::get_page_size() * 8) / (schema.get_size() * 8 + 1)
    }

    fn header_size(slots: usize) -> usize {
        (slots + 7) / 8
    }

    pub fn get_pid(&self) -> HeapPageId {
        self.pid
    }

    pub fn get_slots_count(&self) -> usize {
        self.tuples.len()
    }

    /// The byte image written back to disk. Decoding this image yields an
    /// identical page, and re-encoding yields identical bytes.
    pub fn get_page_data(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_bytes(&self.header.to_bytes());
        for tuple in &self.tuples {
            tuple.encode(&mut writer, &self.schema);
        }
        writer.to_padded_bytes(BufferPool::get_page_size())
    }

    pub fn is_slot_used(&self, slot: usize) -> bool {
        self.header.get(slot).unwrap_or(false)
    }

    pub fn empty_slots_count(&self) -> usize {
        (0..self.get_slots_count())
            .filter(|slot| !self.is_slot_used(*slot))
            .count()
    }

    /// Place the tuple in the first free slot.
    pub fn insert_tuple(&mut self, tuple: &Tuple) -> DbResult<()> {
        if tuple.get_schema() != &self.schema {
            return Err(DbError::Db(
                "tuple schema does not match page schema".to_string(),
            ));
        }

        let slot = (0..self.get_slots_count())
            .find(|slot| !self.is_slot_used(*slot))
            .ok_or_else(|| DbError::Db(format!("no empty slots on page {}", self.pid)))?;

        let mut stored = tuple.clone();
        stored.set_rid(Some(RecordId::new(self.pid, slot)));
        self.tuples[slot] = stored;
        self.header.set(slot, true);
        Ok(())
    }

    /// Remove the tuple at the record id the tuple carries. The slot is
    /// zeroed so the page image stays canonical.
    pub fn delete_tuple(&mut self, tuple: &Tuple) -> DbResult<()> {
        let rid = tuple
            .get_rid()
            .ok_or_else(|| DbError::Db("tuple has no record id".to_string()))?;

        if rid.pid != self.pid {
            return Err(DbError::Db(format!(
                "tuple belongs to {}, not {}",
                rid.pid, self.pid
            )));
        }
        if rid.slot >= self.get_slots_count() || !self.is_slot_used(rid.slot) {
            return Err(DbError::Db(format!(
                "slot {} of {} holds no tuple",
                rid.slot, self.pid
            )));
        }

        let mut cleared = Tuple::new_default(&self.schema);
        cleared.set_rid(Some(rid));
        self.tuples[rid.slot] = cleared;
        self.header.set(rid.slot, false);
        Ok(())
    }

    pub fn tuple_at(&self, slot: usize) -> DbResult<Tuple> {
        if slot >= self.get_slots_count() || !self.is_slot_used(slot) {
            return Err(DbError::NoSuchElement(format!(
                "slot {} of {} holds no tuple",
                slot, self.pid
            )));
        }
        Ok(self.tuples[slot].clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tuple> + '_ {
        self.tuples
            .iter()
            .enumerate()
            .filter(|(slot, _)| self.is_slot_used(*slot))
            .map(|(_, tuple)| tuple)
    }

    pub fn set_dirty(&mut self, dirtier: Option<TransactionID>) {
        self.dirtier = dirtier;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirtier.is_some()
    }

    pub fn get_dirtier(&self) -> Option<TransactionID> {
        self.dirtier
    }
}
