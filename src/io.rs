use std::io::Read;

/// Serialization with an external context: cells need their `Type`, tuples
/// their `Schema`. The encoded form is fixed-width so pages can address
/// slots by offset.
pub trait Serializeable {
    type Reference;

    fn encode(&self, writer: &mut ByteWriter, reference: &Self::Reference);

    fn decode<R: Read>(reader: &mut R, reference: &Self::Reference) -> Self
    where
        Self: Sized;
}

pub fn read_exact<R: Read>(reader: &mut R, bytes_count: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; bytes_count];
    reader
        .read_exact(&mut buffer)
        .unwrap_or_else(|e| panic!("io error, expect {} bytes: {}", bytes_count, e));
    buffer
}

pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn size(&self) -> usize {
        self.buf.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }

    pub fn to_padded_bytes(&self, size: usize) -> Vec<u8> {
        let mut buf = self.buf.clone();

        if buf.len() > size {
            panic!(
                "buffer size is larger than the given size: {} > {}",
                buf.len(),
                size
            );
        }

        buf.resize(size, 0);
        buf
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
