//! Auto-growing byte sink used by the bytecode emitter and serializer.

use alloc::vec::Vec;

#[derive(Debug, Clone, Default)]
pub struct DynamicBuffer {
    bytes: Vec<u8>,
}

impl DynamicBuffer {
    pub fn new() -> Self {
        DynamicBuffer { bytes: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        DynamicBuffer { bytes: Vec::with_capacity(cap) }
    }

    pub fn append(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn push_u8(&mut self, b: u8) {
        self.bytes.push(b);
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_byte_array(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Overwrite `len` bytes at `at` — used to back-patch jump offsets once
    /// a target address is known.
    pub fn patch(&mut self, at: usize, data: &[u8]) {
        self.bytes[at..at + data.len()].copy_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_and_reports_size() {
        let mut b = DynamicBuffer::new();
        b.append(&[1, 2, 3]);
        assert_eq!(b.size(), 3);
        b.push_u8(4);
        assert_eq!(b.to_byte_array(), alloc::vec![1, 2, 3, 4]);
    }

    #[test]
    fn truncate_shrinks_contents() {
        let mut b = DynamicBuffer::new();
        b.append(&[1, 2, 3, 4, 5]);
        b.truncate(2);
        assert_eq!(b.to_byte_array(), alloc::vec![1, 2]);
    }

    #[test]
    fn patch_overwrites_in_place() {
        let mut b = DynamicBuffer::new();
        b.append(&[0, 0, 0, 0]);
        b.patch(1, &[9, 9]);
        assert_eq!(b.to_byte_array(), alloc::vec![0, 9, 9, 0]);
    }
}
