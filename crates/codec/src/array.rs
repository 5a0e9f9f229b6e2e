use std::sync::Arc;

use crate::buffer::ConstBuffer;

/// An ordered, reference-counted sequence of [`ConstBuffer`]s.
#[derive(Clone)]
pub struct ConstBufferArray(Arc<[ConstBuffer]>);

impl ConstBufferArray {
    pub fn new(buffers: Vec<ConstBuffer>) -> Self {
        ConstBufferArray(Arc::from(buffers.into_boxed_slice()))
    }

    pub fn empty() -> Self {
        ConstBufferArray(Arc::from(Vec::new().into_boxed_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn buffer(&self, index: usize) -> &ConstBuffer {
        &self.0[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConstBuffer> {
        self.0.iter()
    }

    /// Sum of every buffer's size. `None` if the sum does not fit in
    /// a `u32`, matching the external `all_buffers_size` collaborator
    /// contract ("fails if sum overflows 32 bits").
    pub fn all_buffers_size(&self) -> Option<u32> {
        let mut total: u64 = 0;
        for buf in self.iter() {
            total += buf.size() as u64;
            if total > u32::MAX as u64 {
                return None;
            }
        }
        Some(total as u32)
    }
}

impl<'a> IntoIterator for &'a ConstBufferArray {
    type Item = &'a ConstBuffer;
    type IntoIter = std::slice::Iter<'a, ConstBuffer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
