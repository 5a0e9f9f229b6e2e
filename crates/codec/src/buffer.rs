use std::sync::Arc;

/// An immutable, reference-counted byte buffer.
///
/// A buffer either owns its storage (`Owned`) or aliases a byte range
/// of another buffer's storage (`Alias`). Aliasing keeps the parent's
/// `Arc` alive for as long as the alias (or any clone of it) exists —
/// this is the Rust substitute for the source's custom-free deleter
/// hook, documented on [`ConstBuffer::alias`].
#[derive(Clone)]
pub struct ConstBuffer(Storage);

#[derive(Clone)]
enum Storage {
    Owned(Arc<[u8]>),
    Alias {
        parent: Arc<[u8]>,
        offset: usize,
        len: usize,
    },
}

impl ConstBuffer {
    /// Copies `bytes` into a freshly allocated, owned buffer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        ConstBuffer(Storage::Owned(Arc::from(bytes)))
    }

    /// Takes ownership of `bytes` without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        ConstBuffer(Storage::Owned(Arc::from(bytes.into_boxed_slice())))
    }

    /// Builds a buffer that aliases `len` bytes of `parent` starting
    /// at `offset`, without copying.
    ///
    /// `parent`'s backing allocation is kept alive by an `Arc` clone
    /// for as long as this handle exists, and is released when the
    /// last clone of it drops — the shared-ownership-plus-drop-hook
    /// substitute the specification allows in place of a
    /// function-pointer deleter.
    pub fn alias(parent: &ConstBuffer, offset: usize, len: usize) -> Self {
        let (root, base) = match &parent.0 {
            Storage::Owned(arc) => (Arc::clone(arc), 0),
            Storage::Alias {
                parent, offset, ..
            } => (Arc::clone(parent), *offset),
        };
        debug_assert!(
            base + offset + len <= root.len(),
            "alias range out of bounds"
        );
        ConstBuffer(Storage::Alias {
            parent: root,
            offset: base + offset,
            len,
        })
    }

    pub fn content(&self) -> &[u8] {
        match &self.0 {
            Storage::Owned(bytes) => bytes,
            Storage::Alias {
                parent,
                offset,
                len,
            } => &parent[*offset..*offset + *len],
        }
    }

    pub fn size(&self) -> usize {
        self.content().len()
    }

    /// Strong count of the underlying allocation — the root allocation
    /// if this buffer is an alias. Exposed for tests that check
    /// refcount neutrality; not part of the serialized contract.
    pub fn strong_count(&self) -> usize {
        match &self.0 {
            Storage::Owned(arc) => Arc::strong_count(arc),
            Storage::Alias { parent, .. } => Arc::strong_count(parent),
        }
    }
}
