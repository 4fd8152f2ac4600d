//! Allocation handles.
//!
//! An [`Allocation`] encodes where a span of arena memory lives: the block,
//! the block's epoch at allocation time, and the byte range within it. The
//! epoch makes handles into reclaimed blocks detectable in O(1).

use std::fmt;

use crate::block::BlockId;

/// Location of one allocation inside an arena.
///
/// Resolve it with [`Arena::bytes`](crate::Arena::bytes) or
/// [`Arena::bytes_mut`](crate::Arena::bytes_mut).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Allocation {
    pub(crate) block: BlockId,
    pub(crate) epoch: u32,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl Allocation {
    pub(crate) fn new(block: BlockId, epoch: u32, offset: usize, len: usize) -> Self {
        Self {
            block,
            epoch,
            offset,
            len,
        }
    }

    /// The block holding this allocation.
    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Byte offset from the start of the block's data span.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte, relative to the block's data span.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Allocation(block={}, epoch={}, off={}, len={})",
            self.block, self.epoch, self.offset, self.len
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let a = Allocation::new(BlockId(2), 7, 16, 8);
        assert_eq!(a.block(), BlockId(2));
        assert_eq!(a.offset(), 16);
        assert_eq!(a.len(), 8);
        assert_eq!(a.end(), 24);
        assert!(!a.is_empty());
    }

    #[test]
    fn display() {
        let a = Allocation::new(BlockId(1), 3, 0, 5);
        assert_eq!(a.to_string(), "Allocation(block=#1, epoch=3, off=0, len=5)");
    }
}
