//! Blocks and the slot slab that stores them.
//!
//! A [`Block`] owns one buffer commissioned from the host. Blocks live in a
//! [`BlockSlab`] and are addressed by stable [`BlockId`] slot indices; the
//! chains link blocks through these indices, never through pointers.

use std::fmt;
use std::mem;

/// Stable slot index of a block within its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    /// The raw slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which chain currently holds a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chain {
    /// Blocks backing current allocations.
    Live,
    /// Reclaimed blocks kept for reuse.
    Free,
}

/// One span of host memory plus its chain linkage.
pub(crate) struct Block {
    pub(crate) data: Box<[u8]>,
    pub(crate) prev: Option<BlockId>,
    pub(crate) next: Option<BlockId>,
    pub(crate) chain: Chain,
    /// Bumped each time the block enters the live chain.
    pub(crate) epoch: u32,
}

/// Per-block bookkeeping cost, subtracted from a page by the
/// page-aligned presets so a block and its header share one page.
pub const BLOCK_OVERHEAD: usize = mem::size_of::<Block>();

impl Block {
    pub(crate) fn new(data: Box<[u8]>) -> Self {
        Self {
            data,
            prev: None,
            next: None,
            chain: Chain::Free,
            epoch: 0,
        }
    }

    /// Usable bytes in the data span.
    pub(crate) fn size(&self) -> usize {
        self.data.len()
    }
}

/// Slot storage for blocks with vacant-slot reuse.
#[derive(Default)]
pub(crate) struct BlockSlab {
    slots: Vec<Option<Block>>,
    /// Indices of vacant slots available for reuse.
    vacant: Vec<u32>,
}

impl BlockSlab {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store a block, reusing a vacant slot when one exists.
    pub(crate) fn insert(&mut self, block: Block) -> BlockId {
        if let Some(idx) = self.vacant.pop() {
            self.slots[idx as usize] = Some(block);
            return BlockId(idx);
        }
        let idx = self.slots.len() as u32;
        self.slots.push(Some(block));
        BlockId(idx)
    }

    /// Take a block out of its slot, leaving the slot vacant.
    pub(crate) fn remove(&mut self, id: BlockId) -> Option<Block> {
        let block = self.slots.get_mut(id.index())?.take()?;
        self.vacant.push(id.0);
        Some(block)
    }

    pub(crate) fn get(&self, id: BlockId) -> Option<&Block> {
        self.slots.get(id.index())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Number of slots ever created, occupied or vacant.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub(crate) fn occupied(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }
}

impl std::ops::Index<BlockId> for BlockSlab {
    type Output = Block;

    fn index(&self, id: BlockId) -> &Block {
        match self.get(id) {
            Some(block) => block,
            None => panic!("block {id} is not in the slab"),
        }
    }
}

impl std::ops::IndexMut<BlockId> for BlockSlab {
    fn index_mut(&mut self, id: BlockId) -> &mut Block {
        match self.get_mut(id) {
            Some(block) => block,
            None => panic!("block {id} is not in the slab"),
        }
    }
}
