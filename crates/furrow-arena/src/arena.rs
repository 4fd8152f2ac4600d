//! The arena: construction, lifecycle, and accessors.
//!
//! Allocation lives in [`bump`](crate::bump), rollback in
//! [`rollback`](crate::rollback), and the chain primitives in
//! [`chain`](crate::chain); they all operate on the [`Arena`] defined here.

use crate::block::{BlockId, BlockSlab, Chain};
use crate::chain::ChainEnds;
use crate::config::{ArenaConfig, BlockSizing};
use crate::error::ArenaError;
use crate::host::{HostMemory, SystemHost};
use crate::stats::ArenaStats;

/// Region allocator serving bump allocations out of host blocks.
///
/// The arena owns a *live chain* of blocks backing current allocations and
/// a *free chain* of reclaimed blocks kept for reuse. Allocation bumps a
/// cursor through the newest live block; memory comes back a whole block
/// at a time or by rolling back the most recent bytes.
///
/// # Layout
///
/// ```text
/// live: [blk] <-> [blk] <-> [tail: used | unused]
///                                       ^ cursor
/// free: [blk] <-> [blk]
/// ```
///
/// An arena is single-threaded: it is `Send` when its host is, but every
/// operation takes `&mut self`.
pub struct Arena<H: HostMemory = SystemHost> {
    pub(crate) blocks: BlockSlab,
    pub(crate) live: ChainEnds,
    pub(crate) free: ChainEnds,
    /// Bytes used in the live tail. `None` iff the live chain is empty.
    pub(crate) cursor: Option<usize>,
    /// Data size of newly commissioned blocks; `0` means variable.
    pub(crate) block_size: usize,
    pub(crate) host: H,
    pub(crate) stats: Option<ArenaStats>,
    pub(crate) scrub_freed: bool,
    /// Last epoch handed to a block entering the live chain.
    pub(crate) next_epoch: u32,
}

impl<H: HostMemory> Arena<H> {
    /// Create an arena drawing blocks from `host`.
    ///
    /// Fixed-size arenas commission their first block immediately, so the
    /// first allocation never has to wait on the host.
    ///
    /// Returns `Err(ArenaError::ZeroMinimum)` or
    /// `Err(ArenaError::MinimumTooLarge)` for an unusable
    /// [`BlockSizing::AtLeast`], and `Err(ArenaError::HostExhausted)` if the
    /// first block cannot be commissioned.
    pub fn new(host: H, config: ArenaConfig) -> Result<Self, ArenaError> {
        let block_size = config.sizing.resolve(host.page_size())?;
        let mut arena = Self {
            blocks: BlockSlab::new(),
            live: ChainEnds::default(),
            free: ChainEnds::default(),
            cursor: None,
            block_size,
            host,
            stats: config.track_stats.then(ArenaStats::default),
            scrub_freed: config.scrub_freed,
            next_epoch: 0,
        };
        if block_size != 0 {
            let id = arena.acquire_new(block_size)?;
            arena.link(Chain::Live, id);
            arena.cursor = Some(0);
        }
        log::debug!(
            "created arena: sizing={:?}, block_size={block_size}, stats={}",
            config.sizing,
            config.track_stats
        );
        Ok(arena)
    }

    /// Arena whose blocks, header included, fill one host page.
    pub fn page_aligned(host: H) -> Result<Self, ArenaError> {
        Self::new(host, ArenaConfig::new(BlockSizing::PageAligned))
    }

    /// Arena with one block per allocation, sized to the allocation.
    pub fn variable(host: H) -> Result<Self, ArenaError> {
        Self::new(host, ArenaConfig::new(BlockSizing::Variable))
    }

    /// Arena whose blocks hold exactly `block_size` usable bytes.
    pub fn with_block_size(host: H, block_size: usize) -> Result<Self, ArenaError> {
        Self::new(host, ArenaConfig::new(BlockSizing::Exact(block_size)))
    }

    /// Arena whose blocks hold at least `least` usable bytes.
    pub fn with_least(host: H, least: usize) -> Result<Self, ArenaError> {
        Self::new(host, ArenaConfig::new(BlockSizing::AtLeast(least)))
    }

    /// Move every live block to the free chain without contacting the host.
    ///
    /// All outstanding allocations become stale; the committed capacity
    /// stays available for reuse.
    pub fn release_to_pool(&mut self) {
        while let Some(tail) = self.live.tail {
            self.retire(tail);
        }
        self.cursor = None;
        if let Some(stats) = self.stats.as_mut() {
            stats.cur_bytes = 0;
        }
    }

    /// Return every block, live and free, to the host.
    pub fn decommission(&mut self) {
        let mut released = 0usize;
        for chain in [Chain::Live, Chain::Free] {
            while let Some(tail) = self.ends(chain).tail {
                self.unlink(chain, tail);
                if let Some(block) = self.blocks.remove(tail) {
                    self.host.release(block.data);
                    released += 1;
                }
            }
        }
        self.cursor = None;
        if let Some(stats) = self.stats.as_mut() {
            stats.blk_decom += released;
            stats.cur_bytes = 0;
        }
        if released > 0 {
            log::debug!("decommissioned {released} blocks");
        }
    }

    /// Data size used for newly commissioned blocks; `0` means variable.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Change the block size used for future acquisitions.
    ///
    /// Blocks already committed keep their size. `0` switches the arena
    /// to one block per allocation.
    pub fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
    }

    /// Whether every new block has the same fixed size.
    pub fn is_fixed(&self) -> bool {
        self.block_size != 0
    }

    /// Bytes used in the live tail block, or `None` when nothing is live.
    pub fn head(&self) -> Option<usize> {
        self.cursor
    }

    /// Unused bytes left in the live tail block.
    pub fn remaining(&self) -> usize {
        match (self.live.tail, self.cursor) {
            (Some(tail), Some(head)) => self.blocks[tail].size() - head,
            _ => 0,
        }
    }

    /// First and last block of the live chain.
    pub fn live_ends(&self) -> ChainEnds {
        self.live
    }

    /// First and last block of the free chain.
    pub fn free_ends(&self) -> ChainEnds {
        self.free
    }

    /// Number of blocks in the live chain.
    pub fn live_blocks(&self) -> usize {
        self.chain_iter(Chain::Live).count()
    }

    /// Number of blocks in the free chain.
    pub fn free_blocks(&self) -> usize {
        self.chain_iter(Chain::Free).count()
    }

    /// Usable size of a committed block.
    pub fn block_len(&self, id: BlockId) -> Option<usize> {
        self.blocks.get(id).map(|b| b.size())
    }

    /// Which chain holds a committed block.
    pub fn block_chain(&self, id: BlockId) -> Option<Chain> {
        self.blocks.get(id).map(|b| b.chain)
    }

    /// Statistics counters, when tracking is enabled.
    pub fn stats(&self) -> Option<&ArenaStats> {
        self.stats.as_ref()
    }

    /// The host memory provider.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host memory provider.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: HostMemory> Drop for Arena<H> {
    fn drop(&mut self) {
        self.decommission();
    }
}
