//! Live and free block chains.
//!
//! Both chains are doubly-linked, insertion-ordered sequences threaded
//! through the block slab by [`BlockId`]. Every structural change goes
//! through [`Arena::link`] and [`Arena::unlink`], which keep the chain ends
//! and the statistics counters consistent within a single call.

use crate::arena::Arena;
use crate::block::{BlockId, BlockSlab, Chain};
use crate::config::ArenaConfig;
use crate::host::HostMemory;

/// First and last block of one chain. Both set or both empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainEnds {
    /// First block in insertion order.
    pub head: Option<BlockId>,
    /// Most recently appended block.
    pub tail: Option<BlockId>,
}

impl ChainEnds {
    /// Whether the chain holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.tail.is_none()
    }
}

/// Forward iterator over the blocks of one chain.
///
/// Stops after visiting as many blocks as the slab has slots, so a
/// corrupted (cyclic) chain cannot loop forever.
pub struct ChainIter<'a> {
    blocks: &'a BlockSlab,
    cursor: Option<BlockId>,
    budget: usize,
}

impl<'a> ChainIter<'a> {
    pub(crate) fn new(blocks: &'a BlockSlab, ends: ChainEnds) -> Self {
        Self {
            blocks,
            cursor: ends.head,
            budget: blocks.capacity(),
        }
    }
}

impl Iterator for ChainIter<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        let id = self.cursor?;
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;
        self.cursor = self.blocks.get(id).and_then(|b| b.next);
        Some(id)
    }
}

impl<H: HostMemory> Arena<H> {
    pub(crate) fn ends(&self, chain: Chain) -> ChainEnds {
        match chain {
            Chain::Live => self.live,
            Chain::Free => self.free,
        }
    }

    fn ends_mut(&mut self, chain: Chain) -> &mut ChainEnds {
        match chain {
            Chain::Live => &mut self.live,
            Chain::Free => &mut self.free,
        }
    }

    /// Iterate over the blocks of `chain`, oldest first.
    pub fn chain_iter(&self, chain: Chain) -> ChainIter<'_> {
        ChainIter::new(&self.blocks, self.ends(chain))
    }

    /// Append a detached block at the tail of `chain`.
    ///
    /// Entering the live chain gives the block a fresh epoch. Entering the
    /// free chain scrubs the data span when configured.
    pub(crate) fn link(&mut self, chain: Chain, id: BlockId) {
        let old_tail = self.ends(chain).tail;
        let epoch = match chain {
            Chain::Live => {
                self.next_epoch = self.next_epoch.wrapping_add(1);
                Some(self.next_epoch)
            }
            Chain::Free => None,
        };
        let scrub = chain == Chain::Free && self.scrub_freed;

        let block = &mut self.blocks[id];
        block.prev = old_tail;
        block.next = None;
        block.chain = chain;
        if let Some(epoch) = epoch {
            block.epoch = epoch;
        }
        if scrub {
            block.data.fill(ArenaConfig::SCRUB_BYTE);
        }
        let size = block.size();

        if let Some(tail) = old_tail {
            self.blocks[tail].next = Some(id);
        }
        let ends = self.ends_mut(chain);
        if ends.head.is_none() {
            ends.head = Some(id);
        }
        ends.tail = Some(id);

        if let Some(stats) = self.stats.as_mut() {
            match chain {
                Chain::Live => {
                    stats.cur_live_size += size;
                    stats.blk_live += 1;
                }
                Chain::Free => {
                    stats.cur_free_size += size;
                    stats.blk_free += 1;
                }
            }
            stats.note_committed();
        }
    }

    /// Detach `id` from `chain`, wherever it sits in it.
    ///
    /// The caller guarantees `id` is a member of `chain`.
    pub(crate) fn unlink(&mut self, chain: Chain, id: BlockId) -> BlockId {
        let block = &mut self.blocks[id];
        debug_assert_eq!(block.chain, chain, "block {id} unlinked from the wrong chain");
        let prev = block.prev.take();
        let next = block.next.take();
        let size = block.size();

        match prev {
            Some(p) => self.blocks[p].next = next,
            None => self.ends_mut(chain).head = next,
        }
        match next {
            Some(n) => self.blocks[n].prev = prev,
            None => self.ends_mut(chain).tail = prev,
        }

        if let Some(stats) = self.stats.as_mut() {
            match chain {
                Chain::Live => {
                    stats.cur_live_size -= size;
                    stats.blk_live -= 1;
                }
                Chain::Free => {
                    stats.cur_free_size -= size;
                    stats.blk_free -= 1;
                }
            }
        }
        id
    }

    /// Move `id` from the live chain to the tail of the free chain.
    pub(crate) fn retire(&mut self, id: BlockId) {
        let id = self.unlink(Chain::Live, id);
        self.link(Chain::Free, id);
    }
}

#[cfg(test)]
mod tests {
    use crate::block::Chain;
    use crate::config::{ArenaConfig, BlockSizing};
    use crate::host::SystemHost;
    use crate::Arena;

    fn arena() -> Arena<SystemHost> {
        let config = ArenaConfig::new(BlockSizing::Variable)
            .with_stats(true)
            .with_scrub(false);
        Arena::new(SystemHost, config).unwrap()
    }

    fn collect(arena: &Arena<SystemHost>, chain: Chain) -> Vec<usize> {
        arena.chain_iter(chain).map(|id| id.index()).collect()
    }

    #[test]
    fn link_appends_in_order() {
        let mut a = arena();
        let x = a.acquire_new(4).unwrap();
        let y = a.acquire_new(8).unwrap();
        a.link(Chain::Free, x);
        a.link(Chain::Free, y);
        assert_eq!(collect(&a, Chain::Free), vec![x.index(), y.index()]);
        assert_eq!(a.free.head, Some(x));
        assert_eq!(a.free.tail, Some(y));
        let stats = a.stats().unwrap();
        assert_eq!(stats.blk_free, 2);
        assert_eq!(stats.cur_free_size, 12);
    }

    #[test]
    fn unlink_middle_repairs_neighbours() {
        let mut a = arena();
        let ids: Vec<_> = (1..=3).map(|n| a.acquire_new(n).unwrap()).collect();
        for &id in &ids {
            a.link(Chain::Free, id);
        }
        a.unlink(Chain::Free, ids[1]);
        assert_eq!(collect(&a, Chain::Free), vec![ids[0].index(), ids[2].index()]);
        assert_eq!(a.blocks[ids[0]].next, Some(ids[2]));
        assert_eq!(a.blocks[ids[2]].prev, Some(ids[0]));
        assert_eq!(a.stats().unwrap().cur_free_size, 4);
        a.link(Chain::Free, ids[1]);
        assert_eq!(a.sanity_code(), 0);
    }

    #[test]
    fn unlink_sole_block_empties_chain() {
        let mut a = arena();
        let x = a.acquire_new(4).unwrap();
        a.link(Chain::Free, x);
        a.unlink(Chain::Free, x);
        assert!(a.free.is_empty());
        assert_eq!(a.stats().unwrap().blk_free, 0);
        a.link(Chain::Free, x);
    }

    #[test]
    fn live_link_assigns_fresh_epoch() {
        let mut a = arena();
        let x = a.acquire_new(4).unwrap();
        a.link(Chain::Live, x);
        let first = a.blocks[x].epoch;
        a.retire(x);
        a.unlink(Chain::Free, x);
        a.link(Chain::Live, x);
        assert_ne!(a.blocks[x].epoch, first);
        a.cursor = Some(0);
        assert_eq!(a.sanity_code(), 0);
    }

    #[test]
    fn free_link_scrubs_when_configured() {
        let config = ArenaConfig::new(BlockSizing::Variable).with_scrub(true);
        let mut a = Arena::new(SystemHost, config).unwrap();
        let x = a.acquire_new(16).unwrap();
        a.link(Chain::Free, x);
        assert!(a.blocks[x].data.iter().all(|&b| b == ArenaConfig::SCRUB_BYTE));
    }
}
