//! Block acquisition: best-fit reuse from the free chain, else the host.

use crate::arena::Arena;
use crate::block::{Block, BlockId, Chain};
use crate::error::ArenaError;
use crate::host::HostMemory;

impl<H: HostMemory> Arena<H> {
    /// Commission a fresh block of exactly `size` usable bytes from the host.
    ///
    /// The block is stored in the slab but belongs to no chain yet. Host
    /// failure is reported once, without retrying.
    pub(crate) fn acquire_new(&mut self, size: usize) -> Result<BlockId, ArenaError> {
        let Some(data) = self.host.acquire(size) else {
            log::warn!("host could not commission a {size}-byte block");
            return Err(ArenaError::HostExhausted { requested: size });
        };
        debug_assert_eq!(data.len(), size, "host returned a block of the wrong size");
        let id = self.blocks.insert(Block::new(data));
        log::debug!("commissioned block {id} ({size} bytes)");
        Ok(id)
    }

    /// Detach the smallest free block holding at least `least` bytes.
    ///
    /// The free chain is scanned tail to head; among equally small
    /// candidates the first one met wins.
    pub(crate) fn acquire_best_fit(&mut self, least: usize) -> Option<BlockId> {
        let mut best: Option<(BlockId, usize)> = None;
        let mut cursor = self.free.tail;
        while let Some(id) = cursor {
            let block = &self.blocks[id];
            if let Some(waste) = block.size().checked_sub(least) {
                if best.is_none_or(|(_, w)| waste < w) {
                    best = Some((id, waste));
                    if waste == 0 {
                        break;
                    }
                }
            }
            cursor = block.prev;
        }
        let (id, waste) = best?;
        log::trace!("reusing free block {id} for {least} bytes ({waste} spare)");
        Some(self.unlink(Chain::Free, id))
    }

    /// Obtain a detached block of at least `least` bytes, reusing a free
    /// block when one fits.
    pub(crate) fn obtain(&mut self, least: usize) -> Result<BlockId, ArenaError> {
        match self.acquire_best_fit(least) {
            Some(id) => Ok(id),
            None => self.acquire_new(least),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::block::Chain;
    use crate::config::{ArenaConfig, BlockSizing};
    use crate::host::SystemHost;
    use crate::Arena;

    fn arena_with_free(sizes: &[usize]) -> Arena<SystemHost> {
        let config = ArenaConfig::new(BlockSizing::Variable).with_stats(true);
        let mut a = Arena::new(SystemHost, config).unwrap();
        for &size in sizes {
            let id = a.acquire_new(size).unwrap();
            a.link(Chain::Free, id);
        }
        a
    }

    fn park(a: &mut Arena<SystemHost>, id: crate::BlockId) {
        a.link(Chain::Free, id);
    }

    #[test]
    fn exact_match_beats_larger() {
        let mut a = arena_with_free(&[10, 50, 12]);
        let id = a.acquire_best_fit(10).unwrap();
        assert_eq!(a.blocks[id].size(), 10);
        assert_eq!(a.stats().unwrap().blk_free, 2);
        park(&mut a, id);
    }

    #[test]
    fn smallest_sufficient_wins() {
        let mut a = arena_with_free(&[50, 12]);
        let id = a.acquire_best_fit(10).unwrap();
        assert_eq!(a.blocks[id].size(), 12);
        park(&mut a, id);
    }

    #[test]
    fn ties_go_to_the_block_nearest_the_tail() {
        let mut a = arena_with_free(&[12, 12]);
        let tail = a.free.tail.unwrap();
        let id = a.acquire_best_fit(10).unwrap();
        assert_eq!(id, tail);
        park(&mut a, id);
    }

    #[test]
    fn nothing_large_enough() {
        let mut a = arena_with_free(&[4, 8]);
        assert!(a.acquire_best_fit(9).is_none());
        assert_eq!(a.stats().unwrap().blk_free, 2);
    }

    #[test]
    fn obtain_falls_back_to_host() {
        let mut a = arena_with_free(&[4]);
        let id = a.obtain(64).unwrap();
        assert_eq!(a.blocks[id].size(), 64);
        assert_eq!(a.stats().unwrap().blk_free, 1);
        park(&mut a, id);
    }
}
