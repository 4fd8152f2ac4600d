//! The allocation hot path.
//!
//! [`Arena::alloc`] bumps the cursor through the live tail block and only
//! falls back to block acquisition when the tail lacks room.

use crate::arena::Arena;
use crate::block::{BlockId, Chain};
use crate::error::ArenaError;
use crate::handle::Allocation;
use crate::host::HostMemory;

impl<H: HostMemory> Arena<H> {
    /// Allocate `size` contiguous bytes.
    ///
    /// The returned memory is not initialised: it holds whatever the block
    /// last contained. Use [`calloc`](Self::calloc) for zeroed memory.
    ///
    /// # Errors
    ///
    /// - `OversizedRequest` if the arena is fixed-size and `size` exceeds
    ///   its block size. The chains are left untouched.
    /// - `HostExhausted` if a new block was needed and the host refused it.
    pub fn alloc(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        if self.block_size != 0 && size > self.block_size {
            return Err(ArenaError::OversizedRequest {
                requested: size,
                block_size: self.block_size,
            });
        }

        let (block, offset) = match self.tail_with_room(size) {
            Some(spot) => spot,
            None => (self.grow(size)?, 0),
        };
        self.cursor = Some(offset + size);
        if let Some(stats) = self.stats.as_mut() {
            stats.note_alloc(size);
        }
        Ok(Allocation::new(block, self.blocks[block].epoch, offset, size))
    }

    /// Allocate zeroed space for `nmemb` elements of `size` bytes each.
    ///
    /// A product that overflows `usize` is saturated to `usize::MAX`, which
    /// no fixed arena and no realistic host can satisfy, so the call fails
    /// instead of returning a short allocation.
    pub fn calloc(&mut self, nmemb: usize, size: usize) -> Result<Allocation, ArenaError> {
        let total = nmemb as u128 * size as u128;
        let total = usize::try_from(total).unwrap_or(usize::MAX);
        let alloc = self.alloc(total)?;
        self.span_mut(alloc).fill(0);
        Ok(alloc)
    }

    /// Allocate `src.len()` bytes and copy `src` into them.
    pub fn alloc_copy(&mut self, src: &[u8]) -> Result<Allocation, ArenaError> {
        let alloc = self.alloc(src.len())?;
        self.span_mut(alloc).copy_from_slice(src);
        Ok(alloc)
    }

    /// Borrow the bytes of a live allocation.
    ///
    /// Returns `Err(ArenaError::StaleAllocation)` if the allocation was
    /// rolled back or its block left the live chain.
    pub fn bytes(&self, alloc: Allocation) -> Result<&[u8], ArenaError> {
        self.validate(alloc)?;
        Ok(&self.blocks[alloc.block].data[alloc.offset..alloc.end()])
    }

    /// Mutably borrow the bytes of a live allocation.
    pub fn bytes_mut(&mut self, alloc: Allocation) -> Result<&mut [u8], ArenaError> {
        self.validate(alloc)?;
        Ok(self.span_mut(alloc))
    }

    /// Whether `alloc` still refers to allocated bytes.
    ///
    /// Bytes that were rolled back and then handed out again cannot be told
    /// apart from the original allocation.
    pub fn is_live(&self, alloc: Allocation) -> bool {
        self.validate(alloc).is_ok()
    }

    fn validate(&self, alloc: Allocation) -> Result<(), ArenaError> {
        let block = self
            .blocks
            .get(alloc.block)
            .ok_or(ArenaError::StaleAllocation)?;
        if block.chain != Chain::Live || block.epoch != alloc.epoch {
            return Err(ArenaError::StaleAllocation);
        }
        let limit = if self.live.tail == Some(alloc.block) {
            self.cursor.unwrap_or(0)
        } else {
            block.size()
        };
        if alloc.end() > limit {
            return Err(ArenaError::StaleAllocation);
        }
        Ok(())
    }

    fn span_mut(&mut self, alloc: Allocation) -> &mut [u8] {
        &mut self.blocks[alloc.block].data[alloc.offset..alloc.end()]
    }

    /// The live tail and cursor, if the tail can hold `size` more bytes.
    fn tail_with_room(&self, size: usize) -> Option<(BlockId, usize)> {
        let tail = self.live.tail?;
        let head = self.cursor?;
        (self.blocks[tail].size() - head >= size).then_some((tail, head))
    }

    /// Append a block able to hold `size` bytes to the live chain.
    fn grow(&mut self, size: usize) -> Result<BlockId, ArenaError> {
        let least = if self.block_size != 0 {
            self.block_size
        } else {
            size
        };
        let id = self.obtain(least)?;
        self.link(Chain::Live, id);
        self.cursor = Some(0);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ArenaConfig, BlockSizing};
    use crate::error::ArenaError;
    use crate::host::SystemHost;
    use crate::Arena;

    fn fixed(block_size: usize) -> Arena<SystemHost> {
        let config = ArenaConfig::new(BlockSizing::Exact(block_size)).with_stats(true);
        Arena::new(SystemHost, config).unwrap()
    }

    #[test]
    fn sequential_allocs_are_contiguous() {
        let mut a = fixed(64);
        let x = a.alloc(10).unwrap();
        let y = a.alloc(20).unwrap();
        let z = a.alloc(34).unwrap();
        assert_eq!(x.block(), y.block());
        assert_eq!(y.block(), z.block());
        assert_eq!(x.offset(), 0);
        assert_eq!(y.offset(), x.end());
        assert_eq!(z.offset(), y.end());
        assert_eq!(a.head(), Some(64));
        assert_eq!(a.remaining(), 0);
        assert_eq!(a.sanity_code(), 0);
    }

    #[test]
    fn full_block_spills_into_a_new_one() {
        let mut a = fixed(16);
        let x = a.alloc(10).unwrap();
        let y = a.alloc(10).unwrap();
        assert_ne!(x.block(), y.block());
        assert_eq!(y.offset(), 0);
        assert_eq!(a.live_blocks(), 2);
        assert_eq!(a.head(), Some(10));
    }

    #[test]
    fn oversized_request_leaves_chains_alone() {
        let mut a = fixed(16);
        let before = (a.live_ends(), a.free_ends(), a.head());
        let err = a.alloc(17).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OversizedRequest {
                requested: 17,
                block_size: 16
            }
        );
        assert!(err.is_contract_violation());
        assert_eq!((a.live_ends(), a.free_ends(), a.head()), before);
        assert_eq!(a.stats().unwrap().tot_allocs, 0);
    }

    #[test]
    fn exact_block_size_fits() {
        let mut a = fixed(16);
        assert!(a.alloc(16).is_ok());
        assert_eq!(a.live_blocks(), 1);
    }

    #[test]
    fn variable_arena_uses_one_block_per_alloc() {
        let mut a = Arena::variable(SystemHost).unwrap();
        let x = a.alloc(3).unwrap();
        let y = a.alloc(5).unwrap();
        assert_ne!(x.block(), y.block());
        assert_eq!(a.block_len(x.block()), Some(3));
        assert_eq!(a.block_len(y.block()), Some(5));
    }

    #[test]
    fn freed_block_is_reused() {
        let mut a = fixed(16);
        let x = a.alloc(16).unwrap();
        let _ = a.alloc(16).unwrap();
        a.free_last_block();
        assert_eq!(a.free_blocks(), 1);

        let z = a.alloc(1).unwrap();
        assert_ne!(z.block(), x.block());
        assert_eq!(a.free_blocks(), 0);
        assert_eq!(a.stats().unwrap().blk_peak, 2);
    }

    #[test]
    fn stats_count_successful_allocations() {
        let mut a = fixed(16);
        let _ = a.alloc(4).unwrap();
        let _ = a.alloc(8).unwrap();
        let _ = a.alloc(32);
        let stats = a.stats().unwrap();
        assert_eq!(stats.tot_allocs, 2);
        assert_eq!(stats.tot_bytes, 12);
        assert_eq!(stats.cur_bytes, 12);
    }

    #[test]
    fn calloc_zero_fills_reused_memory() {
        let mut a = fixed(16);
        let x = a.alloc_copy(&[0xff; 16]).unwrap();
        assert_eq!(a.free_bytes(16), 16);
        assert!(!a.is_live(x));

        let z = a.calloc(4, 4).unwrap();
        assert_eq!(a.bytes(z).unwrap(), &[0u8; 16]);
    }

    #[test]
    fn calloc_overflow_saturates_and_fails() {
        let mut a = fixed(16);
        let err = a.calloc(usize::MAX, 2).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OversizedRequest {
                requested: usize::MAX,
                block_size: 16
            }
        );
    }

    #[test]
    fn calloc_overflow_on_variable_arena_exhausts_host() {
        let mut a = Arena::variable(SystemHost).unwrap();
        let err = a.calloc(usize::MAX, usize::MAX).unwrap_err();
        assert_eq!(
            err,
            ArenaError::HostExhausted {
                requested: usize::MAX
            }
        );
        assert_eq!(a.live_blocks(), 0);
        assert_eq!(a.sanity_code(), 0);
    }

    #[test]
    fn alloc_copy_round_trips_bytes() {
        let mut a = fixed(32);
        let x = a.alloc_copy(b"ab\0").unwrap();
        let y = a.alloc_copy(b"cdef\0").unwrap();
        assert_eq!(a.bytes(x).unwrap(), b"ab\0");
        assert_eq!(a.bytes(y).unwrap(), b"cdef\0");
        a.bytes_mut(x).unwrap()[0] = b'z';
        assert_eq!(a.bytes(x).unwrap(), b"zb\0");
    }

    #[test]
    fn rolled_back_allocation_is_stale() {
        let mut a = fixed(32);
        let x = a.alloc(4).unwrap();
        let y = a.alloc(4).unwrap();
        a.free_bytes(4);
        assert!(a.is_live(x));
        assert_eq!(a.bytes(y), Err(ArenaError::StaleAllocation));
    }

    #[test]
    fn released_allocation_is_stale_even_after_reuse() {
        let mut a = fixed(32);
        let x = a.alloc(4).unwrap();
        a.release_to_pool();
        assert!(!a.is_live(x));

        let y = a.alloc(4).unwrap();
        assert_eq!(y.block(), x.block());
        assert!(!a.is_live(x));
        assert!(a.is_live(y));
    }

    #[test]
    fn zero_sized_alloc_is_valid() {
        let mut a = Arena::variable(SystemHost).unwrap();
        let x = a.alloc(0).unwrap();
        assert!(x.is_empty());
        assert_eq!(a.bytes(x).unwrap(), &[] as &[u8]);
        assert_eq!(a.sanity_code(), 0);
    }
}
