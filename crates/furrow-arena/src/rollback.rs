//! Rolling back the most recent allocations.
//!
//! Rollback never crosses a block boundary in a single call: freeing more
//! than the live tail holds releases the tail and reports how much was
//! actually freed, so callers loop until the target is met.

use crate::arena::Arena;
use crate::host::HostMemory;

impl<H: HostMemory> Arena<H> {
    /// Move the live tail block to the free chain.
    ///
    /// The cursor moves to the end of the new tail's data span, since the
    /// bytes used in earlier blocks are not tracked. No-op when nothing is
    /// live.
    pub fn free_last_block(&mut self) {
        let Some(tail) = self.live.tail else {
            return;
        };
        let used = self.cursor.unwrap_or(0);
        self.retire(tail);
        self.cursor = self.live.tail.map(|t| self.blocks[t].size());
        if let Some(stats) = self.stats.as_mut() {
            stats.note_rollback(used);
        }
    }

    /// Free up to `size` of the most recently allocated bytes.
    ///
    /// Returns the number of bytes actually freed. When `size` covers
    /// everything allocated in the live tail, the whole tail block is moved
    /// to the free chain and its used byte count is returned, even if that
    /// is less than `size`. Returns `0` when nothing is live.
    pub fn free_bytes(&mut self, size: usize) -> usize {
        let (Some(_), Some(left)) = (self.live.tail, self.cursor) else {
            return 0;
        };
        if size >= left {
            self.free_last_block();
            return left;
        }
        self.cursor = Some(left - size);
        if let Some(stats) = self.stats.as_mut() {
            stats.note_rollback(size);
        }
        size
    }

    /// Free `size` bytes across as many blocks as needed.
    ///
    /// Calls [`free_bytes`](Self::free_bytes) with the remaining target
    /// until it is met or the live chain is empty, and returns the total
    /// freed.
    pub fn free_bytes_all(&mut self, size: usize) -> usize {
        let mut freed = 0;
        while freed < size && self.live.tail.is_some() {
            freed += self.free_bytes(size - freed);
        }
        freed
    }
}
