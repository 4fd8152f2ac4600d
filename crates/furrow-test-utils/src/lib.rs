//! Test doubles for Furrow host memory providers.
//!
//! - [`BudgetHost`] — runs out of memory deterministically after a byte or
//!   block budget, with a fixed page size.
//! - [`RecordingHost`] — wraps another host and records every buffer it
//!   hands out, so tests can assert that nothing leaks or is released twice.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use furrow_arena::{HostMemory, SystemHost};
use indexmap::IndexMap;

/// Host with a finite budget.
///
/// Every successful `acquire` consumes its size from the byte budget and one
/// block from the block budget. Released buffers return their bytes to the
/// budget but not their block, so a test can cap the number of commissions.
#[derive(Clone, Debug)]
pub struct BudgetHost {
    bytes_left: usize,
    blocks_left: usize,
    page_size: usize,
}

impl BudgetHost {
    /// Page size reported by default.
    pub const PAGE_SIZE: usize = 4096;

    /// Host allowing `bytes` in total across any number of blocks.
    pub fn with_bytes(bytes: usize) -> Self {
        Self {
            bytes_left: bytes,
            blocks_left: usize::MAX,
            page_size: Self::PAGE_SIZE,
        }
    }

    /// Host allowing `blocks` commissions of any size.
    pub fn with_blocks(blocks: usize) -> Self {
        Self {
            bytes_left: usize::MAX,
            blocks_left: blocks,
            page_size: Self::PAGE_SIZE,
        }
    }

    /// Host that refuses every request.
    pub fn exhausted() -> Self {
        Self::with_blocks(0)
    }

    /// Report `page_size` to page-aligned arenas.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn bytes_left(&self) -> usize {
        self.bytes_left
    }

    pub fn blocks_left(&self) -> usize {
        self.blocks_left
    }
}

impl HostMemory for BudgetHost {
    fn acquire(&mut self, size: usize) -> Option<Box<[u8]>> {
        if self.blocks_left == 0 || size > self.bytes_left {
            return None;
        }
        let block = SystemHost.acquire(size)?;
        self.blocks_left -= 1;
        self.bytes_left -= size;
        Some(block)
    }

    fn release(&mut self, block: Box<[u8]>) {
        self.bytes_left = self.bytes_left.saturating_add(block.len());
    }

    fn page_size(&self) -> usize {
        self.page_size
    }
}

/// Host wrapper that records every buffer handed out.
///
/// Outstanding buffers are keyed by address and length, in acquisition
/// order. Releasing a buffer this host never handed out panics.
#[derive(Debug)]
pub struct RecordingHost<H = SystemHost> {
    inner: H,
    outstanding: IndexMap<(usize, usize), usize>,
    acquired: usize,
    released: usize,
    refused: usize,
}

impl RecordingHost<SystemHost> {
    pub fn new() -> Self {
        Self::wrap(SystemHost)
    }
}

impl Default for RecordingHost<SystemHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostMemory> RecordingHost<H> {
    /// Record the traffic of `inner`.
    pub fn wrap(inner: H) -> Self {
        Self {
            inner,
            outstanding: IndexMap::new(),
            acquired: 0,
            released: 0,
            refused: 0,
        }
    }

    /// Buffers handed out so far.
    pub fn acquired(&self) -> usize {
        self.acquired
    }

    /// Buffers taken back so far.
    pub fn released(&self) -> usize {
        self.released
    }

    /// Requests the inner host refused.
    pub fn refused(&self) -> usize {
        self.refused
    }

    /// Buffers handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.values().sum()
    }

    /// Sizes of outstanding buffers, oldest first.
    pub fn outstanding_sizes(&self) -> Vec<usize> {
        self.outstanding
            .iter()
            .flat_map(|(&(_, len), &count)| std::iter::repeat_n(len, count))
            .collect()
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

fn key(block: &[u8]) -> (usize, usize) {
    (block.as_ptr() as usize, block.len())
}

impl<H: HostMemory> HostMemory for RecordingHost<H> {
    fn acquire(&mut self, size: usize) -> Option<Box<[u8]>> {
        let Some(block) = self.inner.acquire(size) else {
            self.refused += 1;
            return None;
        };
        self.acquired += 1;
        *self.outstanding.entry(key(&block)).or_insert(0) += 1;
        Some(block)
    }

    fn release(&mut self, block: Box<[u8]>) {
        let k = key(&block);
        match self.outstanding.get_mut(&k) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.outstanding.shift_remove(&k);
            }
            None => panic!("released a {}-byte buffer this host never handed out", k.1),
        }
        self.released += 1;
        self.inner.release(block);
    }

    fn page_size(&self) -> usize {
        self.inner.page_size()
    }
}
