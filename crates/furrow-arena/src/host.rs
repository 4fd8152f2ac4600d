//! The host memory provider the arena commissions blocks from.
//!
//! An arena never assumes a particular provider. [`SystemHost`] backs blocks
//! with the global allocator; tests substitute doubles that run out of
//! memory deterministically.

use crate::raw;

/// Source of raw memory blocks for an arena.
///
/// `acquire` hands out a buffer of exactly the requested length or `None`
/// when the provider is exhausted. Buffers passed to `release` are always
/// ones previously returned by `acquire` on the same provider.
pub trait HostMemory {
    /// Commission a buffer of exactly `size` bytes.
    fn acquire(&mut self, size: usize) -> Option<Box<[u8]>>;

    /// Take back a buffer previously handed out by [`acquire`](Self::acquire).
    fn release(&mut self, block: Box<[u8]>);

    /// Virtual-memory page size used by the page-aligned block presets.
    fn page_size(&self) -> usize {
        raw::system_page_size()
    }
}

impl<H: HostMemory + ?Sized> HostMemory for &mut H {
    fn acquire(&mut self, size: usize) -> Option<Box<[u8]>> {
        (**self).acquire(size)
    }

    fn release(&mut self, block: Box<[u8]>) {
        (**self).release(block)
    }

    fn page_size(&self) -> usize {
        (**self).page_size()
    }
}

/// Host provider backed by the global allocator.
///
/// Requests are fallible: an allocation the global allocator refuses is
/// reported as exhaustion instead of aborting the process.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHost;

impl HostMemory for SystemHost {
    fn acquire(&mut self, size: usize) -> Option<Box<[u8]>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(size).ok()?;
        buf.resize(size, 0);
        Some(buf.into_boxed_slice())
    }

    fn release(&mut self, block: Box<[u8]>) {
        drop(block);
    }
}
