//! Region-based block arena with bump allocation and byte-granular rollback.
//!
//! An [`Arena`] commissions blocks from a [`HostMemory`] provider and serves
//! contiguous allocations out of them by bumping a cursor. Memory is never
//! freed per object: whole blocks move to a free chain for reuse, the most
//! recent bytes can be rolled back, and decommissioning hands every block
//! back to the host.
//!
//! # Architecture
//!
//! ```text
//! Arena<H: HostMemory>
//! ├── BlockSlab (slot storage, BlockId handles)
//! ├── live chain  ── doubly linked, tail holds the bump cursor
//! ├── free chain  ── doubly linked, searched best-fit on refill
//! ├── ArenaStats  (optional counters)
//! └── H           (acquire / release / page size)
//! ```
//!
//! # Block sizing
//!
//! - **Fixed:** every new block has `block_size` usable bytes; requests
//!   larger than that are rejected as a contract violation.
//! - **Variable:** `block_size == 0`, one block per allocation, sized to it.
//!
//! # Example
//!
//! ```
//! use furrow_arena::{Arena, SystemHost};
//!
//! let mut arena = Arena::variable(SystemHost).unwrap();
//! let ab = arena.alloc_copy(b"ab\0").unwrap();
//! let _cdef = arena.alloc_copy(b"cdef\0").unwrap();
//! assert_eq!(arena.live_blocks(), 2);
//!
//! arena.free_last_block();
//! assert_eq!(arena.bytes(ab).unwrap(), b"ab\0");
//!
//! arena.decommission();
//! assert_eq!(arena.head(), None);
//! assert_eq!(arena.sanity_code(), 0);
//! ```
//!
//! # Threading
//!
//! Arenas are single-threaded. Every operation takes `&mut self`; share one
//! across threads only behind external locking.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod acquire;
pub mod arena;
pub mod block;
pub mod bump;
pub mod chain;
pub mod config;
pub mod dump;
pub mod error;
pub mod handle;
pub mod host;
mod raw;
pub mod rollback;
pub mod sanity;
pub mod stats;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use block::{BlockId, Chain, BLOCK_OVERHEAD};
pub use chain::{ChainEnds, ChainIter};
pub use config::{ArenaConfig, BlockSizing};
pub use dump::ArenaDump;
pub use error::ArenaError;
pub use handle::Allocation;
pub use host::{HostMemory, SystemHost};
pub use sanity::SanityViolation;
pub use stats::ArenaStats;
