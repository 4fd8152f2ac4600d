//! Furrow: a region-based block arena allocator.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! Furrow sub-crates. For most users, adding `furrow` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use furrow::prelude::*;
//!
//! // Blocks whose size plus bookkeeping is a power of two, at least 20 bytes.
//! let mut arena = Arena::with_least(SystemHost, 20).unwrap();
//! let word = arena.alloc_copy(b"hello\0").unwrap();
//! assert_eq!(arena.bytes(word).unwrap(), b"hello\0");
//!
//! // Roll back the most recent bytes, then hand every block back.
//! assert_eq!(arena.free_bytes(word.len()), word.len());
//! arena.decommission();
//! assert_eq!(arena.sanity_code(), 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `furrow-arena` | `Arena`, host memory providers, statistics, sanity checks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arena allocator, block chains, and host memory (`furrow-arena`).
pub use furrow_arena as arena;

/// Common imports for typical Furrow usage.
///
/// ```rust
/// use furrow::prelude::*;
/// ```
pub mod prelude {
    // Arena and configuration
    pub use furrow_arena::{Arena, ArenaConfig, BlockSizing};

    // Handles
    pub use furrow_arena::{Allocation, BlockId, Chain};

    // Host memory
    pub use furrow_arena::{HostMemory, SystemHost};

    // Errors and diagnostics
    pub use furrow_arena::{ArenaError, ArenaStats, SanityViolation};
}
