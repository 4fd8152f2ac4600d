//! Arena configuration parameters.

use crate::block::BLOCK_OVERHEAD;
use crate::error::ArenaError;

/// How an arena sizes the blocks it commissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSizing {
    /// Blocks whose data span plus header fill one host page.
    PageAligned,
    /// One block per allocation, sized to that allocation.
    Variable,
    /// Every block has exactly this many usable bytes.
    ///
    /// `Exact(0)` is equivalent to [`Variable`](BlockSizing::Variable).
    Exact(usize),
    /// The smallest power-of-two block (header included) holding at least
    /// this many usable bytes. When that fits in a page it is a divisor of
    /// the page size.
    AtLeast(usize),
}

impl BlockSizing {
    /// Resolve to a concrete data size; `0` means variable.
    pub fn resolve(self, page_size: usize) -> Result<usize, ArenaError> {
        match self {
            Self::PageAligned => Ok(page_size.saturating_sub(BLOCK_OVERHEAD)),
            Self::Variable => Ok(0),
            Self::Exact(size) => Ok(size),
            Self::AtLeast(0) => Err(ArenaError::ZeroMinimum),
            Self::AtLeast(least) => {
                let total = least
                    .checked_add(BLOCK_OVERHEAD)
                    .and_then(usize::checked_next_power_of_two)
                    .ok_or(ArenaError::MinimumTooLarge { least })?;
                Ok(total - BLOCK_OVERHEAD)
            }
        }
    }
}

/// Configuration for an [`Arena`](crate::Arena).
///
/// Replaces build-time toggles: one binary can run instrumented and bare
/// arenas side by side.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Block sizing policy.
    ///
    /// Default: [`BlockSizing::PageAligned`].
    pub sizing: BlockSizing,

    /// Maintain [`ArenaStats`](crate::ArenaStats) counters.
    ///
    /// Default: `false`.
    pub track_stats: bool,

    /// Overwrite every block moved to the free chain with
    /// [`SCRUB_BYTE`](ArenaConfig::SCRUB_BYTE), so reads through stale
    /// allocations show garbage instead of plausible data.
    ///
    /// Default: on in debug builds, off in release builds.
    pub scrub_freed: bool,
}

impl ArenaConfig {
    /// Marker written over reclaimed blocks when scrubbing is enabled.
    pub const SCRUB_BYTE: u8 = 0x0c;

    /// Create a config with the given sizing and default toggles.
    pub fn new(sizing: BlockSizing) -> Self {
        Self {
            sizing,
            track_stats: false,
            scrub_freed: cfg!(debug_assertions),
        }
    }

    /// Enable or disable statistics tracking.
    pub fn with_stats(mut self, track_stats: bool) -> Self {
        self.track_stats = track_stats;
        self
    }

    /// Enable or disable scrubbing of freed blocks.
    pub fn with_scrub(mut self, scrub_freed: bool) -> Self {
        self.scrub_freed = scrub_freed;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(BlockSizing::PageAligned)
    }
}
