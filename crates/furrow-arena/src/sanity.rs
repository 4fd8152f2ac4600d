//! Structural invariant checker.
//!
//! [`Arena::sanity_check`] inspects the chains, the cursor, and (when
//! tracked) the statistics without changing anything, and reports the first
//! violated invariant. Each [`SanityViolation`] has a stable negative code.

use std::error::Error;
use std::fmt;

use crate::arena::Arena;
use crate::block::{BlockId, Chain};
use crate::chain::ChainEnds;
use crate::host::HostMemory;

/// A violated arena invariant, in the order the checker tests them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SanityViolation {
    /// Live chain has a head without a tail or vice versa.
    LiveEnds = -1,
    /// Free chain has a head without a tail or vice versa.
    FreeEnds = -2,
    /// Live chain is non-empty but the cursor is unset.
    MissingCursor = -3,
    /// Cursor lies past the end of the live tail's data span.
    CursorOutOfBounds = -4,
    /// A chain references a vacant or unknown block slot.
    DanglingLink = -5,
    /// More blocks are committed than the recorded block peak.
    BlockPeak = -6,
    /// A live block's successor does not link back to it.
    LiveBackLink = -8,
    /// The live chain does not end at its recorded tail.
    LiveTail = -9,
    /// Live block count disagrees with the statistics.
    LiveCount = -10,
    /// Live summed size disagrees with the statistics.
    LiveSize = -11,
    /// A free block's successor does not link back to it.
    FreeBackLink = -12,
    /// The free chain does not end at its recorded tail.
    FreeTail = -13,
    /// Free block count disagrees with the statistics.
    FreeCount = -14,
    /// Free summed size disagrees with the statistics.
    FreeSize = -15,
    /// Peak committed size is below the current committed size.
    PeakSize = -16,
    /// A block's chain tag disagrees with the chain it was found in.
    WrongChain = -17,
    /// A committed block belongs to neither chain.
    OrphanBlock = -18,
    /// The cursor is set while the live chain is empty.
    StrayCursor = -19,
}

impl SanityViolation {
    /// Success value of [`Arena::sanity_code`].
    pub const SANE: i32 = 0;

    /// The stable numeric code of this violation.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for SanityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::LiveEnds => "live chain head/tail mismatch",
            Self::FreeEnds => "free chain head/tail mismatch",
            Self::MissingCursor => "live chain without a cursor",
            Self::CursorOutOfBounds => "cursor outside the live tail block",
            Self::DanglingLink => "chain references a vacant block slot",
            Self::BlockPeak => "committed blocks exceed the block peak",
            Self::LiveBackLink => "broken back link in live chain",
            Self::LiveTail => "live chain does not end at its tail",
            Self::LiveCount => "live block count mismatch",
            Self::LiveSize => "live size mismatch",
            Self::FreeBackLink => "broken back link in free chain",
            Self::FreeTail => "free chain does not end at its tail",
            Self::FreeCount => "free block count mismatch",
            Self::FreeSize => "free size mismatch",
            Self::PeakSize => "peak committed size below current size",
            Self::WrongChain => "block tagged with the wrong chain",
            Self::OrphanBlock => "committed block outside both chains",
            Self::StrayCursor => "cursor set with an empty live chain",
        };
        write!(f, "arena sanity violation {}: {what}", self.code())
    }
}

impl Error for SanityViolation {}

/// What one chain walk measured.
struct ChainTally {
    blocks: usize,
    bytes: usize,
}

/// Violations a chain walk reports, per chain.
struct WalkCodes {
    back_link: SanityViolation,
    tail: SanityViolation,
}

impl<H: HostMemory> Arena<H> {
    /// Verify every structural invariant, reporting the first violation.
    pub fn sanity_check(&self) -> Result<(), SanityViolation> {
        use SanityViolation::*;

        if self.live.head.is_some() != self.live.tail.is_some() {
            return Err(LiveEnds);
        }
        if self.free.head.is_some() != self.free.tail.is_some() {
            return Err(FreeEnds);
        }
        match (self.live.tail, self.cursor) {
            (Some(_), None) => return Err(MissingCursor),
            (None, Some(_)) => return Err(StrayCursor),
            _ => {}
        }
        let ends = [self.live.head, self.live.tail, self.free.head, self.free.tail];
        if ends.into_iter().flatten().any(|id| self.blocks.get(id).is_none()) {
            return Err(DanglingLink);
        }
        if let (Some(tail), Some(head)) = (self.live.tail, self.cursor) {
            if head > self.blocks[tail].size() {
                return Err(CursorOutOfBounds);
            }
        }
        if let Some(stats) = &self.stats {
            if stats.blk_live + stats.blk_free > stats.blk_peak {
                return Err(BlockPeak);
            }
        }

        let live = self.walk(
            Chain::Live,
            self.live,
            WalkCodes {
                back_link: LiveBackLink,
                tail: LiveTail,
            },
        )?;
        if let Some(stats) = &self.stats {
            if live.blocks != stats.blk_live {
                return Err(LiveCount);
            }
            if live.bytes != stats.cur_live_size {
                return Err(LiveSize);
            }
        }

        let free = self.walk(
            Chain::Free,
            self.free,
            WalkCodes {
                back_link: FreeBackLink,
                tail: FreeTail,
            },
        )?;
        if let Some(stats) = &self.stats {
            if free.blocks != stats.blk_free {
                return Err(FreeCount);
            }
            if free.bytes != stats.cur_free_size {
                return Err(FreeSize);
            }
            if stats.peak_com_size < stats.cur_live_size + stats.cur_free_size {
                return Err(PeakSize);
            }
        }

        if self.blocks.occupied() != live.blocks + free.blocks {
            return Err(OrphanBlock);
        }
        Ok(())
    }

    /// [`sanity_check`](Self::sanity_check) as a numeric code: `0` when the
    /// arena is sane, otherwise the violation's negative code.
    pub fn sanity_code(&self) -> i32 {
        match self.sanity_check() {
            Ok(()) => SanityViolation::SANE,
            Err(violation) => violation.code(),
        }
    }

    fn walk(
        &self,
        chain: Chain,
        ends: ChainEnds,
        codes: WalkCodes,
    ) -> Result<ChainTally, SanityViolation> {
        let mut tally = ChainTally {
            blocks: 0,
            bytes: 0,
        };
        let mut prev: Option<BlockId> = None;
        let mut cursor = ends.head;
        while let Some(id) = cursor {
            // More steps than slots means the chain loops.
            if tally.blocks >= self.blocks.capacity() {
                return Err(codes.tail);
            }
            let block = self.blocks.get(id).ok_or(SanityViolation::DanglingLink)?;
            if block.chain != chain {
                return Err(SanityViolation::WrongChain);
            }
            if block.prev != prev {
                return Err(codes.back_link);
            }
            match block.next {
                Some(next) => {
                    let succ = self.blocks.get(next).ok_or(SanityViolation::DanglingLink)?;
                    if succ.prev != Some(id) {
                        return Err(codes.back_link);
                    }
                }
                None if ends.tail != Some(id) => return Err(codes.tail),
                None => {}
            }
            tally.blocks += 1;
            tally.bytes += block.size();
            prev = Some(id);
            cursor = block.next;
        }
        Ok(tally)
    }
}
