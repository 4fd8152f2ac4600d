//! Running allocation counters.

/// Size and block counters for one arena.
///
/// Present only when [`ArenaConfig::track_stats`](crate::ArenaConfig::track_stats)
/// is set. The chain primitives keep the size and block fields in step with
/// the chains; the allocation fields are updated by `alloc` and the
/// rollback operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Summed data size of the live chain.
    pub cur_live_size: usize,
    /// Summed data size of the free chain.
    pub cur_free_size: usize,
    /// Highest `cur_live_size + cur_free_size` ever observed.
    pub peak_com_size: usize,
    /// Bytes currently handed out, excluding wasted block tails.
    pub cur_bytes: usize,
    /// Bytes handed out over the arena's lifetime.
    pub tot_bytes: usize,
    /// Number of successful allocations.
    pub tot_allocs: usize,
    /// Blocks in the live chain.
    pub blk_live: usize,
    /// Blocks in the free chain.
    pub blk_free: usize,
    /// Blocks returned to the host over the arena's lifetime.
    pub blk_decom: usize,
    /// Highest `blk_live + blk_free` ever observed.
    pub blk_peak: usize,
}

impl ArenaStats {
    /// Mean allocation size in bytes, or `0.0` before the first allocation.
    pub fn avg_alloc_size(&self) -> f64 {
        if self.tot_allocs == 0 {
            return 0.0;
        }
        self.tot_bytes as f64 / self.tot_allocs as f64
    }

    /// Bytes currently committed from the host across both chains.
    pub fn committed(&self) -> usize {
        self.cur_live_size + self.cur_free_size
    }

    pub(crate) fn note_committed(&mut self) {
        self.peak_com_size = self.peak_com_size.max(self.committed());
        self.blk_peak = self.blk_peak.max(self.blk_live + self.blk_free);
    }

    pub(crate) fn note_alloc(&mut self, size: usize) {
        self.tot_allocs += 1;
        self.tot_bytes = self.tot_bytes.saturating_add(size);
        self.cur_bytes = self.cur_bytes.saturating_add(size);
    }

    pub(crate) fn note_rollback(&mut self, size: usize) {
        self.cur_bytes = self.cur_bytes.saturating_sub(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_zero_before_first_alloc() {
        assert_eq!(ArenaStats::default().avg_alloc_size(), 0.0);
    }

    #[test]
    fn average_tracks_allocations() {
        let mut stats = ArenaStats::default();
        stats.note_alloc(4);
        stats.note_alloc(8);
        assert_eq!(stats.tot_allocs, 2);
        assert_eq!(stats.avg_alloc_size(), 6.0);
        assert_eq!(stats.cur_bytes, 12);
    }

    #[test]
    fn peaks_never_decrease() {
        let mut stats = ArenaStats {
            cur_live_size: 100,
            blk_live: 2,
            ..Default::default()
        };
        stats.note_committed();
        stats.cur_live_size = 10;
        stats.blk_live = 1;
        stats.note_committed();
        assert_eq!(stats.peak_com_size, 100);
        assert_eq!(stats.blk_peak, 2);
    }

    #[test]
    fn rollback_saturates_at_zero() {
        let mut stats = ArenaStats::default();
        stats.note_alloc(3);
        stats.note_rollback(10);
        assert_eq!(stats.cur_bytes, 0);
        assert_eq!(stats.tot_bytes, 3);
    }
}
