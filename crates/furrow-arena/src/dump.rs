//! Human-readable rendering of an arena's internal state.

use std::fmt;

use crate::arena::Arena;
use crate::block::{BlockId, Chain};
use crate::host::HostMemory;

/// Display adapter returned by [`Arena::dump`].
pub struct ArenaDump<'a, H: HostMemory> {
    arena: &'a Arena<H>,
    name: &'a str,
}

impl<H: HostMemory> Arena<H> {
    /// Render the chains, cursor, and statistics for debugging.
    ///
    /// ```
    /// use furrow_arena::{Arena, SystemHost};
    ///
    /// let mut arena = Arena::with_block_size(SystemHost, 64).unwrap();
    /// let _ = arena.alloc(10).unwrap();
    /// let text = arena.dump("scratch").to_string();
    /// assert!(text.starts_with("ARENA 'scratch'"));
    /// ```
    pub fn dump<'a>(&'a self, name: &'a str) -> ArenaDump<'a, H> {
        ArenaDump { arena: self, name }
    }
}

fn opt(id: Option<BlockId>) -> String {
    id.map_or_else(|| "-".to_owned(), |id| id.to_string())
}

impl<H: HostMemory> ArenaDump<'_, H> {
    fn chain(&self, f: &mut fmt::Formatter<'_>, chain: Chain) -> fmt::Result {
        for (i, id) in self.arena.chain_iter(chain).enumerate() {
            let block = &self.arena.blocks[id];
            writeln!(
                f,
                "({})\tprev: {:>5} | this: {:>5} | next: {:>5} | size: {} | epoch: {}",
                i + 1,
                opt(block.prev),
                id,
                opt(block.next),
                block.size(),
                block.epoch
            )?;
        }
        Ok(())
    }
}

impl<H: HostMemory> fmt::Display for ArenaDump<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.arena;
        writeln!(f, "ARENA '{}'", self.name)?;
        writeln!(f, "live: {} .. {}", opt(a.live.head), opt(a.live.tail))?;
        writeln!(f, "free: {} .. {}", opt(a.free.head), opt(a.free.tail))?;
        if a.block_size == 0 {
            writeln!(f, "blk_size: variable")?;
        } else {
            writeln!(f, "blk_size: {}", a.block_size)?;
        }
        match a.cursor {
            Some(head) => writeln!(f, "head: {head}")?,
            None => writeln!(f, "head: -")?,
        }
        writeln!(f, "live chain:")?;
        self.chain(f, Chain::Live)?;
        writeln!(f, "free chain:")?;
        self.chain(f, Chain::Free)?;

        let Some(stats) = &a.stats else {
            return writeln!(f, "stats: disabled");
        };
        writeln!(f, "cur_live_size: {}", stats.cur_live_size)?;
        writeln!(f, "cur_free_size: {}", stats.cur_free_size)?;
        writeln!(f, "peak_com_size: {}", stats.peak_com_size)?;
        writeln!(f, "tot_allocs: {}", stats.tot_allocs)?;
        writeln!(f, "avg_alloc_size: {:.2}", stats.avg_alloc_size())?;
        writeln!(f, "cur_bytes: {}", stats.cur_bytes)?;
        writeln!(f, "tot_bytes: {}", stats.tot_bytes)?;
        writeln!(f, "blk_live: {}", stats.blk_live)?;
        writeln!(f, "blk_free: {}", stats.blk_free)?;
        writeln!(f, "blk_decom: {}", stats.blk_decom)?;
        writeln!(f, "blk_peak: {}", stats.blk_peak)?;
        writeln!(f, "sanity: {}", a.sanity_code())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ArenaConfig, BlockSizing};
    use crate::host::SystemHost;
    use crate::Arena;

    #[test]
    fn dump_lists_both_chains() {
        let config = ArenaConfig::new(BlockSizing::Variable).with_stats(true);
        let mut a = Arena::new(SystemHost, config).unwrap();
        let _ = a.alloc(3).unwrap();
        let _ = a.alloc(5).unwrap();
        a.free_last_block();

        let text = a.dump("one").to_string();
        assert!(text.contains("ARENA 'one'"));
        assert!(text.contains("blk_size: variable"));
        assert!(text.contains("head: 3"));
        assert!(text.contains("size: 3 |"));
        assert!(text.contains("size: 5 |"));
        assert!(text.contains("blk_peak: 2"));
        assert!(text.ends_with("sanity: 0\n"));
    }

    #[test]
    fn dump_without_stats() {
        let a = Arena::with_block_size(SystemHost, 16).unwrap();
        let text = a.dump("bare").to_string();
        assert!(text.contains("blk_size: 16"));
        assert!(text.contains("head: 0"));
        assert!(text.ends_with("stats: disabled\n"));
    }
}
