//! Counters for one poll cycle.

use std::fmt;

#[derive(Debug, Default, Clone)]
pub struct CycleStats {
    pub ids_found: usize,
    pub messages_processed: usize,
    pub messages_skipped_no_ticker: usize,
    pub messages_failed: usize,
    pub units_written: usize,
    pub units_skipped_processed: usize,
    pub units_failed: usize,
}

impl fmt::Display for CycleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Poll Cycle Complete ===")?;
        writeln!(f, "  Ids found:            {}", self.ids_found)?;
        writeln!(f, "  Messages processed:   {}", self.messages_processed)?;
        writeln!(f, "  Skipped (no ticker):  {}", self.messages_skipped_no_ticker)?;
        writeln!(f, "  Messages failed:      {}", self.messages_failed)?;
        writeln!(f, "  Briefs written:       {}", self.units_written)?;
        writeln!(f, "  Units already done:   {}", self.units_skipped_processed)?;
        write!(f, "  Units failed:         {}", self.units_failed)
    }
}
