use std::time::Duration;

#[derive(Debug, Clone)]
pub enum TickerCall {
    /// Run `units` work units.
    Tick { units: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickerReply {
    Ticked(TickResult),
}

/// Outcome of one `Tick`.
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// 1-based count of calls this activation has handled. Diagnostic only.
    pub call_number: u64,
    pub units_requested: u32,
    pub units_completed: u32,
    pub units_failed: u32,
    pub elapsed: Duration,
}

impl TickResult {
    pub fn is_complete(&self) -> bool {
        self.units_failed == 0 && self.units_completed == self.units_requested
    }
}
