/// Per-thread scheduler settings, installed with [`crate::configure`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How many cycles one flush may run when render callbacks keep queueing
    /// updates. Reaching it discards the queue and fails the flush.
    pub max_nested_cycles: usize,
    /// Emit a `debug!` line per flush.
    pub log_cycles: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_nested_cycles: 50,
            log_cycles: true,
        }
    }
}

impl SchedulerConfig {
    pub fn with_max_nested_cycles(mut self, limit: usize) -> Self {
        self.max_nested_cycles = limit.max(1);
        self
    }

    pub fn with_log_cycles(mut self, on: bool) -> Self {
        self.log_cycles = on;
        self
    }
}
