//! Configuration for one execution context.

/// Default ceiling for cost units charged in one run.
pub const DEFAULT_COMMAND_LIMIT: usize = 65_536;
/// Default ceiling for sources produced by one redirect step.
pub const DEFAULT_FORK_LIMIT: usize = 65_536;
/// Default ceiling for entries pending on the run queue.
pub const DEFAULT_QUEUE_LIMIT: usize = 65_536;

/// Limits applied to one run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecutionConfig {
    /// Maximum cost units charged before the run is aborted.
    pub command_limit: usize,

    /// Maximum sources a single redirect step may produce.
    pub fork_limit: usize,

    /// Maximum entries pending on the run queue.
    pub queue_limit: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            command_limit: DEFAULT_COMMAND_LIMIT,
            fork_limit: DEFAULT_FORK_LIMIT,
            queue_limit: DEFAULT_QUEUE_LIMIT,
        }
    }
}

impl ExecutionConfig {
    /// Creates a configuration with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the cost ceiling.
    #[must_use]
    pub fn with_command_limit(mut self, limit: usize) -> Self {
        self.command_limit = limit;
        self
    }

    /// Builder method to set the fork limit.
    #[must_use]
    pub fn with_fork_limit(mut self, limit: usize) -> Self {
        self.fork_limit = limit;
        self
    }

    /// Builder method to set the queue limit.
    #[must_use]
    pub fn with_queue_limit(mut self, limit: usize) -> Self {
        self.queue_limit = limit;
        self
    }
}
