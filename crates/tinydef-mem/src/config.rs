//! Arena configuration parameters.

/// Configuration for an [`Arena`](crate::Arena).
///
/// Both sizes are rounded up to whole pages when the arena is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Bytes of address space to reserve.
    ///
    /// Default: 100_000_000 (~95 MiB). This is a hard limit; pushes past it
    /// fail instead of growing the arena.
    pub capacity: usize,

    /// Minimum step, in bytes, by which the committed range grows.
    ///
    /// Default: one page. Larger steps trade resident memory for fewer
    /// commit system calls on push-heavy workloads.
    pub commit_granularity: usize,
}

impl ArenaConfig {
    /// Default reservation size in bytes.
    pub const DEFAULT_CAPACITY: usize = 100_000_000;

    /// Create a config reserving `capacity` bytes, committing page by page.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            commit_granularity: 0,
        }
    }

    /// Set the commit step. Values below one page mean one page.
    pub fn with_commit_granularity(mut self, bytes: usize) -> Self {
        self.commit_granularity = bytes;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Configuration for [`mem_init_with`](crate::mem_init_with).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemConfig {
    /// Sizing of the process scratch arena.
    pub scratch: ArenaConfig,
}
