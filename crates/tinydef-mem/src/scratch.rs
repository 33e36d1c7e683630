//! Process-wide scratch arena for transient allocations.
//!
//! [`mem_init`] creates the one scratch [`Arena`] of the process and returns
//! it wrapped in a [`Memory`] handle. Code that needs temporary space takes
//! the handle (or a scope opened on it) as a parameter; there is no
//! ambient global to reach for.
//!
//! The scratch arena is never cleared on access. A caller further up the
//! stack may still hold allocations in it, so every user opens its own
//! [`ArenaScope`] and rewinds only what it pushed.
//!
//! Only one [`Memory`] may exist at a time. It is `Send` but not `Sync`;
//! sharing it between threads takes an external lock.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::arena::Arena;
use crate::config::MemConfig;
use crate::error::MemError;
use crate::scope::ArenaScope;
use crate::vm;

static SCRATCH_LIVE: AtomicBool = AtomicBool::new(false);

/// Clears the process-wide flag once the scratch arena is gone.
#[derive(Debug)]
struct LiveFlag;

impl Drop for LiveFlag {
    fn drop(&mut self) {
        SCRATCH_LIVE.store(false, Ordering::Release);
    }
}

/// Handle to the process scratch arena.
///
/// Dropping the handle tears the arena down; [`mem_close`] does the same
/// and reports backend failures.
#[derive(Debug)]
pub struct Memory {
    scratch: Arena,
    // Declared after `scratch` so the flag clears only once the region is
    // released.
    _live: LiveFlag,
}

impl Memory {
    /// Read access to the scratch arena.
    ///
    /// Pushes made through this reference are never rewound; temporary
    /// work goes through [`scratch_scope`](Self::scratch_scope) instead.
    pub fn scratch(&self) -> &Arena {
        &self.scratch
    }

    /// Open an automatic scope on the scratch arena.
    pub fn scratch_scope(&mut self) -> ArenaScope<'_> {
        self.scratch.scope()
    }

    /// Open a manual scope on the scratch arena.
    pub fn scratch_manual_scope(&mut self) -> ArenaScope<'_> {
        self.scratch.manual_scope()
    }

    /// OS page size detected at initialisation.
    pub fn page_size(&self) -> usize {
        self.scratch.page_size()
    }
}

/// Initialise process memory with the default scratch sizing.
pub fn mem_init() -> Result<Memory, MemError> {
    mem_init_with(MemConfig::default())
}

/// Initialise process memory: detect the page size and reserve the scratch
/// arena.
///
/// Fails with [`MemError::AlreadyInitialized`] while another [`Memory`] is
/// alive.
pub fn mem_init_with(config: MemConfig) -> Result<Memory, MemError> {
    if SCRATCH_LIVE
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Err(MemError::AlreadyInitialized);
    }
    let live = LiveFlag;

    let page_size = vm::page_size();
    let scratch = Arena::with_config(config.scratch)?;
    debug!(page_size, capacity = scratch.capacity(), "scratch arena initialized");
    Ok(Memory {
        scratch,
        _live: live,
    })
}

/// Tear down the scratch arena.
///
/// Consumes the handle, so closing twice does not compile.
pub fn mem_close(memory: Memory) -> Result<(), MemError> {
    let Memory { scratch, _live } = memory;
    let result = scratch.teardown();
    debug!("scratch arena closed");
    drop(_live);
    result.map_err(MemError::from)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::config::ArenaConfig;

    fn small() -> MemConfig {
        MemConfig {
            scratch: ArenaConfig::new(1 << 20),
        }
    }

    #[test]
    #[serial]
    fn init_creates_empty_scratch() {
        let memory = mem_init_with(small()).unwrap();
        assert_eq!(memory.page_size(), vm::page_size());
        let scratch = memory.scratch();
        assert_eq!(scratch.used(), 0);
        assert_eq!(scratch.capacity(), 1 << 20);
        mem_close(memory).unwrap();
    }

    #[test]
    #[serial]
    fn default_init_uses_default_capacity() {
        let memory = mem_init().unwrap();
        assert!(memory.scratch().capacity() >= ArenaConfig::DEFAULT_CAPACITY);
        mem_close(memory).unwrap();
    }

    #[test]
    #[serial]
    fn second_init_is_rejected_until_close() {
        let memory = mem_init_with(small()).unwrap();
        assert!(matches!(
            mem_init_with(small()),
            Err(MemError::AlreadyInitialized)
        ));
        mem_close(memory).unwrap();
        let again = mem_init_with(small()).unwrap();
        drop(again);
        mem_close(mem_init_with(small()).unwrap()).unwrap();
    }

    #[test]
    #[serial]
    fn failed_init_does_not_leave_flag_set() {
        let err = mem_init_with(MemConfig {
            scratch: ArenaConfig::new(usize::MAX),
        })
        .unwrap_err();
        assert!(matches!(err, MemError::Arena(_)));
        mem_close(mem_init_with(small()).unwrap()).unwrap();
    }

    #[test]
    #[serial]
    fn scratch_is_not_cleared_between_accesses() {
        let mut memory = mem_init_with(small()).unwrap();
        {
            let mut caller = memory.scratch_scope();
            caller.push_copy(b"caller");
            {
                let callee = caller.scope();
                callee.push(4096);
            }
            assert_eq!(caller.used(), 6);
            // Re-pushing without zeroing exposes the bytes the caller left.
            caller.pop(6);
            assert_eq!(caller.push(6), b"caller");
        }
        assert_eq!(memory.scratch().used(), 0);
        mem_close(memory).unwrap();
    }

    #[test]
    #[serial]
    fn manual_scratch_scope_keeps_pushes_until_release() {
        let mut memory = mem_init_with(small()).unwrap();
        {
            let mut scope = memory.scratch_manual_scope();
            scope.push(128);
            scope.pop(1024);
            assert_eq!(scope.used(), 0);
            scope.push(64);
        }
        assert_eq!(memory.scratch().used(), 64);
        let mut scope = memory.scratch_manual_scope();
        scope.release();
        assert_eq!(scope.used(), 64);
        drop(scope);
        mem_close(memory).unwrap();
    }
}
