//! Error types for the virtual memory backend, arenas and the scratch lifecycle.

use std::fmt;
use std::io;

use thiserror::Error;

/// Backend operation that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmOp {
    /// Reserving address space.
    Reserve,
    /// Committing physical pages.
    Commit,
    /// Decommitting physical pages.
    Decommit,
    /// Releasing a reservation.
    Release,
}

impl fmt::Display for VmOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reserve => "reserve",
            Self::Commit => "commit",
            Self::Decommit => "decommit",
            Self::Release => "release",
        };
        f.write_str(name)
    }
}

/// The OS refused a virtual memory operation.
///
/// Never ignored: continuing past a failed commit would hand out unmapped
/// memory.
#[derive(Debug, Error)]
#[error("virtual memory {op} of {size} bytes at offset {offset} failed: {source}")]
pub struct VmError {
    /// Which operation failed.
    pub op: VmOp,
    /// Byte offset into the region (0 for whole-region operations).
    pub offset: usize,
    /// Size of the affected range in bytes.
    pub size: usize,
    /// Error reported by the OS.
    #[source]
    pub source: io::Error,
}

/// Errors that can occur during arena operations.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// The push does not fit in the reserved region. Arenas never grow past
    /// their initial reservation.
    #[error(
        "arena capacity exceeded: requested {requested} bytes with {used} of {capacity} bytes in use"
    )]
    CapacityExceeded {
        /// Bytes requested, including alignment padding.
        requested: usize,
        /// Cursor at the time of the request.
        used: usize,
        /// Reserved capacity of the arena.
        capacity: usize,
    },
    /// The capacity hint cannot be rounded to a page multiple.
    #[error("capacity hint of {requested} bytes overflows page rounding")]
    InvalidCapacity {
        /// The hint that was supplied.
        requested: usize,
    },
    /// Alignment is not a power of two.
    #[error("alignment {align} is not a power of two")]
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// The virtual memory backend failed.
    #[error(transparent)]
    Backend(#[from] VmError),
}

/// Errors from the process-wide memory lifecycle.
#[derive(Debug, Error)]
pub enum MemError {
    /// `mem_init` was called while a previous [`Memory`](crate::Memory) is
    /// still alive.
    #[error("process memory is already initialized")]
    AlreadyInitialized,
    /// Creating or tearing down the scratch arena failed.
    #[error("scratch arena: {0}")]
    Arena(#[from] ArenaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_error_names_operation_and_range() {
        let err = VmError {
            op: VmOp::Commit,
            offset: 4096,
            size: 8192,
            source: io::Error::from(io::ErrorKind::OutOfMemory),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("virtual memory commit of 8192 bytes at offset 4096 failed"));
    }

    #[test]
    fn backend_error_is_transparent() {
        let err = ArenaError::from(VmError {
            op: VmOp::Release,
            offset: 0,
            size: 4096,
            source: io::Error::from(io::ErrorKind::InvalidInput),
        });
        assert!(err.to_string().starts_with("virtual memory release"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn capacity_message() {
        let err = ArenaError::CapacityExceeded {
            requested: 10,
            used: 60,
            capacity: 64,
        };
        assert_eq!(
            err.to_string(),
            "arena capacity exceeded: requested 10 bytes with 60 of 64 bytes in use"
        );
    }
}
