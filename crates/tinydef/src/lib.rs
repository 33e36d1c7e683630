//! tinydef: virtual-memory-backed arenas and small fixed-capacity utilities.
//!
//! This facade re-exports the tinydef sub-crates. For most users, adding
//! `tinydef` as a single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tinydef::prelude::*;
//!
//! let mut memory = mem_init().unwrap();
//!
//! fn greet(memory: &mut Memory, name: &str) -> usize {
//!     let scratch = memory.scratch_scope();
//!     let buf = scratch.push_copy(b"hello, ");
//!     let tail = scratch.push_copy(name.as_bytes());
//!     buf.len() + tail.len()
//!     // scope ends: the scratch cursor is back where it started
//! }
//!
//! assert_eq!(greet(&mut memory, "arena"), 12);
//! assert_eq!(memory.scratch().used(), 0);
//!
//! mem_close(memory).unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`mem`] | `tinydef-mem` | Virtual memory backend, `Arena`, `ArenaScope`, scratch `Memory` |
//! | [`util`] | `tinydef-core` | Math helpers, `RingSlice`, `BitSet`, `Stack`, `StateMachine` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arenas, scopes, and the process scratch arena (`tinydef-mem`).
///
/// Most users only need [`mem::Arena`], [`mem::ArenaScope`] and the
/// [`mem::mem_init`] / [`mem::mem_close`] pair; they are also available in
/// the [`prelude`].
pub use tinydef_mem as mem;

/// Scalar math and fixed-capacity containers (`tinydef-core`).
pub use tinydef_core as util;

/// Common imports for typical tinydef usage.
///
/// ```rust
/// use tinydef::prelude::*;
/// ```
pub mod prelude {
    // Memory
    pub use tinydef_mem::{
        mem_close, mem_init, mem_init_with, Arena, ArenaConfig, ArenaScope, MemConfig, Memory,
        ScopeMode,
    };

    // Errors
    pub use tinydef_mem::{ArenaError, MemError};

    // Utilities
    pub use tinydef_core::{BitSet, RingSlice, Stack, StateHandlers, StateMachine};
}
