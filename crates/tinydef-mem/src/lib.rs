//! Virtual-memory-backed arena allocation.
//!
//! An [`Arena`] reserves a large address range once and commits physical
//! pages only as allocations first reach them. Allocation is a cursor bump;
//! deallocation is rewinding the cursor, usually through an
//! [`ArenaScope`] that restores it when the scope ends.
//!
//! # Architecture
//!
//! ```text
//! Memory (process scratch handle, mem_init / mem_close)
//! └── Arena (cursor + committed high-water mark)
//!     ├── ArenaScope × n (saved cursors, strictly nested)
//!     └── VirtualMemory backend (reserve / commit / decommit / release)
//!         └── OsMemory: mmap on Unix, VirtualAlloc on Windows
//! ```
//!
//! # Threading
//!
//! Nothing here locks. An arena can be moved to another thread but not
//! shared; give each thread its own arena, or guard one externally.
//!
//! # Unsafe code
//!
//! `unsafe` is confined to the backend (`vm`), the pointer helpers in
//! `raw`, and the arena calls into both.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;
mod raw;
pub mod scope;
pub mod scratch;
pub mod vm;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use config::{ArenaConfig, MemConfig};
pub use error::{ArenaError, MemError, VmError, VmOp};
pub use scope::{ArenaScope, ScopeMode};
pub use scratch::{mem_close, mem_init, mem_init_with, Memory};
pub use vm::{page_size, OsMemory, Region, VirtualMemory};
