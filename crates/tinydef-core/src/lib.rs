//! Small building blocks used alongside the tinydef arenas.
//!
//! - [`math`]: clamping, circular indexing, frame-rate independent smoothing.
//! - [`RingSlice`]: a slice indexed with wrap-around signed indices.
//! - [`BitSet`]: fixed-size inline bit set.
//! - [`Stack`]: bounded LIFO stack that never spills to the heap.
//! - [`StateMachine`]: table-driven enter/update/exit dispatcher.
//!
//! Nothing here allocates beyond what its type parameters ask for, and
//! nothing depends on the arena crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bitset;
pub mod math;
pub mod ring;
pub mod stack;
pub mod state;

pub use bitset::BitSet;
pub use math::{between, circ_idx, clamp, filerp, filerp_f32, wrap_around};
pub use ring::RingSlice;
pub use stack::Stack;
pub use state::{StateFn, StateHandlers, StateMachine};
