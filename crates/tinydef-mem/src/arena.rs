//! Growable linear allocator over one virtual memory reservation.
//!
//! An [`Arena`] reserves its whole capacity up front and commits pages only
//! as the cursor first reaches them:
//!
//! ```text
//!  base                 cursor        committed                capacity
//!   │  allocated bytes    │   spare     │       reserved only        │
//!   ├─────────────────────┼─────────────┼────────────────────────────┤
//!   └──────── committed (readable/writable) ────┘
//! ```
//!
//! Rewinding (`pop`, `pop_to`, `clear`) never decommits, so reuse after a
//! rewind costs no system calls. [`Arena::clear_and_decommit`] is the
//! explicit way back to a one-page footprint.
//!
//! Pushes take `&self` and return references tied to that borrow. Every
//! rewind takes `&mut self`, so the borrow checker rejects any rewind while
//! an allocation that it would recycle is still reachable.

#![allow(unsafe_code)]

use std::cell::Cell;
use std::fmt;
use std::mem;
use std::ptr::NonNull;

use tracing::{debug, trace, warn};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::raw;
use crate::scope::ArenaScope;
use crate::vm::{round_to_page, OsMemory, Region, VirtualMemory};

/// A linear allocator over a reserved, incrementally committed region.
///
/// Single-threaded: the arena may move between threads but cannot be
/// shared by reference across them.
pub struct Arena<V: VirtualMemory = OsMemory> {
    backend: V,
    region: Region,
    page_size: usize,
    /// Commit step, a page multiple.
    granularity: usize,
    /// Bump pointer: bytes allocated so far.
    cursor: Cell<usize>,
    /// Bytes from the base that are committed. Page multiple, `>= cursor`.
    committed: Cell<usize>,
    released: bool,
}

// SAFETY: the arena exclusively owns its reservation; `Cell` keeps it !Sync.
unsafe impl<V: VirtualMemory + Send> Send for Arena<V> {}

impl Arena {
    /// Reserve an arena of at least `capacity_hint` bytes.
    pub fn new(capacity_hint: usize) -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::new(capacity_hint))
    }

    /// Reserve an arena described by `config`.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::in_backend(OsMemory, config)
    }
}

impl<V: VirtualMemory> Arena<V> {
    /// Reserve an arena through a specific virtual memory backend.
    ///
    /// The capacity is rounded up to a page multiple (a zero hint still
    /// reserves one page) and the first page is committed immediately, so a
    /// fresh arena is usable without further system calls.
    pub fn in_backend(backend: V, config: ArenaConfig) -> Result<Self, ArenaError> {
        let page_size = backend.page_size();
        let capacity = round_to_page(config.capacity.max(1), page_size).ok_or(
            ArenaError::InvalidCapacity {
                requested: config.capacity,
            },
        )?;
        let granularity = round_to_page(config.commit_granularity.min(capacity), page_size)
            .unwrap_or(capacity)
            .max(page_size);

        let region = backend.reserve(capacity)?;
        // SAFETY: the region was just reserved by this backend.
        if let Err(err) = unsafe { backend.commit(&region, 0, page_size) } {
            // SAFETY: nothing references the region yet.
            if let Err(release_err) = unsafe { backend.release(region) } {
                warn!(error = %release_err, "failed to release region after commit failure");
            }
            return Err(err.into());
        }

        debug!(capacity, page_size, granularity, "arena created");
        Ok(Self {
            backend,
            region,
            page_size,
            granularity,
            cursor: Cell::new(0),
            committed: Cell::new(page_size),
            released: false,
        })
    }

    /// Reserved capacity in bytes. Always a page multiple.
    pub fn capacity(&self) -> usize {
        self.region.size()
    }

    /// Bytes allocated so far (the cursor).
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes still available before the capacity limit.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Bytes currently backed by physical memory.
    pub fn committed(&self) -> usize {
        self.committed.get()
    }

    /// Page size of the backend.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// First address of the arena.
    pub fn base(&self) -> NonNull<u8> {
        self.region.base()
    }

    /// Address of the next byte a push would return. Allocates nothing.
    pub fn peek(&self) -> NonNull<u8> {
        // SAFETY: cursor <= capacity.
        unsafe { raw::offset(self.base(), self.used()) }
    }

    /// Allocate `size` bytes.
    ///
    /// The bytes are not cleared: after a rewind they hold whatever the
    /// previous allocation wrote.
    ///
    /// # Panics
    ///
    /// Panics if the arena is out of capacity or the OS refuses to commit
    /// pages. Both are unrecoverable; use [`try_push`](Self::try_push) to
    /// observe them instead.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push(&self, size: usize) -> &mut [u8] {
        match self.try_push(size) {
            Ok(bytes) => bytes,
            Err(err) => fatal(err),
        }
    }

    /// Fallible [`push`](Self::push).
    #[allow(clippy::mut_from_ref)]
    pub fn try_push(&self, size: usize) -> Result<&mut [u8], ArenaError> {
        self.try_push_aligned(size, 1)
    }

    /// Allocate `size` zero-filled bytes.
    ///
    /// # Panics
    ///
    /// As for [`push`](Self::push).
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push_zero(&self, size: usize) -> &mut [u8] {
        match self.try_push_zero(size) {
            Ok(bytes) => bytes,
            Err(err) => fatal(err),
        }
    }

    /// Fallible [`push_zero`](Self::push_zero).
    #[allow(clippy::mut_from_ref)]
    pub fn try_push_zero(&self, size: usize) -> Result<&mut [u8], ArenaError> {
        let bytes = self.try_push(size)?;
        // Fresh pages are zero already, but reused ones are not.
        bytes.fill(0);
        Ok(bytes)
    }

    /// Allocate `src.len()` bytes holding a copy of `src`.
    ///
    /// # Panics
    ///
    /// As for [`push`](Self::push).
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push_copy(&self, src: &[u8]) -> &mut [u8] {
        match self.try_push_copy(src) {
            Ok(bytes) => bytes,
            Err(err) => fatal(err),
        }
    }

    /// Fallible [`push_copy`](Self::push_copy).
    #[allow(clippy::mut_from_ref)]
    pub fn try_push_copy(&self, src: &[u8]) -> Result<&mut [u8], ArenaError> {
        let bytes = self.try_push(src.len())?;
        bytes.copy_from_slice(src);
        Ok(bytes)
    }

    /// Allocate `size` bytes starting at a multiple of `align`.
    ///
    /// The cursor is padded up to the alignment first; the padding counts
    /// as allocated and is reclaimed by the same rewinds as the bytes.
    ///
    /// # Panics
    ///
    /// As for [`push`](Self::push), and if `align` is not a power of two.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push_aligned(&self, size: usize, align: usize) -> &mut [u8] {
        match self.try_push_aligned(size, align) {
            Ok(bytes) => bytes,
            Err(err) => fatal(err),
        }
    }

    /// Fallible [`push_aligned`](Self::push_aligned).
    #[allow(clippy::mut_from_ref)]
    pub fn try_push_aligned(&self, size: usize, align: usize) -> Result<&mut [u8], ArenaError> {
        if !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment { align });
        }
        let cursor = self.used();
        let capacity = self.capacity();
        let exceeded = || ArenaError::CapacityExceeded {
            requested: size,
            used: cursor,
            capacity,
        };

        let addr = self.base().as_ptr() as usize + cursor;
        let start = addr
            .checked_next_multiple_of(align)
            .map(|aligned| cursor + (aligned - addr))
            .ok_or_else(exceeded)?;
        let end = start.checked_add(size).ok_or_else(exceeded)?;
        if end > capacity {
            return Err(ArenaError::CapacityExceeded {
                requested: end - cursor,
                used: cursor,
                capacity,
            });
        }

        self.ensure_committed(end)?;
        self.cursor.set(end);
        // SAFETY: `start..end` is committed and lies past every previously
        // returned allocation still borrowed from `self`.
        Ok(unsafe { raw::bytes_mut(self.base(), start, size) })
    }

    /// Allocate a properly aligned `T` initialised to `value`.
    ///
    /// # Panics
    ///
    /// As for [`push`](Self::push).
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push_value<T: Copy>(&self, value: T) -> &mut T {
        let bytes = self.push_aligned(mem::size_of::<T>(), mem::align_of::<T>());
        // SAFETY: push_aligned returned size_of::<T>() bytes aligned for T.
        unsafe { raw::write_value(bytes, value) }
    }

    /// Allocate a properly aligned copy of `src`.
    ///
    /// # Panics
    ///
    /// As for [`push`](Self::push).
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push_slice_copy<T: Copy>(&self, src: &[T]) -> &mut [T] {
        let bytes = self.push_aligned(mem::size_of_val(src), mem::align_of::<T>());
        // SAFETY: push_aligned returned size_of_val(src) bytes aligned for T.
        unsafe { raw::copy_slice(bytes, src) }
    }

    /// Move the cursor back by `size` bytes, stopping at zero.
    pub fn pop(&mut self, size: usize) {
        self.cursor.set(self.used().saturating_sub(size));
    }

    /// Move the cursor back to `mark`. Marks past the cursor are ignored:
    /// the cursor never moves forward.
    pub fn pop_to(&mut self, mark: usize) {
        if mark <= self.used() {
            self.cursor.set(mark);
        }
    }

    /// Rewind to an empty arena, keeping every committed page.
    pub fn clear(&mut self) {
        self.pop_to(0);
    }

    /// Rewind to an empty arena and decommit every page past the first.
    pub fn clear_and_decommit(&mut self) -> Result<(), ArenaError> {
        self.clear();
        self.decommit_tail()?;
        Ok(())
    }

    /// Open an automatic scope: the cursor is restored when it drops.
    pub fn scope(&mut self) -> ArenaScope<'_, V> {
        ArenaScope::new(self)
    }

    /// Open a manual scope: the cursor is restored only by
    /// [`ArenaScope::release`].
    pub fn manual_scope(&mut self) -> ArenaScope<'_, V> {
        ArenaScope::manual(self)
    }

    /// Decommit everything past the first page and release the reservation.
    ///
    /// Dropping an arena does the same but can only log failures.
    pub fn teardown(mut self) -> Result<(), ArenaError> {
        self.release_region()
    }

    fn ensure_committed(&self, end: usize) -> Result<(), ArenaError> {
        let committed = self.committed();
        if end <= committed {
            return Ok(());
        }
        let target = end
            .checked_next_multiple_of(self.granularity)
            .map_or(self.capacity(), |target| target.min(self.capacity()));
        // SAFETY: our region is live until `release_region`, and the range
        // `committed..target` holds no allocations yet.
        unsafe {
            self.backend
                .commit(&self.region, committed, target - committed)?;
        }
        trace!(offset = committed, size = target - committed, "committed pages");
        self.committed.set(target);
        Ok(())
    }

    fn decommit_tail(&mut self) -> Result<(), ArenaError> {
        let committed = self.committed();
        if committed <= self.page_size {
            return Ok(());
        }
        let size = committed - self.page_size;
        // SAFETY: `&mut self` proves no allocation past the first page is
        // borrowed; the range is inside our live region.
        unsafe {
            self.backend.decommit(&self.region, self.page_size, size)?;
        }
        self.committed.set(self.page_size);
        debug!(size, "decommitted arena pages");
        Ok(())
    }

    fn release_region(&mut self) -> Result<(), ArenaError> {
        if self.released {
            return Ok(());
        }
        self.cursor.set(0);
        let decommitted = self.decommit_tail();
        self.released = true;
        self.committed.set(0);
        // SAFETY: `&mut self` proves no allocation is borrowed and the
        // released flag guarantees this runs once.
        let released = unsafe { self.backend.release(self.region) };
        debug!(capacity = self.capacity(), "arena torn down");
        decommitted.and(released.map_err(ArenaError::from))
    }
}

impl<V: VirtualMemory> Drop for Arena<V> {
    fn drop(&mut self) {
        if let Err(err) = self.release_region() {
            warn!(error = %err, "arena teardown failed");
        }
    }
}

impl<V: VirtualMemory> fmt::Debug for Arena<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("base", &self.base())
            .field("used", &self.used())
            .field("committed", &self.committed())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cold]
#[track_caller]
fn fatal(err: ArenaError) -> ! {
    panic!("{err}")
}
