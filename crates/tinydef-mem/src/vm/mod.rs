//! Platform virtual memory backend.
//!
//! Separates cheap address-space *reservation* from page *commitment*:
//!
//! ```text
//! reserve(size)            ──▶ Region { base, size }   (no physical pages)
//! commit(region, off, n)   ──▶ pages readable/writable, zero-filled
//! decommit(region, off, n) ──▶ physical pages dropped, range stays reserved
//! release(region)          ──▶ address range returned to the OS
//! ```
//!
//! [`OsMemory`] is the backend for the compilation target. Targets without
//! an implementation fail to build instead of getting a backend that
//! reports success while mapping nothing.

#![allow(unsafe_code)]

use std::fmt;
use std::ptr::NonNull;
use std::sync::OnceLock;

use crate::error::{VmError, VmOp};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as sys;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as sys;

#[cfg(not(any(unix, windows)))]
compile_error!("tinydef-mem has no virtual memory backend for this target");

/// One OS address-space reservation.
///
/// A `Region` is plain data: copying it does not duplicate the reservation.
/// Whoever called [`VirtualMemory::reserve`] owns it and must release it
/// exactly once.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Region {
    base: NonNull<u8>,
    size: usize,
}

impl Region {
    /// Build a region from a base address and reserved size.
    ///
    /// # Safety
    ///
    /// `base..base + size` must be a single live reservation obtained from
    /// the backend that will be handed this region.
    pub unsafe fn from_raw_parts(base: NonNull<u8>, size: usize) -> Self {
        Self { base, size }
    }

    /// First address of the reservation.
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Reserved size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `offset..offset + len` lies inside the reservation.
    pub fn contains(&self, offset: usize, len: usize) -> bool {
        offset
            .checked_add(len)
            .is_some_and(|end| end <= self.size)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("base", &self.base)
            .field("size", &self.size)
            .finish()
    }
}

/// Capability interface over an OS virtual memory API.
///
/// Offsets and sizes passed to `commit` and `decommit` are multiples of
/// [`page_size`](Self::page_size) and lie inside the region.
///
/// # Safety
///
/// Implementors guarantee that after a successful `commit` the range is
/// readable and writable, and that pages committed for the first time (or
/// after a `decommit`) read as zero. [`Arena`](crate::Arena) hands out
/// references into committed memory on the strength of this contract.
pub unsafe trait VirtualMemory {
    /// Allocation page size in bytes. Always a power of two.
    fn page_size(&self) -> usize;

    /// Reserve `size` bytes of address space without physical backing.
    fn reserve(&self, size: usize) -> Result<Region, VmError>;

    /// Back `offset..offset + size` of `region` with physical memory.
    ///
    /// # Safety
    ///
    /// `region` must come from this backend's `reserve` and not yet be
    /// released.
    unsafe fn commit(&self, region: &Region, offset: usize, size: usize) -> Result<(), VmError>;

    /// Drop the physical backing of `offset..offset + size`, keeping the
    /// addresses reserved.
    ///
    /// # Safety
    ///
    /// As for [`commit`](Self::commit); additionally no live reference may
    /// point into the range.
    unsafe fn decommit(&self, region: &Region, offset: usize, size: usize)
        -> Result<(), VmError>;

    /// Return the whole reservation to the OS.
    ///
    /// # Safety
    ///
    /// `region` must come from this backend's `reserve`, must not have been
    /// released before, and no live reference may point into it.
    unsafe fn release(&self, region: Region) -> Result<(), VmError>;
}

/// The virtual memory backend of the compilation target.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsMemory;

// SAFETY: the platform modules map committed ranges read/write and obtain
// them from anonymous mappings, which the OS zero-fills on first touch.
unsafe impl VirtualMemory for OsMemory {
    fn page_size(&self) -> usize {
        page_size()
    }

    fn reserve(&self, size: usize) -> Result<Region, VmError> {
        debug_assert!(size > 0 && size % page_size() == 0);
        let base = sys::reserve(size).map_err(|source| VmError {
            op: VmOp::Reserve,
            offset: 0,
            size,
            source,
        })?;
        tracing::debug!(size, base = ?base, "reserved address range");
        // SAFETY: `base` was just returned by a reservation of `size` bytes.
        Ok(unsafe { Region::from_raw_parts(base, size) })
    }

    unsafe fn commit(&self, region: &Region, offset: usize, size: usize) -> Result<(), VmError> {
        debug_assert!(region.contains(offset, size));
        // SAFETY: caller guarantees the region is a live reservation; the
        // range was checked against it above.
        unsafe { sys::commit(region.base().add(offset), size) }.map_err(|source| VmError {
            op: VmOp::Commit,
            offset,
            size,
            source,
        })
    }

    unsafe fn decommit(
        &self,
        region: &Region,
        offset: usize,
        size: usize,
    ) -> Result<(), VmError> {
        debug_assert!(region.contains(offset, size));
        // SAFETY: as for `commit`; the caller holds no references into the range.
        unsafe { sys::decommit(region.base().add(offset), size) }.map_err(|source| VmError {
            op: VmOp::Decommit,
            offset,
            size,
            source,
        })
    }

    unsafe fn release(&self, region: Region) -> Result<(), VmError> {
        // SAFETY: caller transfers ownership of a live reservation.
        unsafe { sys::release(region.base(), region.size()) }.map_err(|source| VmError {
            op: VmOp::Release,
            offset: 0,
            size: region.size(),
            source,
        })?;
        tracing::debug!(size = region.size(), "released address range");
        Ok(())
    }
}

/// Page size used when the OS query reports nonsense.
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// The OS page size, queried once per process.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(|| {
        let size = sys::page_size();
        if size.is_power_of_two() {
            size
        } else {
            tracing::warn!(size, "OS reported an invalid page size, using fallback");
            FALLBACK_PAGE_SIZE
        }
    })
}

/// Round `size` up to the next multiple of `page`, or `None` on overflow.
///
/// `page` must be a power of two.
pub fn round_to_page(size: usize, page: usize) -> Option<usize> {
    debug_assert!(page.is_power_of_two());
    size.checked_next_multiple_of(page)
}
