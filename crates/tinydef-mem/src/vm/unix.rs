//! `mmap`-based backend.
//!
//! Reservations are `PROT_NONE` anonymous private mappings. Committing flips
//! protection to read/write; the kernel supplies zero pages on first touch.
//! Decommitting maps a fresh `PROT_NONE` mapping over the range, which drops
//! the old pages and guarantees zeroes after the next commit.

use std::io;
use std::ptr::{self, NonNull};

pub(super) fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size).unwrap_or(0)
}

pub(super) fn reserve(size: usize) -> io::Result<NonNull<u8>> {
    // SAFETY: a null hint without MAP_FIXED never clobbers existing mappings.
    let ptr = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANON,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }
    NonNull::new(ptr.cast()).ok_or_else(|| io::Error::other("mmap returned a null mapping"))
}

/// # Safety
///
/// `addr..addr + size` must lie inside a live reservation.
pub(super) unsafe fn commit(addr: NonNull<u8>, size: usize) -> io::Result<()> {
    // SAFETY: the range belongs to our own reservation (caller contract).
    let rc = unsafe { libc::mprotect(addr.as_ptr().cast(), size, libc::PROT_READ | libc::PROT_WRITE) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// # Safety
///
/// As for [`commit`]; nothing may reference the range afterwards.
pub(super) unsafe fn decommit(addr: NonNull<u8>, size: usize) -> io::Result<()> {
    // SAFETY: MAP_FIXED replaces only pages inside our own reservation.
    let ptr = unsafe {
        libc::mmap(
            addr.as_ptr().cast(),
            size,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANON | libc::MAP_FIXED,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// # Safety
///
/// `base..base + size` must be exactly one live reservation.
pub(super) unsafe fn release(base: NonNull<u8>, size: usize) -> io::Result<()> {
    // SAFETY: caller hands over the whole reservation.
    let rc = unsafe { libc::munmap(base.as_ptr().cast(), size) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
