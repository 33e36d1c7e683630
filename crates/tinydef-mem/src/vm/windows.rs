//! `VirtualAlloc`-based backend.

use std::io;
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};

use windows_sys::Win32::System::Memory::{
    VirtualAlloc, VirtualFree, MEM_COMMIT, MEM_DECOMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE,
};
use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

pub(super) fn page_size() -> usize {
    let mut info = MaybeUninit::<SYSTEM_INFO>::uninit();
    // SAFETY: GetSystemInfo always fills the struct it is given.
    let info = unsafe {
        GetSystemInfo(info.as_mut_ptr());
        info.assume_init()
    };
    info.dwPageSize as usize
}

pub(super) fn reserve(size: usize) -> io::Result<NonNull<u8>> {
    // SAFETY: a null address lets the OS pick a free range.
    let ptr = unsafe { VirtualAlloc(ptr::null(), size, MEM_RESERVE, PAGE_READWRITE) };
    NonNull::new(ptr.cast()).ok_or_else(io::Error::last_os_error)
}

/// # Safety
///
/// `addr..addr + size` must lie inside a live reservation.
pub(super) unsafe fn commit(addr: NonNull<u8>, size: usize) -> io::Result<()> {
    // SAFETY: the range belongs to our own reservation (caller contract).
    let ptr = unsafe { VirtualAlloc(addr.as_ptr().cast(), size, MEM_COMMIT, PAGE_READWRITE) };
    if ptr.is_null() {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// # Safety
///
/// As for [`commit`]; nothing may reference the range afterwards.
pub(super) unsafe fn decommit(addr: NonNull<u8>, size: usize) -> io::Result<()> {
    // SAFETY: the range belongs to our own reservation (caller contract).
    if unsafe { VirtualFree(addr.as_ptr().cast(), size, MEM_DECOMMIT) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// # Safety
///
/// `base` must be the base of one live reservation.
pub(super) unsafe fn release(base: NonNull<u8>, _size: usize) -> io::Result<()> {
    // SAFETY: caller hands over the whole reservation; MEM_RELEASE needs size 0.
    if unsafe { VirtualFree(base.as_ptr().cast(), 0, MEM_RELEASE) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
