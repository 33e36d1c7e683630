//! Low-level primitives for arena memory operations.
//!
//! Every pointer-to-reference conversion in the crate goes through here.
//! Callers uphold that the ranges lie inside committed arena memory that no
//! other live reference covers.

#![allow(unsafe_code)]

use std::mem;
use std::ptr::NonNull;

/// Address `offset` bytes past `base`.
///
/// # Safety
///
/// `offset` must not exceed the size of the reservation starting at `base`.
pub(crate) unsafe fn offset(base: NonNull<u8>, offset: usize) -> NonNull<u8> {
    // SAFETY: in bounds of one reservation (caller contract).
    unsafe { base.add(offset) }
}

/// Mutable byte slice over `base + offset .. base + offset + len`.
///
/// # Safety
///
/// The range must be committed and not aliased by any live reference for
/// the returned lifetime.
pub(crate) unsafe fn bytes_mut<'a>(base: NonNull<u8>, start: usize, len: usize) -> &'a mut [u8] {
    // SAFETY: committed memory is initialised (zeroed by the OS or written
    // by an earlier push), and exclusivity is the caller's contract.
    unsafe { std::slice::from_raw_parts_mut(offset(base, start).as_ptr(), len) }
}

/// Move `value` into freshly pushed bytes and return a typed reference.
///
/// # Safety
///
/// `bytes` must be exactly `size_of::<T>()` long and aligned for `T`.
pub(crate) unsafe fn write_value<T: Copy>(bytes: &mut [u8], value: T) -> &mut T {
    debug_assert_eq!(bytes.len(), mem::size_of::<T>());
    let ptr = bytes.as_mut_ptr().cast::<T>();
    debug_assert!(ptr.is_aligned());
    // SAFETY: size and alignment checked above (caller contract).
    unsafe {
        ptr.write(value);
        &mut *ptr
    }
}

/// Copy `src` into freshly pushed bytes and return a typed slice.
///
/// # Safety
///
/// `bytes` must be exactly `size_of_val(src)` long and aligned for `T`.
pub(crate) unsafe fn copy_slice<'a, T: Copy>(bytes: &'a mut [u8], src: &[T]) -> &'a mut [T] {
    debug_assert_eq!(bytes.len(), mem::size_of_val(src));
    let ptr = bytes.as_mut_ptr().cast::<T>();
    debug_assert!(ptr.is_aligned());
    // SAFETY: the destination is arena memory, so it cannot overlap `src`
    // while `bytes` is borrowed mutably; size and alignment per contract.
    unsafe {
        std::ptr::copy_nonoverlapping(src.as_ptr(), ptr, src.len());
        std::slice::from_raw_parts_mut(ptr, src.len())
    }
}
