//! Scalar helpers: clamping, circular indexing, frame-rate independent
//! smoothing.

/// Clamp `x` into `[min, max]`.
///
/// Unlike [`Ord::clamp`] this never panics when `min > max`: the upper bound
/// is checked first and wins.
pub fn clamp<T: PartialOrd>(x: T, min: T, max: T) -> T {
    if x >= max {
        max
    } else if x <= min {
        min
    } else {
        x
    }
}

/// Clamp `x` into the range spanned by `a` and `b`, in either order.
pub fn between<T: PartialOrd>(x: T, a: T, b: T) -> T {
    if a == b {
        return a;
    }
    if b < a {
        clamp(x, b, a)
    } else {
        clamp(x, a, b)
    }
}

/// Index into a circular buffer of `len` elements for any signed position.
///
/// # Panics
///
/// Panics if `len` is zero or does not fit in `i64`.
pub fn circ_idx(i: i64, len: usize) -> usize {
    assert!(len > 0, "circular index into an empty ring");
    assert!(len <= i64::MAX as usize, "ring length exceeds i64::MAX");
    // rem_euclid of a positive modulus is in 0..len.
    i.rem_euclid(len as i64) as usize
}

/// Wrap `x` for a cursor that moves at most one step past either end of
/// `0..max`: overflow wraps by remainder, underflow steps back from `max - 1`.
///
/// # Panics
///
/// Panics if `max` is not positive.
pub fn wrap_around(x: i32, max: i32) -> i32 {
    assert!(max > 0, "wrap_around needs a positive bound, got {max}");
    if x >= max {
        x % max
    } else if x < 0 {
        max + x - 1
    } else {
        x
    }
}

/// Frame-rate independent exponential smoothing of `current` towards
/// `target`.
///
/// `decay` around 1 is slow, around 25 is fast; `dt` is the frame time in
/// seconds.
pub fn filerp(current: f64, target: f64, decay: f64, dt: f64) -> f64 {
    target + (current - target) * (-decay * dt).exp()
}

/// `f32` version of [`filerp`].
pub fn filerp_f32(current: f32, target: f32, decay: f32, dt: f32) -> f32 {
    target + (current - target) * (-decay * dt).exp()
}
