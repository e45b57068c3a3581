//! Logic - Native Compute Routines
//!
//! This crate is built as a C-compatible shared library and loaded at runtime by
//! `logic-bridge`. Each routine comes in two layers:
//!
//! 1. **Routine** - a plain Rust function over a slice, pure and allocation-free
//! 2. **Export shim** - a `#[no_mangle] extern "C"` wrapper with a flat
//!    `(pointer, length) -> scalar` signature
//!
//! # Wire Contract
//!
//! ```text
//! int32_t count_positives(const int32_t *values, int32_t len);
//! ```
//!
//! The caller owns `values`; the shim only reads it for the duration of the call.

/// Count the elements strictly greater than zero.
///
/// Zero is not positive. O(n) time, O(1) space.
pub fn positive_count(values: &[i32]) -> usize {
    values.iter().filter(|&&v| v > 0).count()
}

/// C ABI export of [`positive_count`].
///
/// A null `values` or a non-positive `len` is treated as an empty buffer.
///
/// # Safety
///
/// When `len > 0`, `values` must point to at least `len` initialized, contiguous
/// `i32` values that stay valid and unmodified for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn count_positives(values: *const i32, len: i32) -> i32 {
    if values.is_null() || len <= 0 {
        return 0;
    }

    // len > 0 here, so the widening to usize is lossless.
    let values = std::slice::from_raw_parts(values, len as usize);
    let count = positive_count(values);

    // count <= len <= i32::MAX
    i32::try_from(count).unwrap_or(i32::MAX)
}
