//! Reference Implementation
//!
//! Host-side oracle for the native `count_positives` export. Nothing here crosses
//! the FFI boundary.

use crate::ffi::{BridgeError, FfiValue};

/// Count elements strictly greater than zero
pub fn count_positives(values: &[i32]) -> usize {
    let mut count = 0;
    for &v in values {
        if v > 0 {
            count += 1;
        }
    }
    count
}

/// Count positive elements of a dynamically typed sequence
///
/// Applies the same element contract as [`crate::ffi::Bridge::invoke`], so both
/// sides reject the same inputs.
pub fn count_positive_values(values: &[FfiValue]) -> Result<usize, BridgeError> {
    let mut count = 0;
    for (index, value) in values.iter().enumerate() {
        if value.checked_i32(index)? > 0 {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_positives() {
        assert_eq!(count_positives(&[]), 0);
        assert_eq!(count_positives(&[-1, 0, 1]), 1);
        assert_eq!(count_positives(&[-2, -1, 0, 1, 2, 3, -4, 5, 0, 10]), 5);
        assert_eq!(count_positives(&[0, -5, i32::MIN]), 0);
        assert_eq!(count_positives(&[1, 2, i32::MAX]), 3);
    }

    #[test]
    fn test_count_positive_values() {
        let values: Vec<FfiValue> = vec![3.into(), (-1).into(), 0.into(), 8.into()];
        assert_eq!(count_positive_values(&values), Ok(2));
    }

    #[test]
    fn test_count_positive_values_rejects_non_integers() {
        let values = vec![FfiValue::from(1), FfiValue::from(2.5), FfiValue::from(3)];
        match count_positive_values(&values) {
            Err(BridgeError::TypeContract { index, found }) => {
                assert_eq!(index, 1);
                assert_eq!(found, "float 2.5");
            }
            other => panic!("Expected TypeContract, got {:?}", other),
        }
    }
}
