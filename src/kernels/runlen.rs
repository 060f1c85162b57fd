//! This module contains the pure, stateless kernels for detecting and
//! expanding arithmetic runs (sequences increasing by exactly one).
//!
//! This is the single narrow pattern the level compression recognizes: a
//! block whose values form a run `v, v+1, ..., v+len-1` collapses to its
//! first value alone, and is reconstructed from that value plus the run
//! length supplied by the variant catalog. This module is PURE RUST and
//! panic-free, including at the integer-boundary edge cases.

use num_traits::{CheckedAdd, PrimInt};

//==================================================================================
// 1. Public API (Generic, Performant, Decoupled)
//==================================================================================

/// Tests whether a block is an arithmetic run with step one.
///
/// Empty and single-value blocks are trivially runs. A block containing the
/// type's maximum value anywhere but the last position cannot be a run; the
/// overflow check makes that case a plain `false` instead of a panic.
pub fn is_arithmetic_run<T>(block: &[T]) -> bool
where
    T: PrimInt + CheckedAdd,
{
    block.windows(2).all(|pair| match pair[0].checked_add(&T::one()) {
        Some(next) => pair[1] == next,
        None => false,
    })
}

/// Appends the run `start, start+1, ..., start+len-1` to `output_buf`.
///
/// The caller guarantees the run fits the value type; this holds for every
/// run produced by [`is_arithmetic_run`] on a block that was stored
/// uncompressed. Saturating at the type maximum keeps the kernel panic-free
/// even on malformed input.
pub fn expand_run<T>(start: T, len: usize, output_buf: &mut Vec<T>)
where
    T: PrimInt + CheckedAdd,
{
    output_buf.reserve(len);
    let mut current = start;
    for i in 0..len {
        output_buf.push(current);
        if i + 1 < len {
            current = current.checked_add(&T::one()).unwrap_or_else(T::max_value);
        }
    }
}

//==================================================================================
// 2. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_plus_one_run() {
        assert!(is_arithmetic_run(&[5u64, 6, 7, 8]));
    }

    #[test]
    fn test_rejects_broken_run() {
        // A gap anywhere breaks the pattern, even if the tail resumes it.
        assert!(!is_arithmetic_run(&[5u64, 6, 8, 9]));
        assert!(!is_arithmetic_run(&[20u64, 22, 23, 21]));
    }

    #[test]
    fn test_trivial_blocks_are_runs() {
        assert!(is_arithmetic_run::<u64>(&[]));
        assert!(is_arithmetic_run(&[42u64]));
    }

    #[test]
    fn test_run_at_type_boundary_does_not_panic() {
        assert!(is_arithmetic_run(&[u64::MAX - 1, u64::MAX]));
        assert!(!is_arithmetic_run(&[u64::MAX, 0]));
    }

    #[test]
    fn test_expand_run_reconstructs_block() {
        let mut buf = Vec::new();
        expand_run(10u64, 4, &mut buf);
        assert_eq!(buf, vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_expand_run_appends_without_clearing() {
        let mut buf = vec![1u64];
        expand_run(7u64, 2, &mut buf);
        assert_eq!(buf, vec![1, 7, 8]);
    }

    #[test]
    fn test_expand_zero_length_run_is_a_noop() {
        let mut buf: Vec<u64> = Vec::new();
        expand_run(3u64, 0, &mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_expand_detect_are_inverse() {
        let mut buf = Vec::new();
        expand_run(1000u64, 27, &mut buf);
        assert!(is_arithmetic_run(&buf));
        assert_eq!(buf[0], 1000);
        assert_eq!(buf.len(), 27);
    }
}
