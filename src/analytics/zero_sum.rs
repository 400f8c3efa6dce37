//! Closest-to-zero-sum pair search.
//!
//! Given two arrays, find one index into each such that the sum of the two
//! elements is minimal in absolute value. This is the zero-cost criterion of
//! the collar strike selection: with call premiums negated, the minimal
//! absolute sum is the call/put pair whose net premium is nearest to zero.

/// Find indices `(i, j)` minimizing `|a[i] + b[j]|`. O(n log n).
///
/// `b` is argsorted once; for each element of `a` a binary search locates the
/// two sorted neighbors of `-a[i]`, and the running best is tracked across
/// the scan. An exact zero sum short-circuits immediately.
///
/// Tie-break is deterministic: only a strictly smaller absolute sum replaces
/// the running best, so the first minimal pair in scan order wins (ascending
/// `i`, and for each `i` the lower sorted position of `b`).
///
/// Returns `None` if either array is empty.
pub fn closest_zero_sum_pair(a: &[f64], b: &[f64]) -> Option<(usize, usize)> {
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let mut order: Vec<usize> = (0..b.len()).collect();
    order.sort_by(|&i, &j| b[i].total_cmp(&b[j]));
    let sorted: Vec<f64> = order.iter().map(|&i| b[i]).collect();

    let mut best = f64::INFINITY;
    let mut pair = (0, order[0]);

    for (i, &value) in a.iter().enumerate() {
        let target = -value;
        let insertion = sorted.partition_point(|&v| v < target);
        for j in [insertion.wrapping_sub(1), insertion] {
            if j >= sorted.len() {
                continue;
            }
            let sum = value + sorted[j];
            if sum.abs() < best {
                best = sum.abs();
                pair = (i, order[j]);
                if sum == 0.0 {
                    return Some(pair);
                }
            }
        }
    }

    Some(pair)
}
