//! Numeric kernels used by strike selection.

mod zero_sum;

pub use zero_sum::closest_zero_sum_pair;
