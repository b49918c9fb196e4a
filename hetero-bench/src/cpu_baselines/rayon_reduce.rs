//! Min/max reduction on the rayon pool.
//!
//! Each task folds its partition to a `(min, max)` pair; pairs are combined
//! with `min`/`max`, which are associative and commutative, so the answer
//! does not depend on how rayon splits the input.

use rayon::prelude::*;

fn combine(a: Option<(i32, i32)>, b: Option<(i32, i32)>) -> Option<(i32, i32)> {
    match (a, b) {
        (Some((lo1, hi1)), Some((lo2, hi2))) => Some((lo1.min(lo2), hi1.max(hi2))),
        (x, None) | (None, x) => x,
    }
}

/// Parallel minimum and maximum; `None` for an empty slice.
pub fn par_min_max(data: &[i32]) -> Option<(i32, i32)> {
    data.par_iter()
        .fold(
            || None,
            |acc, &x| combine(acc, Some((x, x))),
        )
        .reduce(|| None, combine)
}
