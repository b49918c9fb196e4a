//! Selection sort with a parallel minimum search.
//!
//! Every outer iteration splits the unsorted tail across the rayon pool.
//! Each task scans its partition without synchronization and then merges
//! its local minimum into the iteration's global minimum under a mutex.
//! Ties go to the lower index, so the chosen element (and the final
//! output) is the same as the sequential sort's regardless of scheduling.

use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;

/// `(value, index)` of the smallest element, first occurrence on ties.
type Candidate = (i32, usize);

fn better(a: Candidate, b: Candidate) -> bool {
    a.0 < b.0 || (a.0 == b.0 && a.1 < b.1)
}

pub fn par_selection_sort(data: &mut [i32]) {
    let n = data.len();
    let threads = rayon::current_num_threads().max(1);

    for i in 0..n.saturating_sub(1) {
        let tail = &data[i + 1..];
        let chunk = tail.len().div_ceil(threads).max(1);
        let best = Mutex::new((data[i], i));

        tail.par_chunks(chunk).enumerate().for_each(|(c, part)| {
            let base = i + 1 + c * chunk;
            let mut local = (part[0], base);
            for (off, &v) in part.iter().enumerate().skip(1) {
                if v < local.0 {
                    local = (v, base + off);
                }
            }
            let mut global = best.lock().unwrap_or_else(PoisonError::into_inner);
            if better(local, *global) {
                *global = local;
            }
        });

        let (_, min_idx) = best.into_inner().unwrap_or_else(PoisonError::into_inner);
        if min_idx != i {
            data.swap(i, min_idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu_baselines::sequential;
    use proptest::prelude::*;

    fn check(input: Vec<i32>) {
        let mut seq = input.clone();
        sequential::selection_sort(&mut seq);
        let mut par = input.clone();
        par_selection_sort(&mut par);

        let mut expected = input;
        expected.sort_unstable();
        assert_eq!(sequential::descents(&par), 0);
        assert_eq!(par, expected);
        assert_eq!(seq, expected);
    }

    #[test]
    fn test_sorted() {
        check((0..1000).collect());
    }

    #[test]
    fn test_reverse() {
        check((0..1000).rev().collect());
    }

    #[test]
    fn test_all_equal() {
        check(vec![7; 1000]);
    }

    #[test]
    fn test_tiny() {
        check(vec![]);
        check(vec![3]);
        check(vec![2, 1]);
    }

    #[test]
    fn test_ties_pick_lowest_index() {
        assert!(better((1, 3), (1, 5)));
        assert!(!better((1, 5), (1, 3)));
        assert!(better((0, 9), (1, 0)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_matches_sequential_and_keeps_multiset(
            data in prop::collection::vec(0i32..10_000, 0..400)
        ) {
            let mut seq = data.clone();
            sequential::selection_sort(&mut seq);
            let mut par = data.clone();
            par_selection_sort(&mut par);

            let mut expected = data;
            expected.sort_unstable();
            prop_assert_eq!(sequential::descents(&par), 0);
            prop_assert_eq!(&par, &expected);
            prop_assert_eq!(&seq, &expected);
        }
    }
}
