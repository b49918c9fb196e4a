//! Plain single-threaded loops. These are both the timed baselines and the
//! references device results are checked against.

/// `c[i] = a[i] + b[i]`.
#[cfg_attr(not(feature = "opencl"), allow(dead_code))]
pub fn vector_add(a: &[f32], b: &[f32], c: &mut [f32]) {
    for ((c, &a), &b) in c.iter_mut().zip(a).zip(b) {
        *c = a + b;
    }
}

/// Row-major `C[n x k] = A[n x m] * B[m x k]`, summing over `m` in order.
#[cfg_attr(not(feature = "opencl"), allow(dead_code))]
pub fn matmul(a: &[f32], b: &[f32], c: &mut [f32], n: usize, m: usize, k: usize) {
    for i in 0..n {
        for j in 0..k {
            let mut sum = 0.0f32;
            for l in 0..m {
                sum += a[i * m + l] * b[l * k + j];
            }
            c[i * k + j] = sum;
        }
    }
}

/// Minimum and maximum in one pass; `None` for an empty slice.
pub fn min_max(data: &[i32]) -> Option<(i32, i32)> {
    let (&first, rest) = data.split_first()?;
    let mut lo = first;
    let mut hi = first;
    for &x in rest {
        if x < lo {
            lo = x;
        }
        if x > hi {
            hi = x;
        }
    }
    Some((lo, hi))
}

/// Classic in-place selection sort: the first minimum of the unsorted tail
/// is swapped into place.
pub fn selection_sort(data: &mut [i32]) {
    let n = data.len();
    for i in 0..n.saturating_sub(1) {
        let mut min_idx = i;
        for j in i + 1..n {
            if data[j] < data[min_idx] {
                min_idx = j;
            }
        }
        if min_idx != i {
            data.swap(i, min_idx);
        }
    }
}

/// Number of adjacent pairs that are out of order.
pub fn descents(data: &[i32]) -> usize {
    data.windows(2).filter(|w| w[0] > w[1]).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_add() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [10.0f32, 20.0, 30.0];
        let mut c = [0.0f32; 3];
        vector_add(&a, &b, &mut c);
        assert_eq!(c, [11.0, 22.0, 33.0]);
    }

    #[test]
    fn test_matmul_rectangular() {
        // [2x3] * [3x2]
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0f32, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut c = [0.0f32; 4];
        matmul(&a, &b, &mut c, 2, 3, 2);
        assert_eq!(c, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_identity() {
        let a: Vec<f32> = (0..9).map(|x| x as f32).collect();
        let id = [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let mut c = [0.0f32; 9];
        matmul(&a, &id, &mut c, 3, 3, 3);
        assert_eq!(&c[..], &a[..]);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[5, -3, 8, 1]), Some((-3, 8)));
        assert_eq!(min_max(&[7]), Some((7, 7)));
        assert_eq!(min_max(&[]), None);
    }

    #[test]
    fn test_selection_sort() {
        let mut v = vec![5, 2, 9, 1, 5, 6];
        selection_sort(&mut v);
        assert_eq!(v, vec![1, 2, 5, 5, 6, 9]);

        let mut empty: Vec<i32> = vec![];
        selection_sort(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_descents() {
        assert_eq!(descents(&[1, 2, 2, 3]), 0);
        assert_eq!(descents(&[3, 1, 2, 0]), 2);
    }
}
