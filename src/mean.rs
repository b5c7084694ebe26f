// ------------------------------------------------------------
// Weighted means of point sets
// ------------------------------------------------------------

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::vector::{Vector, accumulate_scaled};

/// Weighted mean of `points`.
///
/// `weight_fn` receives each point along with its index. Fails with
/// [`Error::EmptyInput`] when the total weight is zero, which includes an
/// empty point set.
pub fn mean<W>(points: &[Vector], mut weight_fn: W) -> Result<Vector>
where
    W: FnMut(&Vector, usize) -> f64,
{
    let mut sum = Vec::new();
    let mut total_weight = 0.0;
    for (idx, point) in points.iter().enumerate() {
        let weight = weight_fn(point, idx);
        accumulate_scaled(&mut sum, point.as_slice(), weight);
        total_weight += weight;
    }
    if total_weight == 0.0 {
        return Err(Error::EmptyInput("total weight of points is zero"));
    }
    Ok(divide(sum, total_weight))
}

/// Per-group weighted means computed in a single pass.
///
/// Groups whose accumulated weight is not strictly positive are left out of the
/// result entirely.
pub fn grouped_means<K, KF, W>(points: &[Vector], mut key_fn: KF, mut weight_fn: W) -> HashMap<K, Vector>
where
    K: Eq + Hash,
    KF: FnMut(&Vector, usize) -> K,
    W: FnMut(&Vector, usize) -> f64,
{
    let mut groups: HashMap<K, (Vec<f64>, f64)> = HashMap::new();
    for (idx, point) in points.iter().enumerate() {
        let weight = weight_fn(point, idx);
        let (sum, total) = groups.entry(key_fn(point, idx)).or_default();
        accumulate_scaled(sum, point.as_slice(), weight);
        *total += weight;
    }

    groups
        .into_iter()
        .filter(|(_, (_, total))| *total > 0.0)
        .map(|(key, (sum, total))| (key, divide(sum, total)))
        .collect()
}

fn divide(sum: Vec<f64>, total: f64) -> Vector {
    Vector::new(sum.into_iter().map(|s| s / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Vector, b: &Vector) {
        assert!(a.squared_distance(b) < 1e-18, "{a:?} != {b:?}");
    }

    #[test]
    fn mean_is_weighted() {
        let points = vec![Vector::from([0.0, 0.0]), Vector::from([4.0, 8.0])];
        let weights = [3.0, 1.0];
        let m = mean(&points, |_, i| weights[i]).unwrap();
        assert_close(&m, &Vector::from([1.0, 2.0]));
    }

    #[test]
    fn mean_rejects_zero_weight() {
        let points = vec![Vector::from([1.0, 2.0, 3.0]); 4];
        assert!(matches!(mean(&points, |_, _| 0.0), Err(Error::EmptyInput(_))));
        assert!(matches!(mean(&[], |_, _| 1.0), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn duplicated_points_match_weighted_point() {
        let p = Vector::from([0.25, 0.5, 0.75]);
        let expanded = vec![p.clone(), p.clone(), p.clone()];
        let from_copies = mean(&expanded, |_, _| 1.0).unwrap();
        let from_weight = mean(&[p], |_, _| 3.0).unwrap();
        assert_close(&from_copies, &from_weight);
    }

    #[test]
    fn grouped_means_drop_weightless_groups() {
        let points = vec![
            Vector::from([0.0]),
            Vector::from([2.0]),
            Vector::from([10.0]),
            Vector::from([20.0]),
        ];
        let keys = [0usize, 0, 1, 2];
        let weights = [1.0, 1.0, 0.0, 5.0];
        let means = grouped_means(&points, |_, i| keys[i], |_, i| weights[i]);

        assert_eq!(means.len(), 2);
        assert_close(&means[&0], &Vector::from([1.0]));
        assert_close(&means[&2], &Vector::from([20.0]));
        assert!(!means.contains_key(&1));
    }
}
