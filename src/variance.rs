// ------------------------------------------------------------
// Clustering variance
// ------------------------------------------------------------

use crate::centroids::CentroidList;
use crate::error::Result;
use crate::mean::mean;
use crate::vector::Vector;

/// Weighted mean squared distance from each point to its nearest centroid.
///
/// Only meaningful as a comparison between clusterings of the same points:
/// lower is better. Fails like [`mean`] when the total weight is zero.
pub fn variance<P, C, W>(points: &[P], centroids: &CentroidList, coords_fn: C, weight_fn: W) -> Result<f64>
where
    C: Fn(&P) -> Vector,
    W: Fn(&P, usize) -> f64,
{
    let distances: Vec<Vector> = points
        .iter()
        .map(|point| Vector::from([centroids.nearest_distance(&coords_fn(point))]))
        .collect();
    let m = mean(&distances, |_, idx| weight_fn(&points[idx], idx))?;
    Ok(m.coord(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn identity(v: &Vector) -> Vector {
        v.clone()
    }

    #[test]
    fn weighted_mean_of_squared_distances() {
        let points = vec![Vector::from([0.0, 1.0]), Vector::from([0.0, 3.0])];
        let centroids = CentroidList::new(vec![Vector::from([0.0, 0.0])]).unwrap();
        let weights = [3.0, 1.0];
        // (3 * 1 + 1 * 9) / 4
        let v = variance(&points, &centroids, identity, |_, i| weights[i]).unwrap();
        assert!((v - 3.0).abs() < 1e-12);
    }

    #[test]
    fn closer_palette_scores_lower() {
        let points = vec![
            Vector::from([0.0]),
            Vector::from([1.0]),
            Vector::from([10.0]),
            Vector::from([11.0]),
        ];
        let good = CentroidList::new(vec![Vector::from([0.5]), Vector::from([10.5])]).unwrap();
        let bad = CentroidList::new(vec![Vector::from([5.0]), Vector::from([6.0])]).unwrap();
        let good_v = variance(&points, &good, identity, |_, _| 1.0).unwrap();
        let bad_v = variance(&points, &bad, identity, |_, _| 1.0).unwrap();
        assert!(good_v < bad_v);
    }

    #[test]
    fn duplicates_match_weights() {
        let p = Vector::from([2.0, 2.0, 2.0]);
        let centroids = CentroidList::new(vec![Vector::from([0.0, 0.0, 0.0])]).unwrap();
        let copies = vec![p.clone(), p.clone(), p.clone()];
        let a = variance(&copies, &centroids, identity, |_, _| 1.0).unwrap();
        let b = variance(&[p], &centroids, identity, |_, _| 3.0).unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn all_zero_weights_fail() {
        let points = vec![Vector::from([1.0])];
        let centroids = CentroidList::new(vec![Vector::from([0.0])]).unwrap();
        let err = variance(&points, &centroids, identity, |_, _| 0.0);
        assert!(matches!(err, Err(Error::EmptyInput(_))));
    }
}
