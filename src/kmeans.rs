// ------------------------------------------------------------
// Weighted k-means++ clustering
// ------------------------------------------------------------

use rand::Rng;
use tracing::debug;

use crate::centroids::CentroidList;
use crate::error::{Error, Result};
use crate::mean::grouped_means;
use crate::random::choose_weighted;
use crate::vector::Vector;

pub const DEFAULT_MAX_ITERATIONS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KMeansOptions {
    /// Upper bound on Lloyd iterations.
    pub max_iterations: usize,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self { max_iterations: DEFAULT_MAX_ITERATIONS }
    }
}

/// Cluster `points` into at most `number_of_centroids` groups.
///
/// `coords_fn` extracts the clustered feature of a point (pass
/// `|v: &Vector| v.clone()` when the points already are coordinates) and
/// `weight_fn` supplies each point's weight given the point and its index.
///
/// Seeding follows k-means++: the first centroid is drawn in proportion to the
/// point weights alone, and every later one in proportion to
/// `weight * squared distance to the nearest centroid chosen so far`. Lloyd
/// iteration then runs until the assignment of points to centroids stops
/// changing, or until the iteration cap.
///
/// Fewer centroids than requested come back when seeding runs out of
/// candidates with positive effective weight, or when a cluster loses all of
/// its weight during iteration.
pub fn find_centroids<P, C, W, R>(
    points: &[P],
    number_of_centroids: usize,
    coords_fn: C,
    weight_fn: W,
    options: KMeansOptions,
    rng: &mut R,
) -> Result<CentroidList>
where
    C: Fn(&P) -> Vector,
    W: Fn(&P, usize) -> f64,
    R: Rng + ?Sized,
{
    if number_of_centroids < 1 {
        return Err(Error::invalid("at least one centroid must be requested"));
    }
    let (coords, weights) = extract(points, coords_fn, weight_fn);
    let seeds = seed_centroids(&coords, &weights, number_of_centroids, rng)?;
    debug!(requested = number_of_centroids, seeded = seeds.len(), "seeded centroids");
    lloyd(&coords, &weights, seeds, options.max_iterations)
}

/// Run Lloyd iteration starting from the given centroids instead of random
/// seeds.
pub fn refine_centroids<P, C, W>(
    points: &[P],
    seeds: CentroidList,
    coords_fn: C,
    weight_fn: W,
    options: KMeansOptions,
) -> Result<CentroidList>
where
    C: Fn(&P) -> Vector,
    W: Fn(&P, usize) -> f64,
{
    let (coords, weights) = extract(points, coords_fn, weight_fn);
    lloyd(&coords, &weights, seeds, options.max_iterations)
}

/// k-means++ seeding over precomputed coordinates and weights.
///
/// Fails with [`Error::InvalidArgument`] when `coords` and `weights` differ in
/// length, and with [`Error::EmptyInput`] when no point has positive weight. Stops
/// early, without error, once every remaining candidate has zero effective
/// weight.
pub fn seed_centroids<R>(
    coords: &[Vector],
    weights: &[f64],
    number_of_centroids: usize,
    rng: &mut R,
) -> Result<CentroidList>
where
    R: Rng + ?Sized,
{
    if coords.len() != weights.len() {
        return Err(Error::invalid(format!(
            "got {} points but {} weights",
            coords.len(),
            weights.len()
        )));
    }
    let first = choose_weighted(weights, |weight, _| *weight, rng)
        .ok_or(Error::EmptyInput("at least one data point must exist and have positive weight"))?;
    let mut centroids = CentroidList::new(vec![coords[first].clone()])?;

    // Squared distance from each point to its nearest chosen centroid so far.
    let mut nearest: Vec<f64> = coords.iter().map(|c| c.squared_distance(&coords[first])).collect();

    while centroids.len() < number_of_centroids {
        let Some(next) = choose_weighted(weights, |weight, idx| weight * nearest[idx], rng) else {
            // Everything left either weighs nothing or sits on a chosen centroid.
            break;
        };
        let chosen = coords[next].clone();
        for (dist, c) in nearest.iter_mut().zip(coords) {
            *dist = dist.min(c.squared_distance(&chosen));
        }
        centroids = centroids.with(chosen);
    }
    Ok(centroids)
}

fn extract<P, C, W>(points: &[P], coords_fn: C, weight_fn: W) -> (Vec<Vector>, Vec<f64>)
where
    C: Fn(&P) -> Vector,
    W: Fn(&P, usize) -> f64,
{
    points
        .iter()
        .enumerate()
        .map(|(idx, point)| (coords_fn(point), weight_fn(point, idx)))
        .unzip()
}

fn lloyd(
    coords: &[Vector],
    weights: &[f64],
    mut centroids: CentroidList,
    max_iterations: usize,
) -> Result<CentroidList> {
    let mut previous: Option<Vec<usize>> = None;

    for iteration in 0..max_iterations {
        let assignments: Vec<usize> = coords.iter().map(|c| centroids.classify(c)).collect();
        if previous.as_ref() == Some(&assignments) {
            debug!(iterations = iteration, centroids = centroids.len(), "k-means converged");
            return Ok(centroids);
        }

        let mut means = grouped_means(coords, |_, idx| assignments[idx], |_, idx| weights[idx]);
        let next: Vec<Vector> = (0..centroids.len()).filter_map(|idx| means.remove(&idx)).collect();
        if next.len() < centroids.len() {
            debug!(dropped = centroids.len() - next.len(), iteration, "clusters lost all weight");
        }
        centroids = CentroidList::new(next)
            .map_err(|_| Error::EmptyInput("every cluster lost its weight"))?;
        previous = Some(assignments);
    }

    debug!(max_iterations, centroids = centroids.len(), "k-means hit iteration cap");
    Ok(centroids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn identity(v: &Vector) -> Vector {
        v.clone()
    }

    fn uniform(_: &Vector, _: usize) -> f64 {
        1.0
    }

    fn clumps() -> Vec<Vector> {
        let mut points = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f64 * 0.1;
            points.push(Vector::from([jitter, jitter, 0.0]));
            points.push(Vector::from([100.0 + jitter, 0.0, jitter]));
            points.push(Vector::from([0.0, 100.0 - jitter, 100.0]));
        }
        points
    }

    #[test]
    fn rejects_zero_centroids() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = find_centroids(&clumps(), 0, identity, uniform, KMeansOptions::default(), &mut rng);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn empty_or_weightless_input_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        let none: Vec<Vector> = Vec::new();
        let err = find_centroids(&none, 3, identity, uniform, KMeansOptions::default(), &mut rng);
        assert!(matches!(err, Err(Error::EmptyInput(_))));

        let err = find_centroids(&clumps(), 3, identity, |_, _| 0.0, KMeansOptions::default(), &mut rng);
        assert!(matches!(err, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn finds_separated_clumps() {
        let points = clumps();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let centroids =
                find_centroids(&points, 3, identity, uniform, KMeansOptions::default(), &mut rng).unwrap();
            assert_eq!(centroids.len(), 3);

            let expected = [
                Vector::from([0.2, 0.2, 0.0]),
                Vector::from([100.2, 0.0, 0.2]),
                Vector::from([0.0, 99.8, 100.0]),
            ];
            for e in &expected {
                assert!(centroids.nearest_distance(e) < 1e-9, "seed {seed}: {centroids:?}");
            }
        }
    }

    #[test]
    fn seeding_stops_when_points_coincide() {
        let points = vec![Vector::from([5.0, 5.0, 5.0]); 10];
        let mut rng = StdRng::seed_from_u64(7);
        let centroids =
            find_centroids(&points, 4, identity, uniform, KMeansOptions::default(), &mut rng).unwrap();
        assert_eq!(centroids.centroids(), &[Vector::from([5.0, 5.0, 5.0])]);
    }

    #[test]
    fn zero_weight_points_are_never_seeds() {
        let points = vec![
            Vector::from([0.0]),
            Vector::from([1.0]),
            Vector::from([1000.0]),
        ];
        let weights = [1.0, 1.0, 0.0];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let centroids = seed_centroids(&points, &weights, 3, &mut rng).unwrap();
            assert_eq!(centroids.len(), 2);
            assert!(!centroids.centroids().contains(&Vector::from([1000.0])));
        }
    }

    #[test]
    fn seeding_rejects_mismatched_weights() {
        let points = vec![Vector::from([0.0]), Vector::from([1.0])];
        let mut rng = StdRng::seed_from_u64(0);
        let err = seed_centroids(&points, &[0.0, 0.0, 1.0], 2, &mut rng);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
        let err = seed_centroids(&points, &[1.0], 2, &mut rng);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn single_centroid_is_weighted_mean() {
        struct Sample {
            color: Vector,
            weight: f64,
        }
        let samples = vec![
            Sample { color: Vector::from([0.0, 0.0, 0.0]), weight: 3.0 },
            Sample { color: Vector::from([4.0, 4.0, 4.0]), weight: 1.0 },
        ];
        let mut rng = StdRng::seed_from_u64(11);
        let centroids = find_centroids(
            &samples,
            1,
            |s| s.color.clone(),
            |s, _| s.weight,
            KMeansOptions::default(),
            &mut rng,
        )
        .unwrap();
        assert!(centroids.centroids()[0].squared_distance(&Vector::from([1.0, 1.0, 1.0])) < 1e-18);
    }

    #[test]
    fn converged_centroids_are_a_fixed_point() {
        let points = clumps();
        let mut rng = StdRng::seed_from_u64(5);
        let options = KMeansOptions::default();
        let centroids = find_centroids(&points, 3, identity, uniform, options, &mut rng).unwrap();
        let again = refine_centroids(&points, centroids.clone(), identity, uniform, options).unwrap();
        assert_eq!(centroids, again);
    }

    #[test]
    fn zero_iterations_returns_seeds() {
        let points = clumps();
        let options = KMeansOptions { max_iterations: 0 };
        let mut rng = StdRng::seed_from_u64(9);
        let centroids = find_centroids(&points, 3, identity, uniform, options, &mut rng).unwrap();
        for c in centroids.centroids() {
            assert!(points.contains(c));
        }
    }
}
