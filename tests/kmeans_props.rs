use color_by_number_wasm::assign::assign_colors;
use color_by_number_wasm::kmeans::{KMeansOptions, find_centroids};
use color_by_number_wasm::mean::mean;
use color_by_number_wasm::variance::variance;
use color_by_number_wasm::{CentroidList, Vector};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn coords(v: &Vector) -> Vector {
    v.clone()
}

fn colors() -> impl Strategy<Value = Vec<Vector>> {
    prop::collection::vec((0u8..=255, 0u8..=255, 0u8..=255), 1..60)
        .prop_map(|c| c.into_iter().map(|(r, g, b)| Vector::from([r as f64, g as f64, b as f64])).collect())
}

proptest! {
    #[test]
    fn never_more_centroids_than_requested(points in colors(), k in 1usize..10, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let centroids = find_centroids(&points, k, coords, |_, _| 1.0, KMeansOptions::default(), &mut rng).unwrap();
        prop_assert!(centroids.len() >= 1);
        prop_assert!(centroids.len() <= k);
    }

    #[test]
    fn distinct_points_become_their_own_centroids(
        set in prop::collection::btree_set((-100i32..100, -100i32..100), 1..8),
        seed in any::<u64>(),
    ) {
        let points: Vec<Vector> = set.iter().map(|&(x, y)| Vector::from([x as f64, y as f64])).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let centroids = find_centroids(&points, points.len(), coords, |_, _| 1.0, KMeansOptions::default(), &mut rng).unwrap();

        let mut found: Vec<(i32, i32)> = centroids
            .centroids()
            .iter()
            .map(|c| (c[0] as i32, c[1] as i32))
            .collect();
        found.sort();
        let expected: Vec<(i32, i32)> = set.into_iter().collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn centroids_stay_inside_the_bounding_box(points in colors(), k in 1usize..6, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let centroids = find_centroids(&points, k, coords, |_, i| (i % 3 + 1) as f64, KMeansOptions::default(), &mut rng).unwrap();
        for c in centroids.centroids() {
            for axis in 0..3 {
                let lo = points.iter().map(|p| p[axis]).fold(f64::INFINITY, f64::min);
                let hi = points.iter().map(|p| p[axis]).fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(c[axis] >= lo - 1e-9 && c[axis] <= hi + 1e-9);
            }
        }
    }

    #[test]
    fn variance_is_non_negative(points in colors(), k in 1usize..6, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let centroids = find_centroids(&points, k, coords, |_, _| 1.0, KMeansOptions::default(), &mut rng).unwrap();
        let v = variance(&points, &centroids, coords, |_, _| 1.0).unwrap();
        prop_assert!(v >= 0.0);
        prop_assert!(v.is_finite());
    }

    #[test]
    fn integer_weights_match_duplication(points in colors(), reps in prop::collection::vec(1usize..4, 60)) {
        let weighted = mean(&points, |_, i| reps[i] as f64).unwrap();
        let duplicated: Vec<Vector> = points
            .iter()
            .enumerate()
            .flat_map(|(i, p)| std::iter::repeat_n(p.clone(), reps[i]))
            .collect();
        let plain = mean(&duplicated, |_, _| 1.0).unwrap();
        for axis in 0..3 {
            prop_assert!((weighted[axis] - plain[axis]).abs() < 1e-6);
        }
    }

    #[test]
    fn clustering_copies_matches_clustering_weights(
        points in colors(),
        reps in prop::collection::vec(1usize..4, 60),
        seed in any::<u64>(),
    ) {
        let duplicated: Vec<Vector> = points
            .iter()
            .enumerate()
            .flat_map(|(i, p)| std::iter::repeat_n(p.clone(), reps[i]))
            .collect();
        let options = KMeansOptions::default();
        let from_copies =
            find_centroids(&duplicated, 1, coords, |_, _| 1.0, options, &mut StdRng::seed_from_u64(seed)).unwrap();
        let from_weights =
            find_centroids(&points, 1, coords, |_, i| reps[i] as f64, options, &mut StdRng::seed_from_u64(seed)).unwrap();

        prop_assert_eq!(from_copies.len(), 1);
        prop_assert_eq!(from_weights.len(), 1);
        let d = from_copies.centroids()[0].squared_distance(&from_weights.centroids()[0]);
        prop_assert!(d < 1e-12, "{:?} vs {:?}", from_copies, from_weights);
    }

    #[test]
    fn assignments_index_into_the_palette(
        boxes in prop::collection::vec(colors(), 1..10),
        exponent in -5.0f64..60.0,
        seed in any::<u64>(),
    ) {
        let palette = CentroidList::new(vec![
            Vector::from([0.0, 0.0, 0.0]),
            Vector::from([255.0, 255.0, 255.0]),
            Vector::from([255.0, 0.0, 0.0]),
        ]).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let assignments = assign_colors(&boxes, &palette, exponent, &mut rng).unwrap();
        prop_assert_eq!(assignments.len(), boxes.len());
        for (samples, &idx) in boxes.iter().zip(&assignments) {
            // Only palette entries that some sample is nearest to can be drawn.
            prop_assert!(samples.iter().any(|s| palette.classify(s) == idx));
        }
    }
}
