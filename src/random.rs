// ------------------------------------------------------------
// Weighted random selection
// ------------------------------------------------------------

use rand::Rng;

/// Roulette-wheel selection: picks an index with probability proportional to
/// its weight.
///
/// Returns `None` when there is nothing to choose, i.e. the list is empty or
/// the total weight is zero (or not finite). Callers decide whether that is an
/// error.
pub fn choose_weighted<T, W, R>(items: &[T], mut weight_fn: W, rng: &mut R) -> Option<usize>
where
    W: FnMut(&T, usize) -> f64,
    R: Rng + ?Sized,
{
    let weights: Vec<f64> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| weight_fn(item, idx))
        .collect();
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let test_value = rng.random::<f64>() * total;
    let mut weight_so_far = 0.0;
    for (idx, weight) in weights.iter().enumerate() {
        weight_so_far += weight;
        if weight_so_far > test_value {
            return Some(idx);
        }
    }
    None
}
