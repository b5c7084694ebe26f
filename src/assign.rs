// ------------------------------------------------------------
// Box color assignment
// ------------------------------------------------------------

use rand::Rng;

use crate::centroids::CentroidList;
use crate::error::{Error, Result};
use crate::random::choose_weighted;
use crate::vector::Vector;

/// Choose a palette index for a single box.
///
/// Rather than always taking the most common color among the box's samples,
/// the choice is a weighted draw over the palette entries that were observed,
/// where an entry seen `n` times weighs `n^exponent`:
///
/// * `0` gives every observed entry the same chance,
/// * `1` makes the chance linear in the number of occurrences,
/// * larger values approach "most common wins",
/// * negative values favor the rarer observations.
///
/// Fails with [`Error::InvalidArgument`] when `samples_for_box` is empty.
pub fn assign_color_to_box<R>(
    samples_for_box: &[Vector],
    palette: &CentroidList,
    exponent: f64,
    rng: &mut R,
) -> Result<usize>
where
    R: Rng + ?Sized,
{
    let mut occurrences = vec![0u32; palette.len()];
    for sample in samples_for_box {
        occurrences[palette.classify(sample)] += 1;
    }

    // Normalizing by the largest (or, for negative exponents, the smallest)
    // count keeps every weight in (0, 1] without changing their ratios.
    let observed = occurrences.iter().copied().filter(|&n| n > 0);
    let reference = if exponent >= 0.0 { observed.max() } else { observed.min() };
    let Some(reference) = reference else {
        return Err(Error::invalid("the samples for a box must contain at least one sample"));
    };
    let reference = reference as f64;

    choose_weighted(
        &occurrences,
        |&n, _| if n > 0 { (n as f64 / reference).powf(exponent) } else { 0.0 },
        rng,
    )
    .ok_or_else(|| Error::invalid("no palette entry was eligible for the box"))
}

/// [`assign_color_to_box`] for every box, in order.
pub fn assign_colors<R>(
    sampled_colors: &[Vec<Vector>],
    palette: &CentroidList,
    exponent: f64,
    rng: &mut R,
) -> Result<Vec<usize>>
where
    R: Rng + ?Sized,
{
    sampled_colors
        .iter()
        .map(|samples| assign_color_to_box(samples, palette, exponent, rng))
        .collect()
}
