// ------------------------------------------------------------
// Palette resolution: weighted k-means++ over every sample
// ------------------------------------------------------------

use palette::Srgb;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::centroids::CentroidList;
use crate::color::{to_hex, vector_to_rgb};
use crate::emphasis::{PointOfEmphasis, box_weights};
use crate::error::{Error, Result};
use crate::grid::BoxGrid;
use crate::kmeans::{KMeansOptions, find_centroids};
use crate::variance::variance;
use crate::vector::Vector;

/// Output of one clustering attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedPalette {
    pub colors: CentroidList,
    /// Weighted mean squared distance of the samples to this palette.
    pub variance: f64,
}

impl ResolvedPalette {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn rgb(&self) -> Vec<Srgb<u8>> {
        self.colors.centroids().iter().map(vector_to_rgb).collect()
    }

    pub fn hex(&self) -> Vec<String> {
        self.rgb().into_iter().map(to_hex).collect()
    }
}

/// Everything a single resolution attempt needs besides randomness.
#[derive(Clone, Copy, Debug)]
pub struct ResolveRequest<'a> {
    pub sampled_colors: &'a [Vec<Vector>],
    pub image_width: u32,
    pub image_height: u32,
    pub grid: BoxGrid,
    pub max_colors: usize,
    pub points_of_emphasis: &'a [PointOfEmphasis],
    pub options: KMeansOptions,
}

struct WeightedSample<'a> {
    color: &'a Vector,
    box_index: usize,
}

/// Run the clustering once and score the result.
pub fn resolve_palette<R>(request: &ResolveRequest<'_>, rng: &mut R) -> Result<ResolvedPalette>
where
    R: Rng + ?Sized,
{
    if request.sampled_colors.len() != request.grid.len() {
        return Err(Error::invalid(format!(
            "expected samples for {} boxes, got {}",
            request.grid.len(),
            request.sampled_colors.len()
        )));
    }
    let weights = box_weights(
        request.image_width,
        request.image_height,
        request.grid,
        request.points_of_emphasis,
    );
    let samples: Vec<WeightedSample<'_>> = request
        .sampled_colors
        .iter()
        .enumerate()
        .flat_map(|(box_index, colors)| colors.iter().map(move |color| WeightedSample { color, box_index }))
        .collect();

    let coords_fn = |s: &WeightedSample| s.color.clone();
    let weight_fn = |s: &WeightedSample, _: usize| weights[s.box_index];

    let colors = find_centroids(&samples, request.max_colors, coords_fn, weight_fn, request.options, rng)?;
    let variance = variance(&samples, &colors, coords_fn, weight_fn)?;
    debug!(colors = colors.len(), variance, "resolved palette");
    Ok(ResolvedPalette { colors, variance })
}

/// Lowest-variance palette among `candidates`. Earlier candidates win ties.
///
/// Palette sizes are not compared: a run that seeded fewer colors can still
/// win.
pub fn best_of<I>(candidates: I) -> Option<ResolvedPalette>
where
    I: IntoIterator<Item = ResolvedPalette>,
{
    candidates
        .into_iter()
        .reduce(|best, next| if next.variance < best.variance { next } else { best })
}
