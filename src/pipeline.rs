// ------------------------------------------------------------
// Stage orchestration: sample -> resolve (best of N) -> assign
// ------------------------------------------------------------

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::assign::assign_colors;
use crate::config::GenerationParams;
use crate::error::{Error, Result};
use crate::grid::BoxGrid;
use crate::resolve::{ResolveRequest, ResolvedPalette, best_of, resolve_palette};
use crate::sampling::{SampledColors, sample_colors};
use crate::vector::Vector;

/// Shared flag telling in-flight stages that their inputs went stale.
#[derive(Clone, Debug, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Outcome of a stage that may be abandoned. Abandonment is not a failure.
#[derive(Clone, Debug, PartialEq)]
pub enum Stage<T> {
    Completed(T),
    Abandoned,
}

impl<T> Stage<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Stage::Completed(value) => Some(value),
            Stage::Abandoned => None,
        }
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, Stage::Abandoned)
    }
}

/// A finished color-by-number: the palette plus one palette index per box.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColorByNumber {
    pub grid: BoxGrid,
    pub palette: ResolvedPalette,
    /// Row-major palette index of every box.
    pub assignments: Vec<usize>,
}

impl ColorByNumber {
    pub fn palette_hex(&self) -> Vec<String> {
        self.palette.hex()
    }
}

fn finish<T>(signal: &AbortSignal, stage: &'static str, value: T) -> Stage<T> {
    if signal.is_aborted() {
        debug!(stage, "discarding result of abandoned stage");
        Stage::Abandoned
    } else {
        Stage::Completed(value)
    }
}

pub fn sample_stage<R>(
    image: &RgbaImage,
    params: &GenerationParams,
    signal: &AbortSignal,
    rng: &mut R,
) -> Result<Stage<SampledColors>>
where
    R: Rng + ?Sized,
{
    if signal.is_aborted() {
        return Ok(Stage::Abandoned);
    }
    let grid = params.grid_for(image.width(), image.height());
    let samples = sample_colors(image, grid, params.samples_per_box, params.background_color, rng)?;
    info!(boxes = samples.len(), per_box = params.samples_per_box, "sampled colors");
    Ok(finish(signal, "sample", samples))
}

/// Run `best_of_n` independent clustering attempts and keep the one with the
/// lowest variance.
///
/// Every attempt gets its own generator seeded from `rng`, so the outcome
/// does not depend on how attempts are scheduled.
pub fn resolve_stage<R>(
    image_width: u32,
    image_height: u32,
    sampled_colors: &[Vec<Vector>],
    params: &GenerationParams,
    signal: &AbortSignal,
    rng: &mut R,
) -> Result<Stage<ResolvedPalette>>
where
    R: Rng + ?Sized,
{
    params.validate()?;
    if signal.is_aborted() {
        return Ok(Stage::Abandoned);
    }

    let points = params.points_of_emphasis_for(image_width, image_height);
    let request = ResolveRequest {
        sampled_colors,
        image_width,
        image_height,
        grid: params.grid_for(image_width, image_height),
        max_colors: params.max_colors,
        points_of_emphasis: &points,
        options: params.kmeans_options(),
    };
    let seeds: Vec<u64> = (0..params.best_of_n).map(|_| rng.random()).collect();

    let attempt = |seed: u64| {
        if signal.is_aborted() {
            return None;
        }
        Some(resolve_palette(&request, &mut StdRng::seed_from_u64(seed)))
    };
    #[cfg(not(target_arch = "wasm32"))]
    let attempts: Vec<Option<Result<ResolvedPalette>>> = seeds.into_par_iter().map(attempt).collect();
    #[cfg(target_arch = "wasm32")]
    let attempts: Vec<Option<Result<ResolvedPalette>>> = seeds.into_iter().map(attempt).collect();

    if signal.is_aborted() {
        debug!("palette resolution abandoned");
        return Ok(Stage::Abandoned);
    }
    let palettes = attempts.into_iter().flatten().collect::<Result<Vec<_>>>()?;

    let mut variances: Vec<f64> = palettes.iter().map(|p| p.variance).collect();
    variances.sort_by(f64::total_cmp);
    debug!(?variances, "choosing best palette");

    let best = best_of(palettes).ok_or_else(|| Error::invalid("best_of_n must be a positive integer"))?;
    info!(colors = best.len(), variance = best.variance, "resolved palette");
    Ok(Stage::Completed(best))
}

pub fn assign_stage<R>(
    sampled_colors: &[Vec<Vector>],
    palette: &ResolvedPalette,
    exponent: f64,
    signal: &AbortSignal,
    rng: &mut R,
) -> Result<Stage<Vec<usize>>>
where
    R: Rng + ?Sized,
{
    if signal.is_aborted() {
        return Ok(Stage::Abandoned);
    }
    let assignments = assign_colors(sampled_colors, &palette.colors, exponent, rng)?;
    info!(boxes = assignments.len(), exponent, "assigned colors");
    Ok(finish(signal, "assign", assignments))
}

/// Sample, resolve and assign in order. Each stage only starts once the one
/// before it has completed.
pub fn generate<R>(
    image: &RgbaImage,
    params: &GenerationParams,
    signal: &AbortSignal,
    rng: &mut R,
) -> Result<Stage<ColorByNumber>>
where
    R: Rng + ?Sized,
{
    params.validate()?;

    let Stage::Completed(samples) = sample_stage(image, params, signal, rng)? else {
        return Ok(Stage::Abandoned);
    };
    let Stage::Completed(palette) =
        resolve_stage(image.width(), image.height(), &samples, params, signal, rng)?
    else {
        return Ok(Stage::Abandoned);
    };
    let Stage::Completed(assignments) =
        assign_stage(&samples, &palette, params.color_assignment_exponent, signal, rng)?
    else {
        return Ok(Stage::Abandoned);
    };

    Ok(Stage::Completed(ColorByNumber {
        grid: params.grid_for(image.width(), image.height()),
        palette,
        assignments,
    }))
}
