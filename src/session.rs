// ------------------------------------------------------------
// Memoized generation state for one image
// ------------------------------------------------------------

use image::RgbaImage;
use rand::Rng;
use tracing::debug;

use crate::config::GenerationParams;
use crate::error::Result;
use crate::pipeline::{AbortSignal, ColorByNumber, Stage, assign_stage, resolve_stage, sample_stage};
use crate::resolve::ResolvedPalette;
use crate::sampling::SampledColors;

/// Samples, palette and assignments memoized for one image.
///
/// The palette and the assignments are random, so they are kept as the
/// user's choice until one of their inputs changes or the caller asks for a
/// fresh draw. Changing a parameter drops exactly the stages that depend on
/// it:
///
/// | changed                                               | dropped                       |
/// |-------------------------------------------------------|-------------------------------|
/// | effective grid, samples per box, background color     | samples, palette, assignments |
/// | max colors, best of N, points of emphasis, iterations | palette, assignments          |
/// | color assignment exponent                             | assignments                   |
pub struct Session<R> {
    image: RgbaImage,
    params: GenerationParams,
    sampled_colors: Option<SampledColors>,
    palette: Option<ResolvedPalette>,
    assignments: Option<Vec<usize>>,
    rng: R,
}

impl<R: Rng> Session<R> {
    pub fn new(image: RgbaImage, params: GenerationParams, rng: R) -> Result<Self> {
        params.validate()?;
        let (width, height) = image.dimensions();
        params.grid_for(width, height).validate_for_image(width, height)?;
        Ok(Self {
            image,
            params,
            sampled_colors: None,
            palette: None,
            assignments: None,
            rng,
        })
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn sampled_colors(&self) -> Option<&SampledColors> {
        self.sampled_colors.as_ref()
    }

    pub fn palette(&self) -> Option<&ResolvedPalette> {
        self.palette.as_ref()
    }

    pub fn assignments(&self) -> Option<&[usize]> {
        self.assignments.as_deref()
    }

    /// Edit the parameters. Nothing changes if the edited parameters are
    /// invalid.
    pub fn update<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut GenerationParams),
    {
        let mut next = self.params.clone();
        edit(&mut next);
        next.validate()?;
        let (width, height) = self.image.dimensions();
        next.grid_for(width, height).validate_for_image(width, height)?;

        let prev = std::mem::replace(&mut self.params, next);
        let next = &self.params;
        if prev.grid_for(width, height) != next.grid_for(width, height)
            || prev.samples_per_box != next.samples_per_box
            || prev.background_color != next.background_color
        {
            self.invalidate_samples();
        } else if prev.max_colors != next.max_colors
            || prev.best_of_n != next.best_of_n
            || prev.points_of_emphasis != next.points_of_emphasis
            || prev.max_iterations != next.max_iterations
        {
            self.invalidate_palette();
        } else if prev.color_assignment_exponent != next.color_assignment_exponent {
            self.invalidate_assignments();
        }
        Ok(())
    }

    /// Drop the memoized palette so the next render resolves a new one.
    pub fn regenerate_palette(&mut self) {
        self.invalidate_palette();
    }

    /// Drop the memoized assignments so the next render draws new ones.
    pub fn regenerate_assignments(&mut self) {
        self.invalidate_assignments();
    }

    fn invalidate_samples(&mut self) {
        debug!("invalidating sampled colors");
        self.sampled_colors = None;
        self.invalidate_palette();
    }

    fn invalidate_palette(&mut self) {
        self.palette = None;
        self.invalidate_assignments();
    }

    fn invalidate_assignments(&mut self) {
        self.assignments = None;
    }

    /// Compute whatever is missing and return the current color-by-number.
    ///
    /// When a stage is abandoned, the stages before it stay memoized.
    pub fn render(&mut self, signal: &AbortSignal) -> Result<Stage<ColorByNumber>> {
        let samples = match self.sampled_colors.take() {
            Some(samples) => samples,
            None => match sample_stage(&self.image, &self.params, signal, &mut self.rng)? {
                Stage::Completed(samples) => samples,
                Stage::Abandoned => return Ok(Stage::Abandoned),
            },
        };
        let samples = self.sampled_colors.insert(samples);

        let palette = match self.palette.take() {
            Some(palette) => palette,
            None => {
                let (width, height) = self.image.dimensions();
                match resolve_stage(width, height, samples, &self.params, signal, &mut self.rng)? {
                    Stage::Completed(palette) => palette,
                    Stage::Abandoned => return Ok(Stage::Abandoned),
                }
            }
        };
        let palette = self.palette.insert(palette);

        let assignments = match self.assignments.take() {
            Some(assignments) => assignments,
            None => {
                let exponent = self.params.color_assignment_exponent;
                match assign_stage(samples, palette, exponent, signal, &mut self.rng)? {
                    Stage::Completed(assignments) => assignments,
                    Stage::Abandoned => return Ok(Stage::Abandoned),
                }
            }
        };
        let assignments = self.assignments.insert(assignments);

        Ok(Stage::Completed(ColorByNumber {
            grid: self.params.grid_for(self.image.width(), self.image.height()),
            palette: palette.clone(),
            assignments: assignments.clone(),
        }))
    }
}
