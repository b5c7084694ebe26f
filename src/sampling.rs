// ------------------------------------------------------------
// Per-box color observations
// ------------------------------------------------------------

use image::RgbaImage;
use palette::{Srgb, Srgba};
use rand::Rng;

use crate::color::composite;
use crate::error::{Error, Result};
use crate::grid::BoxGrid;
use crate::mean::grouped_means;
use crate::vector::Vector;

/// Sampled colors, one list per box, boxes in row-major order.
pub type SampledColors = Vec<Vec<Vector>>;

#[inline(always)]
fn read_pixel(image: &RgbaImage, x: u32, y: u32) -> Srgba<u8> {
    let [r, g, b, a] = image.get_pixel(x, y).0;
    Srgba::new(r, g, b, a)
}

/// Draw `samples_per_box` random pixels from every box of `grid` and composite
/// each one over `background`.
///
/// Pixels are drawn independently; the same pixel may be sampled more than
/// once.
pub fn sample_colors<R>(
    image: &RgbaImage,
    grid: BoxGrid,
    samples_per_box: u32,
    background: Srgb<u8>,
    rng: &mut R,
) -> Result<SampledColors>
where
    R: Rng + ?Sized,
{
    grid.validate_for_image(image.width(), image.height())?;
    if samples_per_box == 0 {
        return Err(Error::invalid("samples_per_box must be a positive integer"));
    }

    let samples = (0..grid.len())
        .map(|box_index| {
            let rect = grid.pixel_rect(box_index, image.width(), image.height());
            (0..samples_per_box)
                .map(|_| {
                    let x = rng.random_range(rect.x0..rect.x1);
                    let y = rng.random_range(rect.y0..rect.y1);
                    composite(read_pixel(image, x, y), background)
                })
                .collect()
        })
        .collect();
    Ok(samples)
}

/// Exact mean color of every box, computed over all of its pixels in one
/// grouped pass.
pub fn average_colors(image: &RgbaImage, grid: BoxGrid, background: Srgb<u8>) -> Result<Vec<Vector>> {
    let (width, height) = image.dimensions();
    grid.validate_for_image(width, height)?;

    let pixels: Vec<Vector> = image
        .enumerate_pixels()
        .map(|(_, _, p)| {
            let [r, g, b, a] = p.0;
            composite(Srgba::new(r, g, b, a), background)
        })
        .collect();

    let box_of = |idx: usize| {
        let (x, y) = ((idx % width as usize) as u64, (idx / width as usize) as u64);
        let row = y * grid.boxes_high as u64 / height as u64;
        let col = x * grid.boxes_wide as u64 / width as u64;
        (row * grid.boxes_wide as u64 + col) as usize
    };
    let mut means = grouped_means(&pixels, |_, idx| box_of(idx), |_, _| 1.0);

    (0..grid.len())
        .map(|box_index| means.remove(&box_index).ok_or(Error::EmptyInput("box covers no pixels")))
        .collect()
}
