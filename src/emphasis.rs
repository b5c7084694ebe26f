// ------------------------------------------------------------
// Spatial emphasis weighting
// ------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::BoxGrid;
use crate::vector::Vector;

const DEFAULT_COEFFICIENT: f64 = 1.0;
const DEFAULT_EXPONENT: f64 = 0.4;

/// A spatial location whose surroundings get extra (or less) say when
/// resolving the palette.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointOfEmphasis {
    /// Pixels from the left edge of the image.
    pub x: f64,
    /// Pixels from the top edge of the image.
    pub y: f64,
    /// How much emphasis the point carries. Non-positive values disable it.
    pub coefficient: f64,
    /// How tightly the emphasis concentrates around the point. Negative values
    /// make emphasis grow with distance; zero disables the point.
    pub exponent: f64,
}

impl PointOfEmphasis {
    /// Weak emphasis on the center of a `width` x `height` image.
    pub fn centered(width: u32, height: u32) -> Self {
        Self {
            x: width as f64 / 2.0,
            y: height as f64 / 2.0,
            coefficient: DEFAULT_COEFFICIENT,
            exponent: DEFAULT_EXPONENT,
        }
    }

    /// Read points packed as `[x, y, coefficient, exponent, x, y, ...]`.
    pub fn from_flat(values: &[f64]) -> Result<Vec<Self>> {
        let chunks = values.chunks_exact(4);
        if !chunks.remainder().is_empty() {
            return Err(Error::invalid(format!(
                "points of emphasis come in groups of 4 numbers, got {}",
                values.len()
            )));
        }
        Ok(chunks
            .map(|c| Self { x: c[0], y: c[1], coefficient: c[2], exponent: c[3] })
            .collect())
    }

    pub fn is_effective(&self) -> bool {
        self.coefficient > 0.0 && self.exponent != 0.0
    }

    /// Contribution of this point to the weight of something at `location`.
    ///
    /// Works on squared distance, so the exponent is halved; one is added so
    /// the base stays positive at distance zero.
    pub fn weight_at(&self, location: &Vector) -> f64 {
        let squared = location.squared_distance(&Vector::from([self.x, self.y]));
        self.coefficient * (squared + 1.0).powf(-self.exponent / 2.0)
    }
}

/// Clustering weight of every box, row-major.
///
/// Effective points combine additively. With no effective points every box
/// weighs 1.
pub fn box_weights(width: u32, height: u32, grid: BoxGrid, points: &[PointOfEmphasis]) -> Vec<f64> {
    let effective: Vec<&PointOfEmphasis> = points.iter().filter(|p| p.is_effective()).collect();
    if effective.is_empty() {
        return vec![1.0; grid.len()];
    }

    (0..grid.len())
        .map(|box_index| {
            let center = grid.center(box_index, width, height);
            effective.iter().map(|p| p.weight_at(&center)).sum()
        })
        .collect()
}
