// ------------------------------------------------------------
// Box grid geometry
// ------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vector::Vector;

/// The boxes-wide by boxes-high grid laid over the source image.
///
/// Boxes are numbered row by row: `row * boxes_wide + col`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxGrid {
    pub boxes_wide: u32,
    pub boxes_high: u32,
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }
}

impl BoxGrid {
    pub fn new(boxes_wide: u32, boxes_high: u32) -> Self {
        Self { boxes_wide, boxes_high }
    }

    pub fn len(&self) -> usize {
        self.boxes_wide as usize * self.boxes_high as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row_col(&self, box_index: usize) -> (u32, u32) {
        let wide = self.boxes_wide as usize;
        ((box_index / wide) as u32, (box_index % wide) as u32)
    }

    pub fn validate(&self) -> Result<()> {
        if self.boxes_wide == 0 || self.boxes_high == 0 {
            return Err(Error::invalid("boxes_wide and boxes_high must both be positive integers"));
        }
        Ok(())
    }

    /// Clamp each axis to `1..=pixels` so no box is narrower than a pixel.
    pub fn fit_to(&self, width: u32, height: u32) -> Self {
        Self {
            boxes_wide: self.boxes_wide.clamp(1, width.max(1)),
            boxes_high: self.boxes_high.clamp(1, height.max(1)),
        }
    }

    /// [`validate`](Self::validate), and additionally require at least one
    /// pixel per box along each axis.
    pub fn validate_for_image(&self, width: u32, height: u32) -> Result<()> {
        self.validate()?;
        if width == 0 || height == 0 {
            return Err(Error::invalid("image has no pixels"));
        }
        if self.boxes_wide > width || self.boxes_high > height {
            return Err(Error::invalid(format!(
                "a {}x{} grid does not fit a {width}x{height} image",
                self.boxes_wide, self.boxes_high
            )));
        }
        Ok(())
    }

    /// Pixels covered by a box. Every box covers at least one pixel, even
    /// when box edges fall between pixels.
    pub fn pixel_rect(&self, box_index: usize, width: u32, height: u32) -> PixelRect {
        let (row, col) = self.row_col(box_index);
        let box_w = width as f64 / self.boxes_wide as f64;
        let box_h = height as f64 / self.boxes_high as f64;

        let x0 = (col as f64 * box_w).ceil() as u32;
        let y0 = (row as f64 * box_h).ceil() as u32;
        let x1 = (((col + 1) as f64 * box_w).floor() as u32).max(x0 + 1);
        let y1 = (((row + 1) as f64 * box_h).floor() as u32).max(y0 + 1);
        PixelRect { x0, y0, x1, y1 }
    }

    /// Pixel-space center of a box.
    pub fn center(&self, box_index: usize, width: u32, height: u32) -> Vector {
        let (row, col) = self.row_col(box_index);
        Vector::from([
            (col as f64 + 0.5) * width as f64 / self.boxes_wide as f64,
            (row as f64 + 0.5) * height as f64 / self.boxes_high as f64,
        ])
    }
}
