// ------------------------------------------------------------
// Generation parameters
// ------------------------------------------------------------

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::emphasis::PointOfEmphasis;
use crate::error::{Error, Result};
use crate::grid::BoxGrid;
use crate::kmeans::{DEFAULT_MAX_ITERATIONS, KMeansOptions};

/// Every knob of a color-by-number generation.
///
/// Missing fields deserialize to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub boxes_wide: u32,
    pub boxes_high: u32,
    /// Upper bound on the number of palette colors.
    pub max_colors: usize,
    pub samples_per_box: u32,
    /// How many independent clustering runs to pick the best palette from.
    pub best_of_n: usize,
    /// Shown through transparent pixels.
    #[serde(with = "hex_color")]
    pub background_color: Srgb<u8>,
    /// `None` weakly emphasizes the image center.
    pub points_of_emphasis: Option<Vec<PointOfEmphasis>>,
    /// Prevalence bias for box color assignment. Higher values give smoother
    /// images, values near zero grainier ones.
    pub color_assignment_exponent: f64,
    pub max_iterations: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            boxes_wide: 40,
            boxes_high: 40,
            max_colors: 8,
            samples_per_box: 20,
            best_of_n: 3,
            background_color: Srgb::new(255, 255, 255),
            points_of_emphasis: None,
            color_assignment_exponent: 50.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl GenerationParams {
    pub fn grid(&self) -> BoxGrid {
        BoxGrid::new(self.boxes_wide, self.boxes_high)
    }

    /// The grid actually used on a `width` x `height` image: never more boxes
    /// than pixels along either axis.
    pub fn grid_for(&self, width: u32, height: u32) -> BoxGrid {
        self.grid().fit_to(width, height)
    }

    pub fn kmeans_options(&self) -> KMeansOptions {
        KMeansOptions { max_iterations: self.max_iterations }
    }

    /// Points of emphasis to use for an image of the given size.
    pub fn points_of_emphasis_for(&self, width: u32, height: u32) -> Vec<PointOfEmphasis> {
        match &self.points_of_emphasis {
            Some(points) => points.clone(),
            None => vec![PointOfEmphasis::centered(width, height)],
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.grid().validate()?;
        if self.samples_per_box == 0 {
            return Err(Error::invalid("samples_per_box must be a positive integer"));
        }
        if self.max_colors == 0 {
            return Err(Error::invalid("max_colors must be a positive integer"));
        }
        if self.best_of_n == 0 {
            return Err(Error::invalid("best_of_n must be a positive integer"));
        }
        if !self.color_assignment_exponent.is_finite() {
            return Err(Error::invalid("color_assignment_exponent must be finite"));
        }
        Ok(())
    }
}

mod hex_color {
    use palette::Srgb;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::color::{parse_hex, to_hex};

    pub fn serialize<S: Serializer>(color: &Srgb<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Srgb<u8>, D::Error> {
        let hex = String::deserialize(deserializer)?;
        parse_hex(&hex).map_err(D::Error::custom)
    }
}
