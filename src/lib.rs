use image::RgbaImage;
use js_sys::{Array, Object, Reflect, Uint32Array};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

pub mod assign;
pub mod centroids;
pub mod color;
pub mod config;
pub mod emphasis;
pub mod error;
pub mod grid;
pub mod kmeans;
pub mod mean;
pub mod pipeline;
pub mod random;
pub mod resolve;
pub mod sampling;
pub mod session;
pub mod variance;
pub mod vector;

pub use centroids::CentroidList;
pub use config::GenerationParams;
pub use emphasis::PointOfEmphasis;
pub use error::{Error, Result};
pub use grid::BoxGrid;
pub use pipeline::{AbortSignal, ColorByNumber, Stage, generate};
pub use resolve::ResolvedPalette;
pub use session::Session;
pub use vector::Vector;

#[inline(always)]
fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Turn raw RGBA pixels into a color-by-number.
///
/// `points_of_emphasis` packs `[x, y, coefficient, exponent]` per point. Pass
/// `undefined` to weakly emphasize the image center, or an empty array to
/// weigh every box the same.
///
/// Resolves to `{ palette: string[], assignments: Uint32Array, variance,
/// boxesWide, boxesHigh }`, with one row-major palette index per box.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn generate_color_by_number(
    rgba: Vec<u8>,
    width: u32,
    height: u32,
    boxes_wide: u32,
    boxes_high: u32,
    max_colors: usize,
    samples_per_box: u32,
    best_of_n: usize,
    background: String,
    color_assignment_exponent: f64,
    points_of_emphasis: Option<Vec<f64>>,
) -> std::result::Result<Object, JsValue> {
    // ----------------------
    // 1. Validate inputs
    // ----------------------
    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| JsValue::from_str("pixel buffer does not match width * height * 4"))?;
    let params = GenerationParams {
        boxes_wide,
        boxes_high,
        max_colors,
        samples_per_box,
        best_of_n,
        background_color: color::parse_hex(&background).map_err(js_err)?,
        points_of_emphasis: points_of_emphasis
            .as_deref()
            .map(PointOfEmphasis::from_flat)
            .transpose()
            .map_err(js_err)?,
        color_assignment_exponent,
        ..Default::default()
    };

    // ----------------------
    // 2. Generate
    // ----------------------
    let mut rng = StdRng::from_os_rng();
    let result = generate(&image, &params, &AbortSignal::new(), &mut rng)
        .map_err(js_err)?
        .completed()
        .ok_or_else(|| JsValue::from_str("generation was abandoned"))?;

    // ----------------------
    // 3. Convert to JS types
    // ----------------------
    let palette_js = Array::new();
    for hex in result.palette_hex() {
        palette_js.push(&JsValue::from_str(&hex));
    }
    let indices: Vec<u32> = result.assignments.iter().map(|&i| i as u32).collect();
    let assignments_js = Uint32Array::from(indices.as_slice());

    let out = Object::new();
    Reflect::set(&out, &JsValue::from_str("palette"), &palette_js)?;
    Reflect::set(&out, &JsValue::from_str("assignments"), &assignments_js)?;
    Reflect::set(&out, &JsValue::from_str("variance"), &JsValue::from_f64(result.palette.variance))?;
    Reflect::set(&out, &JsValue::from_str("boxesWide"), &JsValue::from(result.grid.boxes_wide))?;
    Reflect::set(&out, &JsValue::from_str("boxesHigh"), &JsValue::from(result.grid.boxes_high))?;

    Ok(out)
}

/// Decode an encoded image (PNG, JPEG, ...) and run the whole pipeline on it.
#[cfg(not(target_arch = "wasm32"))]
pub fn generate_from_bytes<R>(
    input: &[u8],
    params: &GenerationParams,
    signal: &AbortSignal,
    rng: &mut R,
) -> Result<Stage<ColorByNumber>>
where
    R: rand::Rng + ?Sized,
{
    let image = image::load_from_memory(input)?.to_rgba8();
    generate(&image, params, signal, rng)
}
