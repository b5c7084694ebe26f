use anyhow::{Context, Result, bail};
use clap::Parser;
use color_by_number_wasm::color::{parse_hex, to_hex, vector_to_rgb};
use color_by_number_wasm::sampling::average_colors;
use color_by_number_wasm::{AbortSignal, ColorByNumber, GenerationParams, PointOfEmphasis, Stage, generate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Turn images into color-by-number grids (native wrapper).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON file with generation parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of boxes across
    #[arg(long)]
    boxes_wide: Option<u32>,

    /// Number of boxes down
    #[arg(long)]
    boxes_high: Option<u32>,

    /// Maximum number of palette colors
    #[arg(short = 'k', long)]
    max_colors: Option<usize>,

    /// Random color samples taken from each box
    #[arg(long)]
    samples_per_box: Option<u32>,

    /// Keep the lowest-variance palette out of this many runs
    #[arg(long = "best-of")]
    best_of_n: Option<usize>,

    /// Hex color shown through transparent pixels
    #[arg(long)]
    background: Option<String>,

    /// Prevalence bias when assigning box colors (higher = smoother)
    #[arg(long)]
    bias: Option<f64>,

    /// Point of emphasis as "x,y,coefficient,exponent"; repeatable
    #[arg(long = "emphasis", value_parser = parse_emphasis)]
    emphasis: Vec<PointOfEmphasis>,

    /// Upper bound on k-means iterations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Also report the exact mean color of every box
    #[arg(long)]
    averaged: bool,

    /// Output directory
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Output filename prefix (ignored when --out-dir supplied)
    #[arg(short = 'p', long, default_value = "color_by_number_")]
    prefix: String,
}

fn parse_emphasis(s: &str) -> Result<PointOfEmphasis> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().with_context(|| format!("'{v}' is not a number")))
        .collect::<Result<Vec<_>>>()?;
    if values.len() != 4 {
        bail!("expected x,y,coefficient,exponent, got {} values", values.len());
    }
    let mut points = PointOfEmphasis::from_flat(&values)?;
    points.pop().context("no point of emphasis given")
}

#[derive(Serialize)]
struct Report<'a> {
    input: &'a Path,
    width: u32,
    height: u32,
    #[serde(flatten)]
    result: &'a ColorByNumber,
    palette_hex: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    averaged: Option<Vec<String>>,
}

impl Args {
    fn params(&self) -> Result<GenerationParams> {
        let mut params: GenerationParams = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => GenerationParams::default(),
        };

        if let Some(v) = self.boxes_wide {
            params.boxes_wide = v;
        }
        if let Some(v) = self.boxes_high {
            params.boxes_high = v;
        }
        if let Some(v) = self.max_colors {
            params.max_colors = v;
        }
        if let Some(v) = self.samples_per_box {
            params.samples_per_box = v;
        }
        if let Some(v) = self.best_of_n {
            params.best_of_n = v;
        }
        if let Some(hex) = &self.background {
            params.background_color = parse_hex(hex)?;
        }
        if let Some(v) = self.bias {
            params.color_assignment_exponent = v;
        }
        if !self.emphasis.is_empty() {
            params.points_of_emphasis = Some(self.emphasis.clone());
        }
        if let Some(v) = self.max_iterations {
            params.max_iterations = v;
        }

        params.validate()?;
        Ok(params)
    }

    fn out_path(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        match &self.out_dir {
            Some(dir) => dir.join(format!("{stem}.json")),
            None => PathBuf::from(format!("{}{stem}.json", self.prefix)),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let params = args.params().context("invalid generation parameters")?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let signal = AbortSignal::new();

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let image = image::load_from_memory(&bytes)
            .with_context(|| format!("decoding {}", input.display()))?
            .to_rgba8();
        let result = match generate(&image, &params, &signal, &mut rng)
            .with_context(|| format!("color-by-number processing failed for {}", input.display()))?
        {
            Stage::Completed(result) => result,
            Stage::Abandoned => bail!("generation was abandoned"),
        };

        let averaged = if args.averaged {
            let means = average_colors(&image, result.grid, params.background_color)?;
            Some(means.iter().map(|v| to_hex(vector_to_rgb(v))).collect())
        } else {
            None
        };

        let report = Report {
            input,
            width: image.width(),
            height: image.height(),
            result: &result,
            palette_hex: result.palette_hex(),
            averaged,
        };

        let out_path = args.out_path(input);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, serde_json::to_vec_pretty(&report)?)?;
        info!(colors = result.palette.len(), variance = result.palette.variance, "saved {}", out_path.display());
    }

    Ok(())
}
