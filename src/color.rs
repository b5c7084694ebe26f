// ------------------------------------------------------------
// Color conversions (0-255 units per channel)
// ------------------------------------------------------------

use std::str::FromStr;

use palette::{Srgb, Srgba};

use crate::error::{Error, Result};
use crate::vector::Vector;

/// Composite a straight-alpha pixel over an opaque background.
///
/// `result = alpha / 255 * color + (1 - alpha / 255) * background`
pub fn composite(pixel: Srgba<u8>, background: Srgb<u8>) -> Vector {
    let a = pixel.alpha as f64 / 255.0;
    let blend = |c: u8, bg: u8| a * c as f64 + (1.0 - a) * bg as f64;
    Vector::from([
        blend(pixel.red, background.red),
        blend(pixel.green, background.green),
        blend(pixel.blue, background.blue),
    ])
}

pub fn rgb_to_vector(color: Srgb<u8>) -> Vector {
    Vector::from([color.red as f64, color.green as f64, color.blue as f64])
}

/// Nearest displayable color for a (possibly fractional) RGB vector.
pub fn vector_to_rgb(v: &Vector) -> Srgb<u8> {
    let channel = |axis: usize| v.coord(axis).round().clamp(0.0, 255.0) as u8;
    Srgb::new(channel(0), channel(1), channel(2))
}

/// Parse `#rgb` / `#rrggbb`, with or without the leading `#`.
pub fn parse_hex(hex: &str) -> Result<Srgb<u8>> {
    Srgb::from_str(hex.trim()).map_err(|e| Error::Color(format!("'{hex}': {e}")))
}

pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_transparent_red_over_white() {
        let v = composite(Srgba::new(255, 0, 0, 128), Srgb::new(255, 255, 255));
        // 128/255 is a hair over one half.
        assert!((v[0] - 255.0).abs() < 1e-9);
        assert!((v[1] - 127.5).abs() < 0.6);
        assert!((v[2] - 127.5).abs() < 0.6);
    }

    #[test]
    fn opaque_and_transparent_extremes() {
        let bg = Srgb::new(10, 20, 30);
        assert_eq!(composite(Srgba::new(200, 100, 50, 255), bg), Vector::from([200.0, 100.0, 50.0]));
        assert_eq!(composite(Srgba::new(200, 100, 50, 0), bg), Vector::from([10.0, 20.0, 30.0]));
    }

    #[test]
    fn hex_round_trip_and_short_form() {
        assert_eq!(parse_hex("#fff").unwrap(), Srgb::new(255, 255, 255));
        assert_eq!(parse_hex("2753ca").unwrap(), Srgb::new(0x27, 0x53, 0xca));
        assert_eq!(to_hex(Srgb::new(0x27, 0x53, 0xca)), "#2753ca");
        assert!(matches!(parse_hex("#12345"), Err(Error::Color(_))));
    }

    #[test]
    fn vectors_round_and_clamp() {
        assert_eq!(vector_to_rgb(&Vector::from([127.5, -3.0, 300.0])), Srgb::new(128, 0, 255));
    }
}
