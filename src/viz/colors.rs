//! Random chart colors
//!
//! Each call yields an independent HSL color with a uniformly random hue and
//! fixed saturation (70%) and lightness (60%). Nothing is memoized, so
//! re-rendering the same data gives different colors.

use serde::{Serialize, Serializer};
use std::fmt;

pub const SATURATION: u8 = 70;
pub const LIGHTNESS: u8 = 60;

/// A hue/saturation/lightness triple; saturation and lightness in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HslColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl HslColor {
    /// Chart color with the fixed saturation/lightness
    pub fn from_hue(hue: u16) -> Self {
        HslColor {
            hue: hue % 360,
            saturation: SATURATION,
            lightness: LIGHTNESS,
        }
    }

    /// Convert to RGB for terminals that cannot take CSS colors
    pub fn to_rgb(&self) -> [u8; 3] {
        let s = self.saturation as f64 / 100.0;
        let l = self.lightness as f64 / 100.0;
        let h = self.hue as f64 / 60.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u16 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        [
            ((r + m) * 255.0).round() as u8,
            ((g + m) * 255.0).round() as u8,
            ((b + m) * 255.0).round() as u8,
        ]
    }
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl Serialize for HslColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Source of chart colors
///
/// Counts the colors it has produced so callers can check that no color work
/// happened on paths that must not generate any.
#[derive(Debug)]
pub struct ColorGenerator {
    rng: fastrand::Rng,
    generated: usize,
}

impl Default for ColorGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorGenerator {
    pub fn new() -> Self {
        ColorGenerator {
            rng: fastrand::Rng::new(),
            generated: 0,
        }
    }

    /// Deterministic generator
    pub fn with_seed(seed: u64) -> Self {
        ColorGenerator {
            rng: fastrand::Rng::with_seed(seed),
            generated: 0,
        }
    }

    /// One color, hue drawn uniformly from [0, 360)
    pub fn next_color(&mut self) -> HslColor {
        self.generated += 1;
        HslColor::from_hue(self.rng.u16(0..360))
    }

    /// `count` independent colors
    pub fn colors(&mut self, count: usize) -> Vec<HslColor> {
        (0..count).map(|_| self.next_color()).collect()
    }

    /// Total colors produced so far
    pub fn generated(&self) -> usize {
        self.generated
    }
}
