/// Value types for colours, strokes and fonts
use std::fmt;
use std::str::FromStr;

use crate::error::ChartError;

pub mod codec;

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Color = Color::rgb(192, 192, 192);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Scales the colour channels, keeping alpha.
    pub fn shade(&self, factor: f64) -> Self {
        let scale = |c: u8| (c as f64 * factor).round().clamp(0.0, 255.0) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }

    /// Relative luminance in `[0, 1]`.
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub dash: Vec<f32>,
    pub dash_phase: f32,
}

impl Stroke {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            cap: LineCap::Square,
            join: LineJoin::Miter,
            dash: Vec::new(),
            dash_phase: 0.0,
        }
    }

    pub fn dashed(width: f32, dash: Vec<f32>) -> Self {
        Self {
            width,
            cap: LineCap::Round,
            join: LineJoin::Round,
            dash,
            dash_phase: 0.0,
        }
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub bold: bool,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32, bold: bool) -> Self {
        Self {
            family: family.into(),
            size,
            bold,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Dialog", 12.0, false)
    }
}

macro_rules! text_codec {
    ($ty:ty, $encode:path, $decode:path) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&$encode(self))
            }
        }

        impl FromStr for $ty {
            type Err = ChartError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $decode(s)
            }
        }
    };
}

text_codec!(Color, codec::encode_color, codec::decode_color);
text_codec!(Stroke, codec::encode_stroke, codec::decode_stroke);
text_codec!(Font, codec::encode_font, codec::decode_font);
