//! Colors, alignment, and text styling.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ValueError;

/// An sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase `RRGGBB`, the form `a:srgbClr/@val` expects.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// A color as callers send it: `[r, g, b]` or `"#RRGGBB"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ColorInput {
    /// Red, green, blue components, each 0-255.
    Components([i64; 3]),
    /// Hex string, `#RRGGBB` or `RRGGBB`.
    Hex(String),
}

impl ColorInput {
    pub fn to_rgb(&self) -> Result<Rgb, ValueError> {
        match self {
            ColorInput::Components([r, g, b]) => {
                let channel = |v: i64| {
                    u8::try_from(v).map_err(|_| {
                        ValueError::Color(format!("component {v} outside 0-255"))
                    })
                };
                Ok(Rgb::new(channel(*r)?, channel(*g)?, channel(*b)?))
            }
            ColorInput::Hex(s) => {
                Rgb::from_hex(s).ok_or_else(|| ValueError::Color(format!("'{s}' is not #RRGGBB")))
            }
        }
    }
}

impl From<Rgb> for ColorInput {
    fn from(c: Rgb) -> Self {
        ColorInput::Components([c.r as i64, c.g as i64, c.b as i64])
    }
}

/// Horizontal paragraph alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
pub enum Alignment {
    #[default]
    Left,
    #[strum(serialize = "center", serialize = "centre")]
    Center,
    Right,
    #[strum(serialize = "justify", serialize = "justified")]
    Justify,
}

impl Alignment {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s.trim()).ok()
    }

    /// Value of `a:pPr/@algn`.
    pub fn ooxml(&self) -> &'static str {
        match self {
            Alignment::Left => "l",
            Alignment::Center => "ctr",
            Alignment::Right => "r",
            Alignment::Justify => "just",
        }
    }
}

/// Run-level formatting applied to every run of a text body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Points.
    pub font_size: f64,
    pub font_name: String,
    pub color: Rgb,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 18.0,
            font_name: "Calibri".to_string(),
            color: Rgb::BLACK,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

impl TextStyle {
    pub fn with_size(mut self, points: f64) -> Self {
        self.font_size = points;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}
