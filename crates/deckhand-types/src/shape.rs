//! Auto shape vocabulary.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Preset geometries accepted by `add_shape`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeType {
    Rectangle,
    RoundedRectangle,
    #[strum(serialize = "OVAL", serialize = "ELLIPSE")]
    Oval,
    #[strum(serialize = "ISOSCELES_TRIANGLE", serialize = "TRIANGLE")]
    IsoscelesTriangle,
    RightTriangle,
    Diamond,
    #[strum(serialize = "PENTAGON", serialize = "REGULAR_PENTAGON")]
    Pentagon,
    Hexagon,
    Octagon,
    #[serde(rename = "STAR_5_POINT")]
    #[strum(serialize = "STAR_5_POINT", serialize = "STAR")]
    Star5Point,
    #[strum(serialize = "RIGHT_ARROW", serialize = "ARROW")]
    RightArrow,
    LeftArrow,
    UpArrow,
    DownArrow,
    Chevron,
    Heart,
    Cloud,
    LightningBolt,
    Donut,
    Can,
    Cube,
}

impl ShapeType {
    pub const ALL: [ShapeType; 21] = [
        ShapeType::Rectangle,
        ShapeType::RoundedRectangle,
        ShapeType::Oval,
        ShapeType::IsoscelesTriangle,
        ShapeType::RightTriangle,
        ShapeType::Diamond,
        ShapeType::Pentagon,
        ShapeType::Hexagon,
        ShapeType::Octagon,
        ShapeType::Star5Point,
        ShapeType::RightArrow,
        ShapeType::LeftArrow,
        ShapeType::UpArrow,
        ShapeType::DownArrow,
        ShapeType::Chevron,
        ShapeType::Heart,
        ShapeType::Cloud,
        ShapeType::LightningBolt,
        ShapeType::Donut,
        ShapeType::Can,
        ShapeType::Cube,
    ];

    /// Parse from string (case-insensitive, surrounding whitespace ignored).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s.trim()).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Rectangle => "RECTANGLE",
            ShapeType::RoundedRectangle => "ROUNDED_RECTANGLE",
            ShapeType::Oval => "OVAL",
            ShapeType::IsoscelesTriangle => "ISOSCELES_TRIANGLE",
            ShapeType::RightTriangle => "RIGHT_TRIANGLE",
            ShapeType::Diamond => "DIAMOND",
            ShapeType::Pentagon => "PENTAGON",
            ShapeType::Hexagon => "HEXAGON",
            ShapeType::Octagon => "OCTAGON",
            ShapeType::Star5Point => "STAR_5_POINT",
            ShapeType::RightArrow => "RIGHT_ARROW",
            ShapeType::LeftArrow => "LEFT_ARROW",
            ShapeType::UpArrow => "UP_ARROW",
            ShapeType::DownArrow => "DOWN_ARROW",
            ShapeType::Chevron => "CHEVRON",
            ShapeType::Heart => "HEART",
            ShapeType::Cloud => "CLOUD",
            ShapeType::LightningBolt => "LIGHTNING_BOLT",
            ShapeType::Donut => "DONUT",
            ShapeType::Can => "CAN",
            ShapeType::Cube => "CUBE",
        }
    }

    /// DrawingML preset name (`a:prstGeom/@prst`).
    pub fn preset(&self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rect",
            ShapeType::RoundedRectangle => "roundRect",
            ShapeType::Oval => "ellipse",
            ShapeType::IsoscelesTriangle => "triangle",
            ShapeType::RightTriangle => "rtTriangle",
            ShapeType::Diamond => "diamond",
            ShapeType::Pentagon => "pentagon",
            ShapeType::Hexagon => "hexagon",
            ShapeType::Octagon => "octagon",
            ShapeType::Star5Point => "star5",
            ShapeType::RightArrow => "rightArrow",
            ShapeType::LeftArrow => "leftArrow",
            ShapeType::UpArrow => "upArrow",
            ShapeType::DownArrow => "downArrow",
            ShapeType::Chevron => "chevron",
            ShapeType::Heart => "heart",
            ShapeType::Cloud => "cloud",
            ShapeType::LightningBolt => "lightningBolt",
            ShapeType::Donut => "donut",
            ShapeType::Can => "can",
            ShapeType::Cube => "cube",
        }
    }

    /// Comma-separated list of accepted names, for error messages.
    pub fn supported_names() -> String {
        Self::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_aliases() {
        assert_eq!(ShapeType::from_str("RECTANGLE"), Some(ShapeType::Rectangle));
        assert_eq!(ShapeType::from_str("rounded_rectangle"), Some(ShapeType::RoundedRectangle));
        assert_eq!(ShapeType::from_str("ARROW"), Some(ShapeType::RightArrow));
        assert_eq!(ShapeType::from_str("triangle"), Some(ShapeType::IsoscelesTriangle));
        assert_eq!(ShapeType::from_str("STAR_5_POINT"), Some(ShapeType::Star5Point));
        assert_eq!(ShapeType::from_str("SQUIGGLE"), None);
    }

    #[test]
    fn every_name_parses_back() {
        for t in ShapeType::ALL {
            assert_eq!(ShapeType::from_str(t.as_str()), Some(t), "{}", t.as_str());
        }
    }

    #[test]
    fn presets() {
        assert_eq!(ShapeType::Oval.preset(), "ellipse");
        assert_eq!(ShapeType::Star5Point.preset(), "star5");
    }
}
