//! Positions and sizes.
//!
//! Every length crossing a crate boundary is in inches (`f64`). Font sizes and
//! line widths are in points. Conversion to EMU (English Metric Units, the
//! integer unit of OOXML) happens only at serialization time.

use serde::{Deserialize, Serialize};

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMU per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Default 4:3 slide width in inches.
pub const SLIDE_WIDTH_IN: f64 = 10.0;

/// Default 4:3 slide height in inches.
pub const SLIDE_HEIGHT_IN: f64 = 7.5;

pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

pub fn points_to_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT as f64).round() as i64
}

pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// An axis-aligned box in inches, origin at the slide's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// `(x, y, cx, cy)` in EMU.
    pub fn to_emu(&self) -> (i64, i64, i64, i64) {
        (
            inches_to_emu(self.left),
            inches_to_emu(self.top),
            inches_to_emu(self.width),
            inches_to_emu(self.height),
        )
    }

    /// Offsets must be finite, sizes finite and strictly positive.
    pub fn is_well_formed(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inch_conversion() {
        assert_eq!(inches_to_emu(1.0), 914_400);
        assert_eq!(inches_to_emu(10.0), 9_144_000);
        assert_eq!(inches_to_emu(7.5), 6_858_000);
        assert_eq!(points_to_emu(1.0), 12_700);
        assert!((emu_to_inches(457_200) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rect_to_emu() {
        let r = Rect::new(1.0, 2.5, 8.0, 1.5);
        assert_eq!(r.to_emu(), (914_400, 2_286_000, 7_315_200, 1_371_600));
        assert!((r.bottom() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn well_formed() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(Rect::new(-1.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).is_well_formed());
        assert!(!Rect::new(0.0, f64::NAN, 1.0, 1.0).is_well_formed());
        assert!(!Rect::new(0.0, 0.0, f64::INFINITY, 1.0).is_well_formed());
    }
}
