//! Length units used by DrawingML.

use serde::{Deserialize, Serialize};
use std::fmt;

/// English Metric Units: 914 400 per inch, 12 700 per point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Emu(pub i64);

impl Emu {
    pub const PER_INCH: i64 = 914_400;
    pub const PER_POINT: i64 = 12_700;

    pub fn from_inches(inches: f64) -> Self {
        Emu((inches * Self::PER_INCH as f64).round() as i64)
    }

    pub fn inches(self) -> f64 {
        self.0 as f64 / Self::PER_INCH as f64
    }

    pub(crate) fn parse(raw: Option<&str>) -> Emu {
        Emu(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }
}

impl fmt::Display for Emu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position and size of a shape, as stored in its `a:xfrm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Geometry {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left: Emu(left),
            top: Emu(top),
            width: Emu(width),
            height: Emu(height),
        }
    }
}
