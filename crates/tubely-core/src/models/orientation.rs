use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

// Aspect ratios scaled by 100 and rounded: 16/9 -> 1.78, 9/16 -> 0.56.
const LANDSCAPE_RATIO_X100: i64 = 178;
const PORTRAIT_RATIO_X100: i64 = 56;

/// Coarse aspect-ratio class of a video stream. Only used to namespace storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify a stream by `width / height` rounded to two decimals.
    ///
    /// Anything that does not round to 16:9 or 9:16 is `Other`, including a zero height.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Orientation::Other;
        }

        let ratio_x100 = (f64::from(width) / f64::from(height) * 100.0).round() as i64;
        match ratio_x100 {
            LANDSCAPE_RATIO_X100 => Orientation::Landscape,
            PORTRAIT_RATIO_X100 => Orientation::Portrait,
            _ => Orientation::Other,
        }
    }

    /// Key prefix for objects of this orientation.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.key_prefix())
    }
}
