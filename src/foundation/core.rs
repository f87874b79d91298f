use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Absolute 0-based frame index across the whole render (all scenes, in order).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Stable, fixed-width file name for this frame (`frame_000042.png`).
    ///
    /// The width matches [`FRAME_PATTERN`], which the numbered-sequence encoder relies on.
    pub fn file_name(self) -> String {
        format!("frame_{:06}.png", self.0)
    }
}

/// printf-style pattern matching [`FrameIndex::file_name`].
pub const FRAME_PATTERN: &str = "frame_%06d.png";

/// The four accepted output aspect ratios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    /// Landscape 16:9.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// Portrait 9:16.
    #[serde(rename = "9:16")]
    Portrait,
    /// Square 1:1.
    #[serde(rename = "1:1")]
    Square,
    /// Widescreen 21:9.
    #[serde(rename = "21:9")]
    Widescreen,
}

impl AspectRatio {
    /// All accepted ratios, in the order they are reported to users.
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Square,
        AspectRatio::Widescreen,
    ];

    /// Wire label (`"16:9"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
            Self::Widescreen => "21:9",
        }
    }

    /// Fixed output resolution for this ratio.
    pub fn resolution(self) -> Resolution {
        match self {
            Self::Landscape => Resolution::new(1280, 720),
            Self::Portrait => Resolution::new(720, 1280),
            Self::Square => Resolution::new(720, 720),
            Self::Widescreen => Resolution::new(1280, 540),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = ClipforgeError;

    fn from_str(s: &str) -> ClipforgeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                ClipforgeError::validation(format!(
                    "invalid aspect ratio '{s}'. Must be one of: {}",
                    accepted_ratios()
                ))
            })
    }
}

/// Comma separated list of accepted ratio labels.
pub(crate) fn accepted_ratios() -> String {
    AspectRatio::ALL
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Output frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a resolution value.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
