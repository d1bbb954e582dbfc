//! Viewport breakpoint segmentation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest viewport still considered mobile.
pub const MOBILE_MAX_WIDTH: u32 = 768;

/// Narrowest viewport considered tablet.
pub const TABLET_MIN_WIDTH: u32 = 769;

/// Widest viewport still considered tablet.
pub const TABLET_MAX_WIDTH: u32 = 1024;

/// Narrowest viewport considered desktop.
pub const DESKTOP_MIN_WIDTH: u32 = 1025;

/// Device class a heatmap can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportBreakpoint {
    Mobile,
    Tablet,
    Desktop,
    #[default]
    All,
}

impl ViewportBreakpoint {
    /// Parse a breakpoint from a request parameter.
    ///
    /// The breakpoint is advisory UI state, so anything unrecognized maps to
    /// [`ViewportBreakpoint::All`] instead of failing the request.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("mobile") => Self::Mobile,
            Some("tablet") => Self::Tablet,
            Some("desktop") => Self::Desktop,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
            Self::All => "all",
        }
    }

    /// Inclusive width range for this breakpoint, `None` for `All`.
    pub fn width_range(&self) -> Option<WidthRange> {
        match self {
            Self::Mobile => Some(WidthRange {
                min: None,
                max: Some(MOBILE_MAX_WIDTH),
            }),
            Self::Tablet => Some(WidthRange {
                min: Some(TABLET_MIN_WIDTH),
                max: Some(TABLET_MAX_WIDTH),
            }),
            Self::Desktop => Some(WidthRange {
                min: Some(DESKTOP_MIN_WIDTH),
                max: None,
            }),
            Self::All => None,
        }
    }

    /// Check whether a viewport width falls in this breakpoint.
    pub fn contains(&self, width: u32) -> bool {
        self.width_range().map_or(true, |range| range.contains(width))
    }
}

impl fmt::Display for ViewportBreakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed range over `viewport_width`. A missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidthRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl WidthRange {
    pub fn contains(&self, width: u32) -> bool {
        self.min.map_or(true, |min| width >= min) && self.max.map_or(true, |max| width <= max)
    }
}
