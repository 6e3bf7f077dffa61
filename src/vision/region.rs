//! Window-relative capture regions
//!
//! Maps a window rectangle and an [`AreaType`] to the screen rectangle that
//! gets sampled for template matching.

use serde::{Deserialize, Serialize};

/// Screen-space rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build from Win32-style edges; inverted edges collapse to zero size
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            width: right.saturating_sub(left).max(0) as u32,
            height: bottom.saturating_sub(top).max(0) as u32,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Overlap with another rectangle, if any
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left as i64 || bottom <= top as i64 {
            return None;
        }

        Some(Rect {
            left,
            top,
            width: (right - left as i64) as u32,
            height: (bottom - top as i64) as u32,
        })
    }
}

/// Which part of the window a template is searched in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaType {
    /// The whole window
    FullScreen,
    /// Lower-right corner where the game draws its status spinner
    BottomRight,
}

/// Fractions of the window used by [`AreaType::BottomRight`]
mod bottom_right {
    pub const LEFT: f64 = 0.6;
    pub const TOP: f64 = 0.7;
    pub const WIDTH: f64 = 0.4;
    pub const HEIGHT: f64 = 0.3;
}

/// Compute the capture rectangle for `area` inside `window`.
///
/// Offsets and sizes are truncated to whole pixels. Only `left` and `top`
/// are clamped to the screen origin; width and height are left alone, so
/// the result may hang off the screen edge for windows that do.
pub fn capture_region(window: Rect, area: AreaType) -> Rect {
    let mut region = match area {
        AreaType::FullScreen => window,
        AreaType::BottomRight => Rect {
            left: (window.left as f64 + window.width as f64 * bottom_right::LEFT) as i32,
            top: (window.top as f64 + window.height as f64 * bottom_right::TOP) as i32,
            width: (window.width as f64 * bottom_right::WIDTH) as u32,
            height: (window.height as f64 * bottom_right::HEIGHT) as u32,
        },
    };

    region.left = region.left.max(0);
    region.top = region.top.max(0);
    region
}
