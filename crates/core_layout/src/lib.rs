//! scrollway Core Layout Engine
//!
//! Platform-agnostic scrollable column layout inspired by Niri.
//!
//! The model is a strict hierarchy:
//! - a [`Window`] is a tile with a target rectangle
//! - a [`Container`] stacks windows into one scrolling column
//! - a [`Workspace`] lays columns edge to edge and pins one of them (the anchor)
//!   to the screen; every other column is positioned relative to it
//! - the [`Desktop`] owns all workspaces and plans animated transitions
//!
//! Nothing here talks to a window manager. Operations return an [`Outcome`]
//! telling the caller which window to focus and whether geometry changed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod container;
pub mod desktop;
pub mod easing;
pub mod list;
pub mod window;
pub mod workspace;

pub use container::{Container, ContainerKey};
pub use desktop::{Desktop, Location, Outcome, WindowMotion};
pub use easing::Easing;
pub use list::{Arena, Key, Link, Linked, List};
pub use window::{Window, WindowKey};
pub use workspace::{AnchorSide, Store, Workspace, WorkspaceKey};

/// Unique identifier for a window.
/// For i3 / sway this is the container id reported by the tree.
pub type WindowId = i64;

/// Errors that can occur during layout operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Window {0} is not managed by any workspace")]
    WindowNotFound(WindowId),
}

/// A rectangle in screen coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// The same rectangle shifted vertically.
    pub fn offset_y(self, dy: i32) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }

    /// Interpolate every field from `source` toward `target`.
    ///
    /// Each value is `source + (target - source) * progress`, truncated toward
    /// zero. `progress` may leave `[0, 1]` for overshooting easings.
    pub fn lerp(source: Rect, target: Rect, progress: f64) -> Rect {
        let mix = |a: i32, b: i32| (a as f64 + (b - a) as f64 * progress) as i32;
        Rect {
            x: mix(source.x, target.x),
            y: mix(source.y, target.y),
            width: mix(source.width, target.width),
            height: mix(source.height, target.height),
        }
    }
}

/// Fixed geometry parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// The usable screen rectangle all columns are laid out in.
    pub screen: Rect,
    /// Inset applied on every side of a tile.
    pub margin: i32,
    /// Pixels added or removed by one resize step.
    pub width_step: i32,
    /// Narrowest a column may become.
    pub min_column_width: i32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            screen: Rect::new(5, 55, 1910, 1020),
            margin: 5,
            width_step: 100,
            min_column_width: 150,
        }
    }
}

impl LayoutSettings {
    /// Width given to freshly created columns.
    pub fn default_column_width(&self) -> i32 {
        self.clamp_width(self.screen.width / 2)
    }

    /// Clamp a column width into `[min_column_width, screen.width]`.
    pub fn clamp_width(&self, width: i32) -> i32 {
        width.max(self.min_column_width).min(self.screen.width)
    }
}

/// Which way to walk along a list.
///
/// `Backward` moves toward the list head: the column to the left, or the
/// window below in a stack. `Forward` moves toward the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    /// `-1` for backward, `1` for forward.
    pub fn sign(self) -> i32 {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects() {
        let r1 = Rect::new(0, 0, 100, 100);
        let r2 = Rect::new(50, 50, 100, 100);
        let r3 = Rect::new(200, 200, 50, 50);

        assert!(r1.intersects(&r2));
        assert!(r2.intersects(&r1));
        assert!(!r1.intersects(&r3));
        assert!(!r3.intersects(&r1));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(200, -50, 300, 10);
        assert_eq!(Rect::lerp(a, b, 0.0), a);
        assert_eq!(Rect::lerp(a, b, 1.0), b);
    }

    #[test]
    fn test_lerp_truncates_toward_zero() {
        let a = Rect::new(0, 0, 0, 0);
        let b = Rect::new(3, -3, 5, 1);
        // 1.5 -> 1, -1.5 -> -1, 2.5 -> 2, 0.5 -> 0
        assert_eq!(Rect::lerp(a, b, 0.5), Rect::new(1, -1, 2, 0));
    }

    #[test]
    fn test_lerp_overshoot() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(100, 0, 100, 100);
        assert_eq!(Rect::lerp(a, b, 1.1).x, 110);
    }

    #[test]
    fn test_offset_y() {
        let r = Rect::new(1, 2, 3, 4).offset_y(-10);
        assert_eq!(r, Rect::new(1, -8, 3, 4));
        assert_eq!(r.bottom(), -4);
        assert_eq!(r.right(), 4);
    }

    #[test]
    fn test_clamp_width() {
        let settings = LayoutSettings::default();
        assert_eq!(settings.clamp_width(10), 150);
        assert_eq!(settings.clamp_width(5000), 1910);
        assert_eq!(settings.clamp_width(800), 800);
        assert_eq!(settings.default_column_width(), 955);
    }

    #[test]
    fn test_default_column_width_respects_minimum() {
        let settings = LayoutSettings::default();
        assert_eq!(settings.default_column_width(), 955);

        let narrow = LayoutSettings {
            screen: Rect::new(0, 0, 200, 600),
            ..LayoutSettings::default()
        };
        assert_eq!(narrow.default_column_width(), 150);
    }
}
