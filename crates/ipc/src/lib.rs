//! scrollway protocol vocabulary
//!
//! Shared types for talking to an i3-protocol window manager: the marks that
//! keybindings attach to windows, the commands the daemon issues, the events
//! it consumes and the [`WindowManager`] trait a backend implements.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use scrollway_core_layout::{Rect, WindowId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A one-shot instruction attached to a window as a window-manager mark.
///
/// Keybindings mark the focused window; the daemon reacts to the mark event,
/// clears the mark and performs the action. Declaration order is the order
/// in which several marks on one event are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Focus the column to the left.
    #[serde(rename = "_left")]
    Left,
    /// Focus the column to the right.
    #[serde(rename = "_right")]
    Right,
    /// Focus the window below in the same column.
    #[serde(rename = "_down")]
    Down,
    /// Focus the window above in the same column.
    #[serde(rename = "_up")]
    Up,
    /// Shrink the column by one width step.
    #[serde(rename = "_decwidth")]
    DecWidth,
    /// Grow the column by one width step.
    #[serde(rename = "_incwidth")]
    IncWidth,
    /// Make the column as wide as the screen.
    #[serde(rename = "_fullwidth")]
    FullWidth,
    /// Move the window into or next to the column on the left.
    #[serde(rename = "_moveleft")]
    MoveLeft,
    /// Move the window into or next to the column on the right.
    #[serde(rename = "_moveright")]
    MoveRight,
    /// Swap the column with its left neighbour.
    #[serde(rename = "_swapleft")]
    SwapLeft,
    /// Swap the column with its right neighbour.
    #[serde(rename = "_swapright")]
    SwapRight,
    /// Swap the window with the one above.
    #[serde(rename = "_moveup")]
    MoveUp,
    /// Swap the window with the one below.
    #[serde(rename = "_movedown")]
    MoveDown,
    /// Center the column on screen.
    #[serde(rename = "_center")]
    Center,
    /// Switch to the next workspace.
    #[serde(rename = "_nextworkspace")]
    NextWorkspace,
    /// Switch to the previous workspace.
    #[serde(rename = "_prevworkspace")]
    PrevWorkspace,
    /// Carry the focused column to the next workspace.
    #[serde(rename = "_movenextworkspace")]
    MoveNextWorkspace,
    /// Carry the focused column to the previous workspace.
    #[serde(rename = "_moveprevworkspace")]
    MovePrevWorkspace,
}

impl Mark {
    pub const ALL: [Mark; 18] = [
        Mark::Left,
        Mark::Right,
        Mark::Down,
        Mark::Up,
        Mark::DecWidth,
        Mark::IncWidth,
        Mark::FullWidth,
        Mark::MoveLeft,
        Mark::MoveRight,
        Mark::SwapLeft,
        Mark::SwapRight,
        Mark::MoveUp,
        Mark::MoveDown,
        Mark::Center,
        Mark::NextWorkspace,
        Mark::PrevWorkspace,
        Mark::MoveNextWorkspace,
        Mark::MovePrevWorkspace,
    ];

    /// The mark string as it appears in the window manager.
    pub fn as_str(self) -> &'static str {
        match self {
            Mark::Left => "_left",
            Mark::Right => "_right",
            Mark::Down => "_down",
            Mark::Up => "_up",
            Mark::DecWidth => "_decwidth",
            Mark::IncWidth => "_incwidth",
            Mark::FullWidth => "_fullwidth",
            Mark::MoveLeft => "_moveleft",
            Mark::MoveRight => "_moveright",
            Mark::SwapLeft => "_swapleft",
            Mark::SwapRight => "_swapright",
            Mark::MoveUp => "_moveup",
            Mark::MoveDown => "_movedown",
            Mark::Center => "_center",
            Mark::NextWorkspace => "_nextworkspace",
            Mark::PrevWorkspace => "_prevworkspace",
            Mark::MoveNextWorkspace => "_movenextworkspace",
            Mark::MovePrevWorkspace => "_moveprevworkspace",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mark string that is not one of ours.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown mark '{0}'")]
pub struct UnknownMark(pub String);

impl FromStr for Mark {
    type Err = UnknownMark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mark::ALL
            .into_iter()
            .find(|mark| mark.as_str() == s)
            .ok_or_else(|| UnknownMark(s.to_string()))
    }
}

/// A command for the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmCommand {
    /// Set a window's size.
    Resize {
        id: WindowId,
        width: i32,
        height: i32,
    },
    /// Move a window to an absolute position.
    MoveTo { id: WindowId, x: i32, y: i32 },
    /// Give a window keyboard focus.
    Focus(WindowId),
    /// Take a window out of the manager's own tiling.
    EnableFloating(WindowId),
    /// Clear every mark on a window.
    Unmark(WindowId),
    /// Add a mark to the focused window.
    MarkFocused(Mark),
    /// Bind a key chord to marking the focused window.
    BindMark { key: String, mark: Mark },
}

impl fmt::Display for WmCommand {
    /// Render in i3 command syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WmCommand::Resize { id, width, height } => write!(
                f,
                "[con_id={id}] resize set width {width}px height {height}px"
            ),
            WmCommand::MoveTo { id, x, y } => {
                write!(f, "[con_id={id}] move absolute position {x}px {y}px")
            }
            WmCommand::Focus(id) => write!(f, "[con_id={id}] focus"),
            WmCommand::EnableFloating(id) => write!(f, "[con_id={id}] floating enable"),
            WmCommand::Unmark(id) => write!(f, "[con_id={id}] unmark"),
            WmCommand::MarkFocused(mark) => write!(f, "mark --add {mark}"),
            WmCommand::BindMark { key, mark } => write!(f, "bindsym {key} mark --add {mark}"),
        }
    }
}

/// A window event the daemon reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    /// A window received focus. New windows are reported this way too.
    Focused(WindowId),
    /// A window was closed.
    Closed(WindowId),
    /// A window's marks changed; `marks` is the full current set.
    Marked { id: WindowId, marks: Vec<String> },
}

/// A connection to an i3-protocol window manager.
pub trait WindowManager: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Queue a command. Delivery is not acknowledged and failures are only
    /// logged by the backend.
    fn command(&self, command: WmCommand);

    /// Current on-screen rectangle of every window, title bar included.
    fn window_rects(
        &self,
    ) -> impl Future<Output = Result<HashMap<WindowId, Rect>, Self::Error>> + Send;
}
