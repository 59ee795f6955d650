//! In-memory window manager for tests.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use scrollway_core_layout::{Rect, WindowId};
use scrollway_ipc::{WindowManager, WmCommand};

/// Records every command and serves a fixed window tree.
#[derive(Debug, Default)]
pub struct RecordingWm {
    commands: Mutex<Vec<WmCommand>>,
    rects: Mutex<Option<HashMap<WindowId, Rect>>>,
}

impl RecordingWm {
    pub fn with_windows(windows: impl IntoIterator<Item = (WindowId, Rect)>) -> Self {
        Self {
            commands: Mutex::default(),
            rects: Mutex::new(Some(windows.into_iter().collect())),
        }
    }

    /// A manager whose tree query always fails.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<WmCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }

    /// The rectangle produced by the latest resize and move of `id`.
    pub fn last_rect(&self, id: WindowId) -> Option<Rect> {
        let commands = self.commands.lock().unwrap();
        let size = commands.iter().rev().find_map(|c| match *c {
            WmCommand::Resize {
                id: i,
                width,
                height,
            } if i == id => Some((width, height)),
            _ => None,
        })?;
        let position = commands.iter().rev().find_map(|c| match *c {
            WmCommand::MoveTo { id: i, x, y } if i == id => Some((x, y)),
            _ => None,
        })?;
        Some(Rect::new(position.0, position.1, size.0, size.1))
    }
}

impl WindowManager for RecordingWm {
    type Error = io::Error;

    fn command(&self, command: WmCommand) {
        self.commands.lock().unwrap().push(command);
    }

    async fn window_rects(&self) -> Result<HashMap<WindowId, Rect>, io::Error> {
        self.rects
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no window manager"))
    }
}
