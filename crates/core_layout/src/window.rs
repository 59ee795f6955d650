//! Leaf tiles.

use crate::list::{arena_key, Link, Linked};
use crate::{Rect, WindowId};

arena_key!(
    /// Arena key of a [`Window`].
    WindowKey
);

/// A managed window: its external id and where it should end up.
#[derive(Debug, Clone)]
pub struct Window {
    link: Link<WindowKey>,
    id: WindowId,
    target: Rect,
}

impl Window {
    pub(crate) fn new(id: WindowId) -> Self {
        Self {
            link: Link::default(),
            id,
            target: Rect::new(0, 0, 100, 100),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The rectangle the next transition animates toward.
    pub fn target(&self) -> Rect {
        self.target
    }

    /// Update the supplied fields of the target, inset by `margin` on every
    /// side so neighbouring tiles leave a visible gap.
    pub fn set_target(
        &mut self,
        margin: i32,
        x: Option<i32>,
        y: Option<i32>,
        width: Option<i32>,
        height: Option<i32>,
    ) {
        if let Some(x) = x {
            self.target.x = x + margin;
        }
        if let Some(y) = y {
            self.target.y = y + margin;
        }
        if let Some(width) = width {
            self.target.width = width - 2 * margin;
        }
        if let Some(height) = height {
            self.target.height = height - 2 * margin;
        }
    }
}

impl Linked<WindowKey> for Window {
    fn link(&self) -> &Link<WindowKey> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link<WindowKey> {
        &mut self.link
    }
}
