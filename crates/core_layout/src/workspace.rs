//! Workspaces and the scrolling anchor.
//!
//! A workspace packs its columns edge to edge, left to right, without gaps.
//! One column, the anchor, is pinned to the screen: its left edge to the
//! screen's left, its right edge to the screen's right, or centered. Every
//! other column's position follows by walking outward from the anchor, so
//! "scrolling" is nothing more than choosing a different anchor.

use serde::{Deserialize, Serialize};

use crate::container::{Container, ContainerKey};
use crate::list::{arena_key, Arena, Link, Linked, List};
use crate::window::{Window, WindowKey};
use crate::{Direction, LayoutSettings};

arena_key!(
    /// Arena key of a [`Workspace`].
    WorkspaceKey
);

/// Where the anchor column is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSide {
    /// Anchor's left edge on the screen's left edge.
    #[default]
    Left,
    /// Anchor centered horizontally.
    Center,
    /// Anchor's right edge on the screen's right edge.
    Right,
}

impl AnchorSide {
    /// 0 for left, 0.5 for center, 1 for right.
    pub fn fraction(self) -> f64 {
        match self {
            AnchorSide::Left => 0.0,
            AnchorSide::Center => 0.5,
            AnchorSide::Right => 1.0,
        }
    }

    /// Which neighbour inherits focus when a column disappears: negative
    /// prefers the left neighbour, anything else the right one.
    ///
    /// This reproduces `-trunc(2d - 1)` for the anchor fraction `d`, which
    /// hands focus leftward only from a right-pinned row.
    fn close_bias(self) -> i32 {
        -((2.0 * self.fraction() - 1.0).trunc() as i32)
    }
}

/// Window and column storage shared by every workspace on a desktop.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub windows: Arena<WindowKey, Window>,
    pub containers: Arena<ContainerKey, Container>,
}

/// One horizontally scrollable row of columns.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    link: Link<WorkspaceKey>,
    containers: List<ContainerKey>,
    anchor: Option<ContainerKey>,
    side: AnchorSide,
    focus: Option<ContainerKey>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn containers(&self) -> &List<ContainerKey> {
        &self.containers
    }

    pub fn anchor(&self) -> Option<ContainerKey> {
        self.anchor
    }

    pub fn side(&self) -> AnchorSide {
        self.side
    }

    pub fn focus(&self) -> Option<ContainerKey> {
        self.focus
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub(crate) fn set_focus(&mut self, focus: Option<ContainerKey>) {
        self.focus = focus;
    }

    /// Link a column in after `after`, or at the head.
    pub(crate) fn insert_container(
        &mut self,
        store: &mut Store,
        container: ContainerKey,
        after: Option<ContainerKey>,
    ) {
        self.containers.insert(&mut store.containers, container, after);
    }

    /// Unlink `container`, redirecting anchor and focus to `successor` when
    /// they pointed at it. The column itself stays in the store.
    pub(crate) fn remove_container(
        &mut self,
        store: &mut Store,
        container: ContainerKey,
        successor: Option<ContainerKey>,
    ) {
        if self.anchor == Some(container) {
            self.anchor = successor;
        }
        if self.focus == Some(container) {
            self.focus = successor;
        }
        self.containers.remove(&mut store.containers, container);
    }

    /// Unlink `container` and return the neighbour that should take over its
    /// focus and anchor role.
    pub(crate) fn detach(
        &mut self,
        store: &mut Store,
        container: ContainerKey,
    ) -> Option<ContainerKey> {
        let prev = self.containers.prev(&store.containers, container);
        let next = self.containers.next(&store.containers, container);
        let successor = if self.side.close_bias() < 0 {
            prev.or(next)
        } else {
            next.or(prev)
        };

        self.remove_container(store, container, successor);
        successor
    }

    /// Swap `container` with its neighbour. The anchor role stays with the
    /// screen slot, so the swapped pair trades places visually.
    pub(crate) fn swap_with_neighbor(
        &mut self,
        store: &mut Store,
        container: ContainerKey,
        direction: Direction,
    ) -> bool {
        let Some(neighbor) = self.containers.step(&store.containers, container, direction) else {
            return false;
        };

        if self.anchor == Some(container) {
            self.anchor = Some(neighbor);
        }
        self.containers.swap(&mut store.containers, container, neighbor);
        true
    }

    /// Pin `container` according to `side` and position every column
    /// relative to it.
    pub(crate) fn anchor_set(
        &mut self,
        store: &mut Store,
        settings: &LayoutSettings,
        container: ContainerKey,
        side: AnchorSide,
    ) {
        self.anchor = Some(container);
        self.side = side;

        let Store {
            windows,
            containers,
        } = store;
        let screen = settings.screen;
        let d = side.fraction();
        // Floored so that adding the integer margin later lands on the same
        // pixel as truncating the margin-adjusted position.
        let origin = (screen.width as f64 * d + screen.x as f64
            - d * containers[container].width() as f64)
            .floor() as i32;

        let mut cursor = origin;
        let mut walk = Some(container);
        while let Some(key) = walk {
            containers[key].organise(windows, settings, cursor);
            cursor += containers[key].width();
            walk = self.containers.next(containers, key);
        }

        let mut cursor = origin;
        let mut walk = self.containers.prev(containers, container);
        while let Some(key) = walk {
            cursor -= containers[key].width();
            containers[key].organise(windows, settings, cursor);
            walk = self.containers.prev(containers, key);
        }
    }

    /// Re-run the placement with the current anchor, if any.
    pub(crate) fn refresh(&mut self, store: &mut Store, settings: &LayoutSettings) {
        if let Some(anchor) = self.anchor {
            self.anchor_set(store, settings, anchor, self.side);
        }
    }

    /// Keep `container` on screen while scrolling as little as possible.
    pub(crate) fn focus_cont(
        &mut self,
        store: &mut Store,
        settings: &LayoutSettings,
        container: ContainerKey,
    ) {
        let Some(mut anchor) = self.anchor else {
            self.focus = Some(container);
            self.anchor_set(store, settings, container, AnchorSide::Left);
            return;
        };
        let screen = settings.screen;

        // A right-pinned row that now fits snaps back to the left edge.
        if self.side == AnchorSide::Right && self.span_through(store, anchor) <= screen.width {
            if let Some(head) = self.containers.head() {
                self.anchor_set(store, settings, head, AnchorSide::Left);
                anchor = head;
            }
        }

        let side = self.side;
        let origin = side.fraction() * screen.width as f64 + screen.x as f64;
        let left = screen.x as f64;
        let right = (screen.x + screen.width) as f64;

        for direction in [Direction::Backward, Direction::Forward] {
            let sign = direction.sign();
            let mut edge = origin;
            if side == AnchorSide::Center {
                edge += (-sign * store.containers[anchor].width()).div_euclid(2) as f64;
            }

            let mut walk = Some(anchor);
            while let Some(key) = walk {
                edge += (store.containers[key].width() * sign) as f64;
                if key == container {
                    if edge > right || edge < left {
                        let side = match direction {
                            Direction::Backward => AnchorSide::Left,
                            Direction::Forward => AnchorSide::Right,
                        };
                        self.anchor_set(store, settings, key, side);
                        return;
                    }
                    break;
                }
                walk = self.containers.step(&store.containers, key, direction);
            }
        }

        self.anchor_set(store, settings, anchor, side);
    }

    /// Total width of `container` and everything before it.
    fn span_through(&self, store: &Store, container: ContainerKey) -> i32 {
        let mut width = 0;
        let mut walk = Some(container);
        while let Some(key) = walk {
            width += store.containers[key].width();
            walk = self.containers.prev(&store.containers, key);
        }
        width
    }
}

impl Linked<WorkspaceKey> for Workspace {
    fn link(&self) -> &Link<WorkspaceKey> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link<WorkspaceKey> {
        &mut self.link
    }
}
