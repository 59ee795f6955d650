//! Scrolling columns.

use crate::list::{arena_key, Arena, Link, Linked, List};
use crate::window::{Window, WindowKey};
use crate::{LayoutSettings, WindowId};

arena_key!(
    /// Arena key of a [`Container`].
    ContainerKey
);

/// One scrolling column: a vertical stack of windows with a shared width.
///
/// The head of the stack occupies the bottom band of the screen; walking
/// toward the tail moves up.
#[derive(Debug, Clone)]
pub struct Container {
    link: Link<ContainerKey>,
    windows: List<WindowKey>,
    width: i32,
    x: i32,
}

impl Container {
    pub(crate) fn new(width: i32) -> Self {
        Self {
            link: Link::default(),
            windows: List::new(),
            width,
            x: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    /// Left edge assigned by the last [`Container::organise`].
    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn windows(&self) -> &List<WindowKey> {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Bottom-most window.
    pub fn head(&self) -> Option<WindowKey> {
        self.windows.head()
    }

    /// Push a window onto the bottom of the stack.
    pub(crate) fn push(&mut self, arena: &mut Arena<WindowKey, Window>, window: WindowKey) {
        self.windows.insert(arena, window, None);
    }

    pub(crate) fn remove(&mut self, arena: &mut Arena<WindowKey, Window>, window: WindowKey) {
        self.windows.remove(arena, window);
    }

    pub(crate) fn swap(&mut self, arena: &mut Arena<WindowKey, Window>, a: WindowKey, b: WindowKey) {
        self.windows.swap(arena, a, b);
    }

    /// Change the width by `delta`, clamped to the allowed range.
    pub(crate) fn resize(&mut self, settings: &LayoutSettings, delta: i32) {
        self.width = settings.clamp_width(self.width + delta);
    }

    pub(crate) fn set_width(&mut self, settings: &LayoutSettings, width: i32) {
        self.width = settings.clamp_width(width);
    }

    /// Find the member with the given external id.
    pub fn locate(&self, arena: &Arena<WindowKey, Window>, id: WindowId) -> Option<WindowKey> {
        self.windows.iter(arena).find(|&key| arena[key].id() == id)
    }

    /// Lay members out as equal-height bands with the column's left edge at `x`.
    pub(crate) fn organise(
        &mut self,
        arena: &mut Arena<WindowKey, Window>,
        settings: &LayoutSettings,
        x: i32,
    ) {
        self.x = x;
        if self.windows.is_empty() {
            return;
        }

        let screen = settings.screen;
        let band = screen.height / self.windows.len() as i32;
        let mut cursor = screen.y + screen.height;
        for key in self.windows.keys(arena) {
            cursor -= band;
            arena[key].set_target(
                settings.margin,
                Some(x),
                Some(cursor),
                Some(self.width),
                Some(band),
            );
        }
    }
}

impl Linked<ContainerKey> for Container {
    fn link(&self) -> &Link<ContainerKey> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link<ContainerKey> {
        &mut self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;

    fn settings() -> LayoutSettings {
        LayoutSettings {
            screen: Rect::new(0, 0, 1000, 900),
            margin: 5,
            width_step: 100,
            min_column_width: 150,
        }
    }

    #[test]
    fn test_organise_stacks_head_at_bottom() {
        let settings = settings();
        let mut arena = Arena::new();
        let mut container = Container::new(400);
        let first = arena.insert(Window::new(1));
        let second = arena.insert(Window::new(2));
        let third = arena.insert(Window::new(3));
        container.push(&mut arena, first);
        container.push(&mut arena, second);
        container.push(&mut arena, third);

        // Pushing makes the newest window the head.
        assert_eq!(container.head(), Some(third));

        container.organise(&mut arena, &settings, 200);
        assert_eq!(container.x(), 200);
        assert_eq!(arena[third].target(), Rect::new(205, 605, 390, 290));
        assert_eq!(arena[second].target(), Rect::new(205, 305, 390, 290));
        assert_eq!(arena[first].target(), Rect::new(205, 5, 390, 290));
    }

    #[test]
    fn test_locate() {
        let mut arena = Arena::new();
        let mut container = Container::new(400);
        let key = arena.insert(Window::new(42));
        container.push(&mut arena, key);

        assert_eq!(container.locate(&arena, 42), Some(key));
        assert_eq!(container.locate(&arena, 43), None);
    }

    #[test]
    fn test_resize_clamps() {
        let settings = settings();
        let mut container = Container::new(400);
        container.resize(&settings, -1000);
        assert_eq!(container.width(), 150);
        container.resize(&settings, 5000);
        assert_eq!(container.width(), 1000);
        container.set_width(&settings, 600);
        assert_eq!(container.width(), 600);
    }

    #[test]
    fn test_organise_empty_is_noop() {
        let mut arena = Arena::new();
        let mut container = Container::new(400);
        container.organise(&mut arena, &settings(), 10);
        assert_eq!(container.x(), 10);
        assert!(container.is_empty());
    }
}
