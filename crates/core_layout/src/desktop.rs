//! The workspace collection.
//!
//! A [`Desktop`] owns every workspace, column and window. Its methods are the
//! operations the daemon performs in response to window-manager events; each
//! one mutates the model synchronously and reports what should happen next in
//! an [`Outcome`].

use std::cmp::Ordering;

use crate::container::{Container, ContainerKey};
use crate::list::{Arena, List};
use crate::window::{Window, WindowKey};
use crate::workspace::{AnchorSide, Store, Workspace, WorkspaceKey};
use crate::{Direction, LayoutError, LayoutSettings, Rect, WindowId};

/// Follow-up work requested by a layout operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use]
pub struct Outcome {
    /// Window that should receive keyboard focus.
    pub focus: Option<WindowId>,
    /// Newly adopted window that must be taken out of the manager's own tiling.
    pub adopted: Option<WindowId>,
    /// Whether target geometry changed and a transition should run.
    pub transition: bool,
}

impl Outcome {
    /// Nothing to do.
    pub fn none() -> Self {
        Self::default()
    }

    /// Geometry changed.
    pub fn transition() -> Self {
        Self {
            transition: true,
            ..Self::default()
        }
    }

    /// Only move keyboard focus.
    pub fn focus(window: WindowId) -> Self {
        Self {
            focus: Some(window),
            ..Self::default()
        }
    }

    /// Combine with the outcome of a later operation. The later focus wins.
    pub fn then(self, later: Outcome) -> Self {
        Self {
            focus: later.focus.or(self.focus),
            adopted: later.adopted.or(self.adopted),
            transition: self.transition || later.transition,
        }
    }

    fn with_focus(self, window: Option<WindowId>) -> Self {
        Self {
            focus: window,
            ..self
        }
    }
}

/// Where a managed window lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub workspace: WorkspaceKey,
    pub container: ContainerKey,
    pub window: WindowKey,
}

/// One window's part of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMotion {
    pub id: WindowId,
    /// On-screen target from the layout.
    pub target: Rect,
    /// Vertical displacement applied to the target; non-zero for windows on
    /// inactive workspaces.
    pub offset_y: i32,
}

impl WindowMotion {
    /// Where the window should end up.
    pub fn destination(&self) -> Rect {
        self.target.offset_y(self.offset_y)
    }
}

/// All workspaces plus the active-workspace pointer.
#[derive(Debug, Clone)]
pub struct Desktop {
    settings: LayoutSettings,
    store: Store,
    workspaces: Arena<WorkspaceKey, Workspace>,
    order: List<WorkspaceKey>,
    current: WorkspaceKey,
}

impl Desktop {
    /// A desktop with a single empty workspace.
    pub fn new(settings: LayoutSettings) -> Self {
        let mut workspaces = Arena::new();
        let mut order = List::new();
        let current = workspaces.insert(Workspace::new());
        order.insert(&mut workspaces, current, None);

        Self {
            settings,
            store: Store::default(),
            workspaces,
            order,
            current,
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn current(&self) -> WorkspaceKey {
        self.current
    }

    pub fn current_workspace(&self) -> &Workspace {
        &self.workspaces[self.current]
    }

    pub fn workspace(&self, key: WorkspaceKey) -> &Workspace {
        &self.workspaces[key]
    }

    pub fn container(&self, key: ContainerKey) -> &Container {
        &self.store.containers[key]
    }

    pub fn window(&self, key: WindowKey) -> &Window {
        &self.store.windows[key]
    }

    /// Workspace keys in list order.
    pub fn workspace_keys(&self) -> Vec<WorkspaceKey> {
        self.order.keys(&self.workspaces)
    }

    pub fn workspace_count(&self) -> usize {
        self.order.len()
    }

    /// Column keys of a workspace, left to right.
    pub fn columns(&self, workspace: WorkspaceKey) -> Vec<ContainerKey> {
        self.workspaces[workspace]
            .containers()
            .keys(&self.store.containers)
    }

    /// Window ids of a column, bottom to top.
    pub fn column_windows(&self, container: ContainerKey) -> Vec<WindowId> {
        let windows = &self.store.windows;
        self.store.containers[container]
            .windows()
            .iter(windows)
            .map(|key| windows[key].id())
            .collect()
    }

    pub fn window_count(&self) -> usize {
        self.store.windows.len()
    }

    /// Find a managed window by external id.
    pub fn locate(&self, id: WindowId) -> Option<Location> {
        self.order.iter(&self.workspaces).find_map(|workspace| {
            self.workspaces[workspace]
                .containers()
                .iter(&self.store.containers)
                .find_map(|container| {
                    self.store.containers[container]
                        .locate(&self.store.windows, id)
                        .map(|window| Location {
                            workspace,
                            container,
                            window,
                        })
                })
        })
    }

    fn require(&self, id: WindowId) -> Result<Location, LayoutError> {
        self.locate(id).ok_or(LayoutError::WindowNotFound(id))
    }

    /// External id of a column's bottom window.
    fn head_id(&self, container: ContainerKey) -> Option<WindowId> {
        self.store.containers[container]
            .head()
            .map(|key| self.store.windows[key].id())
    }

    /// A window gained focus. Unknown windows are adopted into a new column.
    pub fn window_focused(&mut self, id: WindowId) -> Outcome {
        let Some(location) = self.locate(id) else {
            return self.adopt(id);
        };

        let previous = self.current;
        if previous != location.workspace && self.workspaces[previous].is_empty() {
            self.delete_workspace(previous);
        }
        self.current = location.workspace;
        let workspace = &mut self.workspaces[location.workspace];
        workspace.set_focus(Some(location.container));
        workspace.focus_cont(&mut self.store, &self.settings, location.container);
        Outcome::transition()
    }

    /// Wrap a new window in its own column right after the focused one.
    fn adopt(&mut self, id: WindowId) -> Outcome {
        let window = self.store.windows.insert(Window::new(id));
        let container = self
            .store
            .containers
            .insert(Container::new(self.settings.default_column_width()));
        self.store.containers[container].push(&mut self.store.windows, window);

        let workspace = &mut self.workspaces[self.current];
        match workspace.focus() {
            Some(focus) => {
                workspace.insert_container(&mut self.store, container, Some(focus));
                workspace.focus_cont(&mut self.store, &self.settings, container);
            }
            None => {
                workspace.insert_container(&mut self.store, container, None);
                workspace.anchor_set(&mut self.store, &self.settings, container, AnchorSide::Left);
            }
        }
        workspace.set_focus(Some(container));

        Outcome {
            adopted: Some(id),
            ..Outcome::transition()
        }
    }

    /// A window was destroyed.
    pub fn window_closed(&mut self, id: WindowId) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        let active = location.workspace == self.current;

        if self.store.containers[location.container].len() == 1 {
            let workspace = &mut self.workspaces[location.workspace];
            let successor = workspace.detach(&mut self.store, location.container);
            self.store.containers.remove(location.container);
            self.store.windows.remove(location.window);

            if !active {
                self.settle_inactive(location.workspace);
                return Ok(Outcome::transition());
            }

            let workspace = &mut self.workspaces[location.workspace];
            workspace.set_focus(successor);
            return Ok(match successor {
                Some(successor) => {
                    workspace.focus_cont(&mut self.store, &self.settings, successor);
                    Outcome::transition().with_focus(self.head_id(successor))
                }
                None => Outcome::transition(),
            });
        }

        let column = self.store.containers[location.container].windows();
        let heir = column
            .next(&self.store.windows, location.window)
            .or_else(|| column.prev(&self.store.windows, location.window))
            .map(|key| self.store.windows[key].id());

        self.store.containers[location.container].remove(&mut self.store.windows, location.window);
        self.store.windows.remove(location.window);

        let workspace = &mut self.workspaces[location.workspace];
        if !active {
            workspace.refresh(&mut self.store, &self.settings);
            return Ok(Outcome::transition());
        }
        workspace.focus_cont(&mut self.store, &self.settings, location.container);
        Ok(Outcome::transition().with_focus(heir))
    }

    /// Focus the bottom window of the neighbouring column.
    pub fn focus_column(&self, id: WindowId, direction: Direction) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        let neighbor = self.workspaces[location.workspace].containers().step(
            &self.store.containers,
            location.container,
            direction,
        );

        Ok(match neighbor.and_then(|n| self.head_id(n)) {
            Some(window) => Outcome::focus(window),
            None => Outcome::none(),
        })
    }

    /// Focus the window above (forward) or below (backward) in the same column.
    pub fn focus_stacked(&self, id: WindowId, direction: Direction) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        let neighbor = self.store.containers[location.container].windows().step(
            &self.store.windows,
            location.window,
            direction,
        );

        Ok(match neighbor {
            Some(key) => Outcome::focus(self.store.windows[key].id()),
            None => Outcome::none(),
        })
    }

    /// Grow or shrink the window's column.
    pub fn resize_column(&mut self, id: WindowId, delta: i32) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        self.store.containers[location.container].resize(&self.settings, delta);
        self.workspaces[location.workspace].focus_cont(
            &mut self.store,
            &self.settings,
            location.container,
        );
        Ok(Outcome::transition())
    }

    /// Make the window's column as wide as the screen.
    pub fn full_width(&mut self, id: WindowId) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        let width = self.settings.screen.width;
        self.store.containers[location.container].set_width(&self.settings, width);
        self.workspaces[location.workspace].focus_cont(
            &mut self.store,
            &self.settings,
            location.container,
        );
        Ok(Outcome::transition())
    }

    /// Move a window out of its column.
    ///
    /// A window sharing its column is split off into a new column on that
    /// side. A window alone in its column merges into the neighbouring column
    /// instead; at the edge of the row this does nothing.
    pub fn move_window(&mut self, id: WindowId, direction: Direction) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        let source = location.container;
        let workspace = &mut self.workspaces[location.workspace];

        if self.store.containers[source].len() == 1 {
            let neighbor = workspace
                .containers()
                .step(&self.store.containers, source, direction);
            let Some(neighbor) = neighbor else {
                return Ok(Outcome::none());
            };

            self.store.containers[source].remove(&mut self.store.windows, location.window);
            workspace.remove_container(&mut self.store, source, Some(neighbor));
            self.store.containers.remove(source);
            self.store.containers[neighbor].push(&mut self.store.windows, location.window);
            workspace.set_focus(Some(neighbor));
            workspace.focus_cont(&mut self.store, &self.settings, neighbor);
            return Ok(Outcome::transition());
        }

        self.store.containers[source].remove(&mut self.store.windows, location.window);
        let split = self
            .store
            .containers
            .insert(Container::new(self.settings.default_column_width()));
        self.store.containers[split].push(&mut self.store.windows, location.window);

        let after = match direction {
            Direction::Forward => Some(source),
            Direction::Backward => workspace.containers().prev(&self.store.containers, source),
        };
        workspace.insert_container(&mut self.store, split, after);
        workspace.set_focus(Some(split));
        workspace.focus_cont(&mut self.store, &self.settings, split);
        Ok(Outcome::transition())
    }

    /// Swap the window's column with its neighbour.
    pub fn swap_column(&mut self, id: WindowId, direction: Direction) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        let workspace = &mut self.workspaces[location.workspace];
        if !workspace.swap_with_neighbor(&mut self.store, location.container, direction) {
            return Ok(Outcome::none());
        }
        workspace.focus_cont(&mut self.store, &self.settings, location.container);
        Ok(Outcome::transition())
    }

    /// Swap the window with the one above (forward) or below (backward).
    pub fn swap_stacked(&mut self, id: WindowId, direction: Direction) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        let column = self.store.containers[location.container].windows();
        let Some(neighbor) = column.step(&self.store.windows, location.window, direction) else {
            return Ok(Outcome::none());
        };

        self.store.containers[location.container].swap(
            &mut self.store.windows,
            location.window,
            neighbor,
        );
        self.workspaces[location.workspace].focus_cont(
            &mut self.store,
            &self.settings,
            location.container,
        );
        Ok(Outcome::transition())
    }

    /// Center the window's column on screen.
    pub fn center(&mut self, id: WindowId) -> Result<Outcome, LayoutError> {
        let location = self.require(id)?;
        self.workspaces[location.workspace].anchor_set(
            &mut self.store,
            &self.settings,
            location.container,
            AnchorSide::Center,
        );
        Ok(Outcome::transition())
    }

    /// Switch to the neighbouring workspace, creating one past the last
    /// non-empty workspace and dropping an empty one being left behind.
    pub fn step_workspace(&mut self, direction: Direction) -> Outcome {
        let source = self.current;
        let neighbor = self.order.step(&self.workspaces, source, direction);
        let empty = self.workspaces[source].is_empty();

        let target = match (neighbor, empty) {
            (Some(neighbor), true) => {
                self.delete_workspace(source);
                neighbor
            }
            (Some(neighbor), false) => neighbor,
            (None, false) => self.create_workspace(source, direction),
            (None, true) => return Outcome::none(),
        };
        self.current = target;

        let workspace = &mut self.workspaces[target];
        let focus = workspace.focus();
        if let Some(focus) = focus {
            workspace.focus_cont(&mut self.store, &self.settings, focus);
        }
        Outcome::transition().with_focus(focus.and_then(|c| self.head_id(c)))
    }

    /// Carry the focused column to the neighbouring workspace and follow it.
    pub fn move_focused_container(&mut self, direction: Direction) -> Outcome {
        let source = self.current;
        let Some(container) = self.workspaces[source].focus() else {
            return Outcome::none();
        };
        if self.workspaces[source].len() == 1 && self.order.len() == 1 {
            return Outcome::none();
        }

        let target = match self.order.step(&self.workspaces, source, direction) {
            Some(neighbor) => neighbor,
            None => self.create_workspace(source, direction),
        };

        self.workspaces[source].detach(&mut self.store, container);
        if self.workspaces[source].is_empty() {
            self.delete_workspace(source);
        } else {
            self.workspaces[source].refresh(&mut self.store, &self.settings);
        }

        let workspace = &mut self.workspaces[target];
        let after = workspace.focus();
        workspace.insert_container(&mut self.store, container, after);
        workspace.set_focus(Some(container));
        workspace.anchor_set(&mut self.store, &self.settings, container, AnchorSide::Left);
        self.current = target;

        Outcome::transition().with_focus(self.head_id(container))
    }

    /// Every window's destination for the next transition.
    ///
    /// Windows on the active workspace head for their targets; workspaces
    /// earlier in the list sit one screen height above, later ones one
    /// screen height below.
    pub fn transition_plan(&self) -> Vec<WindowMotion> {
        let height = self.settings.screen.height;
        let keys = self.workspace_keys();
        let active = keys.iter().position(|&k| k == self.current).unwrap_or(0);

        let mut plan = Vec::with_capacity(self.store.windows.len());
        for (index, &workspace) in keys.iter().enumerate() {
            let offset_y = match index.cmp(&active) {
                Ordering::Less => -height,
                Ordering::Equal => 0,
                Ordering::Greater => height,
            };
            for container in self.columns(workspace) {
                let windows = &self.store.windows;
                for key in self.store.containers[container].windows().iter(windows) {
                    plan.push(WindowMotion {
                        id: windows[key].id(),
                        target: windows[key].target(),
                        offset_y,
                    });
                }
            }
        }
        plan
    }

    /// Re-pack an inactive workspace after an edit, or drop it if empty.
    fn settle_inactive(&mut self, workspace: WorkspaceKey) {
        if self.workspaces[workspace].is_empty() {
            self.delete_workspace(workspace);
        } else {
            self.workspaces[workspace].refresh(&mut self.store, &self.settings);
        }
    }

    fn create_workspace(&mut self, relative_to: WorkspaceKey, direction: Direction) -> WorkspaceKey {
        let after = match direction {
            Direction::Forward => Some(relative_to),
            Direction::Backward => self.order.prev(&self.workspaces, relative_to),
        };
        let key = self.workspaces.insert(Workspace::new());
        self.order.insert(&mut self.workspaces, key, after);
        key
    }

    fn delete_workspace(&mut self, key: WorkspaceKey) {
        self.order.remove(&mut self.workspaces, key);
        self.workspaces.remove(key);
    }
}

impl Default for Desktop {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}
