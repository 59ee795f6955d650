//! Integration tests for the scrollway layout engine and protocol vocabulary.
//!
//! These tests drive a [`Desktop`] through realistic event sequences without
//! a running window manager. They test:
//! - Layout invariants after every step of a session
//! - Mark parsing at the protocol boundary
//! - The commands a transition would issue

use scrollway_core_layout::{AnchorSide, Desktop, Direction, LayoutSettings, Rect, WindowMotion};
use scrollway_ipc::{Mark, WmCommand};

const SCREEN: Rect = Rect {
    x: 5,
    y: 55,
    width: 1910,
    height: 1020,
};

fn desktop() -> Desktop {
    Desktop::new(LayoutSettings::default())
}

/// Columns of the current workspace must tile without gaps or overlaps.
fn assert_packed(desktop: &Desktop) {
    let columns = desktop.columns(desktop.current());
    for pair in columns.windows(2) {
        let left = desktop.container(pair[0]);
        let right = desktop.container(pair[1]);
        assert_eq!(left.x() + left.width(), right.x(), "gap between columns");
    }
}

/// The focused column must overlap the screen horizontally.
fn assert_focus_visible(desktop: &Desktop) {
    let Some(focus) = desktop.current_workspace().focus() else {
        return;
    };
    let column = desktop.container(focus);
    assert!(column.x() < SCREEN.right(), "focused column right of screen");
    assert!(column.x() + column.width() > SCREEN.x, "focused column left of screen");
}

fn current_plan(desktop: &Desktop) -> Vec<WindowMotion> {
    desktop
        .transition_plan()
        .into_iter()
        .filter(|m| m.offset_y == 0)
        .collect()
}

// ============================================================================
// Session scenarios
// ============================================================================

#[test]
fn test_opening_windows_scrolls_to_newest() {
    let mut desktop = desktop();
    for id in 1..=5 {
        let outcome = desktop.window_focused(id);
        assert_eq!(outcome.adopted, Some(id));
        assert_packed(&desktop);
        assert_focus_visible(&desktop);
    }

    // Five half-screen columns do not fit; the newest is pinned right.
    let workspace = desktop.current_workspace();
    assert_eq!(workspace.side(), AnchorSide::Right);
    let newest = desktop.container(workspace.anchor().unwrap());
    assert_eq!(newest.x() + newest.width(), SCREEN.right());
}

#[test]
fn test_walking_back_scrolls_left() {
    let mut desktop = desktop();
    for id in 1..=5 {
        let _ = desktop.window_focused(id);
    }

    for id in (1..=5).rev() {
        let outcome = desktop.focus_column(id, Direction::Backward).unwrap();
        if let Some(next) = outcome.focus {
            let _ = desktop.window_focused(next);
        }
        assert_packed(&desktop);
        assert_focus_visible(&desktop);
    }

    let workspace = desktop.current_workspace();
    assert_eq!(workspace.side(), AnchorSide::Left);
    assert_eq!(desktop.container(workspace.anchor().unwrap()).x(), SCREEN.x);
}

#[test]
fn test_mixed_session_keeps_invariants() {
    let mut desktop = desktop();
    let marks = [
        (2, "_moveleft"),
        (3, "_incwidth"),
        (3, "_swapleft"),
        (4, "_center"),
        (1, "_fullwidth"),
        (2, "_moveright"),
        (4, "_decwidth"),
        (3, "_moveup"),
        (3, "_movedown"),
    ];

    for id in 1..=4 {
        let _ = desktop.window_focused(id);
    }
    for (id, name) in marks {
        let mark: Mark = name.parse().unwrap();
        let width = desktop.settings().width_step;
        let _ = match mark {
            Mark::MoveLeft => desktop.move_window(id, Direction::Backward),
            Mark::MoveRight => desktop.move_window(id, Direction::Forward),
            Mark::IncWidth => desktop.resize_column(id, width),
            Mark::DecWidth => desktop.resize_column(id, -width),
            Mark::SwapLeft => desktop.swap_column(id, Direction::Backward),
            Mark::Center => desktop.center(id),
            Mark::FullWidth => desktop.full_width(id),
            Mark::MoveUp => desktop.swap_stacked(id, Direction::Forward),
            Mark::MoveDown => desktop.swap_stacked(id, Direction::Backward),
            other => panic!("unexpected mark {other}"),
        }
        .unwrap();
        assert_packed(&desktop);
    }

    assert_eq!(desktop.window_count(), 4);
    let windows: usize = desktop
        .columns(desktop.current())
        .into_iter()
        .map(|c| desktop.column_windows(c).len())
        .sum();
    assert_eq!(windows, 4);
}

#[test]
fn test_closing_everything_leaves_one_empty_workspace() {
    let mut desktop = desktop();
    for id in 1..=3 {
        let _ = desktop.window_focused(id);
    }
    let _ = desktop.move_focused_container(Direction::Forward);
    assert_eq!(desktop.workspace_count(), 2);

    for id in [1, 2, 3] {
        let _ = desktop.window_closed(id).unwrap();
        assert_packed(&desktop);
    }

    assert_eq!(desktop.window_count(), 0);
    assert_eq!(desktop.workspace_count(), 1);
    assert!(desktop.current_workspace().is_empty());
}

// ============================================================================
// Transition commands
// ============================================================================

#[test]
fn test_plan_renders_to_absolute_commands() {
    let mut desktop = desktop();
    let _ = desktop.window_focused(10);

    let plan = current_plan(&desktop);
    assert_eq!(plan.len(), 1);
    let target = plan[0].destination();
    assert_eq!(target, Rect::new(10, 60, 945, 1010));

    let resize = WmCommand::Resize {
        id: plan[0].id,
        width: target.width,
        height: target.height,
    };
    let move_to = WmCommand::MoveTo {
        id: plan[0].id,
        x: target.x,
        y: target.y,
    };
    assert_eq!(
        resize.to_string(),
        "[con_id=10] resize set width 945px height 1010px"
    );
    assert_eq!(
        move_to.to_string(),
        "[con_id=10] move absolute position 10px 60px"
    );
}

#[test]
fn test_stacked_windows_split_screen_height() {
    let mut desktop = desktop();
    let _ = desktop.window_focused(1);
    let _ = desktop.window_focused(2);
    let _ = desktop.move_window(2, Direction::Backward).unwrap();

    let plan = current_plan(&desktop);
    let target = |id| plan.iter().find(|m| m.id == id).unwrap().target;
    // Bottom band for the head (2), top band for 1.
    assert_eq!(target(2), Rect::new(10, 570, 945, 500));
    assert_eq!(target(1), Rect::new(10, 60, 945, 500));
}

#[test]
fn test_inactive_workspaces_are_parked_off_screen() {
    let mut desktop = desktop();
    let _ = desktop.window_focused(1);
    let _ = desktop.window_focused(2);
    let _ = desktop.move_focused_container(Direction::Forward);
    let _ = desktop.step_workspace(Direction::Backward);

    for motion in desktop.transition_plan() {
        let destination = motion.destination();
        match motion.id {
            1 => assert!(destination.intersects(&SCREEN)),
            2 => assert!(destination.y >= SCREEN.bottom()),
            other => panic!("unexpected window {other}"),
        }
    }
}

#[test]
fn test_unknown_marks_rejected_at_boundary() {
    for name in ["_LEFT", "left", "_resize", "", "_center "] {
        assert!(name.parse::<Mark>().is_err(), "{name:?} accepted");
    }
}
