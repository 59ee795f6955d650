//! scrollway Daemon
//!
//! Main daemon process for the scrollway layout engine.
//!
//! Responsibilities:
//! - Maintain the workspace / column / window model
//! - Process window events from the window manager
//! - Translate marks set by keybindings into layout operations
//! - Animate every geometry change

mod animation;
mod config;
#[cfg(test)]
mod testing;

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use animation::{run_transition, AnimationSettings, Generation, TransitionError};
use config::{BindingsConfig, Config};
use scrollway_core_layout::{Desktop, Direction, LayoutError, Outcome, WindowId};
use scrollway_ipc::{Mark, WindowManager, WmCommand, WmEvent};
use scrollway_platform_sway::{subscribe_window_events, SwayBackend};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Events that the daemon event loop processes.
#[derive(Debug)]
enum DaemonEvent {
    /// A window event from the window manager.
    Wm(WmEvent),
    /// The window manager's event stream ended.
    Disconnected,
    /// A transition found the layout out of sync with the window manager.
    TransitionFailed(TransitionError),
    /// Shutdown signal.
    Shutdown,
}

/// Layout state plus the handles needed to act on it.
struct Daemon<W: WindowManager> {
    desktop: Desktop,
    wm: Arc<W>,
    generation: Generation,
    animation: AnimationSettings,
    events: mpsc::Sender<DaemonEvent>,
}

impl<W: WindowManager> Daemon<W> {
    fn new(
        desktop: Desktop,
        wm: Arc<W>,
        animation: AnimationSettings,
        events: mpsc::Sender<DaemonEvent>,
    ) -> Self {
        Self {
            desktop,
            wm,
            generation: Generation::new(),
            animation,
            events,
        }
    }

    fn handle_wm_event(&mut self, event: WmEvent) {
        let outcome = match event {
            WmEvent::Focused(id) => self.desktop.window_focused(id),
            WmEvent::Closed(id) => match self.desktop.window_closed(id) {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!("Ignoring close: {}", e);
                    return;
                }
            },
            WmEvent::Marked { id, marks } => {
                // Clearing our own marks produces another, empty, mark event.
                if marks.is_empty() {
                    return;
                }
                self.wm.command(WmCommand::Unmark(id));
                apply_marks(&mut self.desktop, id, &marks)
            }
        };
        self.apply(outcome);
    }

    fn apply(&mut self, outcome: Outcome) {
        if let Some(id) = outcome.adopted {
            info!("Managing window {}", id);
            self.wm.command(WmCommand::EnableFloating(id));
        }
        if let Some(id) = outcome.focus {
            self.wm.command(WmCommand::Focus(id));
        }
        if outcome.transition {
            self.start_transition();
        }
    }

    /// Animate toward the current layout, superseding any running transition.
    fn start_transition(&self) {
        let token = self.generation.advance();
        let plan = self.desktop.transition_plan();
        debug!("Transition {}: {} windows", token, plan.len());

        let wm = self.wm.clone();
        let generation = self.generation.clone();
        let settings = self.animation;
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(e) = run_transition(wm, plan, generation, token, settings).await {
                let _ = events.send(DaemonEvent::TransitionFailed(e)).await;
            }
        });
    }
}

/// Parse the marks on a window and apply ours in declaration order.
fn apply_marks(desktop: &mut Desktop, id: WindowId, marks: &[String]) -> Outcome {
    let mut ours = BTreeSet::new();
    for mark in marks {
        match mark.parse::<Mark>() {
            Ok(mark) => {
                ours.insert(mark);
            }
            Err(e) => debug!("{} on window {}", e, id),
        }
    }

    ours.into_iter()
        .fold(Outcome::none(), |outcome, mark| match handle_mark(desktop, id, mark) {
            Ok(next) => outcome.then(next),
            Err(e) => {
                debug!("Ignoring {}: {}", mark, e);
                outcome
            }
        })
}

/// Perform the layout operation a mark stands for.
fn handle_mark(desktop: &mut Desktop, id: WindowId, mark: Mark) -> Result<Outcome, LayoutError> {
    use Direction::{Backward, Forward};

    let step = desktop.settings().width_step;
    match mark {
        Mark::Left => desktop.focus_column(id, Backward),
        Mark::Right => desktop.focus_column(id, Forward),
        Mark::Down => desktop.focus_stacked(id, Backward),
        Mark::Up => desktop.focus_stacked(id, Forward),
        Mark::DecWidth => desktop.resize_column(id, -step),
        Mark::IncWidth => desktop.resize_column(id, step),
        Mark::FullWidth => desktop.full_width(id),
        Mark::MoveLeft => desktop.move_window(id, Backward),
        Mark::MoveRight => desktop.move_window(id, Forward),
        Mark::SwapLeft => desktop.swap_column(id, Backward),
        Mark::SwapRight => desktop.swap_column(id, Forward),
        Mark::MoveUp => desktop.swap_stacked(id, Forward),
        Mark::MoveDown => desktop.swap_stacked(id, Backward),
        Mark::Center => desktop.center(id),
        Mark::NextWorkspace => Ok(desktop.step_workspace(Forward)),
        Mark::PrevWorkspace => Ok(desktop.step_workspace(Backward)),
        Mark::MoveNextWorkspace => Ok(desktop.move_focused_container(Forward)),
        Mark::MovePrevWorkspace => Ok(desktop.move_focused_container(Backward)),
    }
}

/// Bind every configured key chord to its mark.
fn register_bindings<W: WindowManager>(wm: &W, bindings: &BindingsConfig) {
    for (key, mark) in &bindings.bindings {
        debug!("Binding {} to {}", key, mark);
        wm.command(WmCommand::BindMark {
            key: key.clone(),
            mark: *mark,
        });
    }
    info!("Registered {} key bindings", bindings.bindings.len());
}

/// Spawn a named forwarding thread that receives events from a std::sync::mpsc channel
/// and forwards them to a tokio mpsc sender. `on_close` is sent once the source
/// channel disconnects.
fn spawn_forwarding_thread<T: Send + 'static>(
    name: &str,
    receiver: std::sync::mpsc::Receiver<T>,
    sender: mpsc::Sender<DaemonEvent>,
    map_fn: impl Fn(T) -> DaemonEvent + Send + 'static,
    on_close: Option<DaemonEvent>,
) -> Result<std::thread::JoinHandle<()>> {
    let thread_name = name.to_string();
    std::thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            while let Ok(event) = receiver.recv() {
                if sender.blocking_send(map_fn(event)).is_err() {
                    return; // Channel closed, daemon shutting down
                }
            }
            if let Some(event) = on_close {
                let _ = sender.blocking_send(event);
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to spawn {} thread: {}", thread_name, e))
}

fn log_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO, // default fallback for invalid values
    }
}

// One thread: a frame's token check and its commands never interleave with
// the event loop advancing the generation.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration first (needed for log level)
    let mut config = Config::load().unwrap_or_else(|e| {
        // Can't use tracing yet, fall back to eprintln
        eprintln!("Failed to load configuration: {:#}. Using defaults.", e);
        Config::default()
    });

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config.behavior.log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Validate and clamp config values
    for w in config.validate() {
        warn!("Config: {} - {}", w.field, w.message);
    }

    info!("scrollway daemon starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let settings = config.layout_settings();
    info!(
        "Screen {}x{} at {},{}; margin={}, width_step={}, min_column_width={}",
        settings.screen.width,
        settings.screen.height,
        settings.screen.x,
        settings.screen.y,
        settings.margin,
        settings.width_step,
        settings.min_column_width
    );

    let (wm, _command_worker) =
        SwayBackend::connect().context("Failed to connect to the window manager")?;
    let wm = Arc::new(wm);
    register_bindings(&*wm, &config.bindings);

    // Create event channel
    let (event_tx, mut event_rx) = mpsc::channel::<DaemonEvent>(100);

    let (window_events, _event_reader) =
        subscribe_window_events().context("Failed to subscribe to window events")?;
    let _forwarder = spawn_forwarding_thread(
        "wm-event-fwd",
        window_events,
        event_tx.clone(),
        DaemonEvent::Wm,
        Some(DaemonEvent::Disconnected),
    )?;

    // Ctrl-C handler
    {
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                let _ = event_tx.send(DaemonEvent::Shutdown).await;
            }
        });
    }

    let mut daemon = Daemon::new(
        Desktop::new(settings),
        wm,
        config.animation_settings(),
        event_tx,
    );

    info!("Listening for window events");
    while let Some(event) = event_rx.recv().await {
        match event {
            DaemonEvent::Wm(event) => {
                debug!("{:?}", event);
                daemon.handle_wm_event(event);
            }
            DaemonEvent::TransitionFailed(e) => {
                error!("Layout is out of sync with the window manager: {}", e);
                return Err(e.into());
            }
            DaemonEvent::Disconnected => {
                warn!("Window manager event stream closed");
                break;
            }
            DaemonEvent::Shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollway_core_layout::{LayoutSettings, Rect};
    use std::time::Duration;
    use crate::testing::RecordingWm;

    fn desktop() -> Desktop {
        Desktop::new(LayoutSettings {
            screen: Rect::new(0, 0, 1910, 1000),
            ..LayoutSettings::default()
        })
    }

    fn marks(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn daemon(wm: Arc<RecordingWm>) -> (Daemon<RecordingWm>, mpsc::Receiver<DaemonEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (Daemon::new(desktop(), wm, AnimationSettings::default(), tx), rx)
    }

    #[test]
    fn test_every_mark_is_handled_for_unknown_window() {
        let mut desktop = desktop();
        for mark in Mark::ALL {
            let result = handle_mark(&mut desktop, 99, mark);
            match mark {
                Mark::NextWorkspace
                | Mark::PrevWorkspace
                | Mark::MoveNextWorkspace
                | Mark::MovePrevWorkspace => assert!(result.is_ok(), "{mark}"),
                _ => assert_eq!(result, Err(LayoutError::WindowNotFound(99)), "{mark}"),
            }
        }
    }

    #[test]
    fn test_width_marks_use_configured_step() {
        let mut desktop = desktop();
        let _ = desktop.window_focused(1);
        let column = desktop.locate(1).unwrap().container;

        let _ = apply_marks(&mut desktop, 1, &marks(&["_incwidth"]));
        assert_eq!(desktop.container(column).width(), 1055);
        let _ = apply_marks(&mut desktop, 1, &marks(&["_decwidth"]));
        let _ = apply_marks(&mut desktop, 1, &marks(&["_decwidth"]));
        assert_eq!(desktop.container(column).width(), 855);
        let _ = apply_marks(&mut desktop, 1, &marks(&["_fullwidth"]));
        assert_eq!(desktop.container(column).width(), 1910);
    }

    #[test]
    fn test_marks_apply_once_in_declaration_order() {
        let mut desktop = desktop();
        let _ = desktop.window_focused(1);
        let column = desktop.locate(1).unwrap().container;

        // Duplicates collapse; unknown marks are skipped.
        let outcome = apply_marks(
            &mut desktop,
            1,
            &marks(&["_incwidth", "user-mark", "_incwidth", "_center"]),
        );
        assert!(outcome.transition);
        assert_eq!(desktop.container(column).width(), 1055);
        assert_eq!(
            desktop.current_workspace().side(),
            scrollway_core_layout::AnchorSide::Center
        );
    }

    #[test]
    fn test_focus_marks_only_request_focus() {
        let mut desktop = desktop();
        let _ = desktop.window_focused(1);
        let _ = desktop.window_focused(2);

        let outcome = apply_marks(&mut desktop, 2, &marks(&["_left"]));
        assert_eq!(outcome, Outcome::focus(1));
        let outcome = apply_marks(&mut desktop, 1, &marks(&["_left"]));
        assert_eq!(outcome, Outcome::none());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(log_level("debug"), Level::DEBUG);
        assert_eq!(log_level("WARN"), Level::WARN);
        assert_eq!(log_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_register_bindings() {
        let wm = RecordingWm::default();
        register_bindings(&wm, &BindingsConfig::default());
        let commands = wm.commands();
        assert_eq!(commands.len(), BindingsConfig::default().bindings.len());
        assert!(commands.contains(&WmCommand::BindMark {
            key: "Mod4+h".to_string(),
            mark: Mark::Left,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_window_is_floated_and_placed() {
        let wm = Arc::new(RecordingWm::with_windows([(1, Rect::new(300, 300, 200, 200))]));
        let (mut daemon, _rx) = daemon(wm.clone());

        daemon.handle_wm_event(WmEvent::Focused(1));
        assert_eq!(wm.commands()[0], WmCommand::EnableFloating(1));

        tokio::time::sleep(Duration::from_secs(1)).await;
        // Half the screen wide, full height, inset by the margin.
        assert_eq!(wm.last_rect(1), Some(Rect::new(5, 5, 945, 990)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_event_unmarks_first() {
        let wm = Arc::new(RecordingWm::with_windows([(1, Rect::new(0, 0, 10, 10))]));
        let (mut daemon, _rx) = daemon(wm.clone());
        daemon.handle_wm_event(WmEvent::Focused(1));
        tokio::time::sleep(Duration::from_secs(1)).await;
        wm.clear();

        daemon.handle_wm_event(WmEvent::Marked {
            id: 1,
            marks: marks(&["_center"]),
        });
        assert_eq!(wm.commands()[0], WmCommand::Unmark(1));

        // The follow-up event for the cleared marks does nothing.
        wm.clear();
        daemon.handle_wm_event(WmEvent::Marked {
            id: 1,
            marks: Vec::new(),
        });
        assert!(wm.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_transition_wins() {
        let wm = Arc::new(RecordingWm::with_windows([
            (1, Rect::new(0, 0, 10, 10)),
            (2, Rect::new(0, 0, 10, 10)),
        ]));
        let (mut daemon, _rx) = daemon(wm.clone());

        daemon.handle_wm_event(WmEvent::Focused(1));
        daemon.handle_wm_event(WmEvent::Focused(2));
        tokio::time::sleep(Duration::from_millis(50)).await;
        daemon.handle_wm_event(WmEvent::Marked {
            id: 2,
            marks: marks(&["_incwidth"]),
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Column 2 grew to 1055 and the row was scrolled to keep it visible.
        assert_eq!(wm.last_rect(2).map(|r| r.width), Some(1045));
        assert_eq!(wm.last_rect(2).map(|r| r.right()), Some(1910 - 5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_divergence_is_reported_to_event_loop() {
        let wm = Arc::new(RecordingWm::with_windows([]));
        let (mut daemon, mut rx) = daemon(wm.clone());

        daemon.handle_wm_event(WmEvent::Focused(7));
        match rx.recv().await {
            Some(DaemonEvent::TransitionFailed(TransitionError::Diverged(7))) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_unknown_window_is_ignored() {
        let wm = Arc::new(RecordingWm::with_windows([]));
        let (mut daemon, _rx) = daemon(wm.clone());
        daemon.handle_wm_event(WmEvent::Closed(42));
        assert!(wm.commands().is_empty());
    }

    #[test]
    fn test_forwarding_thread_reports_disconnect() {
        let (tx, mut rx) = mpsc::channel(4);
        let (source_tx, source_rx) = std::sync::mpsc::channel();
        let handle = spawn_forwarding_thread(
            "test-fwd",
            source_rx,
            tx,
            DaemonEvent::Wm,
            Some(DaemonEvent::Disconnected),
        )
        .unwrap();

        source_tx.send(WmEvent::Focused(3)).unwrap();
        drop(source_tx);
        handle.join().unwrap();

        assert!(matches!(rx.blocking_recv(), Some(DaemonEvent::Wm(WmEvent::Focused(3)))));
        assert!(matches!(rx.blocking_recv(), Some(DaemonEvent::Disconnected)));
    }
}
