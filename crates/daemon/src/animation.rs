//! Animated transitions.
//!
//! A transition moves every managed window from where the window manager
//! currently shows it to where the layout wants it, one interpolated
//! resize-and-move per frame. Starting a new transition advances the shared
//! [`Generation`]; frames of older transitions see a stale token and stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scrollway_core_layout::{Easing, Rect, WindowId, WindowMotion};
use scrollway_ipc::{WindowManager, WmCommand};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

/// Errors that end a transition early.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Window {0} is in the layout but missing from the window tree")]
    Diverged(WindowId),

    #[error("Failed to capture the window tree: {0}")]
    Snapshot(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Animation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Monotonic transition counter shared by the event loop and every frame.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede every running transition and return the new token.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.0.load(Ordering::SeqCst) == token
    }
}

/// Transition timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    pub duration: Duration,
    pub fps: u32,
    pub easing: Easing,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            fps: 60,
            easing: Easing::OutQuad,
        }
    }
}

impl AnimationSettings {
    /// Number of frames in one transition. Zero means jump straight to the
    /// target.
    pub fn frames(&self) -> u32 {
        (self.duration.as_secs_f64() * self.fps as f64).round() as u32
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

fn place<W: WindowManager>(wm: &W, id: WindowId, rect: Rect) {
    wm.command(WmCommand::Resize {
        id,
        width: rect.width,
        height: rect.height,
    });
    wm.command(WmCommand::MoveTo {
        id,
        x: rect.x,
        y: rect.y,
    });
}

/// Drive one window from `source` to `target`.
///
/// Returns early, without issuing further commands, as soon as `token` is
/// no longer the current generation.
pub async fn animate_window<W: WindowManager>(
    wm: Arc<W>,
    id: WindowId,
    source: Rect,
    target: Rect,
    generation: Generation,
    token: u64,
    settings: AnimationSettings,
) {
    let frames = settings.frames();
    if frames == 0 {
        if generation.is_current(token) {
            place(&*wm, id, target);
        }
        return;
    }

    let duration = settings.duration.as_secs_f64();
    let interval = settings.frame_interval();
    let start = Instant::now();

    for frame in 1..=frames {
        let frame_start = Instant::now();
        let t = frame_start.duration_since(start).as_secs_f64() / duration;
        let done = t >= 1.0 || frame == frames;
        let progress = if done { 1.0 } else { settings.easing.apply(t) };

        // No await between the check and the commands.
        if !generation.is_current(token) {
            trace!("Window {} animation superseded at frame {}", id, frame);
            return;
        }
        place(&*wm, id, Rect::lerp(source, target, progress));

        if done {
            return;
        }
        sleep(interval.saturating_sub(frame_start.elapsed())).await;
    }
}

/// Animate every window in `plan` toward its destination.
///
/// The window tree is captured once up front. A planned window missing from
/// it means the layout and the window manager disagree, which is reported
/// as [`TransitionError::Diverged`].
pub async fn run_transition<W: WindowManager>(
    wm: Arc<W>,
    plan: Vec<WindowMotion>,
    generation: Generation,
    token: u64,
    settings: AnimationSettings,
) -> Result<(), TransitionError> {
    let rects = wm
        .window_rects()
        .await
        .map_err(|e| TransitionError::Snapshot(Box::new(e)))?;

    // Windows closed while a superseded transition waited for the tree are
    // not a disagreement.
    if !generation.is_current(token) {
        debug!("Transition {} superseded before it started", token);
        return Ok(());
    }

    let mut motions = Vec::with_capacity(plan.len());
    for motion in plan {
        let source = rects
            .get(&motion.id)
            .copied()
            .ok_or(TransitionError::Diverged(motion.id))?;
        motions.push((motion.id, source, motion.destination()));
    }

    let mut tasks = JoinSet::new();
    for (id, source, target) in motions {
        tasks.spawn(animate_window(
            wm.clone(),
            id,
            source,
            target,
            generation.clone(),
            token,
            settings,
        ));
    }
    while let Some(result) = tasks.join_next().await {
        result?;
    }

    trace!("Transition {} finished", token);
    Ok(())
}
