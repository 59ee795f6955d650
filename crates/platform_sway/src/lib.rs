//! scrollway Platform sway
//!
//! Window-manager integration over the i3 IPC protocol, using `swayipc`.
//!
//! This crate handles:
//! - A worker thread owning the command connection, so commands never block
//!   the daemon's event loop
//! - Window-tree snapshots with title bars folded into each window's rect
//! - A reader thread turning window events into [`WmEvent`]s

use std::collections::HashMap;
use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;

use scrollway_core_layout::{Rect, WindowId};
use scrollway_ipc::{WindowManager, WmCommand, WmEvent};
use swayipc::{Connection, Event, EventType, Node, NodeType, WindowChange};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

/// Errors that can occur while talking to the window manager.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Failed to connect to the window manager: {0}")]
    Connect(#[source] swayipc::Error),

    #[error("Window manager request failed: {0}")]
    Request(#[from] swayipc::Error),

    #[error("Command worker has stopped")]
    WorkerStopped,

    #[error("Failed to spawn {0} thread: {1}")]
    Spawn(&'static str, #[source] std::io::Error),
}

enum Request {
    Command(WmCommand),
    Tree(oneshot::Sender<Result<Node, swayipc::Error>>),
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Command(command) => write!(f, "Command({command})"),
            Request::Tree(_) => f.write_str("Tree"),
        }
    }
}

/// Handle to the command worker.
///
/// Cloning is cheap; every clone feeds the same worker thread.
#[derive(Debug, Clone)]
pub struct SwayBackend {
    requests: mpsc::UnboundedSender<Request>,
}

impl SwayBackend {
    /// Connect and start the command worker.
    ///
    /// The worker exits once every handle has been dropped.
    pub fn connect() -> Result<(Self, JoinHandle<()>), PlatformError> {
        let connection = Connection::new().map_err(PlatformError::Connect)?;
        let (requests, receiver) = mpsc::unbounded_channel();

        let worker = std::thread::Builder::new()
            .name("sway-commands".to_string())
            .spawn(move || run_worker(connection, receiver))
            .map_err(|e| PlatformError::Spawn("sway-commands", e))?;

        Ok((Self { requests }, worker))
    }
}

fn run_worker(mut connection: Connection, mut requests: mpsc::UnboundedReceiver<Request>) {
    while let Some(request) = requests.blocking_recv() {
        match request {
            Request::Command(command) => {
                let payload = command.to_string();
                trace!("-> {}", payload);
                match connection.run_command(&payload) {
                    Ok(outcomes) => {
                        for outcome in outcomes {
                            if let Err(e) = outcome {
                                warn!("Command '{}' failed: {}", payload, e);
                            }
                        }
                    }
                    Err(e) => warn!("Failed to send command '{}': {}", payload, e),
                }
            }
            Request::Tree(reply) => {
                // The requester may have given up; nothing to do then.
                let _ = reply.send(connection.get_tree());
            }
        }
    }
    debug!("Command worker exiting");
}

impl WindowManager for SwayBackend {
    type Error = PlatformError;

    fn command(&self, command: WmCommand) {
        if self.requests.send(Request::Command(command)).is_err() {
            warn!("Command worker has stopped; dropping command");
        }
    }

    async fn window_rects(&self) -> Result<HashMap<WindowId, Rect>, PlatformError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Tree(reply))
            .map_err(|_| PlatformError::WorkerStopped)?;
        let tree = response.await.map_err(|_| PlatformError::WorkerStopped)??;

        let mut rects = HashMap::new();
        collect_rects(&tree, &mut rects);
        Ok(rects)
    }
}

/// Gather every container in the tree, with its title bar folded in.
fn collect_rects(node: &Node, rects: &mut HashMap<WindowId, Rect>) {
    if matches!(node.node_type, NodeType::Con | NodeType::FloatingCon) {
        let rect = Rect::new(node.rect.x, node.rect.y, node.rect.width, node.rect.height);
        rects.insert(node.id, include_decoration(rect, node.deco_rect.height));
    }
    for child in node.nodes.iter().chain(&node.floating_nodes) {
        collect_rects(child, rects);
    }
}

/// The manager reports a window's content area; positions we set refer to
/// the outer frame including the title bar above it.
pub fn include_decoration(rect: Rect, deco_height: i32) -> Rect {
    Rect {
        y: rect.y - deco_height,
        height: rect.height + deco_height,
        ..rect
    }
}

/// Subscribe to window events on a dedicated connection.
///
/// Events are delivered on the returned receiver from a reader thread. The
/// receiver disconnects when the event stream ends.
pub fn subscribe_window_events(
) -> Result<(std_mpsc::Receiver<WmEvent>, JoinHandle<()>), PlatformError> {
    let stream = Connection::new()
        .map_err(PlatformError::Connect)?
        .subscribe([EventType::Window])?;
    let (sender, receiver) = std_mpsc::channel();

    let reader = std::thread::Builder::new()
        .name("sway-events".to_string())
        .spawn(move || {
            for event in stream {
                match event {
                    Ok(event) => {
                        let Some(event) = window_event(event) else {
                            continue;
                        };
                        if sender.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Window event stream error: {}", e);
                        break;
                    }
                }
            }
            debug!("Event reader exiting");
        })
        .map_err(|e| PlatformError::Spawn("sway-events", e))?;

    Ok((receiver, reader))
}

fn window_event(event: Event) -> Option<WmEvent> {
    let Event::Window(event) = event else {
        return None;
    };
    let id = event.container.id;
    match event.change {
        WindowChange::Focus => Some(WmEvent::Focused(id)),
        WindowChange::Close => Some(WmEvent::Closed(id)),
        WindowChange::Mark => Some(WmEvent::Marked {
            id,
            marks: event.container.marks,
        }),
        _ => None,
    }
}
