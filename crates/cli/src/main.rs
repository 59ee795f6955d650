//! scrollway CLI
//!
//! Command-line interface for driving the scrollway daemon.
//!
//! Each command marks the focused window; the daemon picks the mark up from
//! the window manager's event stream, clears it and acts on it. This makes
//! the CLI usable from scripts and from keybindings managed outside the
//! daemon.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scrollway_ipc::{Mark, WindowManager, WmCommand};
use scrollway_platform_sway::SwayBackend;

#[derive(Parser)]
#[command(name = "scrollway-cli")]
#[command(author, version, about = "Drive the scrollway layout daemon")]
struct Cli {
    /// Print the window-manager command instead of sending it
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus a neighbouring column or stacked window
    Focus { direction: Side },
    /// Move the focused window into or out of a neighbouring column
    Move { direction: Side },
    /// Swap the focused column or window with its neighbour
    Swap { direction: Side },
    /// Change the width of the focused column
    Width { change: WidthChange },
    /// Center the focused column on screen
    Center,
    /// Switch to the next or previous workspace
    Workspace { direction: Step },
    /// Carry the focused column to the next or previous workspace
    SendToWorkspace { direction: Step },
    /// Send a raw mark such as `_left`
    Mark {
        #[arg(value_parser = parse_mark)]
        mark: Mark,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, ValueEnum)]
enum WidthChange {
    /// Grow by one step
    Inc,
    /// Shrink by one step
    Dec,
    /// Fill the screen
    Full,
}

#[derive(Clone, Copy, ValueEnum)]
enum Step {
    Next,
    Prev,
}

fn parse_mark(s: &str) -> Result<Mark, String> {
    s.parse().map_err(|e: scrollway_ipc::UnknownMark| e.to_string())
}

impl Commands {
    fn mark(&self) -> Mark {
        match *self {
            Commands::Focus { direction } => match direction {
                Side::Left => Mark::Left,
                Side::Right => Mark::Right,
                Side::Up => Mark::Up,
                Side::Down => Mark::Down,
            },
            Commands::Move { direction } => match direction {
                Side::Left => Mark::MoveLeft,
                Side::Right => Mark::MoveRight,
                Side::Up => Mark::MoveUp,
                Side::Down => Mark::MoveDown,
            },
            // Stacked windows only move by swapping.
            Commands::Swap { direction } => match direction {
                Side::Left => Mark::SwapLeft,
                Side::Right => Mark::SwapRight,
                Side::Up => Mark::MoveUp,
                Side::Down => Mark::MoveDown,
            },
            Commands::Width { change } => match change {
                WidthChange::Inc => Mark::IncWidth,
                WidthChange::Dec => Mark::DecWidth,
                WidthChange::Full => Mark::FullWidth,
            },
            Commands::Center => Mark::Center,
            Commands::Workspace { direction } => match direction {
                Step::Next => Mark::NextWorkspace,
                Step::Prev => Mark::PrevWorkspace,
            },
            Commands::SendToWorkspace { direction } => match direction {
                Step::Next => Mark::MoveNextWorkspace,
                Step::Prev => Mark::MovePrevWorkspace,
            },
            Commands::Mark { mark } => mark,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = WmCommand::MarkFocused(cli.command.mark());

    if cli.dry_run {
        println!("{}", command);
        return Ok(());
    }

    let (wm, worker) = SwayBackend::connect().context("Failed to connect to the window manager")?;
    wm.command(command);

    // Dropping the last handle lets the worker drain its queue and exit.
    drop(wm);
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("Command worker panicked"))?;

    Ok(())
}
