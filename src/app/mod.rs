//! The editor shell.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: document, parser, views and scheduler state
//! - [`Message`]: edits, document replacement, tab switches, timer ticks
//! - [`update`]: state transitions
//! - [`App::run`]: loads the file, prints the active view, optionally follows
//!   external saves

mod event_loop;
mod model;
mod update;

pub use model::{Model, Snapshot};
pub use update::{Message, update};

use std::path::PathBuf;
use std::time::Duration;

use crate::render::{DEFAULT_COOLDOWN, ViewId};

/// Runs the shell over one file.
pub struct App {
    file_path: PathBuf,
    view: ViewId,
    watch_enabled: bool,
    print_tree: bool,
    cooldown: Duration,
    poll_interval: Duration,
}

impl App {
    pub const fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            view: ViewId::Rendered,
            watch_enabled: false,
            print_tree: false,
            cooldown: DEFAULT_COOLDOWN,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Select the view shown at startup.
    #[must_use]
    pub const fn with_view(mut self, view: ViewId) -> Self {
        self.view = view;
        self
    }

    /// Keep running and re-render on external saves.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Print the syntax tree as JSON instead of the view output.
    #[must_use]
    pub const fn with_tree_output(mut self, enabled: bool) -> Self {
        self.print_tree = enabled;
        self
    }

    /// Render cooldown while changes keep arriving.
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}
