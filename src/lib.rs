// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. syntax::SyntaxTree)
    clippy::module_name_repetitions
)]

//! # orgpad
//!
//! The parsing and live-preview core of an Org-mode editor.
//!
//! - Turns a tokenizer's flat pre-order token spans into a validated
//!   [`SyntaxTree`](syntax::SyntaxTree)
//! - Rate-limits re-renders while edits keep arriving
//! - Routes exports into exactly one visible view (Org, rendered HTML, raw
//!   HTML)
//!
//! ## Architecture
//!
//! The shell uses The Elm Architecture (TEA) pattern:
//! - **Model**: document buffer, parser, views and scheduler state
//! - **Message**: edits, document replacement, tab switches, timer ticks
//! - **Update**: state transitions
//!
//! ## Modules
//!
//! - [`syntax`]: node type registry, tree builder, parse adapter, highlighting
//! - [`render`]: render scheduler and view synchronizer
//! - [`export`]: exporter contract
//! - [`editor`]: rope-backed document buffer
//! - [`outline`]: line-level stand-in tokenizer and exporter
//! - [`app`]: the editor shell and its event loop
//! - [`watcher`]: file watching
//! - [`config`]: persisted CLI flags

pub mod app;
pub mod config;
pub mod editor;
pub mod export;
pub mod outline;
pub mod perf;
pub mod render;
pub mod syntax;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model, update};
    pub use crate::editor::{DocumentBuffer, Edit};
    pub use crate::export::{ExportKind, Exporter};
    pub use crate::render::{RenderScheduler, ViewId, ViewSynchronizer};
    pub use crate::syntax::{
        BuildError, NodeTypeRegistry, ParseAdapter, SyntaxTree, TokenSpan, Tokenizer, TreeBuilder,
    };
}
