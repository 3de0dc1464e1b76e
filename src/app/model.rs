use std::time::{Duration, Instant};

use crate::editor::DocumentBuffer;
use crate::export::Exporter;
use crate::render::{RenderScheduler, ViewId, ViewSynchronizer};
use crate::syntax::{ParseAdapter, StyledRange, SyntaxTree, Tokenizer, style_ranges};

/// Document text captured when an edit is reported to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub revision: u64,
    pub text: String,
}

/// Everything the shell knows about the open document and its views.
pub struct Model {
    pub document: DocumentBuffer,
    parser: ParseAdapter<Box<dyn Tokenizer>>,
    views: ViewSynchronizer<Box<dyn Exporter>>,
    scheduler: RenderScheduler<Snapshot>,
    tree: Option<SyntaxTree>,
    rendered_revision: Option<u64>,
    render_count: u64,
    last_error: Option<String>,
    pub should_quit: bool,
}

impl Model {
    pub fn new(
        text: &str,
        parser: ParseAdapter<Box<dyn Tokenizer>>,
        views: ViewSynchronizer<Box<dyn Exporter>>,
        cooldown: Duration,
    ) -> Self {
        Self {
            document: DocumentBuffer::from_text(text),
            parser,
            views,
            scheduler: RenderScheduler::new(cooldown),
            tree: None,
            rendered_revision: None,
            render_count: 0,
            last_error: None,
            should_quit: false,
        }
    }

    /// The last tree that built successfully.
    pub const fn tree(&self) -> Option<&SyntaxTree> {
        self.tree.as_ref()
    }

    pub const fn views(&self) -> &ViewSynchronizer<Box<dyn Exporter>> {
        &self.views
    }

    pub const fn active_view(&self) -> ViewId {
        self.views.active_view()
    }

    /// What the active view currently displays.
    pub fn active_output(&self) -> String {
        self.views.active_pane().document()
    }

    /// Revision of the document text behind the latest render.
    pub const fn rendered_revision(&self) -> Option<u64> {
        self.rendered_revision
    }

    /// Number of render cycles run so far.
    pub const fn render_count(&self) -> u64 {
        self.render_count
    }

    /// The most recent failure, cleared by the next clean render.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub const fn scheduler(&self) -> &RenderScheduler<Snapshot> {
        &self.scheduler
    }

    /// When the event loop must wake up to flush a coalesced render.
    pub fn time_until_render(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    /// Style runs over the last good tree.
    pub fn style_ranges(&self) -> Vec<StyledRange> {
        self.tree
            .as_ref()
            .map(|tree| style_ranges(tree, self.parser.registry()))
            .unwrap_or_default()
    }

    pub(super) fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.document.revision(),
            text: self.document.text(),
        }
    }

    /// Report a document change to the scheduler, rendering on the leading
    /// edge of a burst.
    pub(super) fn document_changed(&mut self, now: Instant) {
        let snapshot = self.snapshot();
        if let Some(snapshot) = self.scheduler.notify(now, snapshot) {
            self.render(&snapshot);
        }
    }

    pub(super) fn tick(&mut self, now: Instant) {
        if let Some(snapshot) = self.scheduler.poll(now) {
            self.render(&snapshot);
        }
    }

    pub(super) fn switch_view(&mut self, id: ViewId) {
        self.views.set_active_view(id);
        let snapshot = self.snapshot();
        self.render(&snapshot);
    }

    /// One render cycle: re-parse, then refresh the active view. Each half
    /// keeps its previous result when it fails.
    fn render(&mut self, snapshot: &Snapshot) {
        let _scope = crate::perf::scope("app.render");
        let mut failure = None;

        match self.parser.parse_whole(&snapshot.text) {
            Ok(tree) => self.tree = Some(tree),
            Err(err) => failure = Some(err.to_string()),
        }
        if let Err(err) = self.views.render(&snapshot.text) {
            tracing::warn!(%err, view = %self.views.active_view(), "export failed");
            failure = Some(err.to_string());
        }

        self.last_error = failure;
        self.rendered_revision = Some(snapshot.revision);
        self.render_count += 1;
        tracing::debug!(revision = snapshot.revision, renders = self.render_count, "render cycle");
        crate::perf::log_event(
            "app.render",
            format!("revision={} view={}", snapshot.revision, self.views.active_view()),
        );
    }

    pub(super) fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }
}
