use std::fmt;

use crate::export::{ExportError, ExportKind, Exporter, export_input};

/// The mutually exclusive output views.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    /// Org round-trip of the document.
    Org,
    /// HTML shown as a live page.
    Rendered,
    /// HTML source shown as text.
    Raw,
}

impl ViewId {
    pub const ALL: [Self; 3] = [Self::Org, Self::Rendered, Self::Raw];

    /// The export whose output this view shows.
    pub const fn export_kind(self) -> ExportKind {
        match self {
            Self::Org => ExportKind::Markup,
            Self::Rendered | Self::Raw => ExportKind::Html,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Org => "org",
            Self::Rendered => "rendered",
            Self::Raw => "raw",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    const fn slot(self) -> usize {
        match self {
            Self::Org => 0,
            Self::Rendered => 1,
            Self::Raw => 2,
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a view's output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneContent {
    /// An embedded HTML page. Renders replace only the body so the page is
    /// never reloaded.
    Frame { head: String, body: String },
    /// Literal text, replaced wholesale.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPane {
    id: ViewId,
    visible: bool,
    content: PaneContent,
}

impl ViewPane {
    fn new(id: ViewId) -> Self {
        let content = match id {
            ViewId::Rendered => PaneContent::Frame {
                head: r#"<meta charset="utf-8">"#.to_string(),
                body: String::new(),
            },
            ViewId::Org | ViewId::Raw => PaneContent::Text(String::new()),
        };
        Self {
            id,
            visible: false,
            content,
        }
    }

    pub const fn id(&self) -> ViewId {
        self.id
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn content(&self) -> &PaneContent {
        &self.content
    }

    /// The text last written into this pane (the body for frames).
    pub fn text(&self) -> &str {
        match &self.content {
            PaneContent::Frame { body, .. } => body,
            PaneContent::Text(text) => text,
        }
    }

    /// What the pane displays: the full page for frames, the text otherwise.
    pub fn document(&self) -> String {
        match &self.content {
            PaneContent::Frame { head, body } => format!(
                "<!DOCTYPE html>\n<html>\n<head>{head}</head>\n<body>\n{body}</body>\n</html>\n"
            ),
            PaneContent::Text(text) => text.clone(),
        }
    }

    fn write(&mut self, output: &str) {
        match &mut self.content {
            PaneContent::Frame { body, .. } => {
                body.clear();
                body.push_str(output);
            }
            PaneContent::Text(text) => {
                text.clear();
                text.push_str(output);
            }
        }
    }
}

/// Owns the view state and routes renders into the active view.
pub struct ViewSynchronizer<E> {
    exporter: E,
    panes: [ViewPane; 3],
    active: ViewId,
    export: ExportKind,
    input: String,
    output: String,
}

impl<E: Exporter> ViewSynchronizer<E> {
    pub fn new(exporter: E, initial: ViewId) -> Self {
        let mut views = Self {
            exporter,
            panes: ViewId::ALL.map(ViewPane::new),
            active: initial,
            export: initial.export_kind(),
            input: String::new(),
            output: String::new(),
        };
        views.set_active_view(initial);
        views
    }

    /// Set the head markup of the rendered view's page.
    #[must_use]
    pub fn with_frame_head(mut self, markup: impl Into<String>) -> Self {
        if let PaneContent::Frame { head, .. } = &mut self.panes[ViewId::Rendered.slot()].content {
            *head = markup.into();
        }
        self
    }

    /// Show exactly `id` and select its export.
    pub fn set_active_view(&mut self, id: ViewId) {
        for pane in &mut self.panes {
            pane.visible = pane.id == id;
        }
        self.active = id;
        self.export = id.export_kind();
        tracing::debug!(view = %id, export = ?self.export, "active view changed");
    }

    pub const fn active_view(&self) -> ViewId {
        self.active
    }

    pub const fn export_kind(&self) -> ExportKind {
        self.export
    }

    pub const fn pane(&self, id: ViewId) -> &ViewPane {
        &self.panes[id.slot()]
    }

    pub const fn active_pane(&self) -> &ViewPane {
        self.pane(self.active)
    }

    pub fn visible_count(&self) -> usize {
        self.panes.iter().filter(|pane| pane.visible).count()
    }

    /// Export `text` with the active export and write it into the active view.
    ///
    /// On failure the view keeps its previous content.
    ///
    /// # Errors
    /// Returns the exporter's [`ExportError`].
    pub fn render(&mut self, text: &str) -> Result<(), ExportError> {
        let _scope = crate::perf::scope("render.export");
        export_input(text, &mut self.input);
        self.output.clear();
        self.exporter
            .export(self.export, &self.input, &mut self.output)?;
        let pane = &mut self.panes[self.active.slot()];
        pane.write(&self.output);
        crate::perf::log_event(
            "render.write",
            format!("view={} bytes={}", self.active, self.output.len()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes the input, tagging it with the export kind.
    struct Echo {
        fail: bool,
        calls: Vec<(ExportKind, String)>,
    }

    impl Echo {
        const fn new() -> Self {
            Self {
                fail: false,
                calls: Vec::new(),
            }
        }
    }

    impl Exporter for Echo {
        fn export(
            &mut self,
            kind: ExportKind,
            input: &str,
            out: &mut String,
        ) -> Result<(), ExportError> {
            self.calls.push((kind, input.to_string()));
            if self.fail {
                return Err(ExportError {
                    kind,
                    message: "tokenizer hiccup".to_string(),
                });
            }
            out.push_str(match kind {
                ExportKind::Markup => "org:",
                ExportKind::Html => "html:",
            });
            out.push_str(input);
            Ok(())
        }
    }

    #[test]
    fn test_exactly_one_view_active_after_any_switch() {
        let mut views = ViewSynchronizer::new(Echo::new(), ViewId::Rendered);
        for id in [ViewId::Org, ViewId::Raw, ViewId::Raw, ViewId::Rendered, ViewId::Org] {
            views.set_active_view(id);
            assert_eq!(views.visible_count(), 1);
            assert!(views.pane(id).is_visible());
            assert_eq!(views.active_view(), id);
            assert_eq!(views.export_kind(), id.export_kind());
        }
    }

    #[test]
    fn test_views_select_their_export() {
        assert_eq!(ViewId::Org.export_kind(), ExportKind::Markup);
        assert_eq!(ViewId::Rendered.export_kind(), ExportKind::Html);
        assert_eq!(ViewId::Raw.export_kind(), ExportKind::Html);
    }

    #[test]
    fn test_render_appends_newline_and_writes_active_view() {
        let mut views = ViewSynchronizer::new(Echo::new(), ViewId::Org);
        views.render("* h").unwrap();
        assert_eq!(views.pane(ViewId::Org).text(), "org:* h\n");
        assert_eq!(views.pane(ViewId::Raw).text(), "");
        assert_eq!(views.exporter.calls[0], (ExportKind::Markup, "* h\n".to_string()));
    }

    #[test]
    fn test_rendered_view_replaces_only_the_body() {
        let mut views =
            ViewSynchronizer::new(Echo::new(), ViewId::Rendered).with_frame_head("<style></style>");
        views.render("one").unwrap();
        views.render("two").unwrap();
        let pane = views.pane(ViewId::Rendered);
        assert_eq!(pane.text(), "html:two\n");
        assert_eq!(
            pane.content(),
            &PaneContent::Frame {
                head: "<style></style>".to_string(),
                body: "html:two\n".to_string(),
            }
        );
        assert!(pane.document().contains("<head><style></style></head>"));
    }

    #[test]
    fn test_raw_view_shows_html_as_text() {
        let mut views = ViewSynchronizer::new(Echo::new(), ViewId::Raw);
        views.render("<b>").unwrap();
        assert_eq!(views.active_pane().document(), "html:<b>\n");
    }

    #[test]
    fn test_failed_export_keeps_previous_output() {
        let mut views = ViewSynchronizer::new(Echo::new(), ViewId::Raw);
        views.render("good").unwrap();
        views.exporter.fail = true;
        let err = views.render("bad").unwrap_err();
        assert_eq!(err.kind, ExportKind::Html);
        assert_eq!(views.active_pane().text(), "html:good\n");
    }

    #[test]
    fn test_switching_keeps_other_views_content() {
        let mut views = ViewSynchronizer::new(Echo::new(), ViewId::Org);
        views.render("a").unwrap();
        views.set_active_view(ViewId::Raw);
        views.render("b").unwrap();
        assert_eq!(views.pane(ViewId::Org).text(), "org:a\n");
        assert_eq!(views.pane(ViewId::Raw).text(), "html:b\n");
    }

    #[test]
    fn test_view_id_parse_round_trips() {
        for id in ViewId::ALL {
            assert_eq!(ViewId::parse(id.as_str()), Some(id));
        }
        assert_eq!(ViewId::parse("tree"), None);
    }
}
