use std::io::{Write, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::app::{App, Message, Model, update};
use crate::outline::{OutlineExporter, OutlineTokenizer};
use crate::render::{ViewId, ViewSynchronizer};
use crate::syntax::{NodeTypeRegistry, ParseAdapter};
use crate::watcher::FileWatcher;

/// Stylesheet for the rendered view's page head.
const FRAME_HEAD: &str = concat!(
    r#"<meta charset="utf-8">"#,
    "<style>body{font-family:sans-serif;max-width:48em;margin:1em auto}",
    "pre{background:#f4f4f4;padding:.5em}</style>",
);

/// A model wired to the outline tokenizer and exporter.
pub(super) fn outline_model(
    text: &str,
    registry: Arc<NodeTypeRegistry>,
    view: ViewId,
    cooldown: Duration,
) -> Model {
    let parser = ParseAdapter::new(
        Box::new(OutlineTokenizer) as Box<dyn crate::syntax::Tokenizer>,
        Arc::clone(&registry),
    );
    let views = ViewSynchronizer::new(
        Box::new(OutlineExporter::new(registry)) as Box<dyn crate::export::Exporter>,
        view,
    )
    .with_frame_head(FRAME_HEAD);
    let model = Model::new(text, parser, views, cooldown);
    // Initial render, as a tab selection.
    update(model, Message::SwitchView(view))
}

impl App {
    /// Load the file, print the active view and, when watching, keep
    /// printing it after every render.
    ///
    /// # Errors
    ///
    /// Returns an error if the node type registry is misconfigured, the
    /// file cannot be read or watched, or stdout cannot be written.
    pub fn run(&self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");
        let registry = Arc::new(
            NodeTypeRegistry::org().context("Refusing to start with a broken node type registry")?,
        );

        let text = self.read_file()?;
        let mut model = outline_model(&text, registry, self.view, self.cooldown);
        if let Some(err) = model.last_error() {
            tracing::warn!(%err, "initial render incomplete");
        }
        self.print(&model)?;

        if !self.watch_enabled {
            return Ok(());
        }

        let mut watcher = FileWatcher::new(&self.file_path)
            .with_context(|| format!("Failed to watch {}", self.file_path.display()))?;
        let mut printed = model.render_count();
        while !model.should_quit {
            if watcher.take_changed() {
                match self.read_file() {
                    Ok(text) => {
                        model = update(
                            model,
                            Message::ReplaceDocument {
                                text,
                                at: Instant::now(),
                            },
                        );
                    }
                    // Mid-save reads can fail; the next event retries.
                    Err(err) => tracing::warn!(err = %format!("{err:#}"), "reload failed"),
                }
            }
            model = update(model, Message::Tick(Instant::now()));

            if model.render_count() != printed {
                printed = model.render_count();
                self.print(&model)?;
            }

            let sleep = model
                .time_until_render(Instant::now())
                .map_or(self.poll_interval, |due| due.min(self.poll_interval));
            std::thread::sleep(sleep);
        }
        Ok(())
    }

    fn read_file(&self) -> Result<String> {
        let _scope = crate::perf::scope("app.read_file");
        std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))
    }

    fn print(&self, model: &Model) -> Result<()> {
        let mut out = stdout().lock();
        if self.watch_enabled {
            writeln!(
                out,
                "--- {} (revision {}) ---",
                model.active_view(),
                model.rendered_revision().unwrap_or_default()
            )?;
        }
        if self.print_tree {
            let json = serde_json::to_string_pretty(&model.tree())
                .context("Failed to serialize syntax tree")?;
            writeln!(out, "{json}")?;
        } else {
            write!(out, "{}", model.active_output())?;
        }
        out.flush()?;
        Ok(())
    }
}
