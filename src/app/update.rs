use std::time::Instant;

use crate::app::Model;
use crate::editor::Edit;
use crate::render::ViewId;

/// Events the shell reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The editor changed part of the document
    Edit { edit: Edit, at: Instant },
    /// Replace the whole document (content preset, external save)
    ReplaceDocument { text: String, at: Instant },
    /// A view tab was selected
    SwitchView(ViewId),
    /// Let the scheduler's timer fire if it is due
    Tick(Instant),
    /// Quit the application
    Quit,
}

/// Apply `msg` to `model`.
///
/// Edits go through the render scheduler. View switches render immediately,
/// outside the scheduler.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::Edit { edit, at } => match model.document.apply(&edit) {
            Ok(true) => model.document_changed(at),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(%err, "edit rejected");
                model.record_error(err.to_string());
            }
        },
        Message::ReplaceDocument { text, at } => {
            if model.document.replace_all(&text) {
                model.document_changed(at);
            }
        }
        Message::SwitchView(id) => model.switch_view(id),
        Message::Tick(now) => model.tick(now),
        Message::Quit => model.should_quit = true,
    }
    model
}
