//! Exporter contract.
//!
//! Exports turn the document text into the string a view displays. The
//! exporter itself lives outside this crate; only its interface is defined
//! here.

use thiserror::Error;

/// Which export a view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// Org round-trip of the document.
    Markup,
    Html,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind:?} export failed: {message}")]
pub struct ExportError {
    pub kind: ExportKind,
    pub message: String,
}

/// Renders document text into an output buffer.
///
/// `out` is cleared by the caller and reused across renders. `input` already
/// carries the trailing newline the exporters expect.
pub trait Exporter {
    /// # Errors
    /// Returns an [`ExportError`] when the document cannot be exported.
    fn export(&mut self, kind: ExportKind, input: &str, out: &mut String)
    -> Result<(), ExportError>;
}

impl<E: Exporter + ?Sized> Exporter for Box<E> {
    fn export(
        &mut self,
        kind: ExportKind,
        input: &str,
        out: &mut String,
    ) -> Result<(), ExportError> {
        (**self).export(kind, input, out)
    }
}

/// Build the exporter input for `text`: the text plus one trailing newline.
pub fn export_input(text: &str, buf: &mut String) {
    buf.clear();
    buf.reserve(text.len() + 1);
    buf.push_str(text);
    buf.push('\n');
}
