use std::ops::Range;

use ropey::Rope;
use thiserror::Error;

/// A replacement of `range` (byte offsets) with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub insert: String,
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            insert: text.into(),
        }
    }

    pub const fn delete(range: Range<usize>) -> Self {
        Self {
            range,
            insert: String::new(),
        }
    }

    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            insert: text.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("edit range {start}..{end} is outside the document (length {len})")]
    OutOfRange { start: usize, end: usize, len: usize },
    #[error("edit offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// The document being edited, backed by a rope.
///
/// Offsets are byte offsets into the UTF-8 text. The revision counter only
/// moves when an edit actually changes the text.
pub struct DocumentBuffer {
    rope: Rope,
    revision: u64,
}

impl DocumentBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            revision: 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Apply `edit`. Returns `true` if the text changed.
    ///
    /// # Errors
    /// Returns an [`EditError`] if the range is inverted, past the end, or
    /// splits a character. The buffer is left untouched in that case.
    pub fn apply(&mut self, edit: &Edit) -> Result<bool, EditError> {
        let Range { start, end } = edit.range;
        let len = self.len_bytes();
        if start > end || end > len {
            return Err(EditError::OutOfRange { start, end, len });
        }
        let start_char = self.char_index(start)?;
        let end_char = self.char_index(end)?;

        if start_char == end_char && edit.insert.is_empty() {
            return Ok(false);
        }
        if self.rope.byte_slice(start..end) == edit.insert.as_str() {
            return Ok(false);
        }

        self.rope.remove(start_char..end_char);
        self.rope.insert(start_char, &edit.insert);
        self.revision += 1;
        Ok(true)
    }

    /// Insert `text` at byte offset `at`.
    ///
    /// # Errors
    /// See [`DocumentBuffer::apply`].
    pub fn insert(&mut self, at: usize, text: &str) -> Result<bool, EditError> {
        self.apply(&Edit::insert(at, text))
    }

    /// Remove the bytes in `range`.
    ///
    /// # Errors
    /// See [`DocumentBuffer::apply`].
    pub fn delete(&mut self, range: Range<usize>) -> Result<bool, EditError> {
        self.apply(&Edit::delete(range))
    }

    /// Replace the whole document. Returns `true` if the text changed.
    pub fn replace_all(&mut self, text: &str) -> bool {
        if self.rope == text {
            return false;
        }
        self.rope = Rope::from_str(text);
        self.revision += 1;
        true
    }

    fn char_index(&self, byte: usize) -> Result<usize, EditError> {
        let char_idx = self.rope.byte_to_char(byte);
        if self.rope.char_to_byte(char_idx) == byte {
            Ok(char_idx)
        } else {
            Err(EditError::NotCharBoundary(byte))
        }
    }
}

impl Default for DocumentBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buf = DocumentBuffer::empty();
        assert!(buf.is_empty());
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.revision(), 0);
    }

    #[test]
    fn test_text_roundtrip() {
        let text = "* Heading\nbody\n";
        assert_eq!(DocumentBuffer::from_text(text).text(), text);
    }

    #[test]
    fn test_insert_bumps_revision() {
        let mut buf = DocumentBuffer::from_text("ab");
        assert!(buf.insert(1, "X").unwrap());
        assert_eq!(buf.text(), "aXb");
        assert_eq!(buf.revision(), 1);
    }

    #[test]
    fn test_delete_range() {
        let mut buf = DocumentBuffer::from_text("hello world");
        assert!(buf.delete(5..11).unwrap());
        assert_eq!(buf.text(), "hello");
    }

    #[test]
    fn test_replace_range() {
        let mut buf = DocumentBuffer::from_text("/it/ text");
        assert!(buf.apply(&Edit::replace(0..4, "*b*")).unwrap());
        assert_eq!(buf.text(), "*b* text");
    }

    #[test]
    fn test_noop_edits_do_not_change_revision() {
        let mut buf = DocumentBuffer::from_text("same");
        assert!(!buf.insert(2, "").unwrap());
        assert!(!buf.apply(&Edit::replace(0..2, "sa")).unwrap());
        assert!(!buf.replace_all("same"));
        assert_eq!(buf.revision(), 0);
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut buf = DocumentBuffer::from_text("héllo");
        assert!(buf.insert(3, "!").unwrap());
        assert_eq!(buf.text(), "hé!llo");
    }

    #[test]
    fn test_offset_inside_char_rejected() {
        let mut buf = DocumentBuffer::from_text("héllo");
        assert_eq!(buf.insert(2, "x"), Err(EditError::NotCharBoundary(2)));
        assert_eq!(buf.text(), "héllo");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut buf = DocumentBuffer::from_text("abc");
        assert_eq!(
            buf.delete(2..9),
            Err(EditError::OutOfRange {
                start: 2,
                end: 9,
                len: 3
            })
        );
        assert_eq!(
            buf.delete(2..1),
            Err(EditError::OutOfRange {
                start: 2,
                end: 1,
                len: 3
            })
        );
    }

    #[test]
    fn test_replace_all() {
        let mut buf = DocumentBuffer::from_text("old");
        assert!(buf.replace_all("#+TITLE: new\n"));
        assert_eq!(buf.text(), "#+TITLE: new\n");
        assert_eq!(buf.revision(), 1);
    }
}
