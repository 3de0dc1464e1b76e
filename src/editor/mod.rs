//! The document buffer owned by the hosting editor.
//!
//! A rope-backed text buffer with byte-offset edits and a revision counter,
//! designed for integration into the TEA architecture.

mod buffer;

pub use buffer::{DocumentBuffer, Edit, EditError};
