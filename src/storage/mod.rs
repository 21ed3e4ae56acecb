//! Storage layer for catalogo
//!
//! Reads and writes records as markdown documents with YAML frontmatter.

pub mod collection;
pub mod document;
pub mod frontmatter;
pub mod store;

pub use collection::Collection;
pub use document::{Document, Fields, Value};
pub use store::Store;
