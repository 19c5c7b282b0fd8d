//! Curriculum catalog
//!
//! Static, read-only table of teachable items (letters, numbers, colors,
//! animals, ...). Loaded once and never mutated.

pub mod item;
pub mod catalog;

pub use item::{Category, CurriculumItem};
pub use catalog::{Catalog, CatalogError};
