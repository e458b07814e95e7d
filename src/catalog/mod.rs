pub mod analytics;
mod source;

pub use source::{CatalogError, CatalogGroup, CatalogSource, FileCatalogSource};
