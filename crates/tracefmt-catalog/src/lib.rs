// Error types
pub mod error;

// Catalog model and lookup
pub mod catalog;
pub mod template;

// Parameter substitution
pub mod directive;

pub use catalog::{
    CLASS_LIBRARY_CATALOG, CatalogSearch, MessageCatalog, RUNTIME_CATALOG, SUBSYSTEM_CATALOG,
};
pub use directive::{raw_hex, render_params};
pub use error::{Error, Result};
pub use template::MessageTemplate;
