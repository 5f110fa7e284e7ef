//! PDF document mutation engine
//!
//! Structural manipulation of PDF internals: the page list, the outline
//! (bookmark) tree, the AcroForm field table, and the document-info
//! dictionary. Built on an in-memory object model; no rendering.

mod acroform;
mod document;
mod encoding;
mod error;
mod outline;
mod service;
mod types;

pub use error::{PdfError, PdfResult};
pub use service::PdfService;
pub use types::{Bookmark, FieldKind};
