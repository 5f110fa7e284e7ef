//! PDF mutation operations
//!
//! The engine's public contract surface. Every operation takes immutable
//! input buffers and produces a fresh output buffer; parse and mutation work
//! is CPU-bound and offloaded to the blocking thread pool. Individual bad
//! items (a bookmark pointing outside the document, an unknown field name)
//! are logged and skipped, never failing the enclosing call.

use std::collections::HashMap;

use super::acroform::{self, Assignment};
use super::document::{DocumentAssembler, PdfFile};
use super::error::{PdfError, PdfResult};
use super::outline::{self, OutlineTree};
use super::types::Bookmark;

/// The document mutation engine
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfService;

impl PdfService {
    pub fn new() -> Self {
        Self
    }

    /// Copy all pages into a fresh document and append the given bookmarks
    /// at the top level of its outline tree.
    ///
    /// Bookmarks with a page number outside `[1, page_count]` are skipped
    /// individually; an empty list still re-serializes the document.
    pub async fn add_bookmarks(
        &self,
        source: Vec<u8>,
        bookmarks: Vec<Bookmark>,
    ) -> PdfResult<Vec<u8>> {
        run_blocking(move || add_bookmarks_sync(&source, &bookmarks)).await
    }

    /// Assign values to AcroForm fields by exact name.
    ///
    /// A document with no field table is re-serialized unchanged and reported
    /// as success.
    pub async fn assign_variables(
        &self,
        source: Vec<u8>,
        variables: HashMap<String, String>,
    ) -> PdfResult<Vec<u8>> {
        run_blocking(move || assign_variables_sync(&source, &variables)).await
    }

    /// Write the ordered keyword list as the info-dictionary `Keywords`
    /// scalar, replacing any prior value.
    pub async fn add_keywords(&self, source: Vec<u8>, keywords: Vec<String>) -> PdfResult<Vec<u8>> {
        run_blocking(move || add_keywords_sync(&source, &keywords)).await
    }

    /// Read the ordered keyword list. Empty on a missing scalar or an
    /// unparseable document.
    pub async fn keywords(&self, source: Vec<u8>) -> Vec<String> {
        run_infallible(move || keywords_sync(&source), Vec::new).await
    }

    /// Concatenate the sources' pages, in list order, into one document.
    ///
    /// An empty source list is a typed failure; a source that fails to parse
    /// aborts the whole merge so a partial result is never produced.
    pub async fn merge(&self, sources: Vec<Vec<u8>>) -> PdfResult<Vec<u8>> {
        run_blocking(move || merge_sync(&sources)).await
    }

    /// Page count, or 0 when the document cannot be parsed.
    pub async fn page_count(&self, source: Vec<u8>) -> usize {
        run_infallible(move || page_count_sync(&source), || 0).await
    }

    /// Flatten the outline tree depth-first pre-order into 1-based bookmarks.
    pub async fn bookmarks(&self, source: Vec<u8>) -> Vec<Bookmark> {
        run_infallible(move || bookmarks_sync(&source), Vec::new).await
    }

    /// Whether the bytes parse as a PDF with an obtainable page count.
    pub async fn is_valid(&self, source: Vec<u8>) -> bool {
        run_infallible(move || is_valid_sync(&source), || false).await
    }
}

async fn run_blocking<T, F>(task: F) -> PdfResult<T>
where
    F: FnOnce() -> PdfResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| PdfError::Parse(format!("Task join error: {}", e)))?
}

async fn run_infallible<T, F, D>(task: F, fallback: D) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
    D: FnOnce() -> T,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Task join error: {}", e);
            fallback()
        }
    }
}

fn add_bookmarks_sync(source: &[u8], bookmarks: &[Bookmark]) -> PdfResult<Vec<u8>> {
    let file = PdfFile::from_bytes(source)?;

    let mut assembler = DocumentAssembler::new();
    assembler.append_document(&file);
    let page_count = assembler.page_count();

    let mut entries = Vec::with_capacity(bookmarks.len());
    for bookmark in bookmarks {
        if bookmark.page_number < 1 || bookmark.page_number > page_count {
            tracing::warn!(
                "Invalid page number {} for bookmark '{}', skipping",
                bookmark.page_number,
                bookmark.title
            );
            continue;
        }
        let page_id = assembler.page_ids()[bookmark.page_number - 1];
        entries.push((bookmark.title.clone(), page_id));
    }

    let catalog_id = assembler.attach_catalog();
    outline::write_outline(assembler.document_mut(), catalog_id, &entries);

    tracing::info!("Added {} of {} bookmarks", entries.len(), bookmarks.len());
    assembler.into_bytes()
}

fn assign_variables_sync(source: &[u8], variables: &HashMap<String, String>) -> PdfResult<Vec<u8>> {
    let mut file = PdfFile::from_bytes(source)?;

    let table = acroform::fields(file.document());
    if table.is_empty() {
        tracing::warn!("Document has no form fields, saving unmodified copy");
        return file.into_bytes();
    }
    tracing::debug!("Found {} form fields", table.len());

    let mut assigned = 0usize;
    for (name, value) in variables {
        let Some(field) = table.iter().find(|f| f.name == *name) else {
            tracing::warn!("Field '{}' not found in document", name);
            continue;
        };
        match acroform::assign(file.document_mut(), field, value) {
            Assignment::Applied => {
                assigned += 1;
                tracing::debug!(field = %name, kind = ?field.kind, "Assigned field value");
            }
            Assignment::Skipped => {
                tracing::warn!("Field '{}' has no writable value slot, skipping", name);
            }
        }
    }

    if assigned > 0 {
        acroform::set_need_appearances(file.document_mut());
    }
    tracing::info!("Assigned {} of {} variables", assigned, variables.len());
    file.into_bytes()
}

fn add_keywords_sync(source: &[u8], keywords: &[String]) -> PdfResult<Vec<u8>> {
    let mut file = PdfFile::from_bytes(source)?;
    file.set_keywords(&keywords.join(", "));
    tracing::info!("Wrote {} keywords", keywords.len());
    file.into_bytes()
}

fn keywords_sync(source: &[u8]) -> Vec<String> {
    let file = match PdfFile::from_bytes(source) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Failed to read keywords: {}", e);
            return Vec::new();
        }
    };
    file.keywords()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn merge_sync(sources: &[Vec<u8>]) -> PdfResult<Vec<u8>> {
    if sources.is_empty() {
        tracing::warn!("No documents provided for merging");
        return Err(PdfError::NoSources);
    }

    let mut assembler = DocumentAssembler::new();
    for (position, bytes) in sources.iter().enumerate() {
        let file = PdfFile::from_bytes(bytes).map_err(|e| {
            tracing::error!("Failed to open merge source {}: {}", position + 1, e);
            e
        })?;
        tracing::debug!(
            "Merging source {} ({} pages)",
            position + 1,
            file.page_count()
        );
        assembler.append_document(&file);
    }

    assembler.attach_catalog();
    tracing::info!(
        "Merged {} documents into {} pages",
        sources.len(),
        assembler.page_count()
    );
    assembler.into_bytes()
}

fn page_count_sync(source: &[u8]) -> usize {
    match PdfFile::from_bytes(source) {
        Ok(file) => file.page_count(),
        Err(e) => {
            tracing::warn!("Failed to get page count: {}", e);
            0
        }
    }
}

fn bookmarks_sync(source: &[u8]) -> Vec<Bookmark> {
    let file = match PdfFile::from_bytes(source) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Failed to read bookmarks: {}", e);
            return Vec::new();
        }
    };
    let tree = OutlineTree::from_document(file.document());
    if tree.is_empty() {
        return Vec::new();
    }
    tree.flatten()
        .into_iter()
        .map(|node| Bookmark {
            title: node.title.clone(),
            page_number: node.page_index + 1,
        })
        .collect()
}

fn is_valid_sync(source: &[u8]) -> bool {
    match PdfFile::from_bytes(source) {
        Ok(file) => {
            let _ = file.page_count();
            true
        }
        Err(_) => false,
    }
}
