//! Integration tests for the PDF mutation engine.
//!
//! Fixture documents are built programmatically with lopdf so the tests do
//! not depend on binary assets.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use archivo::pdf::{Bookmark, PdfError, PdfService};

/// Build a minimal document with `page_count` blank pages of a given width.
///
/// The width makes pages distinguishable after a merge.
fn blank_pdf_with_width(page_count: usize, width: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(792),
                ]),
            );
            Object::Reference(doc.add_object(page))
        })
        .collect();

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_count as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn blank_pdf(page_count: usize) -> Vec<u8> {
    blank_pdf_with_width(page_count, 612)
}

/// Build a one-page document carrying an AcroForm with a text field and a
/// checkbox.
fn form_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]),
    );
    let page_id = doc.add_object(page);

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(1));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut text_field = Dictionary::new();
    text_field.set("FT", Object::Name(b"Tx".to_vec()));
    text_field.set("T", Object::string_literal("customer_name"));
    let text_id = doc.add_object(text_field);

    let mut checkbox = Dictionary::new();
    checkbox.set("FT", Object::Name(b"Btn".to_vec()));
    checkbox.set("T", Object::string_literal("subscribed"));
    checkbox.set("V", Object::Name(b"Off".to_vec()));
    let checkbox_id = doc.add_object(checkbox);

    let mut form = Dictionary::new();
    form.set(
        "Fields",
        Object::Array(vec![
            Object::Reference(text_id),
            Object::Reference(checkbox_id),
        ]),
    );
    let form_id = doc.add_object(form);

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    catalog.set("AcroForm", Object::Reference(form_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Read a form field's `/V` from serialized bytes.
fn field_value(bytes: &[u8], name: &str) -> Option<Object> {
    let doc = Document::load_mem(bytes).unwrap();
    let root_id = match doc.trailer.get(b"Root").unwrap() {
        Object::Reference(id) => *id,
        _ => panic!("catalog should be a reference"),
    };
    let catalog = doc.get_object(root_id).unwrap().as_dict().unwrap();
    let form_id = match catalog.get(b"AcroForm").unwrap() {
        Object::Reference(id) => *id,
        _ => panic!("form should be a reference"),
    };
    let form = doc.get_object(form_id).unwrap().as_dict().unwrap();
    let fields = form.get(b"Fields").unwrap().as_array().unwrap().clone();

    for entry in fields {
        let Object::Reference(id) = entry else {
            continue;
        };
        let dict = doc.get_object(id).unwrap().as_dict().unwrap();
        if let Ok(Object::String(title, _)) = dict.get(b"T") {
            if title == name.as_bytes() {
                return dict.get(b"V").ok().cloned();
            }
        }
    }
    None
}

/// Widths of the pages of a serialized document, in page order.
fn page_widths(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    let mut widths = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let Object::Integer(width) = media_box[2] else {
            panic!("width should be an integer");
        };
        widths.push(width);
    }
    widths
}

// ============================================================================
// Keywords
// ============================================================================

#[tokio::test]
async fn test_keyword_round_trip_preserves_order() {
    let service = PdfService::new();
    let keywords = vec![
        "invoice".to_string(),
        "2026".to_string(),
        "Q3 report".to_string(),
        "invoice".to_string(), // duplicates are allowed
    ];

    let output = service
        .add_keywords(blank_pdf(1), keywords.clone())
        .await
        .unwrap();
    let read_back = service.keywords(output).await;

    assert_eq!(read_back, keywords);
}

#[tokio::test]
async fn test_keywords_replace_previous_value() {
    let service = PdfService::new();

    let first = service
        .add_keywords(blank_pdf(1), vec!["old".to_string()])
        .await
        .unwrap();
    let second = service
        .add_keywords(first, vec!["new".to_string(), "tags".to_string()])
        .await
        .unwrap();

    assert_eq!(service.keywords(second).await, vec!["new", "tags"]);
}

#[tokio::test]
async fn test_empty_keyword_list_clears_scalar() {
    let service = PdfService::new();

    let tagged = service
        .add_keywords(blank_pdf(1), vec!["x".to_string()])
        .await
        .unwrap();
    let cleared = service.add_keywords(tagged, Vec::new()).await.unwrap();

    assert!(service.keywords(cleared).await.is_empty());
}

#[tokio::test]
async fn test_keywords_of_untagged_document_are_empty() {
    let service = PdfService::new();
    assert!(service.keywords(blank_pdf(2)).await.is_empty());
}

// ============================================================================
// Merge
// ============================================================================

#[tokio::test]
async fn test_merge_page_count_is_additive() {
    let service = PdfService::new();
    let sources = vec![blank_pdf(2), blank_pdf(3), blank_pdf(1)];

    let merged = service.merge(sources).await.unwrap();

    assert_eq!(service.page_count(merged).await, 6);
}

#[tokio::test]
async fn test_merge_preserves_source_order() {
    let service = PdfService::new();
    let sources = vec![
        blank_pdf_with_width(2, 100),
        blank_pdf_with_width(1, 200),
        blank_pdf_with_width(3, 300),
    ];

    let merged = service.merge(sources).await.unwrap();

    assert_eq!(page_widths(&merged), vec![100, 100, 200, 300, 300, 300]);
}

#[tokio::test]
async fn test_merge_single_source_is_a_copy() {
    let service = PdfService::new();

    let merged = service.merge(vec![blank_pdf(4)]).await.unwrap();

    assert!(service.is_valid(merged.clone()).await);
    assert_eq!(service.page_count(merged).await, 4);
}

#[tokio::test]
async fn test_merge_rejects_empty_input() {
    let service = PdfService::new();
    let result = service.merge(Vec::new()).await;
    assert!(matches!(result, Err(PdfError::NoSources)));
}

#[tokio::test]
async fn test_merge_aborts_on_unparseable_source() {
    let service = PdfService::new();
    let sources = vec![blank_pdf(2), b"definitely not a pdf".to_vec()];

    assert!(service.merge(sources).await.is_err());
}

// ============================================================================
// Bookmarks
// ============================================================================

#[tokio::test]
async fn test_add_and_read_bookmarks() {
    let service = PdfService::new();
    let bookmarks = vec![
        Bookmark::new("Introduction", 1),
        Bookmark::new("Chapter 1", 2),
        Bookmark::new("Appendix", 3),
    ];

    let output = service
        .add_bookmarks(blank_pdf(3), bookmarks.clone())
        .await
        .unwrap();

    assert_eq!(service.bookmarks(output).await, bookmarks);
}

#[tokio::test]
async fn test_out_of_range_bookmark_is_skipped_not_fatal() {
    let service = PdfService::new();
    let bookmarks = vec![
        Bookmark::new("Valid", 2),
        Bookmark::new("Too far", 99),
        Bookmark::new("Zero", 0),
    ];

    let output = service
        .add_bookmarks(blank_pdf(2), bookmarks)
        .await
        .unwrap();

    assert_eq!(
        service.bookmarks(output).await,
        vec![Bookmark::new("Valid", 2)]
    );
}

#[tokio::test]
async fn test_empty_bookmark_list_still_serializes() {
    let service = PdfService::new();

    let output = service
        .add_bookmarks(blank_pdf(2), Vec::new())
        .await
        .unwrap();

    assert!(service.is_valid(output.clone()).await);
    assert_eq!(service.page_count(output.clone()).await, 2);
    assert!(service.bookmarks(output).await.is_empty());
}

#[tokio::test]
async fn test_bookmarks_of_plain_document_are_empty() {
    let service = PdfService::new();
    assert!(service.bookmarks(blank_pdf(5)).await.is_empty());
}

#[tokio::test]
async fn test_non_ascii_bookmark_title_survives() {
    let service = PdfService::new();
    let bookmarks = vec![Bookmark::new("Prólogo 序章", 1)];

    let output = service
        .add_bookmarks(blank_pdf(1), bookmarks.clone())
        .await
        .unwrap();

    assert_eq!(service.bookmarks(output).await, bookmarks);
}

// ============================================================================
// Form fields
// ============================================================================

#[tokio::test]
async fn test_assign_text_and_checkbox_values() {
    let service = PdfService::new();
    let mut variables = HashMap::new();
    variables.insert("customer_name".to_string(), "Ada Lovelace".to_string());
    variables.insert("subscribed".to_string(), "Yes".to_string());

    let output = service.assign_variables(form_pdf(), variables).await.unwrap();

    let Some(Object::String(name, _)) = field_value(&output, "customer_name") else {
        panic!("text field should hold a string value");
    };
    assert_eq!(name, b"Ada Lovelace");
    assert_eq!(
        field_value(&output, "subscribed"),
        Some(Object::Name(b"Yes".to_vec()))
    );
}

#[tokio::test]
async fn test_falsy_checkbox_value_turns_field_off() {
    let service = PdfService::new();
    let mut variables = HashMap::new();
    variables.insert("subscribed".to_string(), "whatever".to_string());

    let output = service.assign_variables(form_pdf(), variables).await.unwrap();

    assert_eq!(
        field_value(&output, "subscribed"),
        Some(Object::Name(b"Off".to_vec()))
    );
}

#[tokio::test]
async fn test_unknown_field_is_skipped_not_fatal() {
    let service = PdfService::new();
    let mut variables = HashMap::new();
    variables.insert("customer_name".to_string(), "Ada".to_string());
    variables.insert("no_such_field".to_string(), "x".to_string());

    let output = service.assign_variables(form_pdf(), variables).await.unwrap();

    assert!(field_value(&output, "customer_name").is_some());
}

#[tokio::test]
async fn test_assign_against_formless_document_succeeds() {
    let service = PdfService::new();
    let mut variables = HashMap::new();
    variables.insert("anything".to_string(), "value".to_string());

    let output = service
        .assign_variables(blank_pdf(2), variables)
        .await
        .unwrap();

    assert!(service.is_valid(output.clone()).await);
    assert_eq!(service.page_count(output).await, 2);
}

// ============================================================================
// Validity and page count
// ============================================================================

#[tokio::test]
async fn test_is_valid_accepts_real_documents() {
    let service = PdfService::new();
    assert!(service.is_valid(blank_pdf(1)).await);
    assert!(service.is_valid(form_pdf()).await);
}

#[tokio::test]
async fn test_is_valid_rejects_garbage() {
    let service = PdfService::new();
    assert!(!service.is_valid(Vec::new()).await);
    assert!(!service.is_valid(b"<html>not a pdf</html>".to_vec()).await);
}

#[tokio::test]
async fn test_page_count_matches_fixture() {
    let service = PdfService::new();
    assert_eq!(service.page_count(blank_pdf(7)).await, 7);
    assert_eq!(service.page_count(b"garbage".to_vec()).await, 0);
}
