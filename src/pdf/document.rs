//! PDF object model adapter
//!
//! Wraps `lopdf` with the accessors the mutation engine needs: ordered page
//! lookup, info-dictionary scalars, and a page-copying assembler that builds
//! fresh output documents from existing ones.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use super::encoding::{decode_text, encode_text};
use super::error::{PdfError, PdfResult};

/// A parsed PDF document
pub struct PdfFile {
    doc: Document,
}

impl PdfFile {
    pub fn from_bytes(bytes: &[u8]) -> PdfResult<Self> {
        let doc = Document::load_mem(bytes)?;
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object ids in document order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Read the `Keywords` scalar from the info dictionary.
    pub fn keywords(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let dict = resolve(&self.doc, info).as_dict().ok()?;
        match dict.get(b"Keywords") {
            Ok(Object::String(bytes, _)) => Some(decode_text(bytes)),
            _ => None,
        }
    }

    /// Replace the `Keywords` scalar, creating the info dictionary if absent.
    pub fn set_keywords(&mut self, value: &str) {
        let keywords = Object::String(encode_text(value), StringFormat::Literal);
        let info = self.doc.trailer.get(b"Info").ok().cloned();
        match info {
            Some(Object::Reference(id))
                if matches!(self.doc.get_object(id), Ok(Object::Dictionary(_))) =>
            {
                if let Ok(Object::Dictionary(dict)) = self.doc.get_object_mut(id) {
                    dict.set("Keywords", keywords);
                }
            }
            Some(Object::Dictionary(_)) => {
                if let Ok(Object::Dictionary(dict)) = self.doc.trailer.get_mut(b"Info") {
                    dict.set("Keywords", keywords);
                }
            }
            _ => {
                let mut dict = Dictionary::new();
                dict.set("Keywords", keywords);
                let id = self.doc.add_object(dict);
                self.doc.trailer.set("Info", Object::Reference(id));
            }
        }
    }

    /// Serialize to bytes. The buffer is materialized fully or not at all.
    pub fn into_bytes(mut self) -> PdfResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PdfError::Serialize(e.to_string()))?;
        Ok(buffer)
    }
}

/// Follow a reference one level; non-references pass through.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Builds a fresh output document from pages copied out of source documents.
///
/// Every appended source is deep-copied with its object ids remapped, so the
/// output owns its page objects outright and a failure can never corrupt a
/// source. `attach_catalog` hooks the copied pages under a new page tree.
pub struct DocumentAssembler {
    out: Document,
    pages: Vec<ObjectId>,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self {
            out: Document::with_version("1.7"),
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Object ids of the copied pages, in append order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.pages
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.out
    }

    /// Append every page of `source`, in order.
    pub fn append_document(&mut self, source: &PdfFile) {
        let doc = source.document();

        let mut id_map: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut next_id = self.out.max_id + 1;
        for &old_id in doc.objects.keys() {
            id_map.insert(old_id, (next_id, 0));
            next_id += 1;
        }
        self.out.max_id = next_id - 1;

        for (&old_id, object) in &doc.objects {
            let mut copied = object.clone();
            remap_references(&mut copied, &id_map);
            self.out.objects.insert(id_map[&old_id], copied);
        }

        for page_id in source.page_ids() {
            if let Some(&new_id) = id_map.get(&page_id) {
                self.pages.push(new_id);
            }
        }
    }

    /// Attach a fresh page tree and catalog over the copied pages.
    ///
    /// Returns the catalog id so callers can hook further structures (an
    /// outline tree) into it before serializing.
    pub fn attach_catalog(&mut self) -> ObjectId {
        let kids: Vec<Object> = self.pages.iter().map(|&id| Object::Reference(id)).collect();

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(self.pages.len() as i64));
        let pages_id = self.out.add_object(pages_dict);

        // Copied pages still point at their source page tree; re-parent them.
        for &page_id in &self.pages {
            if let Ok(Object::Dictionary(page)) = self.out.get_object_mut(page_id) {
                page.set("Parent", Object::Reference(pages_id));
            }
        }

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = self.out.add_object(catalog);

        self.out.trailer.set("Root", Object::Reference(catalog_id));
        catalog_id
    }

    /// Serialize the assembled document.
    pub fn into_bytes(mut self) -> PdfResult<Vec<u8>> {
        self.out.renumber_objects();
        self.out
            .trailer
            .set("Size", Object::Integer(self.out.max_id as i64 + 1));
        let mut buffer = Vec::new();
        self.out
            .save_to(&mut buffer)
            .map_err(|e| PdfError::Serialize(e.to_string()))?;
        Ok(buffer)
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn remap_references(object: &mut Object, id_map: &HashMap<ObjectId, ObjectId>) {
    if let Object::Reference(id) = object {
        if let Some(&mapped) = id_map.get(id) {
            *id = mapped;
        } else {
            // Reference to an object the source never defined.
            *object = Object::Null;
        }
        return;
    }
    match object {
        Object::Array(items) => {
            for item in items {
                remap_references(item, id_map);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                remap_references(value, id_map);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                remap_references(value, id_map);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_rewrites_nested_references() {
        let mut id_map = HashMap::new();
        id_map.insert((1, 0), (10, 0));

        let mut dict = Dictionary::new();
        dict.set("Page", Object::Reference((1, 0)));
        dict.set("Missing", Object::Reference((2, 0)));
        let mut object = Object::Array(vec![Object::Dictionary(dict)]);

        remap_references(&mut object, &id_map);

        let Object::Array(items) = &object else {
            panic!("array survived remap");
        };
        let Object::Dictionary(dict) = &items[0] else {
            panic!("dictionary survived remap");
        };
        assert_eq!(dict.get(b"Page").unwrap(), &Object::Reference((10, 0)));
        assert_eq!(dict.get(b"Missing").unwrap(), &Object::Null);
    }

    #[test]
    fn test_set_keywords_creates_info_dict() {
        let mut file = PdfFile {
            doc: Document::with_version("1.7"),
        };
        assert_eq!(file.keywords(), None);

        file.set_keywords("alpha, beta");
        assert_eq!(file.keywords().as_deref(), Some("alpha, beta"));

        file.set_keywords("gamma");
        assert_eq!(file.keywords().as_deref(), Some("gamma"));
    }
}
