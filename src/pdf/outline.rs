//! Outline (bookmark) tree
//!
//! Arena-backed tree with index child links: the tree owns a flat node store
//! and nodes refer to children by index, so extraction and construction never
//! juggle parent/child pointers into the PDF object graph.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use super::document::resolve;
use super::encoding::{decode_text, encode_text};

/// A single outline node
#[derive(Debug, Clone)]
pub struct OutlineNode {
    pub title: String,
    /// Target page, 0-indexed; unresolvable targets land on 0.
    pub page_index: usize,
    children: Vec<usize>,
}

/// Arena-backed outline tree
#[derive(Debug, Default)]
pub struct OutlineTree {
    nodes: Vec<OutlineNode>,
    roots: Vec<usize>,
}

impl OutlineTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Flatten depth-first, pre-order.
    pub fn flatten(&self) -> Vec<&OutlineNode> {
        let mut flat = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            flat.push(node);
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        flat
    }

    /// Extract the outline tree of a parsed document.
    ///
    /// Tolerates malformed outlines: broken nodes end their sibling chain,
    /// cycles are cut, untitled nodes are dropped with their children hoisted
    /// into their place.
    pub fn from_document(doc: &Document) -> Self {
        let mut tree = OutlineTree::default();
        let Some(first) = outline_chain_start(doc) else {
            return tree;
        };

        // Positional page lookup: object id -> 0-based index.
        let page_index: HashMap<ObjectId, usize> = doc
            .get_pages()
            .into_values()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();

        let mut visited = HashSet::new();
        tree.roots = tree.walk_chain(doc, first, &page_index, &mut visited);
        tree
    }

    fn walk_chain(
        &mut self,
        doc: &Document,
        start: ObjectId,
        page_index: &HashMap<ObjectId, usize>,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<usize> {
        let mut siblings = Vec::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if !visited.insert(id) {
                // Cycle in the Next chain.
                break;
            }
            let Ok(Object::Dictionary(dict)) = doc.get_object(id) else {
                break;
            };

            let title = match dict.get(b"Title") {
                Ok(Object::String(bytes, _)) => decode_text(bytes),
                _ => String::new(),
            };
            let page = resolve_destination(doc, dict, page_index).unwrap_or(0);

            let children = match dict.get(b"First") {
                Ok(Object::Reference(first_child)) => {
                    self.walk_chain(doc, *first_child, page_index, visited)
                }
                _ => Vec::new(),
            };

            if title.trim().is_empty() {
                siblings.extend(children);
            } else {
                let index = self.nodes.len();
                self.nodes.push(OutlineNode {
                    title,
                    page_index: page,
                    children,
                });
                siblings.push(index);
            }

            current = match dict.get(b"Next") {
                Ok(Object::Reference(next)) => Some(*next),
                _ => None,
            };
        }

        siblings
    }
}

fn outline_chain_start(doc: &Document) -> Option<ObjectId> {
    let root_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => *id,
        _ => return None,
    };
    let catalog = doc.get_object(root_id).ok()?.as_dict().ok()?;
    let outlines = resolve(doc, catalog.get(b"Outlines").ok()?).as_dict().ok()?;
    match outlines.get(b"First") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    }
}

/// Resolve a node's target to a 0-based page index.
///
/// Handles a direct `/Dest` array and the `/A` GoTo-action form. Named
/// destinations and anything else resolve to `None`.
fn resolve_destination(
    doc: &Document,
    node: &Dictionary,
    page_index: &HashMap<ObjectId, usize>,
) -> Option<usize> {
    let dest = match node.get(b"Dest") {
        Ok(dest) => dest,
        _ => {
            let action = resolve(doc, node.get(b"A").ok()?).as_dict().ok()?;
            action.get(b"D").ok()?
        }
    };
    let array = resolve(doc, dest).as_array().ok()?;
    match array.first()? {
        Object::Reference(page_id) => page_index.get(page_id).copied(),
        Object::Integer(n) => usize::try_from(*n)
            .ok()
            .filter(|index| *index < page_index.len()),
        _ => None,
    }
}

/// Write a flat top-level outline chain for `entries` (title, target page)
/// into an assembled document and hook it into the catalog.
pub fn write_outline(doc: &mut Document, catalog_id: ObjectId, entries: &[(String, ObjectId)]) {
    if entries.is_empty() {
        return;
    }

    // Reserve the outlines id first so nodes can point back at their parent.
    let outlines_id = doc.add_object(Dictionary::new());

    let mut node_ids = Vec::with_capacity(entries.len());
    for (title, page_id) in entries {
        let mut node = Dictionary::new();
        node.set(
            "Title",
            Object::String(encode_text(title), StringFormat::Literal),
        );
        node.set("Parent", Object::Reference(outlines_id));
        node.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(*page_id),
                Object::Name(b"Fit".to_vec()),
            ]),
        );
        node_ids.push(doc.add_object(node));
    }

    for (position, &id) in node_ids.iter().enumerate() {
        if let Ok(Object::Dictionary(node)) = doc.get_object_mut(id) {
            if position > 0 {
                node.set("Prev", Object::Reference(node_ids[position - 1]));
            }
            if position + 1 < node_ids.len() {
                node.set("Next", Object::Reference(node_ids[position + 1]));
            }
        }
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name(b"Outlines".to_vec()));
    outlines.set("First", Object::Reference(node_ids[0]));
    outlines.set("Last", Object::Reference(node_ids[node_ids.len() - 1]));
    outlines.set("Count", Object::Integer(node_ids.len() as i64));
    if let Ok(Object::Dictionary(slot)) = doc.get_object_mut(outlines_id) {
        *slot = outlines;
    }

    if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
        catalog.set("Outlines", Object::Reference(outlines_id));
    }
}
