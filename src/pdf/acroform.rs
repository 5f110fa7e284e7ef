//! AcroForm field table
//!
//! Discovery and assignment over the interactive-form dictionary. Lookup is
//! by exact field name, assignment dispatches on the closed field kind.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use super::document::resolve;
use super::encoding::{decode_text, encode_text};
use super::types::{is_truthy, FieldKind};

/// A discovered form field
#[derive(Debug, Clone)]
pub struct FormField {
    pub id: ObjectId,
    pub name: String,
    pub kind: FieldKind,
}

/// Outcome of a single assignment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Applied,
    Skipped,
}

/// List the document's form fields. Empty when there is no AcroForm.
pub fn fields(doc: &Document) -> Vec<FormField> {
    let Some(form) = acroform_dict(doc) else {
        return Vec::new();
    };
    let Ok(list) = form.get(b"Fields").map(|f| resolve(doc, f)) else {
        return Vec::new();
    };
    let Ok(list) = list.as_array() else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for entry in list {
        let Object::Reference(id) = entry else {
            continue;
        };
        let Ok(Object::Dictionary(dict)) = doc.get_object(*id) else {
            continue;
        };
        let Some(name) = field_name(dict) else {
            continue;
        };
        let kind = match dict.get(b"FT") {
            Ok(Object::Name(ft)) => FieldKind::from_field_type(ft),
            _ => FieldKind::Other,
        };
        found.push(FormField {
            id: *id,
            name,
            kind,
        });
    }
    found
}

/// Assign `value` to the field, dispatching on its kind.
///
/// Checkbox values are interpreted against the truthy token set; other kinds
/// only get a raw value write when a `/V` slot already exists.
pub fn assign(doc: &mut Document, field: &FormField, value: &str) -> Assignment {
    match field.kind {
        FieldKind::Text => {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(field.id) {
                dict.set(
                    "V",
                    Object::String(encode_text(value), StringFormat::Literal),
                );
                return Assignment::Applied;
            }
            Assignment::Skipped
        }
        FieldKind::Checkbox => {
            let state = if is_truthy(value) {
                on_state_name(doc, field.id)
            } else {
                b"Off".to_vec()
            };
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(field.id) {
                dict.set("V", Object::Name(state.clone()));
                dict.set("AS", Object::Name(state));
                return Assignment::Applied;
            }
            Assignment::Skipped
        }
        FieldKind::Other => {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(field.id) {
                if dict.has(b"V") {
                    dict.set(
                        "V",
                        Object::String(encode_text(value), StringFormat::Literal),
                    );
                    return Assignment::Applied;
                }
            }
            Assignment::Skipped
        }
    }
}

/// Ask viewers to regenerate field appearances after value writes.
pub fn set_need_appearances(doc: &mut Document) {
    let root_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => *id,
        _ => return,
    };

    // The form dictionary may be its own object or inline in the catalog.
    let form_ref = doc
        .get_object(root_id)
        .ok()
        .and_then(|o| o.as_dict().ok())
        .and_then(|catalog| catalog.get(b"AcroForm").ok())
        .map(|form| match form {
            Object::Reference(id) => Some(*id),
            _ => None,
        });

    match form_ref {
        Some(Some(form_id)) => {
            if let Ok(Object::Dictionary(form)) = doc.get_object_mut(form_id) {
                form.set("NeedAppearances", Object::Boolean(true));
            }
        }
        Some(None) => {
            if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(root_id) {
                if let Ok(Object::Dictionary(form)) = catalog.get_mut(b"AcroForm") {
                    form.set("NeedAppearances", Object::Boolean(true));
                }
            }
        }
        None => {}
    }
}

fn acroform_dict(doc: &Document) -> Option<&Dictionary> {
    let root_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => *id,
        _ => return None,
    };
    let catalog = doc.get_object(root_id).ok()?.as_dict().ok()?;
    resolve(doc, catalog.get(b"AcroForm").ok()?).as_dict().ok()
}

fn field_name(dict: &Dictionary) -> Option<String> {
    match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(decode_text(bytes)),
        _ => None,
    }
}

/// The checkbox's "on" appearance-state name; `Yes` when none is declared.
fn on_state_name(doc: &Document, field_id: ObjectId) -> Vec<u8> {
    let fallback = b"Yes".to_vec();
    let Ok(Object::Dictionary(dict)) = doc.get_object(field_id) else {
        return fallback;
    };
    let Some(normal) = dict
        .get(b"AP")
        .ok()
        .map(|ap| resolve(doc, ap))
        .and_then(|ap| ap.as_dict().ok())
        .and_then(|ap| ap.get(b"N").ok())
        .map(|n| resolve(doc, n))
        .and_then(|n| n.as_dict().ok())
    else {
        return fallback;
    };
    normal
        .iter()
        .map(|(key, _)| key)
        .find(|key| key.as_slice() != b"Off")
        .cloned()
        .unwrap_or(fallback)
}
