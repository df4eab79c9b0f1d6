//! Page-level helpers shared by the customizers
//!
//! Lookups here resolve indirect references and page-tree inheritance so that
//! callers can copy what they need onto a single page before mutating it.
//! Mutating a shared resources dictionary in place would leak the change into
//! every other page that references it.

use crate::error::CredPdfError;
use flate2::{write::ZlibEncoder, Compression};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

/// US Letter, used when no MediaBox can be found.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Inheritable page attributes are looked up at most this many levels up.
const MAX_TREE_DEPTH: usize = 32;

/// Resolve a zero-based page index to the page object id.
pub fn page_id_at(doc: &Document, page_index: usize) -> Result<ObjectId, CredPdfError> {
    let pages = doc.get_pages();
    let page_count = pages.len();
    pages
        .values()
        .nth(page_index)
        .copied()
        .ok_or(CredPdfError::PageIndex {
            index: page_index,
            page_count,
        })
}

/// Decoded content of a page, all content streams concatenated in order.
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>, CredPdfError> {
    let page = page_dict(doc, page_id)?;
    if !page.has(b"Contents") || doc.get_page_contents(page_id).is_empty() {
        return Err(CredPdfError::ContentMissing);
    }
    doc.get_page_content(page_id)
        .map_err(|e| CredPdfError::ParseError(format!("Failed to decode page content: {}", e)))
}

pub fn page_dict(doc: &Document, page_id: ObjectId) -> Result<&Dictionary, CredPdfError> {
    doc.get_dictionary(page_id)
        .map_err(|e| CredPdfError::OperationError(format!("Invalid page object: {}", e)))
}

pub fn page_dict_mut(
    doc: &mut Document,
    page_id: ObjectId,
) -> Result<&mut Dictionary, CredPdfError> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| CredPdfError::OperationError(format!("Invalid page object: {}", e)))
}

/// Look up an inheritable page attribute, walking up `/Parent` links.
fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// MediaBox of a page as `[x0, y0, x1, y1]`, normalized so `x0 <= x1` and
/// `y0 <= y1`.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let arr = match inherited_attribute(doc, page_id, b"MediaBox") {
        Some(Object::Array(arr)) => Some(arr),
        Some(Object::Reference(id)) => doc.get_object(*id).and_then(Object::as_array).ok(),
        _ => None,
    };

    let values: Vec<f32> = arr
        .map(|arr| arr.iter().filter_map(number).collect())
        .unwrap_or_default();
    if values.len() != 4 {
        return DEFAULT_MEDIA_BOX;
    }

    [
        values[0].min(values[2]),
        values[1].min(values[3]),
        values[0].max(values[2]),
        values[1].max(values[3]),
    ]
}

/// A private copy of the page's resources dictionary, including resources
/// inherited from the page tree. An empty dictionary when none exist.
pub fn owned_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, CredPdfError> {
    match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => Ok(dict.clone()),
        Some(Object::Reference(id)) => doc.get_dictionary(*id).cloned().map_err(|e| {
            CredPdfError::OperationError(format!("Invalid resources dictionary: {}", e))
        }),
        Some(_) => Err(CredPdfError::OperationError(
            "Resources is not a dictionary".into(),
        )),
        None => Ok(Dictionary::new()),
    }
}

/// A private copy of one resource category (`Font`, `XObject`, ...).
pub fn owned_category(
    doc: &Document,
    resources: &Dictionary,
    category: &[u8],
) -> Result<Dictionary, CredPdfError> {
    match resources.get(category) {
        Ok(Object::Dictionary(dict)) => Ok(dict.clone()),
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).cloned().map_err(|e| {
            CredPdfError::OperationError(format!(
                "Invalid /{} resources: {}",
                String::from_utf8_lossy(category),
                e
            ))
        }),
        _ => Ok(Dictionary::new()),
    }
}

/// Build a Flate-compressed stream.
pub fn compressed_stream(mut dict: Dictionary, content: &[u8]) -> Result<Stream, CredPdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    let compressed = encoder.finish()?;
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    Ok(Stream::new(dict, compressed))
}

/// Content stream object ids of a page in drawing order.
pub fn content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, CredPdfError> {
    match page_dict(doc, page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => Ok(vec![Object::Reference(*id)]),
        Ok(Object::Array(arr)) => Ok(arr.clone()),
        _ => Ok(Vec::new()),
    }
}

/// Recursively remap object references in an object
pub fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Copy every object of `source` into `dest` with ids shifted past
/// `dest.max_id`. Returns the offset applied to the source ids.
pub fn import_objects(dest: &mut Document, source: Document) -> u32 {
    let offset = dest.max_id;
    for (old_id, object) in source.objects.into_iter() {
        let new_id = (old_id.0 + offset, old_id.1);
        dest.objects.insert(new_id, remap_object_refs(object, offset));
    }
    dest.max_id = dest.max_id.max(source.max_id + offset);
    offset
}
