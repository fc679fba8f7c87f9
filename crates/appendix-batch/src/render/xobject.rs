//! XObject creation from source document pages
//!
//! Each source page is wrapped in a Form XObject in the output document,
//! which the compositor then places with a scale/translate transform.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::{BatchError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// How deep to follow `/Parent` links when resolving inherited attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Page box of a source page, in its own user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x
    pub x: f32,
    /// Lower-left y
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    fn letter() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_PAGE_DIMENSIONS.0,
            height: DEFAULT_PAGE_DIMENSIONS.1,
        }
    }

    fn to_array(self) -> Vec<Object> {
        vec![
            Object::Real(self.x),
            Object::Real(self.y),
            Object::Real(self.x + self.width),
            Object::Real(self.y + self.height),
        ]
    }
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject in `output` from a page of `source`.
///
/// Resources are deep-copied; `cache` maps source object IDs to their copies
/// so that resources shared between pages of the same source are copied once.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let page_box = get_page_box(source, page_id)?;

    let content_data = get_page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", Object::Array(page_box.to_array()));
    xobject_dict.set("FormType", Object::Integer(1));

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources")? {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, &resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the content stream data from a page.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            other => Ok(stream_data(other)),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            result.extend_from_slice(&stream_data(doc.get_object(*id)?));
            result.push(b'\n');
        }
    }

    Ok(result)
}

fn stream_data(obj: &Object) -> Vec<u8> {
    match obj.as_stream() {
        Ok(stream) => stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone()),
        Err(_) => Vec::new(),
    }
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the ID first so reference cycles terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = source
                .get_object(*id)
                .map_err(BatchError::from)
                .and_then(|referenced| copy_object_deep(output, source, referenced, cache));
            match copied {
                Ok(copied) => {
                    output.objects.insert(new_id, copied);
                    Ok(Object::Reference(new_id))
                }
                Err(e) => {
                    // Drop this reservation and everything copied under it, so
                    // later pages never pick up a reference to a missing object
                    cache.retain(|_, copied| copied.0 < new_id.0);
                    output.objects.retain(|copied, _| copied.0 < new_id.0);
                    Err(e)
                }
            }
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        // Parent links would drag the whole source page tree along
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

// =============================================================================
// Page Dimensions
// =============================================================================

/// Look up a page attribute, following `/Parent` for inheritable keys
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut current = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Ok(Some(value.clone()));
        }
        match current.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => current = doc.get_dictionary(parent_id)?,
            Err(_) => break,
        }
    }
    Ok(None)
}

/// Get the MediaBox of a source page, falling back to US Letter
pub fn get_page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let media_box = match inherited_attribute(doc, page_id, b"MediaBox")? {
        Some(Object::Reference(id)) => doc.get_object(id)?.clone(),
        Some(obj) => obj,
        None => return Ok(PageBox::letter()),
    };

    let Ok(values) = media_box.as_array() else {
        return Ok(PageBox::letter());
    };
    let numbers: Vec<f32> = values.iter().filter_map(extract_number).collect();
    if numbers.len() != 4 {
        return Ok(PageBox::letter());
    }

    let (x0, x1) = (numbers[0].min(numbers[2]), numbers[0].max(numbers[2]));
    let (y0, y1) = (numbers[1].min(numbers[3]), numbers[1].max(numbers[3]));
    if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
        return Ok(PageBox::letter());
    }

    Ok(PageBox {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
