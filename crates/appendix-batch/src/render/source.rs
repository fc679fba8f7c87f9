//! Source document access
//!
//! The source side of the document engine: load a PDF from bytes, count and
//! measure its pages, and embed individual pages into an output document.

use crate::types::{BatchError, Result};
use lopdf::{Document, ObjectId};
use std::collections::HashMap;

use super::page::{Drawable, OutputDocument};
use super::xobject::{PageBox, create_page_xobject, get_page_box};

/// A loaded source PDF
pub struct SourceDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
    /// Source object → copied object, shared across pages of this source
    copy_cache: HashMap<ObjectId, ObjectId>,
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("pages", &self.page_ids.len())
            .finish()
    }
}

impl SourceDocument {
    /// Parse a PDF from memory
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        let page_ids = doc.get_pages().into_values().collect();
        Ok(Self {
            doc,
            page_ids,
            copy_cache: HashMap::new(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Page box of page `index` (0-based)
    pub fn page_size(&self, index: usize) -> Result<PageBox> {
        get_page_box(&self.doc, self.page_id(index)?)
    }

    /// Wrap page `index` as a Form XObject in `output`
    pub fn embed_page(&mut self, output: &mut OutputDocument, index: usize) -> Result<Drawable> {
        let page_box = self.page_size(index)?;
        let page_id = self.page_id(index)?;
        let id = create_page_xobject(
            output.document_mut(),
            &self.doc,
            page_id,
            &mut self.copy_cache,
        )?;
        Ok(Drawable::Form { id, page_box })
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or_else(|| BatchError::Execution(format!("page {} out of range", index + 1)))
    }
}

/// Count the pages of a PDF without keeping it loaded
pub fn probe_page_count(bytes: &[u8]) -> Result<usize> {
    Ok(Document::load_mem(bytes)?.get_pages().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Dictionary, Object, Stream};

    fn offset_page_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(10),
                    Object::Integer(20),
                    Object::Integer(310),
                    Object::Integer(420),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
                ("Count", Object::Integer(1)),
            ])),
        );
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_embedded_page_keeps_its_size() {
        let bytes = offset_page_pdf();
        assert_eq!(probe_page_count(&bytes).unwrap(), 1);

        let mut source = SourceDocument::load(&bytes).unwrap();
        let expected = PageBox {
            x: 10.0,
            y: 20.0,
            width: 300.0,
            height: 400.0,
        };
        assert_eq!(source.page_size(0).unwrap(), expected);
        assert!(source.page_size(1).is_err());

        let mut output = OutputDocument::new();
        match source.embed_page(&mut output, 0).unwrap() {
            Drawable::Form { page_box, .. } => assert_eq!(page_box, expected),
            other => panic!("expected a form, got {other:?}"),
        }
    }
}
