//! Output document construction
//!
//! [`OutputDocument`] is the target side of the document engine: it creates
//! pages, draws header text and places XObjects, then serializes the whole
//! document to bytes.

use crate::constants::HEADER_FONT_RESOURCE;
use crate::layout::Rect;
use crate::types::Result;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::xobject::PageBox;

/// Something that can be drawn into a rectangle on an output page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drawable {
    /// Form XObject wrapping a source page; its BBox is the source page box
    Form { id: ObjectId, page_box: PageBox },
    /// Image XObject; occupies the unit square in its own space
    Image { id: ObjectId, width: u32, height: u32 },
}

impl Drawable {
    pub fn id(&self) -> ObjectId {
        match self {
            Drawable::Form { id, .. } | Drawable::Image { id, .. } => *id,
        }
    }

    /// Natural size used for fit-to-box scaling (points for pages, pixels for images)
    pub fn natural_size(&self) -> (f32, f32) {
        match self {
            Drawable::Form { page_box, .. } => (page_box.width, page_box.height),
            Drawable::Image { width, height, .. } => (*width as f32, *height as f32),
        }
    }

    /// Transformation matrix mapping the drawable onto `rect`
    fn matrix(&self, rect: &Rect) -> [f32; 6] {
        match self {
            Drawable::Form { page_box, .. } => {
                let sx = rect.width / page_box.width;
                let sy = rect.height / page_box.height;
                [
                    sx,
                    0.0,
                    0.0,
                    sy,
                    rect.x - page_box.x * sx,
                    rect.y - page_box.y * sy,
                ]
            }
            Drawable::Image { .. } => [rect.width, 0.0, 0.0, rect.height, rect.x, rect.y],
        }
    }
}

/// A page being composed. Finish it with [`OutputDocument::finish_page`].
#[derive(Debug)]
pub struct PageBuilder {
    width: f32,
    height: f32,
    operations: Vec<Operation>,
    xobjects: Dictionary,
    uses_font: bool,
}

impl PageBuilder {
    /// Draw black Helvetica text with its baseline starting at (x, y)
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) {
        self.uses_font = true;
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(HEADER_FONT_RESOURCE.as_bytes().to_vec()),
                    Object::Real(size),
                ],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Draw `drawable` scaled into `rect`
    pub fn draw_rectangle_content(&mut self, drawable: &Drawable, rect: &Rect) {
        let name = format!("X{}", self.xobjects.len());
        self.xobjects
            .set(name.as_bytes(), Object::Reference(drawable.id()));

        let matrix = drawable.matrix(rect);
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("cm", matrix.iter().map(|&v| Object::Real(v)).collect()),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
    }
}

/// The document a batch is rendered into
pub struct OutputDocument {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_refs: Vec<Object>,
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));

        Self {
            doc,
            pages_id,
            font_id,
            page_refs: Vec::new(),
        }
    }

    /// Underlying document, for embedding source pages and images
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Start a new page of the given size
    pub fn add_page(&self, width: f32, height: f32) -> PageBuilder {
        PageBuilder {
            width,
            height,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
            uses_font: false,
        }
    }

    /// Write a composed page into the page tree
    pub fn finish_page(&mut self, page: PageBuilder) -> Result<ObjectId> {
        let content = Content {
            operations: page.operations,
        };
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.encode()?));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(page.xobjects));
        if page.uses_font {
            let mut fonts = Dictionary::new();
            fonts.set(HEADER_FONT_RESOURCE, Object::Reference(self.font_id));
            resources.set("Font", Object::Dictionary(fonts));
        }

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.width),
                Object::Real(page.height),
            ]),
        );
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        let page_id = self.doc.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
        Ok(page_id)
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Build the page tree and catalog and serialize the document
    pub fn finalize(self) -> Result<Vec<u8>> {
        let OutputDocument {
            mut doc,
            pages_id,
            page_refs,
            ..
        } = self;

        let count = page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);

        doc.compress();

        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok(writer)
    }
}

/// Encode text for a WinAnsiEncoding font; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}
