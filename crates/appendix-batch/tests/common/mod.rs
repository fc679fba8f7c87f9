#![allow(dead_code)]

use appendix_batch::InputFile;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream};
use std::io::Cursor;

/// Reference to an object no fixture ever defines
pub const MISSING_OBJECT: (u32, u16) = (9999, 0);

/// Serialized PDF with `num_pages` blank pages of the given size
pub fn create_test_pdf(num_pages: usize, width: i64, height: i64) -> Vec<u8> {
    build_test_pdf(num_pages, width, height, |_, _| {})
}

/// Letter-size PDF whose page `broken` has its content stream missing
pub fn create_pdf_with_missing_contents(num_pages: usize, broken: usize) -> Vec<u8> {
    build_test_pdf(num_pages, 612, 792, |index, page| {
        if index == broken {
            page.set("Contents", Object::Reference(MISSING_OBJECT));
        }
    })
}

/// Letter-size PDF whose pages all share one missing font
pub fn create_pdf_with_missing_font(num_pages: usize) -> Vec<u8> {
    build_test_pdf(num_pages, 612, 792, |_, page| {
        let fonts = Dictionary::from_iter(vec![("F1", Object::Reference(MISSING_OBJECT))]);
        page.set(
            "Resources",
            Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]),
        );
    })
}

fn build_test_pdf(
    num_pages: usize,
    width: i64,
    height: i64,
    customize: impl Fn(usize, &mut Dictionary),
) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = format!("0 0 1 rg 10 10 {} 20 re f", 10 + i * 5);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]);
        customize(i, &mut page);
        let page_id = doc.add_object(page);
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 120, 200])));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

pub fn pdf(name: &str, pages: usize) -> InputFile {
    InputFile::from_bytes(name, create_test_pdf(pages, 612, 792))
}

pub fn jpeg(name: &str, width: u32, height: u32) -> InputFile {
    InputFile::from_bytes(name, create_test_image(width, height, ImageFormat::Jpeg))
}

pub fn png(name: &str, width: u32, height: u32) -> InputFile {
    InputFile::from_bytes(name, create_test_image(width, height, ImageFormat::Png))
}

/// Width and height of every page's MediaBox, in page order
pub fn page_sizes(bytes: &[u8]) -> Vec<(f32, f32)> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            let number = |o: &Object| match o {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r,
                _ => panic!("non-numeric MediaBox entry"),
            };
            (number(&media_box[2]), number(&media_box[3]))
        })
        .collect()
}
