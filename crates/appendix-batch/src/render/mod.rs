//! PDF rendering modules for batch assembly
//!
//! This module is the document engine the compositor draws through:
//! - Loading and measuring source PDFs
//! - Wrapping source pages as Form XObjects (deep-copying resources)
//! - Decoding and embedding PNG/JPEG images
//! - Building and serializing output documents

mod page;
mod raster;
mod source;
mod xobject;

pub use raster::{
    DecodedImage, EmbeddedImage, IMAGE_CODECS, ImageCodec, decode_image, embed_image,
};
pub use page::{Drawable, OutputDocument, PageBuilder, encode_win_ansi};
pub use source::{SourceDocument, probe_page_count};
pub use xobject::{PageBox, copy_object_deep, create_page_xobject, get_page_box};
