//! Raster image decoding and embedding
//!
//! Images are tried as PNG first, then JPEG. Gray and RGB JPEG data is
//! embedded as-is (`DCTDecode`); everything else, CMYK JPEG included, is
//! re-encoded as raw samples and left for flate compression when the output
//! document is finalized.

use crate::types::{BatchError, Result};
use image::{ColorType, DynamicImage, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Codecs tried, in preference order
pub const IMAGE_CODECS: [ImageCodec; 2] = [ImageCodec::Png, ImageCodec::Jpeg];

/// Image codec a source decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCodec {
    Png,
    Jpeg,
}

impl ImageCodec {
    fn format(self) -> ImageFormat {
        match self {
            ImageCodec::Png => ImageFormat::Png,
            ImageCodec::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// A successfully decoded source image
pub struct DecodedImage {
    pub codec: ImageCodec,
    pub image: DynamicImage,
    /// Original encoded bytes, reused for JPEG passthrough
    raw: Vec<u8>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("codec", &self.codec)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// An image XObject placed in an output document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Decode image bytes, trying each codec in [`IMAGE_CODECS`] order
pub fn decode_image(bytes: Vec<u8>) -> Result<DecodedImage> {
    let mut last_error = None;
    for codec in IMAGE_CODECS {
        match image::load_from_memory_with_format(&bytes, codec.format()) {
            Ok(image) => {
                return Ok(DecodedImage {
                    codec,
                    image,
                    raw: bytes,
                });
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(match last_error {
        Some(e) => BatchError::Image(e),
        None => BatchError::Config("no image codecs configured".to_string()),
    })
}

/// Add a decoded image to `output` as an image XObject
pub fn embed_image(output: &mut Document, decoded: DecodedImage) -> Result<EmbeddedImage> {
    let width = decoded.width();
    let height = decoded.height();
    if width == 0 || height == 0 {
        return Err(BatchError::Execution("image has zero size".to_string()));
    }

    // The decoder reports CMYK data as RGB, so trust the stream's own header
    let passthrough = match (decoded.codec, decoded.image.color()) {
        (ImageCodec::Jpeg, ColorType::L8) if jpeg_components(&decoded.raw) == Some(1) => {
            Some("DeviceGray")
        }
        (ImageCodec::Jpeg, ColorType::Rgb8) if jpeg_components(&decoded.raw) == Some(3) => {
            Some("DeviceRGB")
        }
        _ => None,
    };

    let id = if let Some(color_space) = passthrough {
        let mut dict = image_dict(width, height, color_space);
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        output.add_object(Stream::new(dict, decoded.raw).with_compression(false))
    } else {
        embed_samples(output, &decoded.image, width, height)
    };

    Ok(EmbeddedImage { id, width, height })
}

/// Embed decoded samples, with a soft mask when the image has alpha
fn embed_samples(output: &mut Document, image: &DynamicImage, width: u32, height: u32) -> ObjectId {
    let color = image.color();
    let grayscale = matches!(
        color,
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16
    );

    let (samples, color_space) = if grayscale {
        (image.to_luma8().into_raw(), "DeviceGray")
    } else {
        (image.to_rgb8().into_raw(), "DeviceRGB")
    };

    let mut dict = image_dict(width, height, color_space);

    if color.has_alpha() {
        let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let mask_id = output.add_object(Stream::new(
            image_dict(width, height, "DeviceGray"),
            alpha,
        ));
        dict.set("SMask", Object::Reference(mask_id));
    }

    output.add_object(Stream::new(dict, samples))
}

/// Component count from a JPEG's start-of-frame header
fn jpeg_components(data: &[u8]) -> Option<u8> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        pos += 2;
        match marker {
            // Fill bytes before a marker
            0xFF => pos -= 1,
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {}
            // End of image or start of scan before any frame header
            0xD9 | 0xDA => return None,
            _ => {
                let length = u16::from_be_bytes([*data.get(pos)?, *data.get(pos + 1)?]) as usize;
                let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
                if is_frame {
                    // length(2) precision(1) height(2) width(2) components(1)
                    return data.get(pos + 7).copied();
                }
                pos += length;
            }
        }
    }
    None
}

fn image_dict(width: u32, height: u32, color_space: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}
