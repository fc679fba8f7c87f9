//! Page composition
//!
//! Turns one source unit (a whole PDF or one image) into destination pages:
//! one page per source page, each on a letter canvas with the running header
//! right-aligned at the top and the content fitted and centered below it.

use crate::constants::{HEADER_FONT_SIZE, HEADER_SEPARATOR};
use crate::layout::{Canvas, canvas_for, header_position, place_source};
use crate::name_key::strip_extension;
use crate::render::{
    DecodedImage, Drawable, OutputDocument, SourceDocument, decode_image, embed_image,
};
use crate::types::*;
use lopdf::ObjectId;

/// Header label for a source file: its basename, plus the user's header text
pub fn header_label(file_name: &str, header_text: &str) -> String {
    let base = strip_extension(file_name);
    let header = header_text.trim();
    if header.is_empty() {
        base.to_string()
    } else {
        format!("{base}{HEADER_SEPARATOR}{header_text}")
    }
}

/// A decoded source, ready to render
#[derive(Debug)]
pub enum SourceUnit {
    Document(SourceDocument),
    Image(DecodedImage),
}

impl SourceUnit {
    /// Decode bytes according to the file's kind.
    ///
    /// Takes ownership of the buffer; images keep it for passthrough embedding.
    pub fn decode(kind: SourceKind, bytes: Vec<u8>) -> Result<Self> {
        match kind {
            SourceKind::Document => Ok(SourceUnit::Document(SourceDocument::load(&bytes)?)),
            SourceKind::Image => Ok(SourceUnit::Image(decode_image(bytes)?)),
        }
    }

    /// Render every page of this unit into `output`.
    ///
    /// Pages that fail to embed are skipped and reported to `issues`; the
    /// return value is the number of pages actually added.
    pub fn render_into(
        self,
        output: &mut OutputDocument,
        name: &str,
        label: &str,
        issues: &mut Vec<RunIssue>,
    ) -> Result<usize> {
        match self {
            SourceUnit::Document(mut source) => {
                let mut rendered = 0;
                for index in 0..source.page_count() {
                    let drawable = match source.embed_page(output, index) {
                        Ok(drawable) => drawable,
                        Err(e) => {
                            report(issues, RunIssue::Embed {
                                name: name.to_string(),
                                page_index: index,
                                reason: e.to_string(),
                            });
                            continue;
                        }
                    };
                    let (width, height) = drawable.natural_size();
                    let canvas = canvas_for(SourceKind::Document, width, height);
                    compose_page(output, &canvas, &drawable, label)?;
                    rendered += 1;
                }
                Ok(rendered)
            }
            SourceUnit::Image(image) => {
                let embedded = match embed_image(output.document_mut(), image) {
                    Ok(embedded) => embedded,
                    Err(e) => {
                        report(issues, RunIssue::Embed {
                            name: name.to_string(),
                            page_index: 0,
                            reason: e.to_string(),
                        });
                        return Ok(0);
                    }
                };
                let drawable = Drawable::Image {
                    id: embedded.id,
                    width: embedded.width,
                    height: embedded.height,
                };
                let (width, height) = drawable.natural_size();
                let canvas = canvas_for(SourceKind::Image, width, height);
                compose_page(output, &canvas, &drawable, label)?;
                Ok(1)
            }
        }
    }
}

/// Compose one destination page: header label plus the fitted drawable
pub fn compose_page(
    output: &mut OutputDocument,
    canvas: &Canvas,
    drawable: &Drawable,
    label: &str,
) -> Result<ObjectId> {
    let mut page = output.add_page(canvas.width, canvas.height);

    let header = header_position(canvas, label, HEADER_FONT_SIZE);
    page.draw_text(label, header.x, header.y, HEADER_FONT_SIZE);

    let (src_width, src_height) = drawable.natural_size();
    let placement = place_source(canvas, src_width, src_height);
    page.draw_rectangle_content(drawable, &placement.content_rect);

    output.finish_page(page)
}

fn report(issues: &mut Vec<RunIssue>, issue: RunIssue) {
    log::warn!("WARN: {issue}");
    issues.push(issue);
}
