//! Content placement on a destination page
//!
//! Every destination page is a letter-sized canvas with a uniform outer
//! margin and a header band reserved at the top. Source content is scaled
//! uniformly to the largest size that fits the remaining box, then centered.

use crate::constants::{
    HEADER_BAND_PT, HEADER_BASELINE_GAP, LETTER_HEIGHT_PT, LETTER_WIDTH_PT, MARGIN_PT,
    helvetica_text_width,
};
use crate::types::{Orientation, SourceKind};

use super::{Canvas, HeaderPosition, Placement, Rect};

/// Pick the canvas for a source.
///
/// Documents always get a portrait page. Images follow their own aspect
/// ratio: width ≥ height gets a landscape page.
pub fn canvas_for(kind: SourceKind, source_width: f32, source_height: f32) -> Canvas {
    let orientation = match kind {
        SourceKind::Document => Orientation::Portrait,
        SourceKind::Image if source_width >= source_height => Orientation::Landscape,
        SourceKind::Image => Orientation::Portrait,
    };
    canvas(orientation)
}

/// Letter canvas in the given orientation
pub fn canvas(orientation: Orientation) -> Canvas {
    let (width, height) = match orientation {
        Orientation::Portrait => (LETTER_WIDTH_PT, LETTER_HEIGHT_PT),
        Orientation::Landscape => (LETTER_HEIGHT_PT, LETTER_WIDTH_PT),
    };
    Canvas {
        width,
        height,
        orientation,
    }
}

/// The area inside the margins and below the header band
pub fn content_box(canvas: &Canvas) -> Rect {
    Rect::new(
        MARGIN_PT,
        MARGIN_PT,
        canvas.width - 2.0 * MARGIN_PT,
        canvas.height - (MARGIN_PT + HEADER_BAND_PT) - MARGIN_PT,
    )
}

/// The header band: between the top margin and the content box
pub fn header_band(canvas: &Canvas) -> Rect {
    Rect::new(
        MARGIN_PT,
        canvas.height - MARGIN_PT - HEADER_BAND_PT,
        canvas.width - 2.0 * MARGIN_PT,
        HEADER_BAND_PT,
    )
}

/// Largest uniform scale at which the source fits the box.
///
/// There is no upper cap: sources smaller than the box are enlarged.
pub fn fit_scale(src_width: f32, src_height: f32, box_width: f32, box_height: f32) -> f32 {
    let scale_w = box_width / src_width;
    let scale_h = box_height / src_height;
    scale_w.min(scale_h)
}

/// Scale a source uniformly into `target` and center it on both axes
pub fn fit_to_box(target: &Rect, src_width: f32, src_height: f32) -> Placement {
    let scale = fit_scale(src_width, src_height, target.width, target.height);
    let scaled_width = src_width * scale;
    let scaled_height = src_height * scale;

    let x = target.x + (target.width - scaled_width) / 2.0;
    let y = target.y + (target.height - scaled_height) / 2.0;

    Placement {
        content_box: *target,
        content_rect: Rect::new(x, y, scaled_width, scaled_height),
        scale,
    }
}

/// Place a source on its canvas
pub fn place_source(canvas: &Canvas, src_width: f32, src_height: f32) -> Placement {
    fit_to_box(&content_box(canvas), src_width, src_height)
}

/// Right-align a header label just below the top margin
pub fn header_position(canvas: &Canvas, label: &str, font_size: f32) -> HeaderPosition {
    let text_width = helvetica_text_width(label, font_size);
    let right = canvas.width - MARGIN_PT;
    HeaderPosition {
        x: right - text_width,
        y: canvas.height - MARGIN_PT - font_size - HEADER_BASELINE_GAP,
        text_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HEADER_FONT_SIZE;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_canvas_orientation() {
        let doc = canvas_for(SourceKind::Document, 800.0, 600.0);
        assert_eq!((doc.width, doc.height), (612.0, 792.0));

        let wide = canvas_for(SourceKind::Image, 800.0, 600.0);
        assert_eq!((wide.width, wide.height), (792.0, 612.0));
        assert_eq!(wide.orientation, Orientation::Landscape);

        let square = canvas_for(SourceKind::Image, 500.0, 500.0);
        assert_eq!(square.orientation, Orientation::Landscape);

        let tall = canvas_for(SourceKind::Image, 600.0, 800.0);
        assert_eq!(tall.orientation, Orientation::Portrait);
    }

    #[test]
    fn test_content_box_portrait() {
        let rect = content_box(&canvas(Orientation::Portrait));
        assert_eq!(rect, Rect::new(36.0, 36.0, 540.0, 666.0));
    }

    #[test]
    fn test_content_box_landscape() {
        let rect = content_box(&canvas(Orientation::Landscape));
        assert_eq!(rect, Rect::new(36.0, 36.0, 720.0, 486.0));
    }

    #[test]
    fn test_fit_preserves_aspect_and_stays_inside() {
        let target = Rect::new(36.0, 36.0, 540.0, 666.0);
        let sources = [
            (612.0, 792.0),
            (792.0, 612.0),
            (100.0, 100.0),
            (3000.0, 200.0),
            (200.0, 3000.0),
            (1.0, 1000.0),
        ];

        for (sw, sh) in sources {
            let placement = fit_to_box(&target, sw, sh);
            let rect = placement.content_rect;

            let src_ratio = sw / sh;
            let out_ratio = rect.width / rect.height;
            assert!(
                (src_ratio - out_ratio).abs() / src_ratio < 1e-4,
                "ratio changed for {sw}x{sh}"
            );
            assert!(target.contains(&rect, EPS), "{sw}x{sh} overflows the box");

            // One dimension always touches the box
            let touches_w = (rect.width - target.width).abs() < EPS;
            let touches_h = (rect.height - target.height).abs() < EPS;
            assert!(touches_w || touches_h);
        }
    }

    #[test]
    fn test_fit_centers_content() {
        let target = Rect::new(36.0, 36.0, 540.0, 666.0);
        let placement = fit_to_box(&target, 100.0, 100.0);
        let rect = placement.content_rect;

        // Width-limited: 5.4x, vertically centered
        assert!((placement.scale - 5.4).abs() < EPS);
        assert!((rect.x - 36.0).abs() < EPS);
        assert!((rect.y - (36.0 + (666.0 - 540.0) / 2.0)).abs() < EPS);
    }

    #[test]
    fn test_small_sources_are_upscaled() {
        let target = content_box(&canvas(Orientation::Portrait));
        let placement = fit_to_box(&target, 10.0, 10.0);
        assert!(placement.scale > 1.0);
    }

    #[test]
    fn test_header_inside_band_and_right_aligned() {
        for orientation in [Orientation::Portrait, Orientation::Landscape] {
            let canvas = canvas(orientation);
            let pos = header_position(&canvas, "Appendix B 2 – Exhibit", HEADER_FONT_SIZE);
            let band = header_band(&canvas);
            let content = content_box(&canvas);

            assert!((pos.x + pos.text_width - (canvas.width - MARGIN_PT)).abs() < EPS);
            assert!(pos.y >= band.y);
            assert!(pos.y + HEADER_FONT_SIZE <= band.top());
            assert!(pos.y > content.top());
        }
    }
}
