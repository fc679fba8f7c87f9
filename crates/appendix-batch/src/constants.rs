//! Shared constants for batch assembly
//!
//! This module centralizes page geometry, header typography and naming
//! constants used throughout the pipeline.

// =============================================================================
// Page Geometry
// =============================================================================

/// US Letter width in points (8.5")
pub const LETTER_WIDTH_PT: f32 = 612.0;

/// US Letter height in points (11")
pub const LETTER_HEIGHT_PT: f32 = 792.0;

/// Outer margin on all four sides (0.5")
pub const MARGIN_PT: f32 = 36.0;

/// Band reserved for the running header below the top margin (0.75")
pub const HEADER_BAND_PT: f32 = 54.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (LETTER_WIDTH_PT, LETTER_HEIGHT_PT);

// =============================================================================
// Header
// =============================================================================

/// Font size of the running header label (points)
pub const HEADER_FONT_SIZE: f32 = 10.0;

/// Gap between the top margin and the header cap height (points)
pub const HEADER_BASELINE_GAP: f32 = 4.0;

/// Separator between the file label and user-supplied header text
pub const HEADER_SEPARATOR: &str = " – ";

/// Resource name of the header font on every output page
pub const HEADER_FONT_RESOURCE: &str = "F1";

/// Helvetica advance width for characters missing from the table (1/1000 em)
const HELVETICA_DEFAULT_WIDTH: u16 = 556;

/// Helvetica advance widths for printable ASCII, `' '` through `'~'` (1/1000 em)
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Advance width of one character in Helvetica (1/1000 em)
pub fn helvetica_char_width(ch: char) -> u16 {
    match ch {
        ' '..='~' => HELVETICA_ASCII_WIDTHS[ch as usize - ' ' as usize],
        '–' => 556,
        '—' => 1000,
        _ => HELVETICA_DEFAULT_WIDTH,
    }
}

/// Width of `text` set in Helvetica at `size` points
pub fn helvetica_text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| helvetica_char_width(c) as u32).sum();
    units as f32 / 1000.0 * size
}

// =============================================================================
// Naming
// =============================================================================

/// Default page budget per output batch
pub const DEFAULT_TARGET_PAGES: usize = 50;

/// Zero-padded width of the batch number in output filenames
pub const BATCH_NUMBER_WIDTH: usize = 3;

/// Filename of the manifest table
pub const MANIFEST_FILE_NAME: &str = "manifest.csv";

/// Filename of the "download all" archive
pub const BUNDLE_FILE_NAME: &str = "appendix_batches.zip";

/// Output filename for a 1-based batch number, e.g. `batch_007.pdf`
pub fn batch_file_name(batch_number: usize) -> String {
    format!(
        "batch_{:0width$}.pdf",
        batch_number,
        width = BATCH_NUMBER_WIDTH
    )
}
