//! Run manifest: where every input file landed

use crate::assemble::RenderedBatch;
use crate::types::*;
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

/// Column names, in order
pub const MANIFEST_COLUMNS: [&str; 8] = [
    "input_name",
    "appendix_num",
    "part_y",
    "is_pdf",
    "pages_in_item",
    "batch",
    "batch_page_start",
    "batch_page_end",
];

/// One rendered input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub input_name: String,
    pub appendix_num: u64,
    pub part_y: Option<u64>,
    pub is_pdf: bool,
    pub pages_in_item: usize,
    /// 1-based batch number
    pub batch: usize,
    /// First page within the batch, 1-based
    pub batch_page_start: usize,
    /// Last page within the batch, inclusive
    pub batch_page_end: usize,
}

impl ManifestRow {
    fn record(&self) -> [String; 8] {
        [
            self.input_name.clone(),
            self.appendix_num.to_string(),
            self.part_y.map(|p| p.to_string()).unwrap_or_default(),
            self.is_pdf.to_string(),
            self.pages_in_item.to_string(),
            self.batch.to_string(),
            self.batch_page_start.to_string(),
            self.batch_page_end.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    rows: Vec<ManifestRow>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ManifestRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one row per rendered unit, numbering pages continuously
    /// from 1 within the batch
    pub fn record_batch(&mut self, batch: &RenderedBatch) {
        let mut next_page = 1;
        for unit in &batch.units {
            self.rows.push(ManifestRow {
                input_name: unit.name.clone(),
                appendix_num: unit.key.appendix_order,
                part_y: unit.key.part_index,
                is_pdf: unit.kind.is_document(),
                pages_in_item: unit.pages,
                batch: batch.number,
                batch_page_start: next_page,
                batch_page_end: next_page + unit.pages - 1,
            });
            next_page += unit.pages;
        }
    }

    /// Write as CSV with a header row, every field quoted
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(writer);
        csv.write_record(MANIFEST_COLUMNS)?;
        for row in &self.rows {
            csv.write_record(row.record())?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::RenderedUnit;
    use crate::name_key::parse_name;

    fn unit(name: &str, pages: usize) -> RenderedUnit {
        RenderedUnit {
            name: name.to_string(),
            kind: SourceKind::from_name(name),
            key: parse_name(name).unwrap(),
            pages,
        }
    }

    fn batch(number: usize, units: Vec<RenderedUnit>) -> RenderedBatch {
        let pages = units.iter().map(|u| u.pages).sum();
        RenderedBatch {
            number,
            bytes: Vec::new(),
            pages,
            units,
            issues: Vec::new(),
        }
    }

    #[test]
    fn test_ranges_are_contiguous_per_batch() {
        let mut manifest = Manifest::new();
        manifest.record_batch(&batch(
            1,
            vec![unit("Appendix A.pdf", 3), unit("Appendix B 1.jpg", 1)],
        ));
        manifest.record_batch(&batch(2, vec![unit("Appendix C (2 of 2).png", 1)]));

        let ranges: Vec<(usize, usize, usize)> = manifest
            .rows()
            .iter()
            .map(|r| (r.batch, r.batch_page_start, r.batch_page_end))
            .collect();
        assert_eq!(ranges, vec![(1, 1, 3), (1, 4, 4), (2, 1, 1)]);

        assert_eq!(manifest.rows()[1].part_y, Some(1));
        assert!(manifest.rows()[0].is_pdf);
        assert!(!manifest.rows()[2].is_pdf);
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let mut manifest = Manifest::new();
        manifest.record_batch(&batch(1, vec![unit("Appendix A.pdf", 2)]));

        let csv = String::from_utf8(manifest.to_csv().unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "\"input_name\",\"appendix_num\",\"part_y\",\"is_pdf\",\"pages_in_item\",\
                 \"batch\",\"batch_page_start\",\"batch_page_end\""
            )
        );
        assert_eq!(
            lines.next(),
            Some("\"Appendix A.pdf\",\"1\",\"\",\"true\",\"2\",\"1\",\"1\",\"2\"")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_names_with_quotes_and_commas() {
        let mut manifest = Manifest::new();
        manifest.record_batch(&batch(1, vec![unit("Appendix A, \"final\".pdf", 1)]));

        let csv = String::from_utf8(manifest.to_csv().unwrap()).unwrap();
        assert!(csv.contains("\"Appendix A, \"\"final\"\".pdf\""));
    }
}
