//! Zip bundling of finished artifacts

use crate::types::*;
use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Pack named byte blobs into one zip archive, in the given order.
///
/// Names may contain `/` to place entries in folders.
pub fn bundle_entries<'a, N>(entries: impl IntoIterator<Item = (N, &'a [u8])>) -> Result<Vec<u8>>
where
    N: AsRef<str>,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        zip.start_file(name.as_ref(), options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}
