//! OE2010 import file writer.
//!
//! Comma-delimited, header row first, every field encoded in Windows-1254.
//! Characters the code page lacks are dropped from each field before encoding.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::WriteError;
use crate::models::{OeRecord, OE_HEADERS};
use crate::text::encode_legacy;

/// Write records in OE2010 schema order to any writer.
pub fn write_oe_records<W: Write>(writer: W, records: &[OeRecord]) -> Result<(), WriteError> {
    let mut csv_writer = csv::WriterBuilder::new().delimiter(b',').from_writer(writer);

    csv_writer.write_record(OE_HEADERS.iter().map(|h| encode_legacy(h)))?;
    for record in records {
        csv_writer.write_record(record.values().iter().map(|v| encode_legacy(v)))?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Create (or truncate) `path` and write the records to it.
///
/// A failure part-way leaves the partial file in place.
pub fn write_oe_csv(path: &Path, records: &[OeRecord]) -> Result<(), WriteError> {
    let file = File::create(path)?;
    write_oe_records(file, records)
}
