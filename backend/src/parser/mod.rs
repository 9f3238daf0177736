//! Input loading with encoding and delimiter auto-detection.
//!
//! Reads a registration export into a [`SourceTable`]. Delimited text goes
//! through a fixed decoding chain (UTF-8, Windows-1254, ISO-8859-9);
//! spreadsheets (xlsx, xls, xlsb, ods) are read with `calamine`.
//! No OE2010-specific logic here.

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use std::io::{self, Cursor};
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::{CellValue, SourceTable};
use crate::text::{decode_latin5, decode_utf8, decode_windows_1254};

/// Extensions read as delimited text. Anything else is a spreadsheet.
const DELIMITED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// Kind of input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Delimited,
    Spreadsheet,
}

impl InputFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        let is_delimited = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| DELIMITED_EXTENSIONS.iter().any(|d| e.eq_ignore_ascii_case(d)))
            .unwrap_or(false);

        if is_delimited {
            InputFormat::Delimited
        } else {
            InputFormat::Spreadsheet
        }
    }
}

/// Result of loading with metadata
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// Headers and rows
    pub table: SourceTable,
    /// Format the file was read as
    pub format: InputFormat,
    /// Encoding that decoded the file (delimited text only)
    pub encoding: Option<&'static str>,
    /// Detected delimiter (delimited text only)
    pub delimiter: Option<char>,
}

/// Whether an OS error means another process holds the file.
pub fn is_lock_error(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::PermissionDenied {
        return true;
    }
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}

/// Source of raw input bytes. [`std::fs::read`] in production.
pub type ReadFn = fn(&Path) -> io::Result<Vec<u8>>;

/// Map a failed read to a load error, reporting locked files distinctly.
pub fn map_read_error(path: &Path, err: io::Error) -> LoadError {
    if is_lock_error(&err) {
        LoadError::Locked { path: path.to_path_buf() }
    } else {
        LoadError::Io(err)
    }
}

/// Load a registration export from disk.
///
/// # Example
/// ```ignore
/// let loaded = load_table(Path::new("kayitlar.xlsx"))?;
/// println!("{} rows, headers: {:?}", loaded.table.len(), loaded.table.headers);
/// ```
pub fn load_table(path: &Path) -> LoadResult<LoadedTable> {
    load_table_with(path, |p: &Path| std::fs::read(p))
}

/// Load a registration export, taking the raw bytes from `read`.
///
/// The format still follows the extension of `path`.
pub fn load_table_with(path: &Path, read: ReadFn) -> LoadResult<LoadedTable> {
    let bytes = read(path).map_err(|e| map_read_error(path, e))?;

    match InputFormat::from_path(path) {
        InputFormat::Delimited => parse_delimited_bytes(&bytes),
        InputFormat::Spreadsheet => Ok(LoadedTable {
            table: parse_spreadsheet_bytes(bytes)?,
            format: InputFormat::Spreadsheet,
            encoding: None,
            delimiter: None,
        }),
    }
}

/// Decode text: strict UTF-8, then strict Windows-1254, then ISO-8859-9.
///
/// Returns the text and the name of the encoding that worked.
pub fn decode_content(bytes: &[u8]) -> (String, &'static str) {
    if let Some(text) = decode_utf8(bytes) {
        return (text, "utf-8");
    }
    if let Some(text) = decode_windows_1254(bytes) {
        return (text, "windows-1254");
    }
    (decode_latin5(bytes), "iso-8859-9")
}

/// Detect the delimiter by counting unquoted occurrences in the first line.
///
/// Separators inside double quotes belong to a header's text, so
/// `a,b,"c (x; y; z)"` is comma-separated. Ties go to the earlier
/// candidate; a line with no candidate means `,`.
pub fn detect_delimiter(content: &str) -> char {
    const SEPARATORS: [char; 4] = [',', ';', '\t', '|'];

    let first_line = content.lines().next().unwrap_or("");
    let mut counts = [0usize; SEPARATORS.len()];
    let mut quoted = false;

    for c in first_line.chars() {
        if c == '"' {
            quoted = !quoted;
        } else if !quoted {
            if let Some(i) = SEPARATORS.iter().position(|&sep| sep == c) {
                counts[i] += 1;
            }
        }
    }

    let mut best_sep = ',';
    let mut best_count = 0;
    for (&sep, &count) in SEPARATORS.iter().zip(&counts) {
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode, detect the delimiter and parse delimited text.
pub fn parse_delimited_bytes(bytes: &[u8]) -> LoadResult<LoadedTable> {
    let (content, encoding) = decode_content(bytes);
    let delimiter = detect_delimiter(&content);
    let table = parse_delimited(&content, delimiter)?;

    Ok(LoadedTable {
        table,
        format: InputFormat::Delimited,
        encoding: Some(encoding),
        delimiter: Some(delimiter),
    })
}

/// Parse decoded delimited text with an explicit delimiter.
///
/// The first record is the header row. Blank lines are skipped, but a
/// record of empty cells (`,,`) is a row. Short rows are padded and surplus
/// cells dropped.
pub fn parse_delimited(content: &str, delimiter: char) -> LoadResult<SourceTable> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    let mut table = SourceTable::new(headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(CellValue::from_text).collect());
    }

    Ok(table)
}

/// Parse the first worksheet of a spreadsheet held in memory.
pub fn parse_spreadsheet_bytes(bytes: Vec<u8>) -> LoadResult<SourceTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::Spreadsheet("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Spreadsheet(format!("cannot read sheet '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(LoadError::EmptyFile)?;
    let headers: Vec<String> = header_row.iter().map(|c| cell_from_data(c).to_text()).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    let mut table = SourceTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }

    Ok(table)
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match cell.as_datetime() {
            Some(naive) => CellValue::Text(naive.to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
    }
}
