//! Domain models for the OE2010 conversion pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`CellValue`] - One source cell, as loaded from text or a spreadsheet
//! - [`SourceTable`] - Headers plus rows of one registration export
//! - [`ColumnRole`] - Semantic role inferred for a source column
//! - [`OeField`] - One column of the fixed OE2010 import schema
//! - [`OeRecord`] - One output row in OE2010 schema order

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Source Cells
// =============================================================================

/// A single source cell.
///
/// Delimited text always yields [`CellValue::Text`] or [`CellValue::Empty`];
/// spreadsheets also produce numeric and boolean cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Build a cell from raw text; empty text is a missing cell.
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }

    /// Render the cell as text.
    ///
    /// Integral floats keep a `.0` suffix (`1234567.0`), which is how
    /// spreadsheet exports of numeric ids usually look.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
                    format!("{:.1}", n)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
        }
    }

    /// Missing or whitespace-only.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text, or `default` when the cell is blank.
    pub fn text_or(&self, default: &str) -> String {
        if self.is_blank() {
            default.to_string()
        } else {
            self.to_text().trim().to_string()
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

// =============================================================================
// Source Table
// =============================================================================

/// A loaded registration export: free-text headers and positional rows.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.headers.len(), CellValue::Empty);
        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// All values of one column, in row order.
    pub fn column(&self, column: usize) -> impl Iterator<Item = &CellValue> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, column))
    }

    /// Rows as JSON objects keyed by header (later duplicates win).
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (header, cell) in self.headers.iter().zip(row) {
                    obj.insert(
                        header.clone(),
                        serde_json::to_value(cell).unwrap_or(Value::Null),
                    );
                }
                Value::Object(obj)
            })
            .collect()
    }
}

// =============================================================================
// Column Roles
// =============================================================================

/// Semantic role of a source column.
///
/// Each role is claimed by at most one column per conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Wants to rent a timing chip.
    Rented,
    /// SI-card / chip number.
    Chipno,
    /// Club, school or team.
    ClubName,
    /// Sex / gender.
    Sex,
    /// Category (class) the runner enters.
    CategorySource,
    /// Mobile phone.
    Mobile,
    /// E-mail address.
    EMail,
    /// "Name Surname" in one column, split later.
    FullNameSource,
    /// Given name(s) only.
    FirstName,
    /// Family name only.
    Surname,
}

impl ColumnRole {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::Rented => "rented chip",
            ColumnRole::Chipno => "chip number",
            ColumnRole::ClubName => "club",
            ColumnRole::Sex => "sex",
            ColumnRole::CategorySource => "category",
            ColumnRole::Mobile => "mobile phone",
            ColumnRole::EMail => "e-mail",
            ColumnRole::FullNameSource => "full name",
            ColumnRole::FirstName => "first name",
            ColumnRole::Surname => "surname",
        }
    }
}

// =============================================================================
// OE2010 Schema
// =============================================================================

/// Header row of the OE2010 entry import, in column order.
pub const OE_HEADERS: [&str; 57] = [
    "OE0001", "Stno", "XStno", "Chipno", "Database Id", "First name", "Surname", "YB", "S",
    "Block", "nc", "Start", "Finish", "Time", "Classifier", "Credit -", "Penalty +", "Comment",
    "Club no.", "Cl.name", "City", "Nat", "Location", "Region", "Cl. no.", "Short", "Long",
    "Entry cl. No", "Entry class (short)", "Entry class (long)", "Rank", "Ranking points",
    "Num1", "Num2", "Num3", "Text1", "Text2", "Text3", "Addr. surname", "Addr. first name",
    "Street", "Line2", "Zip", "Addr. city", "Phone", "Mobile", "Fax", "EMail", "Rented",
    "Start fee", "Paid", "Team", "Course no.", "Course", "km", "m", "Course controls",
];

/// One OE2010 column. Declaration order is schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OeField {
    Oe0001,
    Stno,
    XStno,
    Chipno,
    DatabaseId,
    FirstName,
    Surname,
    YearOfBirth,
    Sex,
    Block,
    Nc,
    Start,
    Finish,
    Time,
    Classifier,
    Credit,
    Penalty,
    Comment,
    ClubNo,
    ClubName,
    City,
    Nat,
    Location,
    Region,
    ClassNo,
    Short,
    Long,
    EntryClassNo,
    EntryClassShort,
    EntryClassLong,
    Rank,
    RankingPoints,
    Num1,
    Num2,
    Num3,
    Text1,
    Text2,
    Text3,
    AddrSurname,
    AddrFirstName,
    Street,
    Line2,
    Zip,
    AddrCity,
    Phone,
    Mobile,
    Fax,
    EMail,
    Rented,
    StartFee,
    Paid,
    Team,
    CourseNo,
    Course,
    Km,
    M,
    CourseControls,
}

impl OeField {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn header(self) -> &'static str {
        OE_HEADERS[self.index()]
    }
}

/// One output row. Every field starts empty.
#[derive(Debug, Clone, PartialEq)]
pub struct OeRecord {
    values: Vec<String>,
}

impl Default for OeRecord {
    fn default() -> Self {
        Self { values: vec![String::new(); OE_HEADERS.len()] }
    }
}

impl OeRecord {
    pub fn get(&self, field: OeField) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: OeField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Values in schema order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order_matches_headers() {
        assert_eq!(OeField::Oe0001.header(), "OE0001");
        assert_eq!(OeField::Stno.header(), "Stno");
        assert_eq!(OeField::Chipno.header(), "Chipno");
        assert_eq!(OeField::Sex.header(), "S");
        assert_eq!(OeField::ClubNo.header(), "Club no.");
        assert_eq!(OeField::City.header(), "City");
        assert_eq!(OeField::ClassNo.header(), "Cl. no.");
        assert_eq!(OeField::EntryClassLong.header(), "Entry class (long)");
        assert_eq!(OeField::EMail.header(), "EMail");
        assert_eq!(OeField::Rented.header(), "Rented");
        assert_eq!(OeField::CourseControls.header(), "Course controls");
        assert_eq!(OeField::CourseControls.index(), OE_HEADERS.len() - 1);
    }

    #[test]
    fn test_record_defaults_empty() {
        let mut rec = OeRecord::default();
        assert_eq!(rec.values().len(), OE_HEADERS.len());
        assert!(rec.values().iter().all(|v| v.is_empty()));

        rec.set(OeField::Surname, "Öz");
        assert_eq!(rec.get(OeField::Surname), "Öz");
        assert_eq!(rec.get(OeField::FirstName), "");
    }

    #[test]
    fn test_cell_text_rendering() {
        assert_eq!(CellValue::Number(1234567.0).to_text(), "1234567.0");
        assert_eq!(CellValue::Number(1.5).to_text(), "1.5");
        assert_eq!(CellValue::Integer(42).to_text(), "42");
        assert_eq!(CellValue::Bool(true).to_text(), "True");
        assert_eq!(CellValue::Empty.to_text(), "");
    }

    #[test]
    fn test_cell_blank_and_default() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Text("   ".into()).is_blank());
        assert!(!CellValue::Integer(0).is_blank());
        assert_eq!(CellValue::Text("  Ferdi Koşu ".into()).text_or("Ferdi"), "Ferdi Koşu");
        assert_eq!(CellValue::Empty.text_or("Ferdi"), "Ferdi");
    }

    #[test]
    fn test_table_pads_short_rows() {
        let mut table = SourceTable::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(vec![CellValue::from_text("1")]);
        table.push_row(vec![
            CellValue::from_text("1"),
            CellValue::from_text("2"),
            CellValue::from_text("3"),
            CellValue::from_text("4"),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 2), &CellValue::Empty);
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.cell(9, 9), &CellValue::Empty);

        let records = table.to_records();
        assert_eq!(records[0]["a"], "1");
        assert!(records[0]["b"].is_null());
    }
}
