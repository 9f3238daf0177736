//! High-level pipeline API: registration export → OE2010 import CSV.
//!
//! Stages run once, in order, with no way back:
//!
//! ```text
//! load → classify columns → blank records → names → sex → category
//!      → club → chip → start numbers → rent/phone/email → write
//! ```
//!
//! A missing optional column is not an error: the stage falls back
//! ("Unknown" category, "Ferdi" club, estimated sex, blank fields) and logs a
//! warning. Nothing is written until every earlier stage has succeeded.
//!
//! # Example
//!
//! ```rust,ignore
//! use oeconvert::{convert, MemorySink};
//! use std::path::Path;
//!
//! let sink = MemorySink::new();
//! let message = convert(Path::new("kayitlar.xlsx"), Path::new("OE2010.csv"), &sink);
//! println!("{}", message);
//! ```

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::fields::{
    category_forms, clean_chip, rent_flag, split_full_name, DEFAULT_CLUB, UNKNOWN_CATEGORY,
};
use super::reference::assign_ids;
use crate::classify::{Classifier, ColumnMapping};
use crate::error::{ConvertError, ConvertResult};
use crate::gender::GenderEstimator;
use crate::logs::LogSink;
use crate::models::{ColumnRole, OeField, OeRecord, SourceTable};
use crate::output::write_oe_csv;
use crate::parser::{load_table_with, ReadFn};
use crate::text::{fold_case, title_case};

/// Message for the "file is open elsewhere" case.
pub const LOCKED_MESSAGE: &str = "Error: the file is open in another program. Close it and try again.";

/// Prefix shared by every failure message.
pub const ERROR_PREFIX: &str = "Error";

/// Result of the transform stages (everything between load and write).
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// One record per source row, in source order
    pub records: Vec<OeRecord>,
    /// Which column plays which role
    pub mapping: ColumnMapping,
    /// Number of distinct categories (0 without a category column)
    pub category_count: usize,
    /// Number of distinct clubs
    pub club_count: usize,
    /// Whether the sex column was estimated from first names
    pub sex_estimated: bool,
}

/// A column the classifier recognised.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedColumn {
    pub header: String,
    pub role: ColumnRole,
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub row_count: usize,
    pub encoding: Option<String>,
    pub delimiter: Option<char>,
    pub columns: Vec<DetectedColumn>,
    pub category_count: usize,
    pub club_count: usize,
    pub sex_estimated: bool,
}

/// The single terminal message handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertMessage {
    Success(String),
    Error(String),
}

impl ConvertMessage {
    pub fn success(output: &Path) -> Self {
        ConvertMessage::Success(format!("SUCCESS! File ready:\n{}", output.display()))
    }

    pub fn from_error(err: &ConvertError) -> Self {
        let text = match err {
            ConvertError::Load(e) if e.is_locked() => LOCKED_MESSAGE.to_string(),
            ConvertError::Load(e) => format!("{} reading file: {}", ERROR_PREFIX, e),
            other => format!("{}: {}", ERROR_PREFIX, other),
        };
        ConvertMessage::Error(text)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ConvertMessage::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            ConvertMessage::Success(t) | ConvertMessage::Error(t) => t,
        }
    }
}

impl fmt::Display for ConvertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Convert with the built-in rules and the process-wide gender estimator.
pub fn convert(input: &Path, output: &Path, sink: &dyn LogSink) -> ConvertMessage {
    Converter::default().convert(input, output, sink)
}

/// Runs the pipeline with a given classifier and gender estimator.
#[derive(Clone)]
pub struct Converter<'a> {
    classifier: &'a Classifier,
    estimator: GenderEstimator,
    reader: ReadFn,
}

impl Default for Converter<'static> {
    fn default() -> Self {
        Self::new(Classifier::builtin(), GenderEstimator::global().clone())
    }
}

impl<'a> Converter<'a> {
    pub fn new(classifier: &'a Classifier, estimator: GenderEstimator) -> Self {
        Self { classifier, estimator, reader: |p: &Path| std::fs::read(p) }
    }

    /// Take the input bytes from `reader` instead of the filesystem.
    pub fn with_reader(mut self, reader: ReadFn) -> Self {
        self.reader = reader;
        self
    }

    /// Run and fold the outcome into one message.
    pub fn convert(&self, input: &Path, output: &Path, sink: &dyn LogSink) -> ConvertMessage {
        match self.run(input, output, sink) {
            Ok(report) => ConvertMessage::success(&report.output),
            Err(err) => ConvertMessage::from_error(&err),
        }
    }

    /// Load `input`, transform it and write the OE2010 file to `output`.
    pub fn run(
        &self,
        input: &Path,
        output: &Path,
        sink: &dyn LogSink,
    ) -> ConvertResult<ConversionReport> {
        let loaded = load_table_with(input, self.reader)?;
        let table = &loaded.table;

        sink.info(format!("File read: {}", file_name(input)));
        if let Some(encoding) = loaded.encoding {
            sink.info_indent(format!("Encoding: {}", encoding), 1);
        }
        if let Some(delimiter) = loaded.delimiter {
            sink.info_indent(format!("Separator: '{}'", format_delimiter(delimiter)), 1);
        }
        sink.info_indent(format!("{} rows, {} columns", table.len(), table.headers.len()), 1);

        let transformed = self.transform(table, sink)?;

        write_oe_csv(output, &transformed.records)?;
        sink.success(format!(
            "{} entries written to {}",
            transformed.records.len(),
            output.display()
        ));

        Ok(ConversionReport {
            output: output.to_path_buf(),
            row_count: transformed.records.len(),
            encoding: loaded.encoding.map(str::to_string),
            delimiter: loaded.delimiter,
            columns: transformed
                .mapping
                .iter()
                .map(|(role, col)| DetectedColumn { header: table.headers[col].clone(), role })
                .collect(),
            category_count: transformed.category_count,
            club_count: transformed.club_count,
            sex_estimated: transformed.sex_estimated,
        })
    }

    /// Stages 2-10 on an already loaded table. No I/O.
    pub fn transform(&self, table: &SourceTable, sink: &dyn LogSink) -> ConvertResult<TransformOutput> {
        let mapping = self.classifier.map_columns(&table.headers);
        log_mapping(table, &mapping, sink);

        let mut records = vec![OeRecord::default(); table.len()];

        fill_names(table, &mapping, &mut records, sink);
        let sex_estimated = self.fill_sex(table, &mapping, &mut records, sink)?;
        let category_count = fill_categories(table, &mapping, &mut records, sink);
        let club_count = fill_clubs(table, &mapping, &mut records, sink);
        fill_chips(table, &mapping, &mut records);
        fill_start_numbers(&mut records);
        self.fill_contact(table, &mapping, &mut records);

        Ok(TransformOutput { records, mapping, category_count, club_count, sex_estimated })
    }

    fn fill_sex(
        &self,
        table: &SourceTable,
        mapping: &ColumnMapping,
        records: &mut [OeRecord],
        sink: &dyn LogSink,
    ) -> ConvertResult<bool> {
        if let Some(col) = mapping.get(ColumnRole::Sex) {
            for (rec, cell) in records.iter_mut().zip(table.column(col)) {
                rec.set(OeField::Sex, cell.to_text());
            }
            return Ok(false);
        }

        sink.warning("No sex column found. Estimating from first names...");
        sink.warning("Estimates may be wrong, CHECK THEM!");
        for rec in records.iter_mut() {
            let sex = self.estimator.estimate_sex(rec.get(OeField::FirstName))?;
            rec.set(OeField::Sex, sex.as_str());
        }
        Ok(true)
    }

    fn fill_contact(&self, table: &SourceTable, mapping: &ColumnMapping, records: &mut [OeRecord]) {
        if let Some(col) = mapping.get(ColumnRole::Rented) {
            let affirmatives = self.classifier.rent_affirmatives();
            for (rec, cell) in records.iter_mut().zip(table.column(col)) {
                rec.set(OeField::Rented, rent_flag(&fold_case(&cell.to_text()), affirmatives));
            }
        }
        if let Some(col) = mapping.get(ColumnRole::Mobile) {
            for (rec, cell) in records.iter_mut().zip(table.column(col)) {
                rec.set(OeField::Mobile, cell.text_or(""));
            }
        }
        if let Some(col) = mapping.get(ColumnRole::EMail) {
            for (rec, cell) in records.iter_mut().zip(table.column(col)) {
                rec.set(OeField::EMail, cell.text_or(""));
            }
        }
    }
}

fn log_mapping(table: &SourceTable, mapping: &ColumnMapping, sink: &dyn LogSink) {
    sink.info(format!("{} of {} columns recognised:", mapping.len(), table.headers.len()));
    for (index, header) in table.headers.iter().enumerate() {
        match mapping.iter().find(|(_, col)| *col == index) {
            Some((role, _)) => sink.info_indent(format!("'{}' → {}", header, role.label()), 1),
            None => sink.info_indent(format!("'{}' ignored", header), 1),
        }
    }
}

fn fill_names(
    table: &SourceTable,
    mapping: &ColumnMapping,
    records: &mut [OeRecord],
    sink: &dyn LogSink,
) {
    if let Some(col) = mapping.get(ColumnRole::FullNameSource) {
        for (rec, cell) in records.iter_mut().zip(table.column(col)) {
            let (given, family) = split_full_name(&cell.to_text());
            rec.set(OeField::FirstName, title_case(&given));
            rec.set(OeField::Surname, title_case(&family));
        }
    } else if let Some(col) = mapping.get(ColumnRole::FirstName) {
        for (rec, cell) in records.iter_mut().zip(table.column(col)) {
            rec.set(OeField::FirstName, title_case(&cell.to_text()));
        }
        if let Some(col) = mapping.get(ColumnRole::Surname) {
            for (rec, cell) in records.iter_mut().zip(table.column(col)) {
                rec.set(OeField::Surname, title_case(&cell.to_text()));
            }
        }
    } else {
        sink.warning("No name column found, names are left empty");
    }
}

fn fill_categories(
    table: &SourceTable,
    mapping: &ColumnMapping,
    records: &mut [OeRecord],
    sink: &dyn LogSink,
) -> usize {
    let Some(col) = mapping.get(ColumnRole::CategorySource) else {
        sink.warning(format!("No category column found, every runner is '{}'", UNKNOWN_CATEGORY));
        for rec in records.iter_mut() {
            rec.set(OeField::Short, UNKNOWN_CATEGORY);
            rec.set(OeField::ClassNo, "0");
        }
        return 0;
    };

    let mut longs = Vec::with_capacity(records.len());
    for (rec, cell) in records.iter_mut().zip(table.column(col)) {
        let forms = category_forms(&cell.text_or(UNKNOWN_CATEGORY), rec.get(OeField::Sex));
        rec.set(OeField::Short, forms.short.clone());
        rec.set(OeField::Long, forms.long.clone());
        rec.set(OeField::EntryClassShort, forms.short);
        rec.set(OeField::EntryClassLong, forms.long.clone());
        longs.push(forms.long);
    }

    let ids = assign_ids(&longs);
    for (rec, long) in records.iter_mut().zip(&longs) {
        let id = ids[long].to_string();
        rec.set(OeField::ClassNo, id.clone());
        rec.set(OeField::EntryClassNo, id);
    }

    sink.info(format!("{} categories created", ids.len()));
    ids.len()
}

fn fill_clubs(
    table: &SourceTable,
    mapping: &ColumnMapping,
    records: &mut [OeRecord],
    sink: &dyn LogSink,
) -> usize {
    let clubs: Vec<String> = match mapping.get(ColumnRole::ClubName) {
        Some(col) => table.column(col).map(|cell| cell.text_or(DEFAULT_CLUB)).collect(),
        None => {
            sink.warning(format!("No club column found, every runner is '{}'", DEFAULT_CLUB));
            vec![DEFAULT_CLUB.to_string(); records.len()]
        }
    };

    let ids = assign_ids(&clubs);
    for (rec, club) in records.iter_mut().zip(&clubs) {
        rec.set(OeField::City, club.clone());
        rec.set(OeField::ClubNo, ids[club].to_string());
    }

    sink.info(format!("{} clubs numbered", ids.len()));
    ids.len()
}

fn fill_chips(table: &SourceTable, mapping: &ColumnMapping, records: &mut [OeRecord]) {
    if let Some(col) = mapping.get(ColumnRole::Chipno) {
        for (rec, cell) in records.iter_mut().zip(table.column(col)) {
            rec.set(OeField::Chipno, clean_chip(&cell.to_text()));
        }
    }
}

fn fill_start_numbers(records: &mut [OeRecord]) {
    for (i, rec) in records.iter_mut().enumerate() {
        rec.set(OeField::Stno, (i + 1).to_string());
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
