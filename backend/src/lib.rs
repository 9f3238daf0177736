//! # OEConvert - registration exports to OE2010 entry imports
//!
//! OEConvert reads the spreadsheet or CSV a Google Forms registration sheet
//! exports, works out which free-text column holds what, and writes the
//! fixed 57-column CSV that the OE2010 orienteering event software imports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / XLSX  │────▶│   Parser    │────▶│  Classify   │────▶│  Transform  │
//! │ (any enc.)  │     │ (auto-enc)  │     │  (rules)    │     │ (+ gender)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                                             ┌──────▼──────┐
//!                                                             │ OE2010 CSV  │
//!                                                             │(Win-1254)   │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use oeconvert::{convert, LogEntry};
//! use std::path::Path;
//!
//! let print = |entry: LogEntry| eprintln!("{}", entry);
//! let message = convert(Path::new("kayitlar.xlsx"), Path::new("OE2010_Import_Final.csv"), &print);
//! println!("{}", message);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Source table, column roles, OE2010 schema
//! - [`text`] - Turkish casing and Windows-1254 transcoding
//! - [`parser`] - Input loading with encoding/delimiter detection
//! - [`classify`] - Header → column role rules
//! - [`gender`] - Sex estimation from first names
//! - [`transform`] - Field normalizers and the conversion pipeline
//! - [`output`] - OE2010 CSV writer
//! - [`logs`] - Progress log sinks
//! - [`config`] - Environment and CLI settings

// Core modules
pub mod error;
pub mod models;
pub mod text;

// Loading
pub mod parser;

// Column detection
pub mod classify;

// Transformation
pub mod gender;
pub mod transform;

// Output
pub mod output;

// Ambient
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConvertError, ConvertResult, GenderError, GenderResult, LoadError, LoadResult, RulesError,
    RulesResult, WriteError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CellValue, ColumnRole, OeField, OeRecord, SourceTable, OE_HEADERS};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, load_table, load_table_with, InputFormat, LoadedTable, ReadFn,
};

// =============================================================================
// Re-exports - Classification
// =============================================================================

pub use classify::{Classifier, ColumnMapping, Matcher, RuleTable};

// =============================================================================
// Re-exports - Gender
// =============================================================================

pub use gender::{DictionarySource, GenderCategory, GenderEstimator, NameDictionary, Sex};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    convert, ConversionReport, ConvertMessage, Converter, DetectedColumn, TransformOutput,
};

// =============================================================================
// Re-exports - Output, logs, config
// =============================================================================

pub use config::{default_output_path, Settings};
pub use logs::{LogBroadcaster, LogEntry, LogLevel, LogSink, MemorySink, NullSink};
pub use output::{write_oe_csv, write_oe_records};
