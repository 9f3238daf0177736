//! Transformation module.
//!
//! This module turns a loaded [`SourceTable`](crate::models::SourceTable)
//! into OE2010 records:
//! - Fields: per-field normalizers (names, categories, chips, rent flag)
//! - Reference: stable numeric ids for distinct values
//! - Pipeline: the ordered stages and the high-level `convert` entry point

pub mod fields;
pub mod pipeline;
pub mod reference;

pub use fields::{
    category_forms, clean_chip, rent_flag, split_full_name, CategoryForms, DEFAULT_CLUB,
    RENTED_MARK, UNKNOWN_CATEGORY,
};
pub use pipeline::*;
pub use reference::{assign_ids, ReferenceIds};
