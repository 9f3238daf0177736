//! Text normalization for names and legacy-encoded output.
//!
//! - [`encoding`] - Windows-1254 (Turkish) transcoding: decode chain for input,
//!   lossy cleaning for output
//! - [`case`] - Turkish-aware title casing and plain capitalization

pub mod case;
pub mod encoding;

pub use case::{capitalize, fold_case, title_case};
pub use encoding::{
    decode_latin5, decode_utf8, decode_windows_1254, encode_legacy, is_legacy_encodable,
    normalize_encoding,
};
