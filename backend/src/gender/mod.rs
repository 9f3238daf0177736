//! Sex estimation from a given name.
//!
//! Used only when a registration form has no sex column. The first word of
//! the name is looked up in a [`NameDictionary`]; `female` and
//! `mostly_female` give [`Sex::F`], every other answer (including unknown
//! names) gives [`Sex::M`]. Category strings downstream need a binary suffix,
//! so there is no neutral result.
//!
//! The dictionary is loaded once per [`GenderEstimator`]. Loading can be
//! started early from a background thread with [`GenderEstimator::ensure_ready`];
//! any caller arriving while the load is in progress blocks until it finishes.
//! A failed load is remembered and returned to every later caller.
//!
//! ```rust,ignore
//! let estimator = GenderEstimator::global().clone();
//! std::thread::spawn({
//!     let estimator = estimator.clone();
//!     move || estimator.ensure_ready().map(|_| ())
//! });
//! assert_eq!(estimator.estimate_sex("Ayşe Nur")?, Sex::F);
//! ```

use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{GenderError, GenderResult};
use crate::text::{capitalize, title_case};

/// Dictionary compiled into the binary.
const BUILTIN_NAMES: &str = include_str!("../../data/names.tsv");

static GLOBAL: Lazy<GenderEstimator> = Lazy::new(|| GenderEstimator::new(DictionarySource::Builtin));

// =============================================================================
// Dictionary
// =============================================================================

/// Answer of a dictionary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderCategory {
    Male,
    Female,
    MostlyMale,
    MostlyFemale,
    /// Used for both sexes
    Andy,
    Unknown,
}

impl FromStr for GenderCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(GenderCategory::Male),
            "female" => Ok(GenderCategory::Female),
            "mostly_male" => Ok(GenderCategory::MostlyMale),
            "mostly_female" => Ok(GenderCategory::MostlyFemale),
            "andy" => Ok(GenderCategory::Andy),
            "unknown" => Ok(GenderCategory::Unknown),
            _ => Err(()),
        }
    }
}

/// Given name → category table.
#[derive(Debug, Clone, Default)]
pub struct NameDictionary {
    names: HashMap<String, GenderCategory>,
}

impl NameDictionary {
    /// Parse `Name<TAB>category` lines. `#` comments and blank lines are skipped.
    pub fn parse(content: &str) -> GenderResult<Self> {
        let mut names = HashMap::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, category) = line
                .split_once('\t')
                .map(|(n, c)| (n.trim(), c.trim()))
                .filter(|(n, c)| !n.is_empty() && !c.is_empty())
                .ok_or_else(|| GenderError::MalformedLine {
                    line: idx + 1,
                    content: raw.to_string(),
                })?;

            let category = category.parse().map_err(|_| GenderError::UnknownCategory {
                line: idx + 1,
                category: category.to_string(),
            })?;

            names.insert(capitalize(name), category);
        }

        Ok(Self { names })
    }

    pub fn builtin() -> GenderResult<Self> {
        Self::parse(BUILTIN_NAMES)
    }

    pub fn from_file(path: &Path) -> GenderResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GenderError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Look up one given name. Tries plain capitalization, then Turkish
    /// title case (so `ismail` finds `İsmail`).
    pub fn get_gender(&self, name: &str) -> GenderCategory {
        let plain = capitalize(name);
        if let Some(category) = self.names.get(&plain) {
            return *category;
        }
        let turkish = title_case(name);
        self.names
            .get(&turkish)
            .copied()
            .unwrap_or(GenderCategory::Unknown)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// =============================================================================
// Estimator
// =============================================================================

/// Sex code written to the OE2010 `S` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
        }
    }

    fn from_category(category: GenderCategory) -> Self {
        match category {
            GenderCategory::Female | GenderCategory::MostlyFemale => Sex::F,
            _ => Sex::M,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the dictionary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    Builtin,
    File(PathBuf),
}

impl DictionarySource {
    fn load(&self) -> GenderResult<NameDictionary> {
        match self {
            DictionarySource::Builtin => NameDictionary::builtin(),
            DictionarySource::File(path) => NameDictionary::from_file(path),
        }
    }
}

struct Inner {
    source: DictionarySource,
    dictionary: OnceCell<GenderResult<NameDictionary>>,
}

/// Shared handle to a lazily loaded name dictionary.
///
/// Clones share the same dictionary and the same one-time load.
#[derive(Clone)]
pub struct GenderEstimator {
    inner: Arc<Inner>,
}

impl GenderEstimator {
    pub fn new(source: DictionarySource) -> Self {
        Self {
            inner: Arc::new(Inner { source, dictionary: OnceCell::new() }),
        }
    }

    /// Process-wide estimator backed by the built-in dictionary.
    pub fn global() -> &'static GenderEstimator {
        &GLOBAL
    }

    pub fn source(&self) -> &DictionarySource {
        &self.inner.source
    }

    /// Whether the dictionary has loaded successfully.
    pub fn is_ready(&self) -> bool {
        matches!(self.inner.dictionary.get(), Some(Ok(_)))
    }

    /// Load the dictionary if nobody has yet, or wait for the load in progress.
    ///
    /// Idempotent. Once a load has failed, every call returns that failure.
    pub fn ensure_ready(&self) -> GenderResult<&NameDictionary> {
        self.inner
            .dictionary
            .get_or_init(|| self.inner.source.load())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Estimate the sex for a full or first name.
    ///
    /// Blank input is `M` without touching the dictionary.
    pub fn estimate_sex(&self, name: &str) -> GenderResult<Sex> {
        let Some(first) = name.split_whitespace().next() else {
            return Ok(Sex::M);
        };
        let dictionary = self.ensure_ready()?;
        Ok(Sex::from_category(dictionary.get_gender(first)))
    }
}

impl fmt::Debug for GenderEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenderEstimator")
            .field("source", &self.inner.source)
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::thread;

    #[test]
    fn test_builtin_dictionary_loads() {
        let dict = NameDictionary::builtin().unwrap();
        assert!(dict.len() > 1500);
        assert_eq!(dict.get_gender("Ayşe"), GenderCategory::Female);
        assert_eq!(dict.get_gender("MEHMET"), GenderCategory::Male);
        assert_eq!(dict.get_gender("ismail"), GenderCategory::Male);
        assert_eq!(dict.get_gender("Deniz"), GenderCategory::Andy);
        assert_eq!(dict.get_gender("Xyzzy"), GenderCategory::Unknown);
    }

    #[test]
    fn test_common_international_names() {
        let est = GenderEstimator::new(DictionarySource::Builtin);
        for name in [
            "Mary", "Emily", "Eva", "Anne", "Helen", "Jessica", "Susan", "Karen", "Linda", "Beyza",
            "Hira", "Sophie", "maria",
        ] {
            assert_eq!(est.estimate_sex(name).unwrap(), Sex::F, "{} should be female", name);
        }
        for name in ["John", "Michael", "David", "Peter", "Thomas", "EMRE", "Burak"] {
            assert_eq!(est.estimate_sex(name).unwrap(), Sex::M, "{} should be male", name);
        }
    }

    #[test]
    fn test_estimate_maps_categories_to_binary() {
        let est = GenderEstimator::new(DictionarySource::Builtin);
        assert_eq!(est.estimate_sex("Ayşe Nur").unwrap(), Sex::F);
        assert_eq!(est.estimate_sex("Nur").unwrap(), Sex::F); // mostly_female
        assert_eq!(est.estimate_sex("Mehmet Can").unwrap(), Sex::M);
        assert_eq!(est.estimate_sex("Umut").unwrap(), Sex::M); // mostly_male
        assert_eq!(est.estimate_sex("Deniz").unwrap(), Sex::M); // andy
        assert_eq!(est.estimate_sex("Qwerty").unwrap(), Sex::M); // unknown
    }

    #[test]
    fn test_blank_name_skips_lookup() {
        let est = GenderEstimator::new(DictionarySource::File("/nonexistent/names.tsv".into()));
        assert_eq!(est.estimate_sex("").unwrap(), Sex::M);
        assert_eq!(est.estimate_sex("   ").unwrap(), Sex::M);
        assert!(!est.is_ready());
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(matches!(
            NameDictionary::parse("Ayşe female"),
            Err(GenderError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            NameDictionary::parse("# c\nAyşe\tfemme"),
            Err(GenderError::UnknownCategory { line: 2, .. })
        ));
        let dict = NameDictionary::parse("# comment\n\nAyşe\tfemale\n").unwrap();
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_concurrent_init_loads_once() {
        let est = GenderEstimator::new(DictionarySource::Builtin);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let est = est.clone();
                thread::spawn(move || est.ensure_ready().map(|d| d as *const NameDictionary as usize))
            })
            .collect();

        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
        assert!(est.is_ready());
    }

    #[test]
    fn test_init_failure_is_sticky() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.tsv");
        let est = GenderEstimator::new(DictionarySource::File(path.clone()));

        assert!(matches!(est.ensure_ready(), Err(GenderError::Unreadable { .. })));
        assert!(est.estimate_sex("Ayşe").is_err());

        // The file showing up later does not revive the estimator
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Ayşe\tfemale").unwrap();
        assert!(est.ensure_ready().is_err());
        assert!(!est.is_ready());
    }

    #[test]
    fn test_custom_dictionary_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Kim\tfemale").unwrap();
        let est = GenderEstimator::new(DictionarySource::File(file.path().to_path_buf()));
        assert_eq!(est.estimate_sex("kim yoon").unwrap(), Sex::F);
    }
}
