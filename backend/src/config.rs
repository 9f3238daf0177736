//! Runtime settings.
//!
//! Resolved as: CLI flag, then environment (a `.env` file is honoured),
//! then built-in defaults.
//!
//! | Variable              | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `OECONVERT_RULES`     | JSON rule table for the column classifier |
//! | `OECONVERT_NAME_DICT` | name dictionary for the sex estimator     |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::classify::{Classifier, RuleTable};
use crate::error::RulesResult;
use crate::gender::{DictionarySource, GenderEstimator};

pub const RULES_ENV: &str = "OECONVERT_RULES";
pub const NAME_DICT_ENV: &str = "OECONVERT_NAME_DICT";

/// Default output file name, placed next to the input.
pub const DEFAULT_OUTPUT_NAME: &str = "OE2010_Import_Final.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Custom classifier rule table; built-in rules when `None`
    pub rules_path: Option<PathBuf>,
    /// Custom name dictionary; built-in dictionary when `None`
    pub name_dict_path: Option<PathBuf>,
}

impl Settings {
    /// Read settings from the environment, loading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self {
            rules_path: env_path(RULES_ENV),
            name_dict_path: env_path(NAME_DICT_ENV),
        }
    }

    /// Command line values take precedence over whatever is already set.
    pub fn with_overrides(mut self, rules: Option<PathBuf>, names: Option<PathBuf>) -> Self {
        if rules.is_some() {
            self.rules_path = rules;
        }
        if names.is_some() {
            self.name_dict_path = names;
        }
        self
    }

    /// Compile the configured rule table.
    pub fn classifier(&self) -> RulesResult<Classifier> {
        let table = match &self.rules_path {
            Some(path) => RuleTable::from_file(path)?,
            None => RuleTable::builtin(),
        };
        Classifier::new(&table)
    }

    /// Estimator for the configured dictionary. Nothing is loaded yet.
    pub fn gender_estimator(&self) -> GenderEstimator {
        match &self.name_dict_path {
            Some(path) => GenderEstimator::new(DictionarySource::File(path.clone())),
            None => GenderEstimator::global().clone(),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// `OE2010_Import_Final.csv` in the input's directory.
pub fn default_output_path(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_OUTPUT_NAME)
}
