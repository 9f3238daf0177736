//! Classifier rule table definition
//!
//! The rule table decides which source header plays which [`ColumnRole`].
//! It is plain data so it can be shipped as JSON and tweaked per event
//! without recompiling.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RulesResult;
use crate::models::ColumnRole;

/// Ordered classification rules plus the name/surname logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Version of the rule table format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Evaluated in order; the first matching rule decides the role
    pub rules: Vec<RoleRule>,

    /// Keywords for the name columns, checked after every rule failed
    pub name: NameRule,

    /// Answers in a rent column that mean "yes, rent me a chip"
    #[serde(default = "default_rent_affirmatives")]
    pub rent_affirmatives: Vec<String>,
}

/// One entry of the ordered rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: ColumnRole,
    #[serde(rename = "match")]
    pub matcher: Matcher,
}

/// How a rule tests a lowercased header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Matcher {
    /// Header contains any of the keywords (substring, case-insensitive)
    Keywords { keywords: Vec<String> },

    /// Header matches the regular expression
    Pattern { pattern: String },
}

/// Keyword families for first name / surname detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRule {
    pub name_keywords: Vec<String>,
    pub surname_keywords: Vec<String>,
}

/// Header pattern of the built-in chip number rule.
pub const CHIP_PATTERN: &str = r"\b(si|chip|çip|ident|si-card)\b";

/// Built-in keyword rules, in evaluation order. The chip pattern runs
/// right after the first entry.
const BUILTIN_KEYWORDS: [(ColumnRole, &[&str]); 6] = [
    (ColumnRole::Rented, &["kira", "rent", "ödünç"]),
    (ColumnRole::ClubName, &["kulüp", "takım", "club", "okul", "grup", "kurum", "takim"]),
    (ColumnRole::Sex, &["cinsiyet", "sex", "gender", "k/e", "erkek", "kadın", "kadin"]),
    (ColumnRole::CategorySource, &["kategori", "class", "tür", "hangi", "tip"]),
    (ColumnRole::Mobile, &["tel", "gsm", "mobil"]),
    (ColumnRole::EMail, &["mail", "posta"]),
];

const NAME_KEYWORDS: [&str; 3] = ["ad", "isim", "isminiz"];
const SURNAME_KEYWORDS: [&str; 4] = ["soyad", "soyisim", "soyisimi", "soyismi"];
const RENT_AFFIRMATIVES: [&str; 2] = ["evet", "istiyor"];

fn default_version() -> String {
    "1.0".to_string()
}

fn default_rent_affirmatives() -> Vec<String> {
    strings(&RENT_AFFIRMATIVES)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn keywords((role, items): (ColumnRole, &[&str])) -> RoleRule {
    RoleRule { role, matcher: Matcher::Keywords { keywords: strings(items) } }
}

impl RuleTable {
    /// The built-in rules, tuned for Turkish Google Forms registration sheets.
    pub fn builtin() -> Self {
        Self {
            version: default_version(),
            description: "Turkish orienteering registration forms".to_string(),
            rules: {
                let mut rules: Vec<RoleRule> = BUILTIN_KEYWORDS.into_iter().map(keywords).collect();
                rules.insert(
                    1,
                    RoleRule {
                        role: ColumnRole::Chipno,
                        matcher: Matcher::Pattern { pattern: CHIP_PATTERN.to_string() },
                    },
                );
                rules
            },
            name: NameRule {
                name_keywords: strings(&NAME_KEYWORDS),
                surname_keywords: strings(&SURNAME_KEYWORDS),
            },
            rent_affirmatives: default_rent_affirmatives(),
        }
    }

    /// Parse a rule table from JSON string
    pub fn from_json(json: &str) -> RulesResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a rule table from a JSON file
    pub fn from_file(path: &Path) -> RulesResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> RulesResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
