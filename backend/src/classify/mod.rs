//! Column classification: free-text header → [`ColumnRole`].
//!
//! Registration forms are written by hand, so headers look like
//! "Adınız Soyadınız", "Hangi kategoride koşacaksınız?" or "SI kart no".
//! The [`Classifier`] runs the ordered rules of a [`RuleTable`] over the
//! lowercased header and falls back to the name/surname logic:
//!
//! ```text
//! rent → chip pattern → club → sex → category → phone → email → names
//! ```
//!
//! For names, surname keywords are removed from a working copy before the
//! first-name keywords are checked, so "soyad" does not also count as "ad".

pub mod rules;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::{RulesError, RulesResult};
use crate::models::ColumnRole;
use crate::text::fold_case;

pub use rules::{Matcher, NameRule, RoleRule, RuleTable};

static BUILTIN: Lazy<Classifier> = Lazy::new(|| {
    let table = RuleTable::builtin();
    let rules = table.rules.iter().filter_map(|rule| compile_rule(rule).ok()).collect();
    Classifier::from_compiled(rules, &table)
});

fn compile_rule(rule: &RoleRule) -> RulesResult<(CompiledMatcher, ColumnRole)> {
    let matcher = match &rule.matcher {
        Matcher::Keywords { keywords } => CompiledMatcher::Keywords(lowercase_all(keywords)),
        Matcher::Pattern { pattern } => {
            let re = Regex::new(pattern).map_err(|e| RulesError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            CompiledMatcher::Pattern(re)
        }
    };
    Ok((matcher, rule.role))
}

enum CompiledMatcher {
    Keywords(Vec<String>),
    Pattern(Regex),
}

impl CompiledMatcher {
    fn matches(&self, header: &str) -> bool {
        match self {
            CompiledMatcher::Keywords(keywords) => contains_any(header, keywords),
            CompiledMatcher::Pattern(re) => re.is_match(header),
        }
    }
}

/// A rule table compiled for matching.
pub struct Classifier {
    rules: Vec<(CompiledMatcher, ColumnRole)>,
    name_keywords: Vec<String>,
    surname_keywords: Vec<String>,
    rent_affirmatives: Vec<String>,
}

impl Classifier {
    /// Compile a rule table. Keywords are lowercased; patterns must compile.
    pub fn new(table: &RuleTable) -> RulesResult<Self> {
        let rules = table.rules.iter().map(compile_rule).collect::<RulesResult<Vec<_>>>()?;
        Ok(Self::from_compiled(rules, table))
    }

    fn from_compiled(rules: Vec<(CompiledMatcher, ColumnRole)>, table: &RuleTable) -> Self {
        Self {
            rules,
            name_keywords: lowercase_all(&table.name.name_keywords),
            surname_keywords: lowercase_all(&table.name.surname_keywords),
            rent_affirmatives: lowercase_all(&table.rent_affirmatives),
        }
    }

    /// The classifier for the built-in rule table.
    ///
    /// A built-in rule that fails to compile is left out rather than panicking.
    pub fn builtin() -> &'static Classifier {
        &BUILTIN
    }

    /// Classify one header. `None` means the column is ignored.
    pub fn classify(&self, header: &str) -> Option<ColumnRole> {
        let header = normalize_header(header);

        if let Some((_, role)) = self.rules.iter().find(|(m, _)| m.matches(&header)) {
            return Some(*role);
        }

        let has_surname = contains_any(&header, &self.surname_keywords);

        let mut without_surname = header.clone();
        for kw in &self.surname_keywords {
            without_surname = without_surname.replace(kw.as_str(), "");
        }
        let has_name = contains_any(&without_surname, &self.name_keywords);

        match (has_name, has_surname) {
            (true, true) => Some(ColumnRole::FullNameSource),
            (true, false) => Some(ColumnRole::FirstName),
            (false, true) => Some(ColumnRole::Surname),
            (false, false) => None,
        }
    }

    /// Assign roles to columns in header order. A role already claimed by an
    /// earlier column is not reassigned.
    pub fn map_columns(&self, headers: &[String]) -> ColumnMapping {
        let mut mapping = ColumnMapping::default();
        for (index, header) in headers.iter().enumerate() {
            if let Some(role) = self.classify(header) {
                mapping.claim(role, index);
            }
        }
        mapping
    }

    /// Lowercased keywords that mark a rent answer as "yes".
    pub fn rent_affirmatives(&self) -> &[String] {
        &self.rent_affirmatives
    }
}

fn normalize_header(header: &str) -> String {
    fold_case(header.trim())
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| fold_case(s)).collect()
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw.as_str()))
}

/// Role → source column index, with each role claimed at most once.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    by_role: HashMap<ColumnRole, usize>,
    claimed: Vec<(ColumnRole, usize)>,
}

impl ColumnMapping {
    /// Claim `role` for `column` unless another column already holds it.
    /// Returns whether the claim succeeded.
    pub fn claim(&mut self, role: ColumnRole, column: usize) -> bool {
        if self.by_role.contains_key(&role) {
            return false;
        }
        self.by_role.insert(role, column);
        self.claimed.push((role, column));
        true
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.by_role.get(&role).copied()
    }

    pub fn contains(&self, role: ColumnRole) -> bool {
        self.by_role.contains_key(&role)
    }

    /// Claims in header order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, usize)> + '_ {
        self.claimed.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(header: &str) -> Option<ColumnRole> {
        Classifier::builtin().classify(header)
    }

    #[test]
    fn test_name_headers() {
        assert_eq!(classify("Adınız Soyadınız"), Some(ColumnRole::FullNameSource));
        assert_eq!(classify("Ad Soyad"), Some(ColumnRole::FullNameSource));
        assert_eq!(classify("İsim Soyisim"), Some(ColumnRole::FullNameSource));
        assert_eq!(classify("Adınız"), Some(ColumnRole::FirstName));
        assert_eq!(classify("İsim"), Some(ColumnRole::FirstName));
        assert_eq!(classify("Soyadınız"), Some(ColumnRole::Surname));
        assert_eq!(classify("SOYİSMİ"), Some(ColumnRole::Surname));
    }

    #[test]
    fn test_each_rule_in_isolation() {
        assert_eq!(classify("Çip kiralamak istiyor musunuz?"), Some(ColumnRole::Rented));
        assert_eq!(classify("SI Kart No"), Some(ColumnRole::Chipno));
        assert_eq!(classify("Chip"), Some(ColumnRole::Chipno));
        assert_eq!(classify("Kulüp / Okul"), Some(ColumnRole::ClubName));
        assert_eq!(classify("Cinsiyet (K/E)"), Some(ColumnRole::Sex));
        assert_eq!(classify("Hangi kategoride koşacaksınız?"), Some(ColumnRole::CategorySource));
        assert_eq!(classify("Cep Telefonu"), Some(ColumnRole::Mobile));
        assert_eq!(classify("E-posta adresi"), Some(ColumnRole::EMail));
    }

    #[test]
    fn test_rule_priority() {
        // "kira" wins over the chip pattern
        assert_eq!(classify("SI kiralama"), Some(ColumnRole::Rented));
        // club keyword beats the name fallback
        assert_eq!(classify("Takım adı"), Some(ColumnRole::ClubName));
    }

    #[test]
    fn test_chip_pattern_needs_word_boundary() {
        assert_eq!(classify("Sistem"), None);
        assert_eq!(classify("si-card"), Some(ColumnRole::Chipno));
    }

    #[test]
    fn test_unmatched_headers() {
        assert_eq!(classify("Zaman damgası"), None);
        assert_eq!(classify("Doğum Yılı"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_first_column_wins_role() {
        let headers: Vec<String> = ["Zaman damgası", "Kulüp", "Okul", "Adınız Soyadınız"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = Classifier::builtin().map_columns(&headers);

        assert_eq!(mapping.get(ColumnRole::ClubName), Some(1));
        assert_eq!(mapping.get(ColumnRole::FullNameSource), Some(3));
        assert_eq!(mapping.len(), 2);
        assert!(mapping.iter().all(|(_, col)| col != 2));
    }

    #[test]
    fn test_custom_rules() {
        let mut table = RuleTable::builtin();
        table.rules.insert(
            0,
            RoleRule {
                role: ColumnRole::ClubName,
                matcher: Matcher::Keywords { keywords: vec!["DERNEK".into()] },
            },
        );
        let classifier = Classifier::new(&table).unwrap();
        assert_eq!(classifier.classify("Dernek"), Some(ColumnRole::ClubName));
    }

    #[test]
    fn test_builtin_table_compiles_completely() {
        let table = RuleTable::builtin();
        let strict = Classifier::new(&table).unwrap();
        assert_eq!(strict.rules.len(), table.rules.len());
        assert_eq!(Classifier::builtin().rules.len(), table.rules.len());
        assert_eq!(Classifier::builtin().rent_affirmatives(), strict.rent_affirmatives());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut table = RuleTable::builtin();
        table.rules.push(RoleRule {
            role: ColumnRole::Chipno,
            matcher: Matcher::Pattern { pattern: "(unclosed".into() },
        });
        assert!(matches!(Classifier::new(&table), Err(RulesError::Pattern { .. })));
    }
}
