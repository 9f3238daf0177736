//! Per-field normalizers applied by the pipeline.

/// Category used when a runner left the category blank, or the form has none.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Club used for unaffiliated runners ("individual").
pub const DEFAULT_CLUB: &str = "Ferdi";

/// Rent column value for "wants a rental chip".
pub const RENTED_MARK: &str = "X";

/// Categories longer than this get a short form.
const SHORT_CATEGORY_THRESHOLD: usize = 10;

/// Number of trailing characters kept in a short category.
const SHORT_CATEGORY_TAIL: usize = 11;

/// Split "Given Names Family" on the last whitespace run.
///
/// `"Ayşe Nur Demir"` → `("Ayşe Nur", "Demir")`; a single word has an empty
/// family name.
pub fn split_full_name(full: &str) -> (String, String) {
    let full = full.trim();
    match full.rfind(char::is_whitespace) {
        Some(idx) => {
            let given = full[..idx].trim_end();
            let family = full[idx..].trim_start();
            (given.to_string(), family.to_string())
        }
        None => (full.to_string(), String::new()),
    }
}

/// Long and short category identity strings for one runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForms {
    pub long: String,
    pub short: String,
}

/// Build `{category}{sex}` identities.
///
/// All whitespace is removed from the category. The short form keeps the
/// last 11 characters of categories longer than 10. The sex code is appended
/// without a separator, so `"AB" + "M"` and `"A" + "BM"` collide.
pub fn category_forms(raw: &str, sex: &str) -> CategoryForms {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let length = stripped.chars().count();

    let short: String = if length > SHORT_CATEGORY_THRESHOLD {
        stripped.chars().skip(length.saturating_sub(SHORT_CATEGORY_TAIL)).collect()
    } else {
        stripped.clone()
    };

    CategoryForms {
        long: format!("{}{}", stripped, sex),
        short: format!("{}{}", short, sex),
    }
}

/// Keep a chip number only if it is all decimal digits, after removing the
/// `.0` a spreadsheet adds to numeric cells.
pub fn clean_chip(raw: &str) -> String {
    let value = raw.trim();
    let value = value.strip_suffix(".0").unwrap_or(value);

    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        value.to_string()
    } else {
        String::new()
    }
}

/// `X` when the (already case-folded) answer contains an affirmative keyword.
pub fn rent_flag(folded_answer: &str, affirmatives: &[String]) -> &'static str {
    if affirmatives.iter().any(|kw| folded_answer.contains(kw.as_str())) {
        RENTED_MARK
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_last_whitespace() {
        assert_eq!(
            split_full_name("Ayşe Nur Demir"),
            ("Ayşe Nur".to_string(), "Demir".to_string())
        );
        assert_eq!(split_full_name("Ahmet"), ("Ahmet".to_string(), String::new()));
        assert_eq!(
            split_full_name("  Mehmet Can \t Öz  "),
            ("Mehmet Can".to_string(), "Öz".to_string())
        );
        assert_eq!(split_full_name(""), (String::new(), String::new()));
    }

    #[test]
    fn test_category_short_form_truncation() {
        // 13 characters: only the last 11 survive
        let forms = category_forms("ABCDEFGHIJKLM", "M");
        assert_eq!(forms.long, "ABCDEFGHIJKLMM");
        assert_eq!(forms.short, "CDEFGHIJKLMM");

        // 7 characters: unchanged
        let forms = category_forms("Genç AB", "F");
        assert_eq!(forms.long, "GençABF");
        assert_eq!(forms.short, "GençABF");

        // Exactly 11 characters is over the threshold but keeps everything
        assert_eq!(category_forms("Yıldız Erkek", "M").short, "YıldızErkekM");
    }

    #[test]
    fn test_category_counts_characters_not_bytes() {
        let forms = category_forms("Büyükler Öğrenci", "E");
        assert_eq!(forms.long, "BüyüklerÖğrenciE");
        assert_eq!(forms.short, "klerÖğrenciE");
    }

    #[test]
    fn test_category_concatenation_can_collide() {
        // Known limitation: no separator between category and sex
        assert_eq!(category_forms("AB", "M").long, category_forms("A", "BM").long);
    }

    #[test]
    fn test_clean_chip() {
        assert_eq!(clean_chip("1234567.0"), "1234567");
        assert_eq!(clean_chip("2012345"), "2012345");
        assert_eq!(clean_chip("ABC123"), "");
        assert_eq!(clean_chip("123.5"), "");
        assert_eq!(clean_chip(""), "");
        assert_eq!(clean_chip(".0"), "");
        assert_eq!(clean_chip(" 8001234 "), "8001234");
    }

    #[test]
    fn test_rent_flag() {
        let yes = vec!["evet".to_string(), "istiyor".to_string()];
        assert_eq!(rent_flag("evet", &yes), "X");
        assert_eq!(rent_flag("kiralamak istiyorum", &yes), "X");
        assert_eq!(rent_flag("hayır, kendi çipim var", &yes), "");
        assert_eq!(rent_flag("", &yes), "");
    }
}
