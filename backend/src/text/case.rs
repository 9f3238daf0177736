//! Name casing.

use super::encoding::normalize_encoding;

/// Turkish title case: `"ali İMRAN"` becomes `"Ali İmran"`.
///
/// The text is first cleaned to the legacy code page. Each whitespace-separated
/// word gets an uppercase first letter (`i` → `İ`, `ı` → `I`) and a lowercase
/// remainder (`I` → `ı`, `İ` → `i`). A first letter with no single-letter
/// uppercase form (`ß`) is kept as is. Words are re-joined with single spaces.
pub fn title_case(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    normalize_encoding(text)
        .split_whitespace()
        .map(title_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_word(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut out = String::with_capacity(word.len());
    match first {
        'i' => out.push('İ'),
        'ı' => out.push('I'),
        c => {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => out.push(u),
                _ => out.push(c),
            }
        }
    }

    let rest: String = chars
        .map(|c| match c {
            'I' => 'ı',
            'İ' => 'i',
            c => c,
        })
        .collect();
    out.push_str(&rest.to_lowercase());
    out
}

/// Lowercase for keyword matching. `İ` folds to a plain `i` instead of
/// `i` + U+0307.
pub fn fold_case(text: &str) -> String {
    text.replace('İ', "i").to_lowercase()
}

/// First character uppercased, the rest lowercased, without Turkish rules.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_basic() {
        assert_eq!(title_case("mehmet can"), "Mehmet Can");
        assert_eq!(title_case("AYŞE NUR"), "Ayşe Nur");
        assert_eq!(title_case("  çağrı   öz "), "Çağrı Öz");
    }

    #[test]
    fn test_title_case_dotted_and_dotless_i() {
        assert_eq!(title_case("ismail"), "İsmail");
        assert_eq!(title_case("ılgaz"), "Ilgaz");
        assert_eq!(title_case("IŞIK"), "Işık");
        assert_eq!(title_case("KIRIMLI İNCİ"), "Kırımlı İnci");
        // Decomposed dotted capital: the combining dot is dropped by cleaning
        assert_eq!(title_case("ali i\u{307}mran"), "Ali İmran");
    }

    #[test]
    fn test_title_case_idempotent() {
        for s in [
            "ali imran",
            "IŞIK",
            "ılgaz İNCE",
            "Ayşe Nur Demir",
            "o'neil mcdonald",
            "çağla ÜNAL",
            "ßeyda",
            "x",
        ] {
            let once = title_case(s);
            assert_eq!(title_case(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_title_case_keeps_letters_without_single_uppercase() {
        assert_eq!(title_case("ßeyda"), "ßeyda");
        assert_eq!(title_case("ßEYDA öz"), "ßeyda Öz");
    }

    #[test]
    fn test_title_case_empty() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("   "), "");
        assert_eq!(title_case("😀"), "");
    }

    #[test]
    fn test_fold_case() {
        assert_eq!(fold_case("İSTİYORUM"), "istiyorum");
        assert_eq!(fold_case("EVET"), "evet");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("ayşe"), "Ayşe");
        assert_eq!(capitalize("MEHMET"), "Mehmet");
        assert_eq!(capitalize(""), "");
    }
}
