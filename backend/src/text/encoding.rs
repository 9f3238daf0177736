//! Windows-1254 transcoding.
//!
//! OE2010 imports Turkish text in the Windows-1254 code page. Output text is
//! cleaned by dropping every character the code page cannot represent; no
//! transliteration is attempted (`ā` disappears, it does not become `a`).
//!
//! The C1 control range U+0080..U+009F is treated as unencodable even though
//! WHATWG maps the code page's undefined bytes onto it.

use encoding_rs::WINDOWS_1254;
use once_cell::sync::Lazy;

/// Bytes with no assigned character in Windows-1254.
const UNDEFINED_1254: [u8; 7] = [0x81, 0x8D, 0x8E, 0x8F, 0x90, 0x9D, 0x9E];

/// ISO-8859-9 (Latin-5) decode table.
static LATIN5: Lazy<[char; 256]> = Lazy::new(|| {
    let mut table = ['\0'; 256];
    for (b, slot) in table.iter_mut().enumerate() {
        let byte = b as u8;
        *slot = if byte < 0xA0 {
            char::from(byte)
        } else {
            WINDOWS_1254
                .decode_without_bom_handling(&[byte])
                .0
                .chars()
                .next()
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        };
    }
    table
});

/// Whether `c` survives a round trip through Windows-1254.
pub fn is_legacy_encodable(c: char) -> bool {
    if c.is_ascii() {
        return true;
    }
    if ('\u{80}'..='\u{9F}').contains(&c) {
        return false;
    }
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = WINDOWS_1254.encode(c.encode_utf8(&mut buf));
    !had_errors
}

/// Drop every character Windows-1254 cannot represent.
pub fn normalize_encoding(text: &str) -> String {
    text.chars().filter(|c| is_legacy_encodable(*c)).collect()
}

/// Encode to Windows-1254 bytes, dropping unencodable characters.
pub fn encode_legacy(text: &str) -> Vec<u8> {
    let cleaned = normalize_encoding(text);
    WINDOWS_1254.encode(&cleaned).0.into_owned()
}

/// Strict UTF-8, with a leading byte-order mark removed.
pub fn decode_utf8(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

/// Strict Windows-1254: fails if any byte is undefined in the code page.
pub fn decode_windows_1254(bytes: &[u8]) -> Option<String> {
    if bytes.iter().any(|b| UNDEFINED_1254.contains(b)) {
        return None;
    }
    Some(WINDOWS_1254.decode_without_bom_handling(bytes).0.into_owned())
}

/// ISO-8859-9. Every byte decodes, so this is the last resort.
pub fn decode_latin5(bytes: &[u8]) -> String {
    bytes.iter().map(|b| LATIN5[*b as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turkish_letters_round_trip() {
        let text = "ÇçĞğİıÖöŞşÜü";
        assert_eq!(normalize_encoding(text), text);
        let bytes = encode_legacy(text);
        assert_eq!(bytes.len(), text.chars().count());
        assert_eq!(decode_windows_1254(&bytes).as_deref(), Some(text));
    }

    #[test]
    fn test_unencodable_dropped_not_substituted() {
        assert_eq!(normalize_encoding("Mēhmet"), "Mhmet");
        assert_eq!(normalize_encoding("Ali 😀 Veli"), "Ali  Veli");
        // Combining dot above: not in the code page
        assert_eq!(normalize_encoding("i\u{307}mran"), "imran");
        assert_eq!(normalize_encoding("\u{81}x"), "x");
        assert_eq!(normalize_encoding(""), "");
    }

    #[test]
    fn test_latin1_letters_replaced_by_turkish_slots() {
        // 0xDD is İ in Windows-1254, so Ý has no slot
        assert!(!is_legacy_encodable('Ý'));
        assert!(is_legacy_encodable('İ'));
        assert!(is_legacy_encodable('€'));
        assert!(is_legacy_encodable('é'));
    }

    #[test]
    fn test_utf8_strips_bom() {
        let bytes = b"\xEF\xBB\xBFAd";
        assert_eq!(decode_utf8(bytes).as_deref(), Some("Ad"));
        assert_eq!(decode_utf8(&[0xFD]), None);
    }

    #[test]
    fn test_windows_1254_rejects_undefined_bytes() {
        assert_eq!(decode_windows_1254(&[0xFD, 0xFE]).as_deref(), Some("ış"));
        assert_eq!(decode_windows_1254(&[0x41, 0x81]), None);
    }

    #[test]
    fn test_latin5_never_fails() {
        assert_eq!(decode_latin5(&[0x41, 0x81, 0xDD]), "A\u{81}İ");
        assert_eq!(decode_latin5(&[0x80]), "\u{80}");
    }
}
