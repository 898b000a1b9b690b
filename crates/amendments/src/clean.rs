use unicode_normalization::UnicodeNormalization;

/// Normalize decoded fragment text before it enters the pipeline.
///
/// Applies Unicode NFC normalization, expands the common Latin ligatures,
/// strips the Unicode replacement character, and trims surrounding
/// whitespace.  Returns an empty string for whitespace-only input, which
/// the extractor drops.
pub fn normalize(text: &str) -> String {
    let mut result: String = text.nfc().collect();

    let ligatures = [
        ("\u{FB00}", "ff"),
        ("\u{FB01}", "fi"),
        ("\u{FB02}", "fl"),
        ("\u{FB03}", "ffi"),
        ("\u{FB04}", "ffl"),
    ];
    for (lig, replacement) in &ligatures {
        if result.contains(lig) {
            result = result.replace(lig, replacement);
        }
    }

    if result.contains('\u{FFFD}') {
        result = result.replace('\u{FFFD}', "");
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough() {
        assert_eq!(normalize("Article 4"), "Article 4");
    }

    #[test]
    fn ligature_expansion() {
        assert_eq!(normalize("\u{FB01}nancial"), "financial");
        assert_eq!(normalize("e\u{FB00}ective"), "effective");
    }

    #[test]
    fn nfc_normalization() {
        // e + combining acute composes to a single code point.
        assert_eq!(normalize("caf\u{0065}\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn replacement_char_removed() {
        assert_eq!(normalize("Or.\u{FFFD} en"), "Or. en");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(normalize("   \t "), "");
    }
}
