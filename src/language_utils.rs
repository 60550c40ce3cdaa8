use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

// Language utilities: normalise configured ISO 639 codes to the 2-letter form
// the word splitter keys on, and guess the language of a text from its script.

/// Default language when detection finds nothing distinctive
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages written without spaces between words
pub const NON_SPACED_LANGUAGES: &[&str] = &["ja", "zh", "th", "lo", "km", "my"];

static THAI: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{0E00}-\u{0E7F}]").expect("Invalid Thai regex"));
static LAO: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{0E80}-\u{0EFF}]").expect("Invalid Lao regex"));
static KHMER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{1780}-\u{17FF}]").expect("Invalid Khmer regex"));
static CJK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{3040}-\u{309F}\u{30A0}-\u{30FF}\u{4E00}-\u{9FAF}\u{AC00}-\u{D7AF}]").expect("Invalid CJK regex")
});
static KANA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{3040}-\u{30FF}]").expect("Invalid kana regex"));
static HANGUL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{AC00}-\u{D7AF}]").expect("Invalid Hangul regex"));
static ARABIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{0600}-\u{06FF}]").expect("Invalid Arabic regex"));
static CYRILLIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{0400}-\u{04FF}]").expect("Invalid Cyrillic regex"));

// Letters only Vietnamese uses among Latin-script languages
static VIETNAMESE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[ạảấầẩẫậắằẳẵặẹẻẽếềểễệỉịọỏốồổỗộớờởỡợụủứừửữựỳỵỷỹăđơư]",
    )
    .expect("Invalid Vietnamese regex")
});

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-3 if no ISO 639-1 code exists
pub fn normalize_language_code(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    let language = match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(&normalized_code),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    Ok(language
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| language.to_639_3().to_string()))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_language_code(code)?;
    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        _ => Language::from_639_3(&normalized),
    }
    .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(language.to_name().to_string())
}

/// Whether the language separates words with spaces
pub fn is_non_spaced(language: &str) -> bool {
    NON_SPACED_LANGUAGES.contains(&language)
}

/// Detect the language of a text from the scripts it uses
///
/// Southeast Asian scripts are checked first, then Vietnamese diacritics
/// (before CJK so mixed subtitles lean Vietnamese), then CJK with kana
/// distinguishing Japanese, then Arabic and Cyrillic.
pub fn detect_language(text: &str) -> &'static str {
    if text.trim().is_empty() {
        return DEFAULT_LANGUAGE;
    }

    if THAI.is_match(text) {
        "th"
    } else if LAO.is_match(text) {
        "lo"
    } else if KHMER.is_match(text) {
        "km"
    } else if VIETNAMESE.is_match(text) {
        "vi"
    } else if CJK.is_match(text) {
        if KANA.is_match(text) {
            "ja"
        } else if HANGUL.is_match(text) {
            "ko"
        } else {
            "zh"
        }
    } else if ARABIC.is_match(text) {
        "ar"
    } else if CYRILLIC.is_match(text) {
        "ru"
    } else {
        DEFAULT_LANGUAGE
    }
}
