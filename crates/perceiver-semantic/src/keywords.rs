//! Text normalization shared by the phrase tiers and the attribute source.

use unicode_segmentation::UnicodeSegmentation;

/// Interrogative and filler words removed by question-style extraction.
const FILLER_WORDS: &[&str] = &[
    // en
    "what", "which", "who", "when", "where", "why", "how", "is", "are", "was", "were", "do",
    "does", "did", "have", "has", "you", "your", "yours", "please", "kindly", "enter", "provide",
    "specify", "tell", "us", "me", "indicate", "many", "much", "the", "a", "an", "would", "will",
    "can", "could", "be", "currently", "if", "any", "here", "below",
    // de
    "was", "wie", "welche", "welcher", "welches", "ihr", "ihre", "ihren", "sie", "haben", "bitte",
    "geben", "an", "ist", "sind",
    // fr
    "quel", "quelle", "quels", "quelles", "est", "votre", "vos", "êtes", "vous", "avez",
    "veuillez", "indiquer", "indiquez", "le", "la", "les",
    // es
    "cuál", "cuáles", "qué", "su", "sus", "tiene", "usted", "por", "favor", "indique", "es",
    // pt
    "qual", "quais", "é", "seu", "sua", "você", "tem", "informe",
    // hi
    "क्या", "आपका", "आपकी", "आपके", "है", "कितना", "कितने", "कृपया",
];

const QUESTION_OPENERS: &[&str] = &[
    "what", "which", "how", "when", "where", "do", "does", "are", "is", "have", "will", "would",
    "can", "wie", "welche", "haben", "quel", "quelle", "avez", "êtes", "cuál", "qué", "tiene",
    "qual", "você", "क्या",
];

/// Lowercase and rejoin the Unicode words of `text` with single spaces.
pub fn normalize(text: &str) -> String {
    text.unicode_words()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tokens(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

/// Whether a caption reads like a question rather than a noun phrase.
pub fn looks_like_question(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.ends_with('?') || trimmed.starts_with('¿') {
        return true;
    }
    tokens(trimmed)
        .first()
        .map_or(false, |first| QUESTION_OPENERS.contains(&first.as_str()))
}

/// Drop filler words from normalized text. `None` when nothing changed or
/// nothing is left.
pub fn strip_question(normalized: &str) -> Option<String> {
    let all: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    let kept: Vec<&str> = all
        .iter()
        .copied()
        .filter(|token| !FILLER_WORDS.contains(token))
        .collect();
    if kept.is_empty() || kept.len() == all.len() {
        return None;
    }
    Some(kept.join(" "))
}

/// Split an identifier such as `applicant[firstName]` or `last_name-2` into
/// lowercase words.
pub fn identifier_tokens(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in raw.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_numeric();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
