use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for language tag handling
///
/// Target languages are written as ISO 639-1 or ISO 639-2 codes, optionally
/// followed by a region or script subtag (`zh-TW`, `pt_BR`). Only the primary
/// subtag is checked against ISO 639; the rest is kept as given so output file
/// names stay exactly what the user configured.
/// Language code type
#[derive(Debug, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
fn bibliographic_to_terminologic(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Split a language tag into its primary subtag and the optional remainder
pub fn split_language_tag(tag: &str) -> (String, Option<String>) {
    let tag = tag.trim();
    match tag.split_once(['-', '_']) {
        Some((primary, rest)) if !rest.is_empty() => (primary.to_lowercase(), Some(rest.to_string())),
        Some((primary, _)) => (primary.to_lowercase(), None),
        None => (tag.to_lowercase(), None),
    }
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let (primary, _) = split_language_tag(code);

    if primary.len() == 2 && Language::from_639_1(&primary).is_some() {
        return Ok(LanguageCodeType::Part1);
    }
    if primary.len() == 3 {
        if Language::from_639_3(&primary).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if bibliographic_to_terminologic(&primary).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize the primary subtag of a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let (primary, _) = split_language_tag(code);

    if primary.len() == 2 {
        if let Some(lang) = Language::from_639_1(&primary) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if primary.len() == 3 {
        if Language::from_639_3(&primary).is_some() {
            return Ok(primary);
        }
        if let Some(part2t) = bibliographic_to_terminologic(&primary) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes name the same language, ignoring region subtags
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code, e.g. `zh-TW` -> `Chinese (TW)`
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    match split_language_tag(code).1 {
        Some(region) => Ok(format!("{} ({})", lang.to_name(), region)),
        None => Ok(lang.to_name().to_string()),
    }
}
