//! Attribute heuristics applied during identity resolution
//!
//! The increment extraction is a best-effort reading of free text: when
//! several numbers appear, the first matching rule in the precedence list
//! wins, which is not guaranteed to be the number a human would pick.

use once_cell::sync::Lazy;
use regex::Regex;

/// Increment patterns, highest precedence first
static INCREMENT_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        // 4-digit, underscore-delimited: PUMP_0012_MAIN
        Regex::new(r"(?:^|_)(\d{4})(?:_|$)").expect("increment pattern must compile"),
        // 4-digit standalone: Tank 0345 north
        Regex::new(r"\b(\d{4})\b").expect("increment pattern must compile"),
        // 2-3 digit trailing: Valve 07
        Regex::new(r"(\d{2,3})\s*$").expect("increment pattern must compile"),
    ]
});

static SOURCE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<stem>.+?)(?:[_-]v|_rev\.?)(?P<version>\d+)(?P<ext>\.[a-z0-9]+)?$")
        .expect("source version pattern must compile")
});

/// Suffix increment read from a free-text description
pub fn increment_from_description(description: &str) -> Option<u32> {
    INCREMENT_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(description)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

/// Strip a version suffix from a source file name
///
/// Returns the file name without the version and the version digits.
pub fn split_source_version(file_name: &str) -> (String, Option<String>) {
    match SOURCE_VERSION.captures(file_name) {
        Some(caps) => {
            let stem = caps.name("stem").map_or("", |m| m.as_str());
            let ext = caps.name("ext").map_or("", |m| m.as_str());
            let version = caps.name("version").map(|m| m.as_str().to_string());
            (format!("{}{}", stem, ext), version)
        }
        None => (file_name.to_string(), None),
    }
}

/// Trailing letter of the last base-name part (`PU101A` -> `A`)
pub fn suffix_letter(tag: &str) -> Option<char> {
    let base = tag.split('-').next().unwrap_or(tag);
    let last_part = base.rsplit('.').next()?;
    let mut chars = last_part.chars().rev();
    let letter = chars.next().filter(|c| c.is_ascii_alphabetic())?;
    chars
        .next()
        .filter(|c| c.is_ascii_digit())
        .map(|_| letter)
}

/// Counter namespace for a base name: trailing digits and separators removed
pub fn counter_prefix(base_name: &str) -> String {
    base_name
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end_matches(['.', '_'])
        .to_string()
}
