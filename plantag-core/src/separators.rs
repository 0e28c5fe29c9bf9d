//! Separator policy shared by Naming and Suffix
//!
//! Three separator classes:
//! - structural: prefixes a positional increment (`.001`) and joins base parts
//! - normalized: joins sibling suffix values (`ME_SDE`)
//! - suffix-introducing: separates the base name from the suffix block (`-`)

/// Characters treated as punctuation when producing a normalized name
const PUNCTUATION: [char; 5] = ['.', '-', '_', '/', ' '];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeparatorPolicy {
    pub structural: char,
    pub normalized: char,
    pub suffix: char,
}

impl Default for SeparatorPolicy {
    fn default() -> Self {
        Self {
            structural: '.',
            normalized: '_',
            suffix: '-',
        }
    }
}

impl SeparatorPolicy {
    /// Prefix `value` with exactly one `separator`
    ///
    /// Any run of leading `separator` characters collapses to one.
    pub fn ensure_leading(value: &str, separator: char) -> String {
        let trimmed = value.trim_start_matches(separator);
        let mut out = String::with_capacity(trimmed.len() + 1);
        out.push(separator);
        out.push_str(trimmed);
        out
    }

    /// Replace every punctuation character with the normalized separator
    pub fn normalize(&self, value: &str) -> String {
        value
            .chars()
            .map(|c| if PUNCTUATION.contains(&c) { self.normalized } else { c })
            .collect()
    }

    /// Append `value` to `out` joined by `separator`, never doubling it
    ///
    /// Values that already begin with the separator are appended as-is.
    pub fn push_joined(out: &mut String, value: &str, separator: char) {
        if value.is_empty() {
            return;
        }
        if out.is_empty() {
            out.push_str(value.trim_start_matches(separator));
            return;
        }
        if !out.ends_with(separator) && !value.starts_with(separator) {
            out.push(separator);
        } else if out.ends_with(separator) && value.starts_with(separator) {
            out.push_str(value.trim_start_matches(separator));
            return;
        }
        out.push_str(value);
    }
}
