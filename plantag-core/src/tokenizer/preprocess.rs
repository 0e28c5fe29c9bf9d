//! Stage 1: normalize separators and split the tag into parts

use super::TokenizeContext;

/// Characters unified into the structural separator
fn is_unified_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '/' | '\\' | ',' | ';' | ':')
}

/// Uppercase, unify separators and collapse runs of `.`
pub(crate) fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        let c = if is_unified_separator(c) { '.' } else { c.to_ascii_uppercase() };
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Split a normalized tag at the first `-` into (base, suffix) blocks
fn split_blocks(normalized: &str) -> (&str, &str) {
    match normalized.split_once('-') {
        Some((base, suffix)) => (
            base.trim_matches('.'),
            suffix.trim_matches(|c| matches!(c, '.' | '_' | '-')),
        ),
        None => (normalized.trim_matches('.'), ""),
    }
}

pub(crate) fn run(ctx: &mut TokenizeContext<'_>) {
    let normalized = normalize(&ctx.result.raw_input);
    let (base, suffix) = split_blocks(&normalized);

    ctx.result.normalized_input = if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{}-{}", base, suffix)
    };

    if base.is_empty() && suffix.is_empty() {
        ctx.result.diagnostics.error("empty tag");
        ctx.halted = true;
        tracing::debug!(raw = %ctx.result.raw_input, "Empty tag rejected");
        return;
    }

    ctx.base_parts = base
        .split('.')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    ctx.suffix_parts = suffix
        .split(|c| matches!(c, '_' | '.' | '-'))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    ctx.consumed = vec![false; ctx.base_parts.len()];

    if ctx.base_parts.is_empty() {
        ctx.result
            .diagnostics
            .warning("tag has no base block before the suffix separator");
    }
}
