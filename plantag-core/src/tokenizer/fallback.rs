//! Stage 3: positional regex fallback and exception categories
//!
//! Codification always wins a contested slot; the regex candidate is kept in
//! `excluded_tokens` so the conflict stays visible.

use super::TokenizeContext;
use crate::codes::definitions::{base_definition, match_exception, Matcher, EXCEPTION_POSITIONS};
use crate::types::{StructuralSlot, Token, TokenSource};

/// Outcome of offering a fallback candidate for a slot
enum Claim {
    Filled,
    Agreed,
    Contested,
}

fn claim(ctx: &mut TokenizeContext<'_>, slot: StructuralSlot, token: Token) -> Claim {
    let existing = ctx.result.tokens.get(slot.key()).map(|t| t.value.clone());
    match existing {
        Some(value) if value == token.value => Claim::Agreed,
        Some(value) => {
            let reason = format!("{} codified as '{}', fallback value ignored", slot, value);
            ctx.exclude(token, reason);
            Claim::Contested
        }
        None => {
            // Key checked above; insert cannot collide
            let _ = ctx.result.tokens.insert(token);
            Claim::Filled
        }
    }
}

pub(crate) fn run(ctx: &mut TokenizeContext<'_>) {
    if ctx.halted {
        return;
    }

    for index in 0..ctx.base_parts.len() {
        if ctx.consumed[index] {
            continue;
        }
        let Some(slot) = StructuralSlot::from_position(index).filter(|s| s.is_required()) else {
            continue;
        };
        let part = ctx.base_parts[index].clone();

        if EXCEPTION_POSITIONS.contains(&index) {
            if let Some(category) = match_exception(&part) {
                let token = Token::base(slot, part, index as i32, TokenSource::ExceptionTable)
                    .with_domain(Some(category.domain));
                if ctx.result.exception_category.is_none() {
                    ctx.result.exception_category = Some(category.name.to_string());
                    ctx.result
                        .diagnostics
                        .message(format!("{} exception category matched", category.name));
                }
                claim(ctx, slot, token);
                ctx.consumed[index] = true;
                continue;
            }
        }

        let Some(definition) = base_definition(slot) else {
            continue;
        };
        let Matcher::Pattern(pattern) = &definition.matcher else {
            continue;
        };
        if !pattern.is_match(&part) {
            continue;
        }

        let token = Token::base(slot, part, index as i32, TokenSource::RegexFallback)
            .with_domain(definition.domain_for(&ctx.base_parts[index]));
        if let Claim::Filled = claim(ctx, slot, token) {
            tracing::trace!(slot = %slot, "Filled by regex fallback");
        }
        ctx.consumed[index] = true;
    }

    let exempt = ctx.result.equipment_exempt();
    for slot in StructuralSlot::REQUIRED {
        if ctx.result.tokens.contains_key(slot.key()) {
            continue;
        }
        if slot == StructuralSlot::Equipment && exempt {
            continue;
        }
        ctx.result
            .diagnostics
            .warning(format!("required slot {} not resolved", slot));
        let _ = ctx.result.tokens.insert(Token::missing(slot));
    }
}
