//! Stage 4: Component, Discipline, Entity and tag fragment recognition
//!
//! A definition that declares `replaces` stands in for its structural slot
//! only while that slot is unfilled. Direct tokens are placed first, so a
//! real Component always beats a composite that could stand in for it. The
//! first accepted replacement per slot wins; later candidates are excluded.

use super::TokenizeContext;
use crate::codes::definitions::{suffix_stage_definitions, Matcher, TokenDefinition};
use crate::codes::CodeTables;
use crate::types::{Token, TokenKind, TokenSource};

/// Base positions from which leftover parts are offered to this stage
const FIRST_SUFFIX_POSITION: usize = 3;

fn matches(definition: &TokenDefinition, tables: &CodeTables, part: &str) -> bool {
    match &definition.matcher {
        Matcher::Pattern(pattern) => pattern.is_match(part),
        Matcher::Disciplines => tables.disciplines.contains(part),
        Matcher::Entities => tables.entities.contains(part),
    }
}

fn recognize(
    tables: &CodeTables,
    part: &str,
    position: Option<usize>,
) -> Option<&'static TokenDefinition> {
    suffix_stage_definitions()
        .find(|d| d.position.applies(position) && matches(d, tables, part))
}

fn build_token(definition: &TokenDefinition, part: &str, position: i32) -> Token {
    let token = match (definition.kind, definition.slot()) {
        (TokenKind::Base, Some(slot)) => {
            Token::base(slot, part, position, TokenSource::RegexFallback)
        }
        _ => Token::suffix(definition.key, part, position),
    };
    token
        .with_separator(definition.custom_separator)
        .with_domain(definition.domain_for(part))
}

fn accept(ctx: &mut TokenizeContext<'_>, definition: &TokenDefinition, mut token: Token) {
    if let Some(slot) = definition.replaces {
        if ctx.result.present(slot.key()).is_none() {
            if ctx.result.replacement_for(slot).is_some() {
                let reason = format!("{} already has an accepted replacement", slot);
                ctx.exclude(token, reason);
                return;
            }
            token.mark_replacement(slot);
        }
    }

    if let Err(rejected) = ctx.result.tokens.insert(token) {
        let reason = format!("{} already recognized", rejected.key);
        ctx.exclude(rejected, reason);
    }
}

pub(crate) fn run(ctx: &mut TokenizeContext<'_>) {
    if ctx.halted {
        return;
    }
    let tables = ctx.tables;

    let mut candidates: Vec<(String, Option<usize>, i32)> = Vec::new();
    for (index, part) in ctx.base_parts.iter().enumerate() {
        if ctx.consumed[index] {
            continue;
        }
        if index < FIRST_SUFFIX_POSITION {
            ctx.result
                .diagnostics
                .warning(format!("unrecognised fragment '{}' at position {}", part, index));
            continue;
        }
        candidates.push((part.clone(), Some(index), index as i32));
    }
    for (index, part) in ctx.suffix_parts.iter().enumerate() {
        candidates.push((part.clone(), None, ctx.suffix_position(index)));
    }

    let mut recognized = Vec::with_capacity(candidates.len());
    for (part, position, token_position) in candidates {
        match recognize(tables, &part, position) {
            Some(definition) => recognized.push((definition, part, position, token_position)),
            None => ctx
                .result
                .diagnostics
                .warning(format!("unrecognised fragment '{}'", part)),
        }
    }

    // Replacements are decided once every direct token has claimed its slot
    let (replacing, direct): (Vec<_>, Vec<_>) = recognized
        .into_iter()
        .partition(|(definition, ..)| definition.replaces.is_some());

    for (definition, part, position, token_position) in direct.into_iter().chain(replacing) {
        let token = build_token(definition, &part, token_position);
        accept(ctx, definition, token);
        if let Some(index) = position {
            ctx.consumed[index] = true;
        }
    }
}
