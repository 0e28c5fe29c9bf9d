//! Stage 2: authoritative code table lookup

use super::TokenizeContext;
use crate::types::{Token, TokenSource};

pub(crate) fn run(ctx: &mut TokenizeContext<'_>) {
    if ctx.halted {
        return;
    }

    let tables = ctx.tables;
    for index in 0..ctx.base_parts.len() {
        let part = ctx.base_parts[index].clone();
        let Some(entry) = tables.codification.lookup(&part) else {
            continue;
        };
        let slot = entry.level;
        let token = Token::base(slot, part, index as i32, TokenSource::Codification);
        ctx.consumed[index] = true;

        if let Err(rejected) = ctx.result.tokens.insert(token) {
            ctx.exclude(rejected, format!("{} already codified", slot));
            continue;
        }
        tracing::trace!(slot = %slot, code = %entry.code, "Codified");
    }
}
