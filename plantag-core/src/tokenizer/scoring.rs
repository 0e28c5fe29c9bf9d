//! Stage 6: source-weighted confidence
//!
//! Per-token score is the weight of its source (missing tokens score 0).
//! Total = mean over occupied structural slots minus a fixed penalty per
//! missing slot, clamped to [0, 100]. A missing slot covered by an accepted
//! replacement counts as occupied.

use super::TokenizeContext;
use crate::types::StructuralSlot;

/// Penalty subtracted per unresolved required slot
pub const MISSING_PENALTY: f64 = 15.0;

pub(crate) fn run(ctx: &mut TokenizeContext<'_>) {
    for token in ctx.result.tokens.iter_mut() {
        token.score = if token.is_missing {
            0.0
        } else {
            token.source.base_weight()
        };
    }
    for excluded in ctx.result.excluded_tokens.iter_mut() {
        excluded.token.score = excluded.token.source.base_weight();
    }

    let mut occupied = Vec::new();
    let mut missing = 0usize;
    for slot in StructuralSlot::ALL {
        match ctx.result.slot_token(slot) {
            Some(token) => occupied.push(token.score),
            None if ctx.result.token(slot.key()).is_some_and(|t| t.is_missing) => missing += 1,
            None => {}
        }
    }

    ctx.result.score = if occupied.is_empty() {
        0.0
    } else {
        let mean = occupied.iter().sum::<f64>() / occupied.len() as f64;
        (mean - MISSING_PENALTY * missing as f64).clamp(0.0, 100.0)
    };
}

#[cfg(test)]
mod tests {
    use crate::tokenizer::Tokenizer;

    #[test]
    fn test_replacement_counts_instead_of_penalty() {
        let result = Tokenizer::default().tokenize("PCM01.MHS01.MFS01.001");

        // mean(100, 100, 100, 60), no penalty for the replaced Equipment slot
        assert_eq!(result.score, 90.0);
    }

    #[test]
    fn test_mixed_sources() {
        let result = Tokenizer::default().tokenize("PCM01.MHS01.BLD01");

        // mean(100, 100, 50), Equipment exempt
        let expected = 250.0 / 3.0;
        assert!((result.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let result = Tokenizer::default().tokenize("-ME_SDE");

        assert_eq!(result.score, 0.0);
        assert!(!result.is_valid);
    }
}
