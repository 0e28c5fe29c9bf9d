//! Stage 7: finalize exclusions and validity

use super::TokenizeContext;
use crate::types::StructuralSlot;

pub(crate) fn run(ctx: &mut TokenizeContext<'_>) {
    let result = &mut ctx.result;

    // sort_by_key is stable: same-position exclusions keep detection order
    result.excluded_tokens.sort_by_key(|e| e.token.position);

    result.is_valid =
        !result.diagnostics.has_errors() && result.present(StructuralSlot::Plant.key()).is_some();
    result.is_consistency_checked = true;

    if !result.is_valid {
        tracing::debug!(
            raw = %result.raw_input,
            errors = result.diagnostics.errors.len(),
            "Tokenization invalid"
        );
    }
}
