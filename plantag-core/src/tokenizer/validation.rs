//! Stage 5: cross-check codified parent/child relations

use super::TokenizeContext;
use crate::types::{StructuralSlot, TokenSource};

pub(crate) fn run(ctx: &mut TokenizeContext<'_>) {
    if ctx.halted {
        return;
    }
    let table = &ctx.tables.codification;

    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    for slot in StructuralSlot::ALL {
        let Some(child) = ctx
            .result
            .present(slot.key())
            .filter(|t| t.source == TokenSource::Codification)
        else {
            continue;
        };
        let Some(entry) = table.lookup(&child.value) else {
            continue;
        };
        let Some(declared_parent) = entry.parent.as_deref() else {
            continue;
        };

        if !table.contains(declared_parent) {
            errors.push(format!(
                "{} '{}' declares unknown parent '{}'",
                slot, child.value, declared_parent
            ));
            continue;
        }

        let parent_token = slot
            .parent()
            .and_then(|p| ctx.result.present(p.key()))
            .filter(|t| t.source == TokenSource::Codification);
        if let Some(parent_token) = parent_token {
            if !parent_token.value.eq_ignore_ascii_case(declared_parent) {
                warnings.push(format!(
                    "{} '{}' belongs to '{}', not '{}'",
                    slot, child.value, declared_parent, parent_token.value
                ));
            }
        }
    }

    for warning in warnings {
        ctx.result.diagnostics.warning(warning);
    }
    for error in errors {
        tracing::warn!(raw = %ctx.result.raw_input, error = %error, "Codification inconsistency");
        ctx.result.diagnostics.error(error);
    }
}

#[cfg(test)]
mod tests {
    use crate::codes::{CodeEntry, CodeTable, CodeTables};
    use crate::tokenizer::Tokenizer;
    use crate::types::StructuralSlot;
    use std::sync::Arc;

    #[test]
    fn test_parent_mismatch_is_warning() {
        // UTL01 belongs to PCM02
        let result = Tokenizer::default().tokenize("PCM01.UTL01.MFS01.STR01");

        assert!(result.diagnostics.errors.is_empty());
        assert!(result
            .diagnostics
            .warnings
            .iter()
            .any(|w| w.contains("belongs to 'PCM02'")));
        assert!(result.is_valid);
    }

    #[test]
    fn test_unknown_declared_parent_is_error() {
        let mut table = CodeTable::builtin();
        table.insert(CodeEntry::new("ORP01", StructuralSlot::PlantUnit, Some("GONE1"), "Orphan"));
        let tables = Arc::new(CodeTables::builtin().with_codification(table));

        let result = Tokenizer::new(tables).tokenize("PCM01.ORP01.MFS01.STR01");

        assert_eq!(result.diagnostics.errors.len(), 1);
        assert!(!result.is_valid);
    }
}
