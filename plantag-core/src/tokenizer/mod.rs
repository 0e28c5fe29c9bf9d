// Tag Tokenizer
//
// Concept: Decompose a raw engineering tag into typed structural and suffix tokens
// Synchronization: Accepts a raw string, outputs an immutable TokenizationResult
//
// Algorithm:
// 1. Pre-processing: normalize separators, split base and suffix blocks
// 2. Structural codification: authoritative code table lookup
// 3. Regex base fallback: positional patterns + exception categories
// 4. Suffix recognition: Component/Discipline/Entity/tag fragments, replacements
// 5. Codification validation: parent/child cross-check
// 6. Scoring: source-weighted confidence, missing-slot penalty
// 7. Post-processing: finalize exclusions and validity
//
// Stages run strictly in order over one shared context. Any stage may be
// skipped through a StageSelection for diagnostics-only runs.

mod codification;
mod fallback;
mod postprocess;
mod preprocess;
mod scoring;
mod suffix;
mod validation;

use crate::codes::CodeTables;
use crate::types::{ExcludedToken, Token, TokenizationResult};
use std::sync::Arc;

pub use scoring::MISSING_PENALTY;

/// Tokenizer stage identifiers, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenizeStage {
    Preprocess,
    Codification,
    RegexFallback,
    SuffixRecognition,
    Validation,
    Scoring,
    Postprocess,
}

impl TokenizeStage {
    pub const ALL: [TokenizeStage; 7] = [
        Self::Preprocess,
        Self::Codification,
        Self::RegexFallback,
        Self::SuffixRecognition,
        Self::Validation,
        Self::Scoring,
        Self::Postprocess,
    ];
}

/// Subset of stages to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSelection {
    enabled: Vec<TokenizeStage>,
}

impl Default for StageSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl StageSelection {
    pub fn all() -> Self {
        Self {
            enabled: TokenizeStage::ALL.to_vec(),
        }
    }

    pub fn only(stages: &[TokenizeStage]) -> Self {
        Self {
            enabled: stages.to_vec(),
        }
    }

    pub fn without(mut self, stage: TokenizeStage) -> Self {
        self.enabled.retain(|s| *s != stage);
        self
    }

    pub fn is_enabled(&self, stage: TokenizeStage) -> bool {
        self.enabled.contains(&stage)
    }
}

/// Mutable state threaded through the stages for one tag
pub(crate) struct TokenizeContext<'a> {
    pub tables: &'a CodeTables,
    pub result: TokenizationResult,
    pub base_parts: Vec<String>,
    pub suffix_parts: Vec<String>,
    /// Base parts already claimed by a stage
    pub consumed: Vec<bool>,
    /// Set when pre-processing rejected the input; token stages become no-ops
    pub halted: bool,
}

impl<'a> TokenizeContext<'a> {
    fn new(tables: &'a CodeTables, raw: &str) -> Self {
        Self {
            tables,
            result: TokenizationResult::new(raw),
            base_parts: Vec::new(),
            suffix_parts: Vec::new(),
            consumed: Vec::new(),
            halted: false,
        }
    }

    /// Token position of suffix-block part `index`
    pub fn suffix_position(&self, index: usize) -> i32 {
        (self.base_parts.len() + index) as i32
    }

    /// Record a recognized token as excluded, with a matching warning
    pub fn exclude(&mut self, token: Token, reason: impl Into<String>) {
        let reason = reason.into();
        self.result.diagnostics.warning(format!(
            "Excluded {} '{}': {}",
            token.key, token.value, reason
        ));
        tracing::debug!(key = %token.key, value = %token.value, reason = %reason, "Token excluded");
        self.result.excluded_tokens.push(ExcludedToken { token, reason });
    }
}

/// Staged tag tokenizer over shared code tables
#[derive(Debug, Clone)]
pub struct Tokenizer {
    tables: Arc<CodeTables>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(Arc::new(CodeTables::builtin()))
    }
}

impl Tokenizer {
    pub fn new(tables: Arc<CodeTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &CodeTables {
        &self.tables
    }

    /// Run every stage over `raw`
    pub fn tokenize(&self, raw: &str) -> TokenizationResult {
        self.tokenize_with(raw, &StageSelection::all())
    }

    /// Run the selected stages over `raw`
    pub fn tokenize_with(&self, raw: &str, selection: &StageSelection) -> TokenizationResult {
        let mut ctx = TokenizeContext::new(&self.tables, raw);

        for stage in TokenizeStage::ALL {
            if !selection.is_enabled(stage) {
                continue;
            }
            match stage {
                TokenizeStage::Preprocess => preprocess::run(&mut ctx),
                TokenizeStage::Codification => codification::run(&mut ctx),
                TokenizeStage::RegexFallback => fallback::run(&mut ctx),
                TokenizeStage::SuffixRecognition => suffix::run(&mut ctx),
                TokenizeStage::Validation => validation::run(&mut ctx),
                TokenizeStage::Scoring => scoring::run(&mut ctx),
                TokenizeStage::Postprocess => postprocess::run(&mut ctx),
            }
        }

        tracing::debug!(
            raw = %raw,
            tokens = ctx.result.tokens.len(),
            excluded = ctx.result.excluded_tokens.len(),
            score = ctx.result.score,
            valid = ctx.result.is_valid,
            "Tag tokenized"
        );

        ctx.result
    }
}
