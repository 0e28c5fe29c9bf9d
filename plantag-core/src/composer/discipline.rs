//! Discipline resolver

use super::resolution::{resolve_code, CodeResolution};
use super::ParentContext;
use crate::codes::CodeVocabulary;
use crate::types::{keys, TokenizationResult};

pub type DisciplineResult = CodeResolution;

/// Disciplines whose sectional elements are structures rather than areas
pub const STRUCTURAL_DISCIPLINES: [&str; 2] = ["ST", "CI"];

pub fn is_structural(discipline: &str) -> bool {
    STRUCTURAL_DISCIPLINES
        .iter()
        .any(|d| d.eq_ignore_ascii_case(discipline))
}

pub struct DisciplineResolver<'a> {
    vocabulary: &'a CodeVocabulary,
}

impl<'a> DisciplineResolver<'a> {
    pub fn new(vocabulary: &'a CodeVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn resolve(
        &self,
        tokenization: &TokenizationResult,
        parent: Option<&ParentContext>,
    ) -> DisciplineResult {
        resolve_code(keys::DISCIPLINE, self.vocabulary, tokenization, parent)
    }
}
