//! Entity resolver

use super::resolution::{resolve_code, CodeResolution};
use super::ParentContext;
use crate::codes::CodeVocabulary;
use crate::types::{keys, TokenizationResult};

pub type EntityResult = CodeResolution;

pub struct EntityResolver<'a> {
    vocabulary: &'a CodeVocabulary,
}

impl<'a> EntityResolver<'a> {
    pub fn new(vocabulary: &'a CodeVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn resolve(
        &self,
        tokenization: &TokenizationResult,
        parent: Option<&ParentContext>,
    ) -> EntityResult {
        resolve_code(keys::ENTITY, self.vocabulary, tokenization, parent)
    }
}
