// Composer
//
// Concept: Derive classification attributes and the canonical tag of one element
// Synchronization: Reads a TokenizationResult (never mutates it) plus an
//                  optional inherited parent context
//
// Order: Discipline/Entity -> Role -> Naming/Suffix -> Tag merge

pub mod discipline;
pub mod entity;
pub mod naming;
pub mod resolution;
pub mod role;
pub mod suffix;
pub mod tag;

pub use discipline::{DisciplineResolver, DisciplineResult};
pub use entity::{EntityResolver, EntityResult};
pub use naming::{NamingResolver, NamingResult};
pub use resolution::{CodeResolution, ResolutionOrigin};
pub use role::{ElementRole, RoleResolver, RoleResult, SlotPresence};
pub use suffix::{SuffixInputs, SuffixResolver, SuffixResult};
pub use tag::TagResult;

use crate::codes::CodeTables;
use crate::separators::SeparatorPolicy;
use crate::types::{PipelineError, PipelineResult, TokenizationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Inherited context from the parent element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentContext {
    pub parent_id: Option<String>,
    /// Parent discipline or entity code
    pub parent_code: Option<String>,
}

impl ParentContext {
    pub fn new(parent_id: impl Into<String>, parent_code: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            parent_code: Some(parent_code.into()),
        }
    }
}

/// Every composer output for one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub discipline: DisciplineResult,
    pub entity: EntityResult,
    pub role: RoleResult,
    pub naming: NamingResult,
    pub suffix: SuffixResult,
    pub tag: TagResult,
}

impl CompositionResult {
    pub fn full_tag(&self) -> &str {
        &self.tag.full_tag
    }
}

#[derive(Debug, Clone)]
pub struct Composer {
    tables: Arc<CodeTables>,
    separators: SeparatorPolicy,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(Arc::new(CodeTables::builtin()))
    }
}

impl Composer {
    pub fn new(tables: Arc<CodeTables>) -> Self {
        Self {
            tables,
            separators: SeparatorPolicy::default(),
        }
    }

    pub fn with_separators(mut self, separators: SeparatorPolicy) -> Self {
        self.separators = separators;
        self
    }

    /// Compose all results for one tokenized element
    ///
    /// # Errors
    /// `MissingUpstream` when no tokenization is supplied. Every other
    /// problem is recorded as a diagnostic on the individual results.
    pub fn compose(
        &self,
        tokenization: Option<&TokenizationResult>,
        parent: Option<&ParentContext>,
    ) -> PipelineResult<CompositionResult> {
        let tokenization = tokenization.ok_or(PipelineError::MissingUpstream("tokenization"))?;
        let tables = &*self.tables;

        let discipline = DisciplineResolver::new(&tables.disciplines).resolve(tokenization, parent);
        let entity = EntityResolver::new(&tables.entities).resolve(tokenization, parent);
        let role = RoleResolver::new().resolve(tokenization, &discipline.value);
        let naming = NamingResolver::new(self.separators).resolve(tokenization);
        let suffix = SuffixResolver::new(&tables.schemas, self.separators).resolve(
            tokenization,
            SuffixInputs {
                role: role.role,
                discipline: &discipline.value,
                entity: &entity.value,
                default_discipline: tables.disciplines.default_code(),
            },
        );
        let tag = tag::merge(&naming, &suffix);

        tracing::debug!(
            raw = %tokenization.raw_input,
            role = %role.role,
            full_tag = %tag.full_tag,
            valid = tag.is_valid,
            "Element composed"
        );

        Ok(CompositionResult {
            discipline,
            entity,
            role,
            naming,
            suffix,
            tag,
        })
    }
}
