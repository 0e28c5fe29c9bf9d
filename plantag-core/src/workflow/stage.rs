//! Typed per-element stage results
//!
//! One variant per engine result kind, kept in execution order on the
//! element so consumers match exhaustively.

use crate::composer::{
    CompositionResult, DisciplineResult, EntityResult, NamingResult, RoleResult, SuffixResult,
    TagResult,
};
use crate::disposition::DispositionResult;
use crate::identity::IdentityResolution;
use crate::types::{Diagnostics, TokenizationResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "result")]
pub enum StageResult {
    Tokenization(TokenizationResult),
    Discipline(DisciplineResult),
    Entity(EntityResult),
    Role(RoleResult),
    Naming(NamingResult),
    Suffix(SuffixResult),
    Tag(TagResult),
    Identity(IdentityResolution),
    Disposition(DispositionResult),
}

impl StageResult {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tokenization(_) => "tokenization",
            Self::Discipline(_) => "discipline",
            Self::Entity(_) => "entity",
            Self::Role(_) => "role",
            Self::Naming(_) => "naming",
            Self::Suffix(_) => "suffix",
            Self::Tag(_) => "tag",
            Self::Identity(_) => "identity",
            Self::Disposition(_) => "disposition",
        }
    }

    /// Stage results of one composition, in resolver order
    pub fn from_composition(composition: CompositionResult) -> [StageResult; 6] {
        [
            Self::Discipline(composition.discipline),
            Self::Entity(composition.entity),
            Self::Role(composition.role),
            Self::Naming(composition.naming),
            Self::Suffix(composition.suffix),
            Self::Tag(composition.tag),
        ]
    }

    /// Correlate this result with an element identity
    pub fn assign_identity(&mut self, id: &str) {
        let slot = match self {
            Self::Tokenization(r) => &mut r.identity_id,
            Self::Discipline(r) => &mut r.identity_id,
            Self::Entity(r) => &mut r.identity_id,
            Self::Role(r) => &mut r.identity_id,
            Self::Naming(r) => &mut r.identity_id,
            Self::Suffix(r) => &mut r.identity_id,
            Self::Tag(r) => &mut r.identity_id,
            Self::Disposition(r) => &mut r.identity_id,
            // The resolution itself carries the id it produced
            Self::Identity(_) => return,
        };
        *slot = Some(id.to_string());
    }

    pub fn identity_id(&self) -> Option<&str> {
        match self {
            Self::Tokenization(r) => r.identity_id.as_deref(),
            Self::Discipline(r) => r.identity_id.as_deref(),
            Self::Entity(r) => r.identity_id.as_deref(),
            Self::Role(r) => r.identity_id.as_deref(),
            Self::Naming(r) => r.identity_id.as_deref(),
            Self::Suffix(r) => r.identity_id.as_deref(),
            Self::Tag(r) => r.identity_id.as_deref(),
            Self::Identity(r) => Some(&r.identity_id),
            Self::Disposition(r) => r.identity_id.as_deref(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Self::Tokenization(r) => r.is_valid,
            Self::Discipline(r) | Self::Entity(r) => r.is_valid,
            Self::Role(r) => r.is_valid,
            Self::Naming(r) => r.is_valid,
            Self::Suffix(r) => r.is_valid,
            Self::Tag(r) => r.is_valid,
            Self::Identity(r) => r.record_valid,
            Self::Disposition(r) => r.is_valid,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Self::Tokenization(r) => &r.diagnostics,
            Self::Discipline(r) | Self::Entity(r) => &r.diagnostics,
            Self::Role(r) => &r.diagnostics,
            Self::Naming(r) => &r.diagnostics,
            Self::Suffix(r) => &r.diagnostics,
            Self::Tag(r) => &r.diagnostics,
            Self::Identity(r) => &r.diagnostics,
            Self::Disposition(r) => &r.diagnostics,
        }
    }
}

/// Fan an identity out to every result of one element
pub fn assign_identity(stages: &mut [StageResult], id: &str) {
    for stage in stages.iter_mut() {
        stage.assign_identity(id);
    }
}
