// Disposition Classifier
//
// Concept: Bucket a tokenized element by quality and decide where it lands
// Synchronization: Reads a TokenizationResult (never re-tokenizes), outputs
//                  a DispositionResult created once per element per run
//
// Stages:
// 1. Pre-processing: capture the raw input, reject a missing tokenization
// 2. Token snapshot: structural presence flags
// 3. Quality assessment: functional completeness + eligibility flags
// 4. Bucket assignment: total function over flags
// 5. Route resolution: bucket -> opaque route, target keys
// 6. Scoring: tokenization score weighted by bucket

use crate::composer::SlotPresence;
use crate::types::{
    keys, Diagnostics, PipelineError, PipelineResult, StructuralSlot, TokenizationResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityBucket {
    Unknown,
    FinalImport,
    DbLimbo,
    MdbLimbo,
}

impl QualityBucket {
    pub const ALL: [QualityBucket; 4] = [
        Self::Unknown,
        Self::FinalImport,
        Self::DbLimbo,
        Self::MdbLimbo,
    ];

    /// Opaque route string interpreted by the writer layer
    pub fn route(self) -> &'static str {
        match self {
            Self::FinalImport => "import/final",
            Self::DbLimbo => "limbo/db",
            Self::MdbLimbo => "limbo/mdb",
            Self::Unknown => "reject",
        }
    }

    /// Weight applied to the tokenization score
    pub fn score_factor(self) -> f64 {
        match self {
            Self::FinalImport => 1.0,
            Self::DbLimbo => 0.6,
            Self::MdbLimbo => 0.3,
            Self::Unknown => 0.0,
        }
    }
}

impl fmt::Display for QualityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Structural snapshot of the tokenization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureFlags {
    pub presence: SlotPresence,
    /// An exception category allows Equipment to be absent
    pub equipment_exempt: bool,
    /// Number of recognized (non-missing) tokens
    pub recognized_tokens: usize,
}

/// Independent eligibility flags from quality assessment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub is_valid: bool,
    /// Discipline and entity resolvable without a discarded rival
    pub functional: bool,
    pub final_import: bool,
    pub db_limbo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispositionResult {
    pub quality_bucket: QualityBucket,
    pub route: String,
    pub target_server_key: Option<String>,
    pub target_mdb_key: Option<String>,
    pub raw_input_value: String,
    pub structure: StructureFlags,
    pub eligibility: Eligibility,
    pub score: f64,
    pub is_valid: bool,
    pub diagnostics: Diagnostics,
    pub identity_id: Option<String>,
}

/// Eligibility from structure flags and tokenizer validity
pub fn assess(structure: &StructureFlags, is_valid: bool, functional: bool) -> Eligibility {
    let p = &structure.presence;
    let equipment_ok = p.equipment || structure.equipment_exempt;
    Eligibility {
        is_valid,
        functional,
        final_import: is_valid && p.plant && p.unit && p.section && equipment_ok && functional,
        db_limbo: is_valid && p.plant && p.unit,
    }
}

/// Total bucket assignment
///
/// `Unknown` only when the tokenizer recognized nothing at all.
pub fn assign_bucket(structure: &StructureFlags, eligibility: &Eligibility) -> QualityBucket {
    if structure.recognized_tokens == 0 {
        QualityBucket::Unknown
    } else if eligibility.final_import {
        QualityBucket::FinalImport
    } else if eligibility.db_limbo {
        QualityBucket::DbLimbo
    } else {
        QualityBucket::MdbLimbo
    }
}

#[derive(Debug, Default, Clone)]
pub struct DispositionClassifier;

impl DispositionClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one tokenized element
    ///
    /// # Errors
    /// `MissingUpstream` when no tokenization is supplied.
    pub fn classify(&self, tokenization: Option<&TokenizationResult>) -> PipelineResult<DispositionResult> {
        // 1. Pre-processing
        let tokenization = tokenization.ok_or(PipelineError::MissingUpstream("tokenization"))?;
        let mut diagnostics = Diagnostics::default();

        // 2. Token snapshot
        let structure = StructureFlags {
            presence: SlotPresence::from_tokenization(tokenization),
            equipment_exempt: tokenization.equipment_exempt(),
            recognized_tokens: tokenization.recognized_count(),
        };

        // 3. Quality assessment
        let discarded_codes = tokenization.excluded(keys::DISCIPLINE).count()
            + tokenization.excluded(keys::ENTITY).count();
        if discarded_codes > 0 {
            diagnostics.warning(format!(
                "{} discipline/entity candidate(s) discarded, functional completeness not met",
                discarded_codes
            ));
        }
        let eligibility = assess(&structure, tokenization.is_valid, discarded_codes == 0);

        // 4. Bucket assignment
        let bucket = assign_bucket(&structure, &eligibility);
        if bucket == QualityBucket::Unknown {
            diagnostics.error("tokenizer recognized no tokens");
        }

        // 5. Route resolution
        let plant = tokenization
            .slot_token(StructuralSlot::Plant)
            .map(|t| t.value.clone());
        let unit = tokenization
            .slot_token(StructuralSlot::PlantUnit)
            .map(|t| t.value.clone());
        let target_mdb_key = match (&plant, &unit) {
            (Some(p), Some(u)) => Some(format!("{}_{}", p, u)),
            _ => None,
        };

        // 6. Scoring
        let score = tokenization.score * bucket.score_factor();

        tracing::debug!(
            raw = %tokenization.raw_input,
            bucket = %bucket,
            score = score,
            "Element classified"
        );

        Ok(DispositionResult {
            quality_bucket: bucket,
            route: bucket.route().to_string(),
            target_server_key: plant,
            target_mdb_key,
            raw_input_value: tokenization.raw_input.clone(),
            structure,
            eligibility,
            score,
            is_valid: !diagnostics.has_errors(),
            diagnostics,
            identity_id: None,
        })
    }
}
