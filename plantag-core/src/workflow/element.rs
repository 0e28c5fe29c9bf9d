// Element Pipeline
//
// Concept: Run one element through the whole resolution chain
// Synchronization: Tokenizer/Composer/Classifier are pure; identity access
//                  goes through the shared resolver's store lock
//
// Order: Tokenize -> Compose -> Resolve identity -> Classify -> fan out id
//
// Only elements with a base name are resolved; a suffix alone would merge
// unrelated elements into one record.
//
// An identity failure is isolated: tokenization and composition results are
// still returned, with the error recorded on the outcome.

use super::stage::{assign_identity, StageResult};
use crate::codes::CodeTables;
use crate::composer::{CompositionResult, Composer, ParentContext};
use crate::disposition::{DispositionClassifier, DispositionResult, QualityBucket};
use crate::identity::{IdentityContext, IdentityResolution, IdentityResolver};
use crate::input::ElementInput;
use crate::tokenizer::Tokenizer;
use crate::types::{PipelineResult, TokenizationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether identity resolution runs for an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    Resolve,
    /// Identity resolution was halted for this batch
    Skip,
}

/// Everything produced for one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementOutcome {
    pub stages: Vec<StageResult>,
    pub identity_id: Option<String>,
    pub was_restored: bool,
    pub bucket: QualityBucket,
    pub full_tag: String,
    pub identity_error: Option<String>,
}

impl ElementOutcome {
    pub fn tokenization(&self) -> Option<&TokenizationResult> {
        self.stages.iter().find_map(|s| match s {
            StageResult::Tokenization(r) => Some(r),
            _ => None,
        })
    }

    pub fn identity(&self) -> Option<&IdentityResolution> {
        self.stages.iter().find_map(|s| match s {
            StageResult::Identity(r) => Some(r),
            _ => None,
        })
    }

    pub fn disposition(&self) -> Option<&DispositionResult> {
        self.stages.iter().find_map(|s| match s {
            StageResult::Disposition(r) => Some(r),
            _ => None,
        })
    }
}

pub struct ElementPipeline {
    tokenizer: Tokenizer,
    composer: Composer,
    classifier: DispositionClassifier,
    resolver: Arc<IdentityResolver>,
}

impl ElementPipeline {
    pub fn new(tables: Arc<CodeTables>, resolver: Arc<IdentityResolver>) -> Self {
        Self {
            tokenizer: Tokenizer::new(tables.clone()),
            composer: Composer::new(tables),
            classifier: DispositionClassifier::new(),
            resolver,
        }
    }

    pub fn resolver(&self) -> &Arc<IdentityResolver> {
        &self.resolver
    }

    fn identity_context(input: &ElementInput, composition: &CompositionResult) -> IdentityContext {
        IdentityContext {
            tag: composition.tag.full_tag.clone(),
            geometry_kind: input.geometry_kind.clone(),
            owner_model_name: input.owner_model_name.clone(),
            generated_name: composition.naming.normalized_name.clone(),
            base_name: composition.naming.base_name.clone(),
            description: input.description.clone(),
            catalog_reference: input.catalog_reference.clone(),
            reference_number: input.reference_number.clone(),
            source_file: input.source_file.clone(),
            source_version: input.source_version.clone(),
            known_id: input.known_id.clone(),
        }
    }

    /// Process one element with identity resolution
    pub fn process(
        &self,
        input: &ElementInput,
        parent: Option<&ParentContext>,
    ) -> PipelineResult<ElementOutcome> {
        self.process_with(input, parent, IdentityMode::Resolve)
    }

    pub fn process_with(
        &self,
        input: &ElementInput,
        parent: Option<&ParentContext>,
        mode: IdentityMode,
    ) -> PipelineResult<ElementOutcome> {
        let tokenization = self.tokenizer.tokenize(&input.raw_tag);
        let composition = self.composer.compose(Some(&tokenization), parent)?;
        let disposition = self.classifier.classify(Some(&tokenization))?;
        let bucket = disposition.quality_bucket;
        let full_tag = composition.tag.full_tag.clone();

        let mut identity = None;
        let mut identity_error = None;
        // Unknown elements and suffix-only tags carry nothing element-specific to key on
        let keyable = bucket != QualityBucket::Unknown && !composition.naming.base_name.is_empty();
        if keyable {
            match mode {
                IdentityMode::Skip => {
                    identity_error = Some("identity resolution halted for this batch".to_string());
                }
                IdentityMode::Resolve => {
                    let ctx = Self::identity_context(input, &composition);
                    match self.resolver.resolve(&ctx) {
                        Ok(resolution) => identity = Some(resolution),
                        Err(e) => {
                            tracing::warn!(tag = %full_tag, error = %e, "Identity resolution failed");
                            identity_error = Some(e.to_string());
                        }
                    }
                }
            }
        } else {
            tracing::debug!(tag = %full_tag, bucket = ?bucket, "No base name, identity resolution skipped");
        }

        let identity_id = identity.as_ref().map(|r| r.identity_id.clone());
        let was_restored = identity.as_ref().is_some_and(|r| r.was_restored);

        let mut stages = Vec::with_capacity(9);
        stages.push(StageResult::Tokenization(tokenization));
        stages.extend(StageResult::from_composition(composition));
        if let Some(resolution) = identity {
            stages.push(StageResult::Identity(resolution));
        }
        stages.push(StageResult::Disposition(disposition));

        if let Some(id) = identity_id.as_deref() {
            assign_identity(&mut stages, id);
        }

        Ok(ElementOutcome {
            stages,
            identity_id,
            was_restored,
            bucket,
            full_tag,
            identity_error,
        })
    }
}
