//! # PLANTAG Core
//!
//! Plant tag resolution pipeline:
//! - Tokenizer: raw tag -> typed structural and suffix tokens
//! - Composer: discipline, entity, role, naming, suffix and full tag
//! - Identity resolver: stable element identifiers across runs
//! - Disposition classifier: quality bucket and route per element
//! - Workflow: per-element pipeline and batch processing

pub mod codes;
pub mod composer;
pub mod disposition;
pub mod identity;
pub mod input;
pub mod separators;
pub mod tokenizer;
pub mod types;
pub mod workflow;

pub use codes::CodeTables;
pub use composer::{Composer, CompositionResult, ParentContext};
pub use disposition::{DispositionClassifier, DispositionResult, QualityBucket};
pub use identity::{IdentityError, IdentityResolver, IdentityStore};
pub use input::ElementInput;
pub use separators::SeparatorPolicy;
pub use tokenizer::{StageSelection, TokenizeStage, Tokenizer};
pub use types::{
    Diagnostics, PipelineError, PipelineResult, StructuralSlot, Token, TokenizationResult,
};
pub use workflow::{BatchItem, BatchProcessor, BatchReport, ElementOutcome, ElementPipeline};
