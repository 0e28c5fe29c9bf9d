//! Element and batch orchestration
//!
//! Wires tokenizer, composer, identity resolver and disposition classifier
//! into one per-element pipeline, and runs batches of elements against a
//! single identity store.

pub mod batch;
pub mod element;
pub mod stage;

pub use batch::{BatchItem, BatchOutput, BatchProcessor, BatchReport};
pub use element::{ElementOutcome, ElementPipeline, IdentityMode};
pub use stage::{assign_identity, StageResult};
