// Batch Processor
//
// Concept: Resolve a batch of elements against one identity store
// Synchronization: Store loaded once per batch; elements independent except
//                  through the resolver's store lock
//
// Algorithm:
// 1. Load the identity store once
// 2. Process elements sequentially (`run`) or across blocking workers (`run_parallel`)
// 3. Flush every `flush_every` identity resolutions and once at the end
// 4. A failed flush halts identity resolution for the rest of the batch;
//    tokenization and composition continue
//
// Outcomes are returned in input order regardless of worker scheduling.

use super::element::{ElementOutcome, ElementPipeline, IdentityMode};
use crate::codes::CodeTables;
use crate::composer::ParentContext;
use crate::disposition::QualityBucket;
use crate::identity::{IdentityResolver, KnownCatalog};
use crate::input::ElementInput;
use crate::types::{PipelineError, PipelineResult};
use plantag_common::config::{resolve_store_path, TomlConfig, STORE_ENV_VAR};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// One element to process, with its optional parent context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchItem {
    pub input: ElementInput,
    pub parent: Option<ParentContext>,
}

impl From<ElementInput> for BatchItem {
    fn from(input: ElementInput) -> Self {
        Self {
            input,
            parent: None,
        }
    }
}

/// Batch statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub final_import: usize,
    pub db_limbo: usize,
    pub mdb_limbo: usize,
    pub unknown: usize,
    pub identities_created: usize,
    pub identities_restored: usize,
    pub invalid_records: usize,
    pub identity_failures: usize,
    pub flushes: usize,
    pub flush_error: Option<String>,
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &ElementOutcome) {
        self.total += 1;
        match outcome.bucket {
            QualityBucket::FinalImport => self.final_import += 1,
            QualityBucket::DbLimbo => self.db_limbo += 1,
            QualityBucket::MdbLimbo => self.mdb_limbo += 1,
            QualityBucket::Unknown => self.unknown += 1,
        }
        if let Some(identity) = outcome.identity() {
            if identity.was_restored {
                self.identities_restored += 1;
            } else {
                self.identities_created += 1;
            }
            if !identity.record_valid {
                self.invalid_records += 1;
            }
        }
        if outcome.identity_error.is_some() {
            self.identity_failures += 1;
        }
    }

    pub fn bucket_count(&self, bucket: QualityBucket) -> usize {
        match bucket {
            QualityBucket::FinalImport => self.final_import,
            QualityBucket::DbLimbo => self.db_limbo,
            QualityBucket::MdbLimbo => self.mdb_limbo,
            QualityBucket::Unknown => self.unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub outcomes: Vec<ElementOutcome>,
    pub report: BatchReport,
}

/// Flush cadence and halt state shared by all workers of one batch
struct FlushState {
    resolved: AtomicUsize,
    flushes: AtomicUsize,
    halted: AtomicBool,
    error: std::sync::Mutex<Option<String>>,
}

impl FlushState {
    fn new() -> Self {
        Self {
            resolved: AtomicUsize::new(0),
            flushes: AtomicUsize::new(0),
            halted: AtomicBool::new(false),
            error: std::sync::Mutex::new(None),
        }
    }

    fn mode(&self) -> IdentityMode {
        if self.halted.load(Ordering::Acquire) {
            IdentityMode::Skip
        } else {
            IdentityMode::Resolve
        }
    }

    fn flush(&self, resolver: &IdentityResolver) {
        match resolver.flush() {
            Ok(true) => {
                self.flushes.fetch_add(1, Ordering::Relaxed);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Identity store flush failed, halting identity resolution");
                self.halted.store(true, Ordering::Release);
                if let Ok(mut slot) = self.error.lock() {
                    slot.get_or_insert_with(|| e.to_string());
                }
            }
        }
    }

    fn after_element(&self, outcome: &ElementOutcome, resolver: &IdentityResolver, flush_every: usize) {
        if outcome.identity().is_none() {
            return;
        }
        let resolved = self.resolved.fetch_add(1, Ordering::AcqRel) + 1;
        if flush_every > 0 && resolved % flush_every == 0 {
            self.flush(resolver);
        }
    }

    fn finish(&self, report: &mut BatchReport) {
        report.flushes = self.flushes.load(Ordering::Relaxed);
        report.flush_error = self.error.lock().ok().and_then(|e| e.clone());
    }
}

pub struct BatchProcessor {
    pipeline: Arc<ElementPipeline>,
    flush_every: usize,
    workers: usize,
}

impl BatchProcessor {
    pub fn new(pipeline: Arc<ElementPipeline>, flush_every: usize, workers: usize) -> Self {
        Self {
            pipeline,
            flush_every,
            workers: workers.max(1),
        }
    }

    /// Build tables, load the store and size the batch from configuration
    ///
    /// Store path priority: `store_override` -> `PLANTAG_STORE` -> config -> OS default.
    pub fn from_config(config: &TomlConfig, store_override: Option<&str>) -> PipelineResult<Self> {
        config.validate()?;
        let tables = Arc::new(CodeTables::from_config(config)?);
        let store_path = resolve_store_path(store_override, STORE_ENV_VAR, Some(config));
        if store_path.as_os_str().is_empty() {
            return Err(PipelineError::MissingStorePath);
        }

        let resolver = Arc::new(IdentityResolver::open(&store_path, KnownCatalog::new())?);
        tracing::info!(
            store = %store_path.display(),
            flush_every = config.flush_every,
            workers = config.workers,
            "Batch processor ready"
        );

        Ok(Self::new(
            Arc::new(ElementPipeline::new(tables, resolver)),
            config.flush_every,
            config.workers,
        ))
    }

    pub fn pipeline(&self) -> &Arc<ElementPipeline> {
        &self.pipeline
    }

    fn finish(&self, state: &FlushState, outcomes: Vec<ElementOutcome>, started: Instant) -> BatchOutput {
        if state.mode() == IdentityMode::Resolve {
            state.flush(self.pipeline.resolver());
        }

        let mut report = BatchReport::default();
        for outcome in &outcomes {
            report.record(outcome);
        }
        state.finish(&mut report);
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            total = report.total,
            final_import = report.final_import,
            db_limbo = report.db_limbo,
            mdb_limbo = report.mdb_limbo,
            unknown = report.unknown,
            created = report.identities_created,
            restored = report.identities_restored,
            elapsed_ms = report.elapsed_ms,
            "Batch completed"
        );

        BatchOutput { outcomes, report }
    }

    /// Process every item in order on the calling thread
    pub fn run(&self, items: &[BatchItem]) -> PipelineResult<BatchOutput> {
        let started = Instant::now();
        let state = FlushState::new();
        let resolver = self.pipeline.resolver();

        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            let outcome = self
                .pipeline
                .process_with(&item.input, item.parent.as_ref(), state.mode())?;
            state.after_element(&outcome, resolver, self.flush_every);
            outcomes.push(outcome);
        }

        Ok(self.finish(&state, outcomes, started))
    }

    /// Process items across `workers` blocking tasks
    pub async fn run_parallel(&self, items: Vec<BatchItem>) -> PipelineResult<BatchOutput> {
        let started = Instant::now();
        let state = Arc::new(FlushState::new());
        let total = items.len();
        let chunk_size = total.div_ceil(self.workers).max(1);

        let mut indexed: Vec<(usize, BatchItem)> = items.into_iter().enumerate().collect();
        let mut handles = Vec::new();
        while !indexed.is_empty() {
            let rest = indexed.split_off(chunk_size.min(indexed.len()));
            let chunk = std::mem::replace(&mut indexed, rest);

            let pipeline = Arc::clone(&self.pipeline);
            let state = Arc::clone(&state);
            let flush_every = self.flush_every;
            handles.push(tokio::task::spawn_blocking(
                move || -> PipelineResult<Vec<(usize, ElementOutcome)>> {
                    let mut done = Vec::with_capacity(chunk.len());
                    for (index, item) in chunk {
                        let outcome =
                            pipeline.process_with(&item.input, item.parent.as_ref(), state.mode())?;
                        state.after_element(&outcome, pipeline.resolver(), flush_every);
                        done.push((index, outcome));
                    }
                    Ok(done)
                },
            ));
        }

        tracing::debug!(workers = handles.len(), items = total, "Parallel batch started");

        let mut slots: Vec<Option<ElementOutcome>> = vec![None; total];
        for handle in handles {
            let done = handle
                .await
                .map_err(|e| PipelineError::Worker(e.to_string()))??;
            for (index, outcome) in done {
                slots[index] = Some(outcome);
            }
        }
        let outcomes: Vec<ElementOutcome> = slots.into_iter().flatten().collect();

        Ok(self.finish(&state, outcomes, started))
    }
}
