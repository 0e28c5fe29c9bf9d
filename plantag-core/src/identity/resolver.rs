// Identity Resolver
//
// Concept: One stable identifier per logical element across repeated runs
// Synchronization: Store access serialized by a mutex held for one
//                  read-modify-write; pure inputs otherwise
//
// Algorithm:
// 1. Consistency checks (tag, geometry, catalog reference) -> record diagnostics
// 2. Known id supplied by the caller: reuse it when its stored tag agrees
// 3. Exact match on (tag, geometry, owner): update mutable fields in place
// 4. Otherwise create a record with a fresh id and the next increment
//
// The catalog may force a geometry kind. That override is reported as
// `effective_geometry` on the resolution; it is never written back into the
// caller's inputs or any earlier stage result.

use super::heuristics::{
    counter_prefix, increment_from_description, split_source_version, suffix_letter,
};
use super::record::{GeometryKind, IdentityRecord, ResolutionKey};
use super::store::IdentityStore;
use super::{IdentityError, IdentityResult};
use crate::types::Diagnostics;
use plantag_common::{time, uuid_utils};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Catalog entry describing a referenced component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub reference: String,
    /// Geometry every instance of this entry must use
    pub forced_geometry: Option<GeometryKind>,
}

/// Resolves catalog references
pub trait CatalogLookup: Send + Sync {
    fn lookup(&self, reference: &str) -> Option<CatalogEntry>;
}

/// In-memory catalog keyed by upper-cased reference
#[derive(Debug, Clone, Default)]
pub struct KnownCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl KnownCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: &str, forced_geometry: Option<GeometryKind>) {
        self.entries.insert(
            reference.to_ascii_uppercase(),
            CatalogEntry {
                reference: reference.to_string(),
                forced_geometry,
            },
        );
    }
}

impl CatalogLookup for KnownCatalog {
    fn lookup(&self, reference: &str) -> Option<CatalogEntry> {
        self.entries.get(&reference.to_ascii_uppercase()).cloned()
    }
}

/// Everything identity resolution needs to know about one element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    /// Resolved full tag
    pub tag: String,
    pub geometry_kind: String,
    pub owner_model_name: String,
    pub generated_name: String,
    /// Base name used as the increment counter namespace
    pub base_name: String,
    pub description: Option<String>,
    pub catalog_reference: Option<String>,
    pub reference_number: Option<String>,
    /// Source file name as exported; a version suffix is split off
    pub source_file: Option<String>,
    /// Explicit source version; overrides one found in the file name
    pub source_version: Option<String>,
    /// Identifier the caller believes this element already has
    pub known_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityResolution {
    pub identity_id: String,
    pub was_restored: bool,
    /// Catalog-forced geometry if any, else the requested geometry
    pub effective_geometry: GeometryKind,
    pub record_valid: bool,
    pub diagnostics: Diagnostics,
}

pub struct IdentityResolver {
    store: Mutex<IdentityStore>,
    catalog: Box<dyn CatalogLookup>,
}

impl IdentityResolver {
    pub fn new(store: IdentityStore, catalog: impl CatalogLookup + 'static) -> Self {
        Self {
            store: Mutex::new(store),
            catalog: Box::new(catalog),
        }
    }

    /// Load the store at `path` (once per batch)
    pub fn open(
        path: impl Into<std::path::PathBuf>,
        catalog: impl CatalogLookup + 'static,
    ) -> IdentityResult<Self> {
        Ok(Self::new(IdentityStore::load(path)?, catalog))
    }

    fn lock(&self) -> IdentityResult<MutexGuard<'_, IdentityStore>> {
        self.store.lock().map_err(|_| IdentityError::LockPoisoned)
    }

    fn check(&self, ctx: &IdentityContext, geometry: GeometryKind) -> (Diagnostics, GeometryKind) {
        let mut diagnostics = Diagnostics::default();
        let mut effective = geometry;

        if ctx.tag.trim().is_empty() {
            diagnostics.error("identity tag is empty");
        }
        if !geometry.is_known() {
            diagnostics.warning(format!("unknown geometry kind '{}'", ctx.geometry_kind));
        }
        if let Some(reference) = ctx.catalog_reference.as_deref().filter(|r| !r.is_empty()) {
            match self.catalog.lookup(reference) {
                Some(entry) => {
                    if let Some(forced) = entry.forced_geometry {
                        if forced != geometry {
                            diagnostics.message(format!(
                                "catalog '{}' forces geometry {}",
                                entry.reference, forced
                            ));
                        }
                        effective = forced;
                    }
                }
                None => diagnostics.warning(format!(
                    "catalog reference '{}' cannot be resolved",
                    reference
                )),
            }
        }

        (diagnostics, effective)
    }

    /// Look up or create the identity record for one element
    ///
    /// # Errors
    /// Only `LockPoisoned`; consistency problems are record diagnostics.
    pub fn resolve(&self, ctx: &IdentityContext) -> IdentityResult<IdentityResolution> {
        let geometry = GeometryKind::parse(&ctx.geometry_kind);
        let (mut diagnostics, effective_geometry) = self.check(ctx, geometry);

        let (source_file, file_version) = match ctx.source_file.as_deref() {
            Some(file) => {
                let (stripped, version) = split_source_version(file);
                (Some(stripped), version)
            }
            None => (None, None),
        };
        let source_version = ctx.source_version.clone().or(file_version);
        let key = ResolutionKey::new(&ctx.tag, geometry, &ctx.owner_model_name);

        let mut store = self.lock()?;

        let mut existing_id = None;
        if let Some(known_id) = ctx.known_id.as_deref() {
            match store.get(known_id) {
                Some(record) if record.tag == ctx.tag => existing_id = Some(known_id.to_string()),
                Some(record) => diagnostics.error(format!(
                    "identity corruption: id {} holds tag '{}', not '{}'",
                    known_id, record.tag, ctx.tag
                )),
                None => diagnostics.message(format!("known id {} not in store", known_id)),
            }
        }
        if existing_id.is_none() {
            existing_id = store.find(&key).map(str::to_string);
        }

        let record_valid = !diagnostics.has_errors();
        let restored = existing_id.as_deref().and_then(|id| store.get_mut(id));
        let resolution = match restored {
            Some(record) => {
                let id = record.id.clone();
                record.generated_name = ctx.generated_name.clone();
                record.description = ctx.description.clone();
                record.catalog_reference = ctx.catalog_reference.clone();
                record.reference_number = ctx.reference_number.clone();
                record.source_file = source_file;
                record.source_version = source_version;
                record.suffix_letter = suffix_letter(&ctx.tag);
                record.updated_at = time::monotonic_after(record.updated_at);
                record.is_valid = record_valid;
                record.diagnostics = diagnostics.clone();

                tracing::debug!(id = %id, tag = %ctx.tag, "Identity restored");
                IdentityResolution {
                    identity_id: id,
                    was_restored: true,
                    effective_geometry,
                    record_valid,
                    diagnostics,
                }
            }
            None => {
                let prefix = counter_prefix(&ctx.base_name);
                let described = ctx.description.as_deref().and_then(increment_from_description);
                let suffix_increment = match described {
                    Some(value) => {
                        store.observe_counter(&prefix, value);
                        value
                    }
                    None => store.next_counter(&prefix),
                };

                let now = time::now();
                let id = uuid_utils::generate_id();
                store.insert(IdentityRecord {
                    id: id.clone(),
                    tag: ctx.tag.clone(),
                    geometry_kind: geometry,
                    generated_name: ctx.generated_name.clone(),
                    catalog_reference: ctx.catalog_reference.clone(),
                    reference_number: ctx.reference_number.clone(),
                    source_file,
                    source_version,
                    owner_model_name: ctx.owner_model_name.clone(),
                    suffix_letter: suffix_letter(&ctx.tag),
                    suffix_increment: Some(suffix_increment),
                    description: ctx.description.clone(),
                    is_valid: record_valid,
                    created_at: now,
                    updated_at: now,
                    diagnostics: diagnostics.clone(),
                });

                tracing::debug!(id = %id, tag = %ctx.tag, increment = suffix_increment, "Identity created");
                IdentityResolution {
                    identity_id: id,
                    was_restored: false,
                    effective_geometry,
                    record_valid,
                    diagnostics,
                }
            }
        };

        if !resolution.record_valid {
            tracing::warn!(
                id = %resolution.identity_id,
                tag = %ctx.tag,
                errors = resolution.diagnostics.errors.len(),
                "Identity record invalid"
            );
        }
        Ok(resolution)
    }

    /// Persist the store if anything changed since the last save
    ///
    /// Returns whether a save happened.
    pub fn flush(&self) -> IdentityResult<bool> {
        let mut store = self.lock()?;
        if !store.is_dirty() {
            return Ok(false);
        }
        store.save()?;
        Ok(true)
    }

    /// Copy of the stored record for `id`
    pub fn record(&self, id: &str) -> IdentityResult<Option<IdentityRecord>> {
        Ok(self.lock()?.get(id).cloned())
    }

    pub fn len(&self) -> IdentityResult<usize> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(tag: &str) -> IdentityContext {
        IdentityContext {
            tag: tag.to_string(),
            geometry_kind: "Box".to_string(),
            owner_model_name: "ModelA".to_string(),
            generated_name: tag.replace(['.', '-'], "_"),
            base_name: tag.split('-').next().unwrap_or_default().to_string(),
            ..Default::default()
        }
    }

    fn resolver(dir: &TempDir) -> IdentityResolver {
        IdentityResolver::open(dir.path().join("store.json"), KnownCatalog::new()).unwrap()
    }

    #[test]
    fn test_same_key_restores_same_id() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);

        let first = resolver.resolve(&context("PCM01.MHS01.MFS01.STR01-ME_SDE")).unwrap();
        let second = resolver.resolve(&context("PCM01.MHS01.MFS01.STR01-ME_SDE")).unwrap();

        assert!(!first.was_restored);
        assert!(second.was_restored);
        assert_eq!(first.identity_id, second.identity_id);
        assert_eq!(resolver.len().unwrap(), 1);
    }

    #[test]
    fn test_geometry_is_part_of_key() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);

        let boxed = resolver.resolve(&context("PCM01.MHS01-ME")).unwrap();
        let mut cylinder = context("PCM01.MHS01-ME");
        cylinder.geometry_kind = "Cylinder".to_string();
        let other = resolver.resolve(&cylinder).unwrap();

        assert_ne!(boxed.identity_id, other.identity_id);
    }

    #[test]
    fn test_update_in_place_keeps_created_at() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);

        let mut ctx = context("PCM01.MHS01.MFS01.STR01-ME_SDE");
        ctx.source_file = Some("PlantA_v03.xml".to_string());
        let first = resolver.resolve(&ctx).unwrap();
        let created = resolver.record(&first.identity_id).unwrap().unwrap();

        ctx.description = Some("Storage bin".to_string());
        ctx.source_file = Some("PlantA_v04.xml".to_string());
        resolver.resolve(&ctx).unwrap();
        let updated = resolver.record(&first.identity_id).unwrap().unwrap();

        assert_eq!(created.source_file.as_deref(), Some("PlantA.xml"));
        assert_eq!(created.source_version.as_deref(), Some("03"));
        assert_eq!(updated.source_version.as_deref(), Some("04"));
        assert_eq!(updated.description.as_deref(), Some("Storage bin"));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_consistency_checks() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);

        let mut ctx = context("");
        ctx.geometry_kind = "blob".to_string();
        ctx.catalog_reference = Some("CAT-404".to_string());
        let resolution = resolver.resolve(&ctx).unwrap();

        assert!(!resolution.record_valid);
        assert_eq!(resolution.diagnostics.errors.len(), 1);
        assert_eq!(resolution.diagnostics.warnings.len(), 2);
        assert_eq!(resolution.effective_geometry, GeometryKind::Unknown);
    }

    #[test]
    fn test_known_id_with_other_tag_is_corruption() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);

        let first = resolver.resolve(&context("PCM01.MHS01-ME")).unwrap();
        let mut ctx = context("PCM02.UTL01-ME");
        ctx.known_id = Some(first.identity_id.clone());
        let second = resolver.resolve(&ctx).unwrap();

        assert!(!second.record_valid);
        assert_ne!(second.identity_id, first.identity_id);
        assert!(second.diagnostics.errors[0].contains("identity corruption"));
        // The original record is untouched
        let original = resolver.record(&first.identity_id).unwrap().unwrap();
        assert_eq!(original.tag, "PCM01.MHS01-ME");
        assert!(original.is_valid);
    }

    #[test]
    fn test_catalog_forces_effective_geometry() {
        let dir = TempDir::new().unwrap();
        let mut catalog = KnownCatalog::new();
        catalog.insert("VALVE-DN50", Some(GeometryKind::CatalogInstance));
        let resolver =
            IdentityResolver::open(dir.path().join("store.json"), catalog).unwrap();

        let mut ctx = context("PCM01.MHS01.MFS01.STR01-PI_PIP");
        ctx.catalog_reference = Some("valve-dn50".to_string());
        let resolution = resolver.resolve(&ctx).unwrap();

        assert_eq!(resolution.effective_geometry, GeometryKind::CatalogInstance);
        let record = resolver.record(&resolution.identity_id).unwrap().unwrap();
        assert_eq!(record.geometry_kind, GeometryKind::Box);
        assert!(resolution.record_valid);
    }

    #[test]
    fn test_increment_from_description_or_counter() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);

        let mut described = context("PCM01.MHS01.MFS01.STR01-ME_SDE");
        described.description = Some("PUMP_0012_MAIN".to_string());
        let a = resolver.resolve(&described).unwrap();

        let mut plain = context("PCM01.MHS01.MFS01.STR02-ME_SDE");
        plain.base_name = "PCM01.MHS01.MFS01.STR01".to_string();
        let b = resolver.resolve(&plain).unwrap();

        let rec_a = resolver.record(&a.identity_id).unwrap().unwrap();
        let rec_b = resolver.record(&b.identity_id).unwrap().unwrap();
        assert_eq!(rec_a.suffix_increment, Some(12));
        assert_eq!(rec_b.suffix_increment, Some(13));
    }

    #[test]
    fn test_flush_only_when_dirty() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);

        assert!(!resolver.flush().unwrap());
        resolver.resolve(&context("PCM01-ME")).unwrap();
        assert!(resolver.flush().unwrap());
        assert!(!resolver.flush().unwrap());
        assert!(dir.path().join("store.json").exists());
    }
}
