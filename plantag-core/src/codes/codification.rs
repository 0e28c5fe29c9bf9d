//! Authoritative structural code table
//!
//! Parent → child relations are known in advance; the tokenizer trusts a hit
//! in this table over any pattern-based inference.

use crate::types::StructuralSlot;
use plantag_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One codified structural element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub level: StructuralSlot,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl CodeEntry {
    pub fn new(code: &str, level: StructuralSlot, parent: Option<&str>, description: &str) -> Self {
        Self {
            code: code.to_string(),
            level,
            parent: parent.map(str::to_string),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CodeTableFile {
    #[serde(default)]
    codes: Vec<CodeEntry>,
}

/// Hierarchical code table with case-insensitive lookup
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
    index: HashMap<String, usize>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table used when no codification file is configured
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for entry in [
            CodeEntry::new("PCM01", StructuralSlot::Plant, None, "Process complex 1"),
            CodeEntry::new("MHS01", StructuralSlot::PlantUnit, Some("PCM01"), "Material handling system"),
            CodeEntry::new("MFS01", StructuralSlot::PlantSection, Some("MHS01"), "Material feed section"),
            CodeEntry::new("STR01", StructuralSlot::Equipment, Some("MFS01"), "Storage unit"),
            CodeEntry::new("PCM02", StructuralSlot::Plant, None, "Process complex 2"),
            CodeEntry::new("UTL01", StructuralSlot::PlantUnit, Some("PCM02"), "Utilities"),
            CodeEntry::new("CWS01", StructuralSlot::PlantSection, Some("UTL01"), "Cooling water section"),
            CodeEntry::new("PMP01", StructuralSlot::Equipment, Some("CWS01"), "Cooling water pump"),
        ] {
            table.insert(entry);
        }
        table
    }

    /// Insert or replace an entry (keyed by upper-cased code)
    pub fn insert(&mut self, entry: CodeEntry) {
        let key = entry.code.to_ascii_uppercase();
        match self.index.get(&key) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&CodeEntry> {
        self.index
            .get(&code.to_ascii_uppercase())
            .map(|&i| &self.entries[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `[[codes]]` TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CodeTableFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse code table failed: {}", e)))?;

        let mut table = Self::new();
        for entry in file.codes {
            if entry.code.trim().is_empty() {
                return Err(Error::Config("Code table entry with empty code".to_string()));
            }
            table.insert(entry);
        }
        Ok(table)
    }

    /// Load a code table from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read code table {} failed: {}", path.display(), e)))?;
        let table = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), codes = table.len(), "Codification table loaded");
        Ok(table)
    }
}
