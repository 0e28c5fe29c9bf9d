//! Code tables consumed by the tokenizer and composer
//!
//! - `codification` - authoritative structural hierarchy
//! - `definitions` - regex/vocabulary token definitions and exception categories
//! - `schemas` - suffix schemas per role/discipline

pub mod codification;
pub mod definitions;
pub mod schemas;

pub use codification::{CodeEntry, CodeTable};
pub use definitions::{CodeVocabulary, ExceptionCategory, TokenDefinition};
pub use schemas::{SchemaMatch, SuffixSchema, SuffixSchemas};

use plantag_common::config::TomlConfig;
use plantag_common::Result;

/// Every table the pipeline consults, bundled for sharing across workers
#[derive(Debug, Clone)]
pub struct CodeTables {
    pub codification: CodeTable,
    pub disciplines: CodeVocabulary,
    pub entities: CodeVocabulary,
    pub schemas: SuffixSchemas,
}

impl Default for CodeTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CodeTables {
    pub fn builtin() -> Self {
        Self {
            codification: CodeTable::builtin(),
            disciplines: CodeVocabulary::disciplines(),
            entities: CodeVocabulary::entities(),
            schemas: SuffixSchemas::builtin(),
        }
    }

    pub fn with_codification(mut self, codification: CodeTable) -> Self {
        self.codification = codification;
        self
    }

    /// Build tables from configuration: codification file and default codes
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let codification = match &config.codification_file {
            Some(path) => CodeTable::load(path)?,
            None => CodeTable::builtin(),
        };
        Ok(Self {
            codification,
            disciplines: CodeVocabulary::disciplines().with_default(&config.default_discipline)?,
            entities: CodeVocabulary::entities().with_default(&config.default_entity)?,
            schemas: SuffixSchemas::builtin(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_rejects_unknown_default() {
        let config = TomlConfig {
            default_discipline: "ZZ".to_string(),
            ..Default::default()
        };
        assert!(CodeTables::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_defaults() {
        let tables = CodeTables::from_config(&TomlConfig::default()).unwrap();
        assert_eq!(tables.disciplines.default_code(), "ME");
        assert_eq!(tables.entities.default_code(), "SDE");
        assert!(tables.codification.contains("PCM01"));
    }
}
