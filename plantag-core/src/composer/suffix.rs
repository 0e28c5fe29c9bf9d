// Suffix Resolver
//
// Concept: Assemble the discipline/entity/tag suffix from schema rules
// Synchronization: Reads TokenizationResult + role + resolved codes, outputs SuffixResult
//
// Algorithm:
// 1. Schema lookup: (role, discipline) -> (role, default discipline) -> generic equipment
// 2. Discipline/Entity substituted directly; other declared tokens substituted
//    when present and not already standing in for a structural slot
// 3. Custom-separator values first, each with exactly one leading separator,
//    then the suffix-introducing separator and the remaining values joined
//    with the normalized separator

use super::role::ElementRole;
use crate::codes::{SchemaMatch, SuffixSchemas};
use crate::separators::SeparatorPolicy;
use crate::types::{keys, Diagnostics, TokenizationResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuffixResult {
    pub suffix: String,
    pub role: ElementRole,
    pub discipline: String,
    pub entity: String,
    /// Declared token names of the applied schema
    pub schema_tokens: Vec<String>,
    pub is_valid: bool,
    pub diagnostics: Diagnostics,
    pub identity_id: Option<String>,
}

/// Inputs the suffix depends on besides the tokenization
#[derive(Debug, Clone, Copy)]
pub struct SuffixInputs<'a> {
    pub role: ElementRole,
    pub discipline: &'a str,
    pub entity: &'a str,
    pub default_discipline: &'a str,
}

pub struct SuffixResolver<'a> {
    schemas: &'a SuffixSchemas,
    separators: SeparatorPolicy,
}

impl<'a> SuffixResolver<'a> {
    pub fn new(schemas: &'a SuffixSchemas, separators: SeparatorPolicy) -> Self {
        Self { schemas, separators }
    }

    pub fn resolve(&self, tokenization: &TokenizationResult, inputs: SuffixInputs<'_>) -> SuffixResult {
        let mut diagnostics = Diagnostics::default();
        let (schema, how) =
            self.schemas
                .resolve(inputs.role, inputs.discipline, inputs.default_discipline);

        match how {
            SchemaMatch::Exact => {}
            SchemaMatch::DefaultDiscipline => diagnostics.message(format!(
                "no {} schema for discipline {}, using {}",
                inputs.role, inputs.discipline, inputs.default_discipline
            )),
            SchemaMatch::GenericEquipment => diagnostics.warning(format!(
                "no schema for role {}, using generic equipment schema",
                inputs.role
            )),
        }

        let mut prefixed = String::new();
        let mut plain: Vec<String> = Vec::new();

        for name in schema.tokens {
            if name.eq_ignore_ascii_case(keys::DISCIPLINE) {
                if !inputs.discipline.is_empty() {
                    plain.push(inputs.discipline.to_string());
                }
                continue;
            }
            if name.eq_ignore_ascii_case(keys::ENTITY) {
                if !inputs.entity.is_empty() {
                    plain.push(inputs.entity.to_string());
                }
                continue;
            }

            let Some(token) = tokenization.present(name).filter(|t| !t.is_replacement) else {
                continue;
            };
            match token.custom_separator {
                Some(separator) => {
                    prefixed.push_str(&SeparatorPolicy::ensure_leading(&token.value, separator))
                }
                None => plain.push(token.value.clone()),
            }
        }

        let mut suffix = prefixed;
        if !plain.is_empty() {
            suffix.push(self.separators.suffix);
            suffix.push_str(&plain.join(&self.separators.normalized.to_string()));
        }

        let is_valid = !inputs.discipline.is_empty() && !inputs.entity.is_empty();
        if !is_valid {
            diagnostics.error("suffix requires both discipline and entity");
        }

        SuffixResult {
            suffix,
            role: inputs.role,
            discipline: inputs.discipline.to_string(),
            entity: inputs.entity.to_string(),
            schema_tokens: schema.tokens.iter().map(|t| t.to_string()).collect(),
            is_valid,
            diagnostics,
            identity_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn suffix_of(raw: &str, role: ElementRole, discipline: &str, entity: &str) -> SuffixResult {
        let schemas = SuffixSchemas::builtin();
        let tokenization = Tokenizer::default().tokenize(raw);
        SuffixResolver::new(&schemas, SeparatorPolicy::default()).resolve(
            &tokenization,
            SuffixInputs {
                role,
                discipline,
                entity,
                default_discipline: "ME",
            },
        )
    }

    #[test]
    fn test_zone_suffix() {
        let result = suffix_of("PCM01.MHS01.MFS01.STR01", ElementRole::Zone, "ME", "SDE");
        assert_eq!(result.suffix, "-ME_SDE");
        assert!(result.is_valid);
    }

    #[test]
    fn test_incremental_prefixed_once() {
        let result = suffix_of("PCM01.MHS01.MFS01.STR01.0042", ElementRole::Zone, "ME", "SDE");
        assert_eq!(result.suffix, ".0042-ME_SDE");
    }

    #[test]
    fn test_replacement_not_repeated_in_suffix() {
        let result = suffix_of("PCM01.MHS01.MFS01.001", ElementRole::Zone, "ME", "SDE");
        assert_eq!(result.suffix, "-ME_SDE");
    }

    #[test]
    fn test_site_suffix_empty() {
        let result = suffix_of("PCM01.MHS01", ElementRole::Site, "ME", "SDE");
        assert_eq!(result.suffix, "");
        assert!(result.is_valid);
    }

    #[test]
    fn test_area_falls_back_to_default_discipline_schema() {
        let result = suffix_of("PCM01.MHS01.MFS01", ElementRole::Area, "EL", "ELE");
        assert_eq!(result.suffix, "-EL");
        assert_eq!(result.diagnostics.messages.len(), 1);
    }

    #[test]
    fn test_invalid_without_entity() {
        let result = suffix_of("PCM01.MHS01.MFS01.STR01", ElementRole::Zone, "ME", "");
        assert_eq!(result.suffix, "-ME");
        assert!(!result.is_valid);
    }
}
