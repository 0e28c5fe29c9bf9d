//! Suffix schemas per (role, discipline)

use crate::composer::role::ElementRole;
use crate::types::keys;

/// Declared suffix token names for a role/discipline pair
///
/// `discipline = None` matches any discipline of the role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixSchema {
    pub role: ElementRole,
    pub discipline: Option<&'static str>,
    pub tokens: &'static [&'static str],
}

impl SuffixSchema {
    fn matches(&self, role: ElementRole, discipline: &str) -> bool {
        self.role == role
            && self
                .discipline
                .map_or(true, |d| d.eq_ignore_ascii_case(discipline))
    }
}

/// How the applicable schema was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMatch {
    Exact,
    DefaultDiscipline,
    GenericEquipment,
}

#[derive(Debug, Clone)]
pub struct SuffixSchemas {
    schemas: Vec<SuffixSchema>,
}

const GENERIC_EQUIPMENT: SuffixSchema = SuffixSchema {
    role: ElementRole::Equipment,
    discipline: None,
    tokens: &[
        keys::TAG_INCREMENTAL,
        keys::DISCIPLINE,
        keys::ENTITY,
        keys::TAG_COMPOSITE,
    ],
};

impl SuffixSchemas {
    pub fn builtin() -> Self {
        Self {
            schemas: vec![
                SuffixSchema {
                    role: ElementRole::Zone,
                    discipline: None,
                    tokens: &[keys::TAG_INCREMENTAL, keys::DISCIPLINE, keys::ENTITY],
                },
                GENERIC_EQUIPMENT,
                SuffixSchema {
                    role: ElementRole::Structure,
                    discipline: Some("ST"),
                    tokens: &[keys::DISCIPLINE, keys::ENTITY],
                },
                SuffixSchema {
                    role: ElementRole::Structure,
                    discipline: Some("CI"),
                    tokens: &[keys::DISCIPLINE, keys::ENTITY],
                },
                SuffixSchema {
                    role: ElementRole::Area,
                    discipline: Some("ME"),
                    tokens: &[keys::DISCIPLINE],
                },
                SuffixSchema {
                    role: ElementRole::Site,
                    discipline: Some("ME"),
                    tokens: &[],
                },
                SuffixSchema {
                    role: ElementRole::PlantRoot,
                    discipline: Some("ME"),
                    tokens: &[],
                },
            ],
        }
    }

    /// Resolve the schema: exact pair, then the default discipline's schema
    /// for the role, then the generic equipment schema
    pub fn resolve(
        &self,
        role: ElementRole,
        discipline: &str,
        default_discipline: &str,
    ) -> (&SuffixSchema, SchemaMatch) {
        if let Some(schema) = self.schemas.iter().find(|s| s.matches(role, discipline)) {
            return (schema, SchemaMatch::Exact);
        }
        if let Some(schema) = self
            .schemas
            .iter()
            .find(|s| s.matches(role, default_discipline))
        {
            return (schema, SchemaMatch::DefaultDiscipline);
        }
        let generic = self
            .schemas
            .iter()
            .find(|s| s.role == ElementRole::Equipment && s.discipline.is_none())
            .unwrap_or(&GENERIC_EQUIPMENT);
        (generic, SchemaMatch::GenericEquipment)
    }
}
