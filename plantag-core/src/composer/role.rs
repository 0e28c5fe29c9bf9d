// Role Resolver
//
// Concept: Map the combination of occupied structural slots to an element role
// Synchronization: Reads TokenizationResult + resolved discipline, outputs RoleResult
//
// Algorithm:
// 1. Exact combinations: any Component -> Equipment, {P,U,S,E} -> Zone,
//    {P,U,S} -> Structure/Area (by discipline), {P,U} -> Site, {P} -> PlantRoot
// 2. Otherwise a slot-count ladder for partially missing input, which keeps
//    the same discipline-conditioned branch for three slots

use super::discipline::is_structural;
use crate::types::{Diagnostics, StructuralSlot, TokenizationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementRole {
    PlantRoot,
    Site,
    Area,
    Structure,
    Zone,
    Equipment,
    Unknown,
}

impl ElementRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlantRoot => "PlantRoot",
            Self::Site => "Site",
            Self::Area => "Area",
            Self::Structure => "Structure",
            Self::Zone => "Zone",
            Self::Equipment => "Equipment",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occupied structural slots of one element (replacements count)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPresence {
    pub plant: bool,
    pub unit: bool,
    pub section: bool,
    pub equipment: bool,
    pub component: bool,
}

impl SlotPresence {
    pub fn from_tokenization(tokenization: &TokenizationResult) -> Self {
        Self {
            plant: tokenization.is_slot_filled(StructuralSlot::Plant),
            unit: tokenization.is_slot_filled(StructuralSlot::PlantUnit),
            section: tokenization.is_slot_filled(StructuralSlot::PlantSection),
            equipment: tokenization.is_slot_filled(StructuralSlot::Equipment),
            component: tokenization.is_slot_filled(StructuralSlot::Component),
        }
    }

    pub fn count(&self) -> usize {
        [self.plant, self.unit, self.section, self.equipment, self.component]
            .iter()
            .filter(|present| **present)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleResult {
    pub role: ElementRole,
    pub presence: SlotPresence,
    /// Role came from the slot-count ladder rather than an exact combination
    pub from_fallback: bool,
    pub is_valid: bool,
    pub diagnostics: Diagnostics,
    pub identity_id: Option<String>,
}

fn sectional_role(discipline: &str) -> ElementRole {
    if is_structural(discipline) {
        ElementRole::Structure
    } else {
        ElementRole::Area
    }
}

/// Exact role for a slot combination, if the combination is recognized
pub fn exact_role(presence: &SlotPresence, discipline: &str) -> Option<ElementRole> {
    if presence.component {
        return Some(ElementRole::Equipment);
    }
    match (presence.plant, presence.unit, presence.section, presence.equipment) {
        (true, true, true, true) => Some(ElementRole::Zone),
        (true, true, true, false) => Some(sectional_role(discipline)),
        (true, true, false, false) => Some(ElementRole::Site),
        (true, false, false, false) => Some(ElementRole::PlantRoot),
        _ => None,
    }
}

/// Role by number of occupied slots
pub fn ladder_role(count: usize, discipline: &str) -> ElementRole {
    match count {
        0 => ElementRole::Unknown,
        1 => ElementRole::PlantRoot,
        2 => ElementRole::Site,
        3 => sectional_role(discipline),
        _ => ElementRole::Zone,
    }
}

#[derive(Debug, Default)]
pub struct RoleResolver;

impl RoleResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, tokenization: &TokenizationResult, discipline: &str) -> RoleResult {
        let presence = SlotPresence::from_tokenization(tokenization);
        let mut diagnostics = Diagnostics::default();

        let (role, from_fallback) = match exact_role(&presence, discipline) {
            Some(role) => (role, false),
            None => {
                let role = ladder_role(presence.count(), discipline);
                diagnostics.message(format!(
                    "slot combination not recognized, role {} from {} occupied slots",
                    role,
                    presence.count()
                ));
                (role, true)
            }
        };

        if role == ElementRole::Unknown {
            diagnostics.error("no structural slot occupied, role unknown");
        }

        RoleResult {
            role,
            presence,
            from_fallback,
            is_valid: !diagnostics.has_errors(),
            diagnostics,
            identity_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn role_of(raw: &str, discipline: &str) -> RoleResult {
        let tokenization = Tokenizer::default().tokenize(raw);
        RoleResolver::new().resolve(&tokenization, discipline)
    }

    #[test]
    fn test_exact_combinations() {
        assert_eq!(role_of("PCM01", "ME").role, ElementRole::PlantRoot);
        assert_eq!(role_of("PCM01.MHS01", "ME").role, ElementRole::Site);
        assert_eq!(role_of("PCM01.MHS01.MFS01", "ME").role, ElementRole::Area);
        assert_eq!(role_of("PCM01.MHS01.MFS01", "ST").role, ElementRole::Structure);
        assert_eq!(role_of("PCM01.MHS01.MFS01.STR01", "ME").role, ElementRole::Zone);
        assert_eq!(
            role_of("PCM01.MHS01.MFS01.STR01.PV101", "ME").role,
            ElementRole::Equipment
        );
    }

    #[test]
    fn test_component_always_equipment() {
        let result = role_of("PCM01.MHS01.MFS01.STR01-A12", "ME");
        assert_eq!(result.role, ElementRole::Equipment);
        assert!(!result.from_fallback);
    }

    #[test]
    fn test_ladder_keeps_discipline_branch() {
        let presence = SlotPresence {
            plant: false,
            unit: true,
            section: true,
            equipment: true,
            component: false,
        };
        assert_eq!(exact_role(&presence, "CI"), None);
        assert_eq!(ladder_role(presence.count(), "CI"), ElementRole::Structure);
        assert_eq!(ladder_role(presence.count(), "EL"), ElementRole::Area);
        assert_eq!(ladder_role(5, "EL"), ElementRole::Zone);
    }

    #[test]
    fn test_unknown_for_no_slots() {
        let result = role_of("-ME_SDE", "ME");
        assert_eq!(result.role, ElementRole::Unknown);
        assert!(result.from_fallback);
        assert!(!result.is_valid);
    }
}
