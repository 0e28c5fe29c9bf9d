// Naming Resolver
//
// Concept: Rebuild the canonical base name from structural tokens
// Synchronization: Reads TokenizationResult, outputs NamingResult
//
// Algorithm:
// 1. Walk slots Plant..Component
// 2. Each slot takes TokenizationResult::slot_token: its own base token, or
//    the accepted replacement standing in for it
// 3. Join with the structural separator; a custom-separator replacement
//    contributes its value without doubling the separator

use crate::separators::SeparatorPolicy;
use crate::types::{Diagnostics, StructuralSlot, TokenizationResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingResult {
    pub base_name: String,
    pub normalized_name: String,
    /// Slots that contributed to the base name, in order
    pub slots: Vec<StructuralSlot>,
    pub is_valid: bool,
    pub diagnostics: Diagnostics,
    pub identity_id: Option<String>,
}

pub struct NamingResolver {
    separators: SeparatorPolicy,
}

impl Default for NamingResolver {
    fn default() -> Self {
        Self::new(SeparatorPolicy::default())
    }
}

impl NamingResolver {
    pub fn new(separators: SeparatorPolicy) -> Self {
        Self { separators }
    }

    pub fn resolve(&self, tokenization: &TokenizationResult) -> NamingResult {
        let mut diagnostics = Diagnostics::default();
        let mut base_name = String::new();
        let mut slots = Vec::new();

        for slot in StructuralSlot::ALL {
            let Some(token) = tokenization.slot_token(slot) else {
                continue;
            };
            let value = match token.custom_separator {
                Some(separator) if token.is_replacement => {
                    SeparatorPolicy::ensure_leading(&token.value, separator)
                }
                _ => token.value.clone(),
            };
            SeparatorPolicy::push_joined(&mut base_name, &value, self.separators.structural);
            slots.push(slot);
        }

        let has_plant = slots.first() == Some(&StructuralSlot::Plant);
        if !has_plant {
            diagnostics.error("base name has no Plant token");
        }
        if base_name.is_empty() {
            diagnostics.warning("no structural token available for the base name");
        }

        NamingResult {
            normalized_name: self.separators.normalize(&base_name),
            base_name,
            slots,
            is_valid: has_plant,
            diagnostics,
            identity_id: None,
        }
    }
}
