//! Tag merge: base name + suffix

use super::naming::NamingResult;
use super::suffix::SuffixResult;
use crate::types::Diagnostics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagResult {
    pub full_tag: String,
    pub base_name: String,
    pub suffix: String,
    pub is_valid: bool,
    pub diagnostics: Diagnostics,
    pub identity_id: Option<String>,
}

/// Concatenate without adding separators; Naming and Suffix embed their own
pub fn merge(naming: &NamingResult, suffix: &SuffixResult) -> TagResult {
    let mut diagnostics = Diagnostics::default();
    let full_tag = format!("{}{}", naming.base_name, suffix.suffix);

    if naming.base_name.is_empty() {
        diagnostics.error("empty base name");
    }
    if !naming.is_valid {
        diagnostics.warning("base name is invalid");
    }
    if !suffix.is_valid {
        diagnostics.warning("suffix is invalid");
    }

    TagResult {
        is_valid: naming.is_valid && suffix.is_valid && !naming.base_name.is_empty(),
        full_tag,
        base_name: naming.base_name.clone(),
        suffix: suffix.suffix.clone(),
        diagnostics,
        identity_id: None,
    }
}
