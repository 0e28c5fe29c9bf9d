// Shared Code Resolution (Discipline / Entity)
//
// Concept: Derive one vocabulary code for an element from local evidence,
//          domain hints, an inherited parent code, or the default
// Synchronization: Reads a TokenizationResult and optional ParentContext
//
// Decision order:
// 1. Explicit token present locally
// 2. Domain context (Structural > Civil > Electrical > Piping > Mechanical)
// 3. Parent code, when it belongs to this vocabulary
// 4. Vocabulary default

use super::ParentContext;
use crate::codes::CodeVocabulary;
use crate::types::{Diagnostics, TokenizationResult};
use serde::{Deserialize, Serialize};

/// Where a resolved code came from (mutually exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOrigin {
    /// Explicit token or domain context of this element
    Local,
    /// Taken from the parent element
    Inherited,
    /// Vocabulary default
    Defaulted,
    /// Local value that disagrees with the parent's code
    Foreign,
}

/// Resolved discipline or entity code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeResolution {
    pub value: String,
    pub origin: ResolutionOrigin,
    /// Parent code considered for inheritance, if it belonged to the vocabulary
    pub inherited_value: Option<String>,
    pub is_valid: bool,
    pub diagnostics: Diagnostics,
    pub identity_id: Option<String>,
}

impl CodeResolution {
    pub fn is_local(&self) -> bool {
        matches!(self.origin, ResolutionOrigin::Local | ResolutionOrigin::Foreign)
    }
}

/// Run the four-step decision order for `token_key` against `vocabulary`
pub(crate) fn resolve_code(
    token_key: &str,
    vocabulary: &CodeVocabulary,
    tokenization: &TokenizationResult,
    parent: Option<&ParentContext>,
) -> CodeResolution {
    let mut diagnostics = Diagnostics::default();

    let inherited = parent
        .and_then(|p| p.parent_code.as_deref())
        .filter(|code| !code.trim().is_empty());
    let inherited_value = match inherited {
        Some(code) if vocabulary.contains(code) => Some(code.to_ascii_uppercase()),
        Some(code) => {
            diagnostics.message(format!(
                "parent code '{}' is not a {} code, not inherited",
                code, vocabulary.name
            ));
            None
        }
        None => None,
    };

    let local = tokenization
        .present(token_key)
        .map(|t| (t.value.to_ascii_uppercase(), "token"))
        .or_else(|| {
            tokenization
                .domains()
                .into_iter()
                .find_map(|d| vocabulary.for_domain(d))
                .map(|code| (code.to_string(), "domain context"))
        });

    let (value, origin) = match (local, &inherited_value) {
        (Some((value, via)), Some(parent_value)) if &value != parent_value => {
            diagnostics.warning(format!(
                "{} '{}' from {} differs from inherited '{}'",
                vocabulary.name, value, via, parent_value
            ));
            (value, ResolutionOrigin::Foreign)
        }
        (Some((value, via)), _) => {
            diagnostics.message(format!("{} '{}' resolved from {}", vocabulary.name, value, via));
            (value, ResolutionOrigin::Local)
        }
        (None, Some(parent_value)) => {
            diagnostics.message(format!("{} '{}' inherited", vocabulary.name, parent_value));
            (parent_value.clone(), ResolutionOrigin::Inherited)
        }
        (None, None) => {
            let value = vocabulary.default_code().to_string();
            diagnostics.message(format!("{} defaulted to '{}'", vocabulary.name, value));
            (value, ResolutionOrigin::Defaulted)
        }
    };

    CodeResolution {
        is_valid: !value.is_empty() && !diagnostics.has_errors(),
        value,
        origin,
        inherited_value,
        diagnostics,
        identity_id: None,
    }
}
