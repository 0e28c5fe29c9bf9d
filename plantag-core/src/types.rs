// Shared Types and Data Contracts
//
// This module defines the explicit data contracts between the stages of the
// tag resolution pipeline: the Tokenizer produces a TokenizationResult, which
// the Composer, Identity Resolver and Disposition Classifier consume read-only.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::identity::IdentityError;

// ============================================================================
// Structural hierarchy
// ============================================================================

/// Structural hierarchy level (base token slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructuralSlot {
    Plant,
    PlantUnit,
    PlantSection,
    Equipment,
    Component,
}

impl StructuralSlot {
    /// All slots, top of hierarchy first
    pub const ALL: [StructuralSlot; 5] = [
        Self::Plant,
        Self::PlantUnit,
        Self::PlantSection,
        Self::Equipment,
        Self::Component,
    ];

    /// Slots that must be filled (or reported missing) for every tag
    pub const REQUIRED: [StructuralSlot; 4] = [
        Self::Plant,
        Self::PlantUnit,
        Self::PlantSection,
        Self::Equipment,
    ];

    /// Canonical token key
    pub fn key(self) -> &'static str {
        match self {
            Self::Plant => "Plant",
            Self::PlantUnit => "PlantUnit",
            Self::PlantSection => "PlantSection",
            Self::Equipment => "Equipment",
            Self::Component => "Component",
        }
    }

    /// Depth in the hierarchy (Plant = 0)
    pub fn ordinal(self) -> usize {
        match self {
            Self::Plant => 0,
            Self::PlantUnit => 1,
            Self::PlantSection => 2,
            Self::Equipment => 3,
            Self::Component => 4,
        }
    }

    /// Slot expected at a base-part position
    pub fn from_position(position: usize) -> Option<Self> {
        Self::ALL.get(position).copied()
    }

    /// Case-insensitive key lookup
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|slot| slot.key().eq_ignore_ascii_case(key))
    }

    /// Level directly above this one
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Plant => None,
            Self::PlantUnit => Some(Self::Plant),
            Self::PlantSection => Some(Self::PlantUnit),
            Self::Equipment => Some(Self::PlantSection),
            Self::Component => Some(Self::Equipment),
        }
    }

    pub fn is_required(self) -> bool {
        self != Self::Component
    }
}

impl fmt::Display for StructuralSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Keys of non-structural tokens
pub mod keys {
    pub const DISCIPLINE: &str = "Discipline";
    pub const ENTITY: &str = "Entity";
    pub const TAG_INCREMENTAL: &str = "TagIncremental";
    pub const TAG_COMPOSITE: &str = "TagComposite";
}

/// Engineering domain hinted by a token or an exception category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    Mechanical,
    Civil,
    Structural,
    Electrical,
    Piping,
}

impl Domain {
    /// Precedence when several domains are hinted at once
    pub const PRECEDENCE: [Domain; 5] = [
        Self::Structural,
        Self::Civil,
        Self::Electrical,
        Self::Piping,
        Self::Mechanical,
    ];
}

// ============================================================================
// Tokens
// ============================================================================

/// Token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Base,
    Suffix,
}

/// Evidence source that produced a token (for provenance and scoring)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSource {
    Codification,   // score: 100 (authoritative code table)
    RegexFallback,  // score: 70 (positional pattern)
    ExceptionTable, // score: 50 (non-equipment structure)
    SuffixPattern,  // score: 60 (suffix definition)
    Unresolved,     // score: 0 (missing slot placeholder)
}

impl TokenSource {
    /// Base weight of this source on the 0–100 scale
    pub fn base_weight(self) -> f64 {
        match self {
            Self::Codification => 100.0,
            Self::RegexFallback => 70.0,
            Self::ExceptionTable => 50.0,
            Self::SuffixPattern => 60.0,
            Self::Unresolved => 0.0,
        }
    }
}

/// A single recognized fragment of a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub key: String,
    pub value: String,
    pub kind: TokenKind,
    /// Ordinal of the source part, -1 when not positional
    pub position: i32,
    pub is_missing: bool,
    pub is_replacement: bool,
    pub replaced_by: Option<String>,
    pub source: TokenSource,
    pub score: f64,
    pub custom_separator: Option<char>,
    pub domain: Option<Domain>,
}

impl Token {
    /// Structural token filling `slot`
    pub fn base(slot: StructuralSlot, value: impl Into<String>, position: i32, source: TokenSource) -> Self {
        Self {
            key: slot.key().to_string(),
            value: value.into(),
            kind: TokenKind::Base,
            position,
            is_missing: false,
            is_replacement: false,
            replaced_by: None,
            source,
            score: 0.0,
            custom_separator: None,
            domain: None,
        }
    }

    /// Suffix token (Discipline, Entity, tag fragments)
    pub fn suffix(key: impl Into<String>, value: impl Into<String>, position: i32) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind: TokenKind::Suffix,
            position,
            is_missing: false,
            is_replacement: false,
            replaced_by: None,
            source: TokenSource::SuffixPattern,
            score: 0.0,
            custom_separator: None,
            domain: None,
        }
    }

    /// Placeholder for a required slot nothing could fill
    pub fn missing(slot: StructuralSlot) -> Self {
        Self {
            key: slot.key().to_string(),
            value: String::new(),
            kind: TokenKind::Base,
            position: -1,
            is_missing: true,
            is_replacement: false,
            replaced_by: None,
            source: TokenSource::Unresolved,
            score: 0.0,
            custom_separator: None,
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: Option<Domain>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_separator(mut self, separator: Option<char>) -> Self {
        self.custom_separator = separator;
        self
    }

    /// Register this token as the stand-in for a structural slot
    pub fn mark_replacement(&mut self, slot: StructuralSlot) {
        self.is_replacement = true;
        self.replaced_by = Some(slot.key().to_string());
    }

    /// Slot this token occupies in the base name, if any
    ///
    /// Accepted replacements occupy the slot they replace; base tokens occupy
    /// their own key. Plain suffix tokens have no slot.
    pub fn target_slot(&self) -> Option<StructuralSlot> {
        if self.is_replacement {
            return self.replaced_by.as_deref().and_then(StructuralSlot::from_key);
        }
        match self.kind {
            TokenKind::Base => StructuralSlot::from_key(&self.key),
            TokenKind::Suffix => None,
        }
    }

    pub fn is_present(&self) -> bool {
        !self.is_missing && !self.value.is_empty()
    }
}

/// Token recognized but deliberately not used downstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedToken {
    pub token: Token,
    pub reason: String,
}

/// Insertion-ordered token map with case-insensitive unique keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenMap {
    entries: Vec<Token>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|t| t.key.eq_ignore_ascii_case(key))
    }

    pub fn get(&self, key: &str) -> Option<&Token> {
        self.index_of(key).map(|i| &self.entries[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    /// Insert a token whose key is not yet taken
    ///
    /// Returns the rejected token when the key already exists.
    pub fn insert(&mut self, token: Token) -> Result<(), Token> {
        if self.contains_key(&token.key) {
            return Err(token);
        }
        self.entries.push(token);
        Ok(())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Token> {
        self.index_of(key).map(move |i| &mut self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Token> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Ordered diagnostic lists, three severities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub messages: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Diagnostics {
    pub fn message(&mut self, text: impl Into<String>) {
        self.messages.push(text.into());
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.warnings.push(text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.errors.push(text.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.warnings.is_empty() && self.errors.is_empty()
    }
}

// ============================================================================
// Tokenizer output
// ============================================================================

/// Output of the Tokenizer for one raw tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizationResult {
    pub raw_input: String,
    pub normalized_input: String,
    pub tokens: TokenMap,
    pub excluded_tokens: Vec<ExcludedToken>,
    pub diagnostics: Diagnostics,
    /// Aggregate confidence, 0–100
    pub score: f64,
    pub is_valid: bool,
    pub is_consistency_checked: bool,
    /// Exception category matched in place of a structural slot
    pub exception_category: Option<String>,
    /// Element identity, assigned after identity resolution
    #[serde(default)]
    pub identity_id: Option<String>,
}

impl TokenizationResult {
    pub fn new(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            normalized_input: String::new(),
            tokens: TokenMap::new(),
            excluded_tokens: Vec::new(),
            diagnostics: Diagnostics::default(),
            score: 0.0,
            is_valid: false,
            is_consistency_checked: false,
            exception_category: None,
            identity_id: None,
        }
    }

    pub fn token(&self, key: &str) -> Option<&Token> {
        self.tokens.get(key)
    }

    /// Token under `key` that is neither missing nor empty
    pub fn present(&self, key: &str) -> Option<&Token> {
        self.tokens.get(key).filter(|t| t.is_present())
    }

    /// Accepted replacement standing in for `slot`
    pub fn replacement_for(&self, slot: StructuralSlot) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|t| t.is_replacement && t.target_slot() == Some(slot))
    }

    /// Token occupying `slot`: the present base token, else its replacement
    pub fn slot_token(&self, slot: StructuralSlot) -> Option<&Token> {
        self.present(slot.key())
            .or_else(|| self.replacement_for(slot))
    }

    pub fn is_slot_filled(&self, slot: StructuralSlot) -> bool {
        self.slot_token(slot).is_some()
    }

    /// Number of recognized (non-missing) tokens
    pub fn recognized_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_present()).count()
    }

    pub fn missing_slots(&self) -> Vec<StructuralSlot> {
        StructuralSlot::ALL
            .iter()
            .copied()
            .filter(|slot| self.tokens.get(slot.key()).is_some_and(|t| t.is_missing))
            .collect()
    }

    /// Equipment may be omitted because an exception category matched
    pub fn equipment_exempt(&self) -> bool {
        self.exception_category.is_some()
    }

    pub fn excluded(&self, key: &str) -> impl Iterator<Item = &ExcludedToken> + '_ {
        let key = key.to_string();
        self.excluded_tokens
            .iter()
            .filter(move |e| e.token.key.eq_ignore_ascii_case(&key))
    }

    /// Domains hinted by recognized tokens, in precedence order
    pub fn domains(&self) -> Vec<Domain> {
        Domain::PRECEDENCE
            .iter()
            .copied()
            .filter(|d| {
                self.tokens
                    .iter()
                    .any(|t| t.is_present() && t.domain == Some(*d))
            })
            .collect()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Hard faults: programmer-contract violations and identity store failures
///
/// Stage-level problems never surface here; they are recorded as diagnostics.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing upstream result: {0}")]
    MissingUpstream(&'static str),

    #[error("Identity store path not configured")]
    MissingStorePath,

    #[error("Identity resolution failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("Common error: {0}")]
    Common(#[from] plantag_common::Error),

    #[error("Batch worker failed: {0}")]
    Worker(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_map_keys_case_insensitive() {
        let mut map = TokenMap::new();
        map.insert(Token::suffix("Discipline", "ME", 5)).unwrap();

        let rejected = map.insert(Token::suffix("DISCIPLINE", "EL", 6)).unwrap_err();
        assert_eq!(rejected.value, "EL");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("discipline").unwrap().value, "ME");
    }

    #[test]
    fn test_target_slot_of_replacement() {
        let mut token = Token::suffix(keys::TAG_INCREMENTAL, "001", 3);
        assert_eq!(token.target_slot(), None);

        token.mark_replacement(StructuralSlot::Equipment);
        assert_eq!(token.target_slot(), Some(StructuralSlot::Equipment));
    }

    #[test]
    fn test_slot_token_prefers_present_base() {
        let mut result = TokenizationResult::new("X");
        result.tokens.insert(Token::missing(StructuralSlot::Equipment)).unwrap();
        assert!(!result.is_slot_filled(StructuralSlot::Equipment));

        let mut replacement = Token::suffix(keys::TAG_INCREMENTAL, "001", 3);
        replacement.mark_replacement(StructuralSlot::Equipment);
        result.tokens.insert(replacement).unwrap();

        assert_eq!(
            result.slot_token(StructuralSlot::Equipment).unwrap().value,
            "001"
        );
        assert_eq!(result.missing_slots(), vec![StructuralSlot::Equipment]);
    }

    #[test]
    fn test_slot_positions() {
        assert_eq!(StructuralSlot::from_position(2), Some(StructuralSlot::PlantSection));
        assert_eq!(StructuralSlot::from_position(7), None);
        assert_eq!(StructuralSlot::Equipment.parent(), Some(StructuralSlot::PlantSection));
    }
}
