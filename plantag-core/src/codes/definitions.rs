//! Token definition table, exception categories and code vocabularies
//!
//! The same definition table drives both the regex base fallback and the
//! suffix recognition stage of the tokenizer.

use crate::types::{keys, Domain, StructuralSlot, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Where a definition may match, in terms of tag parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionRule {
    /// Base part at exactly this position
    Exact(usize),
    /// Base part at this position or later
    AtLeast(usize),
    /// Any part of the suffix block (after the suffix-introducing separator)
    SuffixBlock,
    /// Base part at this position or later, or any suffix-block part
    Trailing(usize),
}

impl PositionRule {
    /// `position` is `Some(i)` for base part `i`, `None` for a suffix-block part
    pub fn applies(self, position: Option<usize>) -> bool {
        match (self, position) {
            (Self::Exact(p), Some(i)) => i == p,
            (Self::AtLeast(p), Some(i)) => i >= p,
            (Self::SuffixBlock, None) => true,
            (Self::Trailing(p), Some(i)) => i >= p,
            (Self::Trailing(_), None) => true,
            _ => false,
        }
    }
}

/// How a definition recognizes a part
#[derive(Debug, Clone)]
pub enum Matcher {
    Pattern(Regex),
    /// Part must be a known discipline code
    Disciplines,
    /// Part must be a known entity code
    Entities,
}

/// One row of the token definition table
#[derive(Debug, Clone)]
pub struct TokenDefinition {
    pub key: &'static str,
    pub kind: TokenKind,
    pub position: PositionRule,
    pub matcher: Matcher,
    /// Structural slot this token may stand in for
    pub replaces: Option<StructuralSlot>,
    pub custom_separator: Option<char>,
    /// Value prefixes that hint an engineering domain
    pub domain_prefixes: &'static [(&'static str, Domain)],
}

impl TokenDefinition {
    pub fn slot(&self) -> Option<StructuralSlot> {
        StructuralSlot::from_key(self.key)
    }

    pub fn domain_for(&self, value: &str) -> Option<Domain> {
        self.domain_prefixes
            .iter()
            .find(|(prefix, _)| value.starts_with(prefix))
            .map(|(_, domain)| *domain)
    }
}

fn pattern(expr: &str) -> Matcher {
    Matcher::Pattern(Regex::new(expr).expect("token definition pattern must compile"))
}

/// Built-in token definition table
pub static TOKEN_DEFINITIONS: Lazy<Vec<TokenDefinition>> = Lazy::new(|| {
    vec![
        TokenDefinition {
            key: "Plant",
            kind: TokenKind::Base,
            position: PositionRule::Exact(0),
            matcher: pattern(r"^[A-Z]{3}\d{2}$"),
            replaces: None,
            custom_separator: None,
            domain_prefixes: &[],
        },
        TokenDefinition {
            key: "PlantUnit",
            kind: TokenKind::Base,
            position: PositionRule::Exact(1),
            matcher: pattern(r"^[A-Z]{3}\d{2}$"),
            replaces: None,
            custom_separator: None,
            domain_prefixes: &[],
        },
        TokenDefinition {
            key: "PlantSection",
            kind: TokenKind::Base,
            position: PositionRule::Exact(2),
            matcher: pattern(r"^[A-Z]{3}\d{2}$"),
            replaces: None,
            custom_separator: None,
            domain_prefixes: &[],
        },
        TokenDefinition {
            key: "Equipment",
            kind: TokenKind::Base,
            position: PositionRule::Exact(3),
            matcher: pattern(r"^[A-Z]{2,4}\d{2,3}[A-Z]?$"),
            replaces: None,
            custom_separator: None,
            domain_prefixes: &[],
        },
        TokenDefinition {
            key: "Component",
            kind: TokenKind::Base,
            position: PositionRule::AtLeast(4),
            matcher: pattern(r"^[A-Z]{2}\d{2,3}$"),
            replaces: None,
            custom_separator: None,
            domain_prefixes: &[("EM", Domain::Electrical), ("PV", Domain::Piping)],
        },
        TokenDefinition {
            key: keys::DISCIPLINE,
            kind: TokenKind::Suffix,
            position: PositionRule::SuffixBlock,
            matcher: Matcher::Disciplines,
            replaces: None,
            custom_separator: None,
            domain_prefixes: &[],
        },
        TokenDefinition {
            key: keys::ENTITY,
            kind: TokenKind::Suffix,
            position: PositionRule::SuffixBlock,
            matcher: Matcher::Entities,
            replaces: None,
            custom_separator: None,
            domain_prefixes: &[],
        },
        TokenDefinition {
            key: keys::TAG_INCREMENTAL,
            kind: TokenKind::Suffix,
            position: PositionRule::Trailing(3),
            matcher: pattern(r"^\d{2,4}$"),
            replaces: Some(StructuralSlot::Equipment),
            custom_separator: Some('.'),
            domain_prefixes: &[],
        },
        TokenDefinition {
            key: keys::TAG_COMPOSITE,
            kind: TokenKind::Suffix,
            position: PositionRule::Trailing(3),
            matcher: pattern(r"^[A-Z]\d{2,3}$"),
            replaces: Some(StructuralSlot::Component),
            custom_separator: None,
            domain_prefixes: &[],
        },
    ]
});

/// Definition used by the regex fallback for a structural slot
pub fn base_definition(slot: StructuralSlot) -> Option<&'static TokenDefinition> {
    TOKEN_DEFINITIONS
        .iter()
        .find(|d| d.kind == TokenKind::Base && d.slot() == Some(slot))
}

/// Definitions tried by suffix recognition, in recognition order
pub fn suffix_stage_definitions() -> impl Iterator<Item = &'static TokenDefinition> {
    TOKEN_DEFINITIONS.iter().filter(|d| {
        d.kind == TokenKind::Suffix || matches!(d.position, PositionRule::AtLeast(_))
    })
}

// ============================================================================
// Exception categories
// ============================================================================

/// Named non-equipment structure allowed to omit Equipment
#[derive(Debug, Clone)]
pub struct ExceptionCategory {
    pub name: &'static str,
    pub pattern: Regex,
    pub domain: Domain,
}

/// Base positions at which exception categories are tried
pub const EXCEPTION_POSITIONS: [usize; 2] = [2, 3];

pub static EXCEPTION_CATEGORIES: Lazy<Vec<ExceptionCategory>> = Lazy::new(|| {
    [
        ("Building", r"^BLD\d{2,3}$", Domain::Civil),
        ("Walkway", r"^WLK\d{2,3}$", Domain::Structural),
        ("Platform", r"^PLF\d{2,3}$", Domain::Structural),
        ("PipeRack", r"^PRK\d{2,3}$", Domain::Piping),
    ]
    .into_iter()
    .map(|(name, expr, domain)| ExceptionCategory {
        name,
        pattern: Regex::new(expr).expect("exception pattern must compile"),
        domain,
    })
    .collect()
});

pub fn match_exception(part: &str) -> Option<&'static ExceptionCategory> {
    EXCEPTION_CATEGORIES.iter().find(|c| c.pattern.is_match(part))
}

// ============================================================================
// Code vocabularies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub code: &'static str,
    pub description: &'static str,
    pub domain: Option<Domain>,
}

/// Closed list of discipline or entity codes with a default
#[derive(Debug, Clone)]
pub struct CodeVocabulary {
    pub name: &'static str,
    entries: Vec<VocabularyEntry>,
    default_code: String,
}

impl CodeVocabulary {
    pub fn disciplines() -> Self {
        Self {
            name: "discipline",
            entries: vec![
                VocabularyEntry { code: "ME", description: "Mechanical", domain: Some(Domain::Mechanical) },
                VocabularyEntry { code: "EL", description: "Electrical", domain: Some(Domain::Electrical) },
                VocabularyEntry { code: "CI", description: "Civil", domain: Some(Domain::Civil) },
                VocabularyEntry { code: "ST", description: "Structural", domain: Some(Domain::Structural) },
                VocabularyEntry { code: "PI", description: "Piping", domain: Some(Domain::Piping) },
                VocabularyEntry { code: "IN", description: "Instrumentation", domain: None },
                VocabularyEntry { code: "AR", description: "Architecture", domain: None },
            ],
            default_code: "ME".to_string(),
        }
    }

    pub fn entities() -> Self {
        Self {
            name: "entity",
            entries: vec![
                VocabularyEntry { code: "SDE", description: "Standard design element", domain: None },
                VocabularyEntry { code: "EQP", description: "Mechanical equipment", domain: Some(Domain::Mechanical) },
                VocabularyEntry { code: "STR", description: "Steel structure", domain: Some(Domain::Structural) },
                VocabularyEntry { code: "PIP", description: "Piping", domain: Some(Domain::Piping) },
                VocabularyEntry { code: "ELE", description: "Electrical equipment", domain: Some(Domain::Electrical) },
                VocabularyEntry { code: "BLD", description: "Building", domain: Some(Domain::Civil) },
                VocabularyEntry { code: "FND", description: "Foundation", domain: None },
                VocabularyEntry { code: "CBL", description: "Cable", domain: None },
            ],
            default_code: "SDE".to_string(),
        }
    }

    /// Override the default code (must belong to the vocabulary)
    pub fn with_default(mut self, code: &str) -> plantag_common::Result<Self> {
        if !self.contains(code) {
            return Err(plantag_common::Error::Config(format!(
                "Unknown default {} code '{}'",
                self.name, code
            )));
        }
        self.default_code = code.to_ascii_uppercase();
        Ok(self)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|e| e.code.eq_ignore_ascii_case(code))
    }

    pub fn for_domain(&self, domain: Domain) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.domain == Some(domain))
            .map(|e| e.code)
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }
}
