//! Tokenizer and composer integration tests
//!
//! Runs raw tags end to end through tokenization and composition and checks
//! the properties every element must satisfy regardless of input shape.

use plantag_core::codes::{CodeEntry, CodeTable};
use plantag_core::composer::{ElementRole, ResolutionOrigin};
use plantag_core::types::{keys, TokenSource};
use plantag_core::{CodeTables, Composer, StructuralSlot, Tokenizer};
use std::sync::Arc;

const SAMPLE_TAGS: &[&str] = &[
    "PCM01.MHS01.MFS01.STR01",
    "PCM01.MHS01.MFS01.STR01-ME_SDE",
    "pcm01/mhs01/mfs01/str01 - el",
    "PCM01.MHS01",
    "PCM01.MHS01.BLD01",
    "PCM01.MHS01.MFS01.001.002",
    "PCM01.MHS01.MFS01.STR01-ME_EQP_A12",
    "PCM01.MHS01.MFS01.STR01.EM12",
    "PCM01.MHS01.MFS01.STR01.A12.EM12",
    "PCM01.MHS01.MFS01.STR01-ME_EL",
    "ABC12.DEF34.GHI56.PU101A",
    "PCM01.UTL01.MFS01.STR01",
    "-ME_SDE",
    "ZZZZZ",
    "",
];

#[test]
fn test_tokenization_is_deterministic() {
    let tokenizer = Tokenizer::default();
    for tag in SAMPLE_TAGS {
        let first = tokenizer.tokenize(tag);
        let second = tokenizer.tokenize(tag);
        assert_eq!(first, second, "tokenization of '{}' differs between runs", tag);
    }
}

#[test]
fn test_composition_is_deterministic() {
    let tokenizer = Tokenizer::default();
    let composer = Composer::default();
    for tag in SAMPLE_TAGS {
        let tokenization = tokenizer.tokenize(tag);
        let first = composer.compose(Some(&tokenization), None).unwrap();
        let second = composer.compose(Some(&tokenization), None).unwrap();
        assert_eq!(first, second, "composition of '{}' differs between runs", tag);
    }
}

#[test]
fn test_codification_takes_precedence_over_patterns() {
    // ABC12 also matches the Plant pattern; the table must win
    let mut table = CodeTable::builtin();
    table.insert(CodeEntry::new("ABC12", StructuralSlot::Plant, None, "Custom plant"));
    let tables = Arc::new(CodeTables::builtin().with_codification(table));

    let result = Tokenizer::new(tables).tokenize("ABC12.DEF34.GHI56.PU101A");

    assert_eq!(result.present("Plant").unwrap().source, TokenSource::Codification);
    assert_eq!(result.present("PlantUnit").unwrap().source, TokenSource::RegexFallback);
    // mean(100, 70, 70, 70)
    assert!((result.score - 77.5).abs() < 1e-9);
}

#[test]
fn test_at_most_one_replacement_per_slot() {
    let tokenizer = Tokenizer::default();
    for tag in SAMPLE_TAGS {
        let result = tokenizer.tokenize(tag);
        for slot in StructuralSlot::ALL {
            let replacements = result
                .tokens
                .iter()
                .filter(|t| {
                    t.is_replacement
                        && t.replaced_by
                            .as_deref()
                            .is_some_and(|k| k.eq_ignore_ascii_case(slot.key()))
                })
                .count();
            assert!(replacements <= 1, "'{}' has {} replacements for {}", tag, replacements, slot);
        }
    }
}

#[test]
fn test_token_keys_unique() {
    let tokenizer = Tokenizer::default();
    for tag in SAMPLE_TAGS {
        let result = tokenizer.tokenize(tag);
        let keys: Vec<String> = result.tokens.iter().map(|t| t.key.to_ascii_uppercase()).collect();
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len(), "duplicate token key in '{}'", tag);
    }
}

#[test]
fn test_scores_within_bounds() {
    let tokenizer = Tokenizer::default();
    for tag in SAMPLE_TAGS {
        let result = tokenizer.tokenize(tag);
        assert!((0.0..=100.0).contains(&result.score), "'{}' scored {}", tag, result.score);
        for token in result.tokens.iter() {
            assert!((0.0..=100.0).contains(&token.score));
        }
    }
}

#[test]
fn test_full_tags_well_formed() {
    let tokenizer = Tokenizer::default();
    let composer = Composer::default();
    for tag in SAMPLE_TAGS {
        let composition = composer
            .compose(Some(&tokenizer.tokenize(tag)), None)
            .unwrap();
        let full = composition.full_tag();

        for doubled in ["..", "--", "__", ".-", "-.", "_-", "-_"] {
            assert!(!full.contains(doubled), "'{}' composed to '{}'", tag, full);
        }
        assert!(!full.ends_with(&['.', '-', '_'][..]), "'{}' composed to '{}'", tag, full);
        assert_eq!(full, format!("{}{}", composition.tag.base_name, composition.tag.suffix));
    }
}

#[test]
fn test_storage_zone_example() {
    let tokenization = Tokenizer::default().tokenize("PCM01.MHS01.MFS01.STR01");
    let composition = Composer::default().compose(Some(&tokenization), None).unwrap();

    assert_eq!(composition.role.role, ElementRole::Zone);
    assert_eq!(composition.discipline.value, "ME");
    assert_eq!(composition.discipline.origin, ResolutionOrigin::Defaulted);
    assert_eq!(composition.entity.value, "SDE");
    assert_eq!(composition.naming.base_name, "PCM01.MHS01.MFS01.STR01");
    assert_eq!(composition.full_tag(), "PCM01.MHS01.MFS01.STR01-ME_SDE");
    assert!(composition.tag.is_valid);
}

#[test]
fn test_explicit_suffix_codes_are_local() {
    let tokenization = Tokenizer::default().tokenize("PCM01.MHS01.MFS01.STR01-EL_SDE");
    assert_eq!(tokenization.present(keys::DISCIPLINE).unwrap().value, "EL");

    let composition = Composer::default().compose(Some(&tokenization), None).unwrap();
    assert!(composition.discipline.is_local());
    assert_eq!(composition.full_tag(), "PCM01.MHS01.MFS01.STR01-EL_SDE");
}

#[test]
fn test_foreign_parent_not_inherited() {
    let tokenization = Tokenizer::default().tokenize("PCM01.MHS01.MFS01.STR01");
    let parent = plantag_core::ParentContext::new("parent-1", "QQ");
    let composition = Composer::default()
        .compose(Some(&tokenization), Some(&parent))
        .unwrap();

    assert_eq!(composition.discipline.value, "ME");
    assert_ne!(composition.discipline.origin, ResolutionOrigin::Inherited);
}

#[test]
fn test_stages_agree_on_component() {
    let tokenization = Tokenizer::default().tokenize("PCM01.MHS01.MFS01.STR01.A12.EM12");
    let composition = Composer::default().compose(Some(&tokenization), None).unwrap();

    let component = tokenization.slot_token(StructuralSlot::Component).unwrap();
    assert_eq!(component.value, "EM12");
    assert!(composition.naming.base_name.ends_with(".EM12"));
    assert!(!composition.naming.base_name.contains("A12"));
    // EM12 drives the discipline, so it must also be the named Component
    assert_eq!(composition.discipline.value, "EL");
}
