//! Disposition bucket assignment tests
//!
//! Enumerates every combination of structural presence and eligibility
//! inputs and checks that bucket assignment is total and consistent.

use plantag_core::composer::SlotPresence;
use plantag_core::disposition::{assess, assign_bucket, QualityBucket, StructureFlags};
use plantag_core::{DispositionClassifier, Tokenizer};

fn presence_from_bits(bits: u8) -> SlotPresence {
    SlotPresence {
        plant: bits & 0b00001 != 0,
        unit: bits & 0b00010 != 0,
        section: bits & 0b00100 != 0,
        equipment: bits & 0b01000 != 0,
        component: bits & 0b10000 != 0,
    }
}

fn all_structures() -> Vec<StructureFlags> {
    let mut out = Vec::new();
    for bits in 0u8..32 {
        let presence = presence_from_bits(bits);
        for equipment_exempt in [false, true] {
            for recognized_tokens in [0, presence.count().max(1)] {
                out.push(StructureFlags {
                    presence,
                    equipment_exempt,
                    recognized_tokens,
                });
            }
        }
    }
    out
}

#[test]
fn test_every_combination_gets_exactly_one_bucket() {
    let mut seen = std::collections::HashSet::new();
    for structure in all_structures() {
        for is_valid in [false, true] {
            for functional in [false, true] {
                let eligibility = assess(&structure, is_valid, functional);
                let bucket = assign_bucket(&structure, &eligibility);
                assert!(QualityBucket::ALL.contains(&bucket));
                seen.insert(bucket);

                let p = &structure.presence;
                match bucket {
                    QualityBucket::Unknown => assert_eq!(structure.recognized_tokens, 0),
                    QualityBucket::FinalImport => {
                        assert!(is_valid && functional && p.plant && p.unit && p.section);
                        assert!(p.equipment || structure.equipment_exempt);
                    }
                    QualityBucket::DbLimbo => {
                        assert!(is_valid && p.plant && p.unit);
                        assert!(!eligibility.final_import);
                    }
                    QualityBucket::MdbLimbo => {
                        assert!(structure.recognized_tokens > 0);
                        assert!(!eligibility.db_limbo);
                    }
                }
            }
        }
    }
    assert_eq!(seen.len(), QualityBucket::ALL.len());
}

#[test]
fn test_final_import_implies_db_limbo_eligibility() {
    for structure in all_structures() {
        let eligibility = assess(&structure, true, true);
        if eligibility.final_import {
            assert!(eligibility.db_limbo);
        }
    }
}

#[test]
fn test_classifier_matches_pure_assignment() {
    let tokenizer = Tokenizer::default();
    let classifier = DispositionClassifier::new();
    for tag in [
        "PCM01.MHS01.MFS01.STR01",
        "PCM01.MHS01.BLD01",
        "PCM01.MHS01",
        "PCM01.MHS01.MFS01.STR01-ME_EL",
        "-ME_SDE",
        "",
    ] {
        let result = classifier.classify(Some(&tokenizer.tokenize(tag))).unwrap();
        assert_eq!(
            result.quality_bucket,
            assign_bucket(&result.structure, &result.eligibility),
            "{}",
            tag
        );
        assert_eq!(result.route, result.quality_bucket.route());
    }
}
