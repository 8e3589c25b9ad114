//! Duplicate detection integration tests
//!
//! End-to-end scans over small batches and the sample directory fixture,
//! plus property-based checks of the normalizer, the ratio and the resolver.

mod common;

use bizdir_dedup::{
    merge_exact_address_duplicates, ratio, CandidateGrouper, DedupConfig, DuplicateResolver,
    MatchReason, Normalizer,
};
use bizdir_domain::Record;
use common::fixtures::load_seed_sample;
use proptest::prelude::*;
use rstest::rstest;

// === Scenarios ===

#[test]
fn test_formatting_variants_of_one_address() {
    let records = vec![
        Record::new(1, "Pho Saigon")
            .with_address("123 Main St, Dallas, TX")
            .with_phone("(214) 555-0100"),
        Record::new(2, "Pho Saigon").with_address("123 Main Street, Dallas, TX"),
    ];
    let resolution = DuplicateResolver::default().find_duplicates(&records);

    assert_eq!(resolution.findings.len(), 1);
    let finding = &resolution.findings[0];
    assert_eq!(finding.reason, MatchReason::SimilarAddress);
    assert_eq!((finding.keep, finding.remove), (1, 2));
    assert_eq!(resolution.ids_to_remove, vec![2]);
}

#[test]
fn test_shared_phone_with_unrelated_names() {
    let records = vec![
        Record::new(1, "Golden Dragon")
            .with_address("456 Belt Line Rd")
            .with_phone("2145550100"),
        Record::new(2, "Kim's Alterations")
            .with_address("789 Jupiter Rd")
            .with_phone("(214) 555-0100"),
    ];
    let resolution = DuplicateResolver::default().find_duplicates(&records);

    assert_eq!(resolution.findings.len(), 1);
    assert_eq!(resolution.findings[0].reason, MatchReason::SamePhone);
}

#[test]
fn test_near_identical_names_elsewhere() {
    let records = vec![
        Record::new(1, "Pho Bistro")
            .with_address("100 Elm St")
            .with_phone("2145550122"),
        Record::new(2, "Pho Bistro 2")
            .with_address("2000 Oak Ave")
            .with_phone("4695550133"),
    ];
    let resolution = DuplicateResolver::default().find_duplicates(&records);

    assert_eq!(resolution.findings.len(), 1);
    let finding = &resolution.findings[0];
    assert_eq!(finding.reason, MatchReason::VerySimilarName);
    assert!((finding.similarity - 20.0 / 22.0).abs() < 1e-9);
}

#[test]
fn test_identical_address_unrelated_names_flagged_for_review() {
    let records = vec![
        Record::new(1, "ABC").with_address("500 Oak Rd"),
        Record::new(2, "XYZ").with_address("500 Oak Road"),
    ];
    let resolution = DuplicateResolver::default().find_duplicates(&records);

    assert_eq!(resolution.findings.len(), 1);
    let finding = &resolution.findings[0];
    assert_eq!(finding.reason, MatchReason::SimilarAddress);
    assert_eq!(finding.similarity, 0.0);
    assert!(finding.needs_review);
}

#[test]
fn test_exact_address_merge_keeps_most_reviewed() {
    let address = "3317 W Walnut St, Garland, TX 75042";
    let records = vec![
        Record::new(1, "Vietnam Plaza").with_address(address).with_review_count(10),
        Record::new(2, "Vietnam Plaza Market").with_address(address).with_review_count(50),
        Record::new(3, "Vietnam Plaza Grocery")
            .with_address(address)
            .with_review_count(5)
            .with_email("info@vietnamplaza.example"),
    ];
    let outcome = merge_exact_address_duplicates(records);

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.removed_count, 2);
    assert_eq!(outcome.records[0].id, 2);
    assert_eq!(
        outcome.records[0].email.as_deref(),
        Some("info@vietnamplaza.example")
    );
}

// === Sample directory ===

#[test]
fn test_seed_sample_findings() {
    let records = load_seed_sample();
    let resolution = DuplicateResolver::default().find_duplicates(&records);

    let summary: Vec<_> = resolution
        .findings
        .iter()
        .map(|f| (f.reason, f.record_a, f.record_b))
        .collect();
    assert_eq!(
        summary,
        vec![
            (MatchReason::SimilarAddress, 1, 2),
            (MatchReason::VerySimilarName, 5, 6),
            (MatchReason::SimilarAddress, 7, 8),
            (MatchReason::SamePhone, 3, 4),
        ]
    );
    assert_eq!(resolution.ids_to_remove, vec![2, 6, 8, 4]);
    assert_eq!(resolution.needs_review_count(), 0);
}

#[test]
fn test_seed_sample_short_phones_not_grouped() {
    // Records 10 and 11 share a 7-digit phone
    let records = load_seed_sample();
    let resolution = DuplicateResolver::default().find_duplicates(&records);
    assert!(resolution
        .findings
        .iter()
        .all(|f| f.record_a != 10 && f.record_b != 10));
}

#[test]
fn test_seed_sample_clustered() {
    let records = load_seed_sample();
    let mut config = DedupConfig::default();
    config.resolution.cluster_findings = true;
    let resolution = DuplicateResolver::new(config).unwrap().find_duplicates(&records);

    let survivors: Vec<_> = resolution.clusters.iter().map(|c| c.survivor).collect();
    assert_eq!(survivors, vec![1, 3, 5, 7]);
    assert_eq!(resolution.ids_to_remove, vec![2, 6, 8, 4]);
}

#[test]
fn test_seed_sample_merge() {
    let outcome = merge_exact_address_duplicates(load_seed_sample());

    let ids: Vec<_> = outcome.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 8, 9, 10, 11]);
    assert_eq!(outcome.removed_count, 1);

    let survivor = &outcome.records[6];
    assert_eq!(survivor.phone.as_deref(), Some("(972) 555-0144"));
    assert_eq!(survivor.slug(), Some("vietnam-plaza-market-dfw"));
    assert_eq!(outcome.merges[0].filled_fields, vec!["phone"]);
}

// === Normalization cases ===

#[rstest]
#[case("123 Main St", "123 main street")]
#[case("123 MAIN ST.", "123 main street.")]
#[case("5 S Jupiter Rd", "5 south jupiter road")]
#[case("2 E Arapaho Blvd Ste 300", "2 east arapaho boulevard suite 300")]
#[case("40 Lake Dr #B", "40 lake drive suite b")]
#[case("8 Stonebrook Ln", "8 stonebrook lane")]
#[case("", "")]
fn test_normalize_address_cases(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(Normalizer::default().normalize_address(input), expected);
}

#[rstest]
#[case("Pho Saigon", "pho saigon", 1.0)]
#[case("abc", "xyz", 0.0)]
#[case("", "", 1.0)]
#[case("abc", "", 0.0)]
fn test_ratio_cases(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
    assert_eq!(ratio(a, b), expected);
}

// === Property-Based Tests ===

fn record_strategy() -> impl Strategy<Value = (String, Option<String>, Option<String>)> {
    (
        "[A-Za-z ]{1,12}",
        proptest::option::of("[1-3]{1,2} [A-C][a-c]{0,3} (St|Rd|Ave)"),
        proptest::option::of("[0-1]{10}"),
    )
}

fn build_records(specs: Vec<(String, Option<String>, Option<String>)>) -> Vec<Record> {
    specs
        .into_iter()
        .enumerate()
        .map(|(index, (name, address, phone))| {
            let mut record = Record::new(index as i64 + 1, name);
            record.address = address;
            record.phone = phone;
            record
        })
        .collect()
}

proptest! {
    #[test]
    fn test_normalize_address_idempotent(address in "[0-9a-zA-Z .#]{0,30}") {
        let normalizer = Normalizer::default();
        let once = normalizer.normalize_address(&address);
        let twice = normalizer.normalize_address(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_ratio_symmetric(a in "[a-zA-Z ]{0,20}", b in "[a-zA-Z ]{0,20}") {
        prop_assert_eq!(ratio(&a, &b), ratio(&b, &a));
    }

    #[test]
    fn test_ratio_identity(a in "\\PC{0,20}") {
        prop_assert_eq!(ratio(&a, &a), 1.0);
    }

    #[test]
    fn test_ratio_bounded(a in "\\PC{0,20}", b in "\\PC{0,20}") {
        let score = ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score), "ratio out of bounds: {}", score);
    }

    #[test]
    fn test_short_phones_never_grouped(phones in proptest::collection::vec("[0-9]{0,9}", 0..8)) {
        let normalizer = Normalizer::default();
        let views: Vec<_> = phones
            .iter()
            .enumerate()
            .map(|(i, phone)| normalizer.view(&Record::new(i as i64, "X").with_phone(phone.clone())))
            .collect();
        prop_assert!(CandidateGrouper::default().group(&views).phone.is_empty());
    }

    #[test]
    fn test_no_finding_pairs_a_record_with_itself(
        specs in proptest::collection::vec(record_strategy(), 0..10)
    ) {
        let records = build_records(specs);
        let resolution = DuplicateResolver::default().find_duplicates(&records);
        for finding in &resolution.findings {
            prop_assert_ne!(finding.record_a, finding.record_b);
            prop_assert_ne!(finding.keep, finding.remove);
            prop_assert!((0.0..=1.0).contains(&finding.similarity));
        }
    }

    #[test]
    fn test_equal_completeness_keeps_first(a in "[A-Za-z]{1,10}", b in "[A-Za-z]{1,10}") {
        let records = vec![
            Record::new(1, a).with_phone("2145550100"),
            Record::new(2, b).with_phone("214-555-0100"),
        ];
        let resolution = DuplicateResolver::default().find_duplicates(&records);
        prop_assert_eq!(resolution.findings.len(), 1);
        prop_assert_eq!(resolution.findings[0].keep, 1);
        prop_assert_eq!(resolution.ids_to_remove.clone(), vec![2]);
    }

    #[test]
    fn test_ids_to_remove_unique(specs in proptest::collection::vec(record_strategy(), 0..10)) {
        let records = build_records(specs);
        let resolution = DuplicateResolver::default().find_duplicates(&records);
        let mut ids = resolution.ids_to_remove.clone();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), resolution.ids_to_remove.len());
    }
}
