//! Property-based tests for catalog draft normalization and matching
//!
//! The deduplicator's correctness rests on the normalized
//! (title, brand, piece count) triple behaving like an identity: stable
//! under case and whitespace noise, and distinct whenever the underlying
//! product differs. These properties pin that down over random inputs.

use proptest::prelude::*;
use puzzle_exchange::catalog::CatalogDraft;

// PROPERTY TEST STRATEGIES

/// Titles with interior structure but no leading/trailing whitespace, so the
/// padded variants below are the only source of trim noise.
fn title_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z ]{0,16}[a-zA-Z]"
}

fn brand_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z]{3,10}")
}

fn piece_count_strategy() -> impl Strategy<Value = u32> {
    1u32..=5_000
}

fn draft(title: &str, brand: &Option<String>, piece_count: u32) -> CatalogDraft {
    let mut draft = CatalogDraft::new(title, piece_count);
    if let Some(brand) = brand {
        draft = draft.set_brand(brand);
    }
    draft
}

// PROPERTY TESTS
proptest! {
    /// Property: case changes and surrounding whitespace never change the
    /// identity triple, so a noisy re-listing of the same product matches
    /// the entry created from the clean draft.
    #[test]
    fn prop_identity_survives_case_and_padding(
        title in title_strategy(),
        brand in brand_strategy(),
        piece_count in piece_count_strategy(),
    ) {
        let clean = draft(&title, &brand, piece_count);

        let noisy_title = format!("  {}  ", title.to_uppercase());
        let noisy_brand = brand.as_ref().map(|b| format!(" {} ", b.to_lowercase()));
        let noisy = draft(&noisy_title, &noisy_brand, piece_count);

        prop_assert_eq!(clean.fingerprint(), noisy.fingerprint());
        prop_assert!(noisy.matches(&clean.into_entry()));
    }

    /// Property: the piece count is part of the identity; the same title and
    /// brand at a different count is a different product.
    #[test]
    fn prop_piece_count_separates_products(
        title in title_strategy(),
        brand in brand_strategy(),
        count_a in piece_count_strategy(),
        count_b in piece_count_strategy(),
    ) {
        prop_assume!(count_a != count_b);

        let a = draft(&title, &brand, count_a);
        let b = draft(&title, &brand, count_b);

        prop_assert_ne!(a.fingerprint(), b.fingerprint());
    }

    /// Property: titles that differ after normalization never match.
    #[test]
    fn prop_distinct_titles_do_not_match(
        title_a in title_strategy(),
        title_b in title_strategy(),
        brand in brand_strategy(),
        piece_count in piece_count_strategy(),
    ) {
        prop_assume!(title_a.trim().to_lowercase() != title_b.trim().to_lowercase());

        let a = draft(&title_a, &brand, piece_count);
        let b = draft(&title_b, &brand, piece_count);

        prop_assert_ne!(a.fingerprint(), b.fingerprint());
        prop_assert!(!a.matches(&b.into_entry()));
    }

    /// Property: a branded draft never collapses onto the unbranded entry
    /// for the same title.
    #[test]
    fn prop_brand_is_part_of_the_identity(
        title in title_strategy(),
        brand in "[a-zA-Z]{3,10}",
        piece_count in piece_count_strategy(),
    ) {
        let branded = draft(&title, &Some(brand), piece_count);
        let unbranded = draft(&title, &None, piece_count);

        prop_assert_ne!(branded.fingerprint(), unbranded.fingerprint());
        prop_assert!(!branded.matches(&unbranded.into_entry()));
    }

    /// Property: the derived search blob is lowercase and always contains
    /// the lowercased title.
    #[test]
    fn prop_search_text_carries_the_title(
        title in title_strategy(),
        brand in brand_strategy(),
        piece_count in piece_count_strategy(),
    ) {
        let entry = draft(&title, &brand, piece_count).into_entry();

        prop_assert!(entry.search_text.contains(&title.to_lowercase()));
        prop_assert_eq!(entry.search_text.clone(), entry.search_text.to_lowercase());
    }

    /// Property: any draft with a non-blank title and a positive piece count
    /// passes validation.
    #[test]
    fn prop_wellformed_drafts_validate(
        title in title_strategy(),
        brand in brand_strategy(),
        piece_count in piece_count_strategy(),
    ) {
        prop_assert!(draft(&title, &brand, piece_count).validate().is_ok());
    }
}
