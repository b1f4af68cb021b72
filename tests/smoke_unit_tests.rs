//! Smoke Screen Unit tests for exchange engine components
//!
//! These test are unit tests that span the codebase, testing behavior in
//! isolation from integration scenarios. These are intended as smoke-screen
//! and generally test the happy-path.

use chrono::{Datelike, Timelike, Utc};
use puzzle_exchange::catalog::{CatalogDraft, CatalogEntry, Difficulty};
use puzzle_exchange::exchange::{
    Effect, Exchange, ExchangeAction, ExchangeKind, ExchangeProposal, ExchangeStatus,
};
use puzzle_exchange::notification::{Notification, NotificationKind};
use puzzle_exchange::types::{ExchangeId, InstanceId, TimeStamp, UserId};
use puzzle_exchange::utils::new_uuid_to_bech32;

// UTILS MODULE TESTS
mod utils_tests {
    use super::*;

    /// Test that new_uuid_to_bech32 generates valid bech32-encoded strings
    /// with the correct human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let result = new_uuid_to_bech32("exch_");
        assert!(result.is_ok());

        let encoded = result.unwrap();
        assert!(encoded.starts_with("exch_1"));
        assert!(encoded.len() > 10); // UUID should produce substantial output
    }

    /// Test that the function handles empty strings appropriately
    #[test]
    fn handles_empty_hrp() {
        // Empty string should fail
        let result = new_uuid_to_bech32("");
        assert!(result.is_err());
    }

    /// Test that multiple calls generate unique identifiers
    #[test]
    fn generates_unique_ids() {
        let id1 = UserId::generate();
        let id2 = UserId::generate();
        let id3 = UserId::generate();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }
}

// TYPES MODULE TESTS
mod types_tests {
    use super::*;

    /// Test that TimeStamp::new() creates a timestamp close to current time
    #[test]
    fn timestamp_new_creates_current_time() {
        let ts = TimeStamp::new();
        let now = Utc::now();

        let diff = (now - ts.to_datetime_utc()).num_seconds().abs();
        assert!(diff < 1); // Should be within 1 second
    }

    /// Test that TimeStamp can be created with specific date/time values
    #[test]
    fn timestamp_new_with_creates_specific_time() {
        let ts = TimeStamp::new_with(2024, 6, 15, 10, 30, 0);
        let dt = ts.to_datetime_utc();

        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 6);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    /// Test that TimeStamp CBOR encoding/decoding round-trips correctly
    #[test]
    fn timestamp_cbor_roundtrip() {
        let original = TimeStamp::new();

        let encoded = minicbor::to_vec(&original).unwrap();
        let decoded: TimeStamp<Utc> = minicbor::decode(&encoded).unwrap();

        assert_eq!(original, decoded);
    }
}

// CATALOG MODULE TESTS
mod catalog_tests {
    use super::*;

    /// Test that the draft builder carries every field into the entry
    #[test]
    fn draft_builder_sets_fields() {
        let entry = CatalogDraft::new("Starry Night", 1000)
            .set_brand("Ravensburger")
            .set_difficulty(Difficulty::Hard)
            .set_category("Art")
            .set_description("Van Gogh classic")
            .add_tag("impressionism")
            .add_tag("night")
            .add_image("img/starry-night.jpg")
            .into_entry();

        assert_eq!(entry.title, "Starry Night");
        assert_eq!(entry.brand.as_deref(), Some("Ravensburger"));
        assert_eq!(entry.piece_count, 1000);
        assert_eq!(entry.difficulty, Some(Difficulty::Hard));
        assert_eq!(entry.category.as_deref(), Some("Art"));
        assert_eq!(entry.tags.len(), 2);
        assert_eq!(entry.images.len(), 1);
        assert!(entry.id.as_str().starts_with("puzl_1"));
    }

    /// Test that entries round-trip through the CBOR codec
    #[test]
    fn entry_cbor_roundtrip() {
        let original = CatalogDraft::new("Starry Night", 1000)
            .set_brand("Ravensburger")
            .set_difficulty(Difficulty::Medium)
            .into_entry();

        let encoded = minicbor::to_vec(&original).unwrap();
        let decoded: CatalogEntry = minicbor::decode(&encoded).unwrap();

        assert_eq!(original, decoded);
    }

    /// Test that fingerprints only depend on the normalized identity triple
    #[test]
    fn fingerprint_ignores_descriptive_fields() {
        let plain = CatalogDraft::new("Starry Night", 1000).set_brand("Ravensburger");
        let decorated = CatalogDraft::new("Starry Night", 1000)
            .set_brand("Ravensburger")
            .set_category("Art")
            .set_description("Van Gogh classic")
            .add_tag("impressionism");

        assert_eq!(plain.fingerprint(), decorated.fingerprint());
    }
}

// EXCHANGE MODULE TESTS
mod exchange_tests {
    use super::*;

    fn sale_between(initiator: &UserId, recipient: &UserId) -> Exchange {
        Exchange::from_proposal(ExchangeProposal::new(
            initiator.clone(),
            recipient.clone(),
            InstanceId::generate(),
            ExchangeKind::Sale,
        ))
    }

    /// Test that the proposal builder carries the optional fields through
    #[test]
    fn proposal_builder_sets_fields() {
        let date = TimeStamp::new_with(2026, 9, 1, 12, 0, 0);
        let exchange = Exchange::from_proposal(
            ExchangeProposal::new(
                UserId::generate(),
                UserId::generate(),
                InstanceId::generate(),
                ExchangeKind::Loan,
            )
            .set_message("Back in two weeks?")
            .set_proposed_date(date.clone())
            .set_shipping_method("pickup"),
        );

        assert_eq!(exchange.kind, ExchangeKind::Loan);
        assert_eq!(exchange.message.as_deref(), Some("Back in two weeks?"));
        assert_eq!(exchange.proposed_date, Some(date));
        assert_eq!(exchange.shipping_method.as_deref(), Some("pickup"));
        assert!(exchange.offered_instance.is_none());
        assert_eq!(exchange.created_at, exchange.updated_at);
    }

    /// Test which party a completion notification is addressed to
    #[test]
    fn completion_notifies_whoever_did_not_act() {
        let initiator = UserId::generate();
        let recipient = UserId::generate();
        let complete = ExchangeAction::Complete {
            actual_date: None,
            tracking_info: None,
        };

        for (actor, counter_party) in [(&initiator, &recipient), (&recipient, &initiator)] {
            let mut exchange = sale_between(&initiator, &recipient);
            exchange.status = ExchangeStatus::Accepted;

            let plan = exchange.plan_transition(actor, &complete).unwrap();
            assert!(plan.effects.contains(&Effect::Notify {
                user: counter_party.clone(),
                kind: NotificationKind::ExchangeCompleted,
            }));
        }
    }

    /// Test that exchanges round-trip through the CBOR codec
    #[test]
    fn exchange_cbor_roundtrip() {
        let original = sale_between(&UserId::generate(), &UserId::generate());

        let encoded = minicbor::to_vec(&original).unwrap();
        let decoded: Exchange = minicbor::decode(&encoded).unwrap();

        assert_eq!(original, decoded);
    }

    /// Test the terminal set of the status machine
    #[test]
    fn exactly_three_statuses_are_terminal() {
        assert!(!ExchangeStatus::Proposed.is_terminal());
        assert!(!ExchangeStatus::Accepted.is_terminal());
        assert!(ExchangeStatus::Rejected.is_terminal());
        assert!(ExchangeStatus::Completed.is_terminal());
        assert!(ExchangeStatus::Cancelled.is_terminal());
    }
}

// NOTIFICATION MODULE TESTS
mod notification_tests {
    use super::*;

    /// Test that a fresh notification carries the copy for its kind
    #[test]
    fn notification_uses_the_copy_table() {
        let note = Notification::new(
            UserId::generate(),
            NotificationKind::ExchangeCancelled,
            ExchangeId::generate(),
        );

        assert_eq!(note.title, "Exchange cancelled");
        assert_eq!(note.message, NotificationKind::ExchangeCancelled.message());
        assert!(!note.read);
        assert!(note.id.as_str().starts_with("ntf_1"));
    }

    /// Test that notifications round-trip through the CBOR codec
    #[test]
    fn notification_cbor_roundtrip() {
        let original = Notification::new(
            UserId::generate(),
            NotificationKind::ProposalReceived,
            ExchangeId::generate(),
        );

        let encoded = minicbor::to_vec(&original).unwrap();
        let decoded: Notification = minicbor::decode(&encoded).unwrap();

        assert_eq!(original, decoded);
    }
}
