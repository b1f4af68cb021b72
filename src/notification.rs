//! Notification records and the best-effort dispatcher that appends them.
//!
//! Delivery (push, email, in-app badge) happens outside this crate; the
//! engine only records that a user should be told about an exchange event.

use crate::store::NotificationSink;
use crate::types::{ExchangeId, NotificationId, TimeStamp, UserId};
use chrono::Utc;
use std::sync::Arc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    #[n(0)]
    ProposalReceived,
    #[n(1)]
    ProposalAccepted,
    #[n(2)]
    ProposalDeclined,
    #[n(3)]
    ExchangeCancelled,
    #[n(4)]
    ExchangeCompleted,
}

impl NotificationKind {
    // the copy table is a total mapping; adding a kind forces both matches
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::ProposalReceived => "New exchange proposal",
            NotificationKind::ProposalAccepted => "Proposal accepted",
            NotificationKind::ProposalDeclined => "Proposal declined",
            NotificationKind::ExchangeCancelled => "Exchange cancelled",
            NotificationKind::ExchangeCompleted => "Exchange completed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            NotificationKind::ProposalReceived => {
                "Someone proposed an exchange for one of your puzzles."
            }
            NotificationKind::ProposalAccepted => "Your exchange proposal was accepted.",
            NotificationKind::ProposalDeclined => "Your exchange proposal was declined.",
            NotificationKind::ExchangeCancelled => "An exchange you were part of was cancelled.",
            NotificationKind::ExchangeCompleted => "An exchange you were part of was completed.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Notification {
    #[n(0)]
    pub id: NotificationId,
    #[n(1)]
    pub user: UserId,
    #[n(2)]
    pub kind: NotificationKind,
    #[n(3)]
    pub title: String,
    #[n(4)]
    pub message: String,
    #[n(5)]
    pub exchange: ExchangeId,
    #[n(6)]
    pub read: bool,
    #[n(7)]
    pub created_at: TimeStamp<Utc>,
}

impl Notification {
    pub fn new(user: UserId, kind: NotificationKind, exchange: ExchangeId) -> Self {
        Self {
            id: NotificationId::generate(),
            user,
            kind,
            title: kind.title().to_owned(),
            message: kind.message().to_owned(),
            exchange,
            read: false,
            created_at: TimeStamp::new(),
        }
    }
}

/// Appends notification rows for exchange events. Best-effort: the exchange
/// state change is the primary effect, so a sink failure is logged and
/// swallowed rather than failing the triggering transition.
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub fn notify(&self, user: &UserId, kind: NotificationKind, exchange: &ExchangeId) {
        let notification = Notification::new(user.clone(), kind, exchange.clone());
        if let Err(err) = self.sink.append(&notification) {
            tracing::warn!(
                user = %user,
                exchange = %exchange,
                error = %err,
                "failed to record notification",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn append(&self, _: &Notification) -> Result<(), StoreError> {
            Err(StoreError::Decode("sink unavailable".into()))
        }
    }

    #[test]
    fn copy_is_defined_for_every_kind() {
        let kinds = [
            NotificationKind::ProposalReceived,
            NotificationKind::ProposalAccepted,
            NotificationKind::ProposalDeclined,
            NotificationKind::ExchangeCancelled,
            NotificationKind::ExchangeCompleted,
        ];

        for kind in kinds {
            assert!(!kind.title().is_empty());
            assert!(!kind.message().is_empty());
        }
    }

    #[test]
    fn new_notification_starts_unread() {
        let note = Notification::new(
            UserId::generate(),
            NotificationKind::ProposalReceived,
            ExchangeId::generate(),
        );

        assert!(!note.read);
        assert_eq!(note.title, NotificationKind::ProposalReceived.title());
    }

    #[test]
    fn dispatcher_swallows_sink_failures() {
        let dispatcher = NotificationDispatcher::new(Arc::new(FailingSink));

        // must not panic or propagate
        dispatcher.notify(
            &UserId::generate(),
            NotificationKind::ProposalAccepted,
            &ExchangeId::generate(),
        );
    }
}
