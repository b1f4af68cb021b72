//! Service layer API driving exchanges through their lifecycle.
//!
//! `ExchangeService` is the entry point the rest of the marketplace calls
//! into. It validates proposals, persists status changes, and executes the
//! effects a transition schedules: availability freezes and notification
//! rows. The transition decision itself is pure and lives on
//! [`Exchange::plan_transition`](crate::exchange::Exchange::plan_transition).

use crate::error::{ExchangeError, StoreError};
use crate::exchange::{Effect, Exchange, ExchangeAction, ExchangeProposal};
use crate::notification::{NotificationDispatcher, NotificationKind};
use crate::store::{ExchangeStore, InstanceStore, NotificationSink, ProposalSlot, UserDirectory};
use crate::types::{ExchangeId, TimeStamp, UserId};
use crate::validate;
use chrono::Utc;
use std::sync::Arc;

pub struct ExchangeService {
    users: Arc<dyn UserDirectory>,
    instances: Arc<dyn InstanceStore>,
    exchanges: Arc<dyn ExchangeStore>,
    dispatcher: NotificationDispatcher,
}

impl ExchangeService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        instances: Arc<dyn InstanceStore>,
        exchanges: Arc<dyn ExchangeStore>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            users,
            instances,
            exchanges,
            dispatcher: NotificationDispatcher::new(notifications),
        }
    }

    fn load_exchange(&self, id: &ExchangeId) -> Result<Exchange, ExchangeError> {
        self.exchanges
            .get_exchange(id)?
            .ok_or_else(|| ExchangeError::ExchangeNotFound(id.clone()))
    }

    /// Submit a new proposal. Validation fully precedes any write: a rejected
    /// proposal leaves no trace in the store.
    pub fn propose(&self, proposal: ExchangeProposal) -> Result<ExchangeId, ExchangeError> {
        validate::validate(
            &proposal,
            self.users.as_ref(),
            self.instances.as_ref(),
            self.exchanges.as_ref(),
        )?;

        let exchange = Exchange::from_proposal(proposal);

        // the store claims the open-proposal key atomically, so a concurrent
        // duplicate that slipped past the validator read still loses here
        match self.exchanges.insert_proposed(&exchange)? {
            ProposalSlot::AlreadyOpen => Err(ExchangeError::DuplicateProposal),
            ProposalSlot::Created => {
                self.dispatcher.notify(
                    &exchange.recipient,
                    NotificationKind::ProposalReceived,
                    &exchange.id,
                );
                Ok(exchange.id)
            }
        }
    }

    /// Accept a proposed exchange. Only the recipient may accept.
    pub fn accept(&self, id: &ExchangeId, acting_user: &UserId) -> Result<(), ExchangeError> {
        self.transition(id, acting_user, ExchangeAction::Accept)
    }

    /// Decline a proposed exchange, optionally with a response message.
    /// Only the recipient may decline.
    pub fn decline(
        &self,
        id: &ExchangeId,
        acting_user: &UserId,
        response_message: Option<String>,
    ) -> Result<(), ExchangeError> {
        self.transition(
            id,
            acting_user,
            ExchangeAction::Decline {
                response: response_message,
            },
        )
    }

    /// Cancel an exchange. Legal from `Proposed` (initiator only) and from
    /// `Accepted` (either party).
    pub fn cancel(&self, id: &ExchangeId, acting_user: &UserId) -> Result<(), ExchangeError> {
        self.transition(id, acting_user, ExchangeAction::Cancel)
    }

    /// Complete an accepted exchange. Either party may drive completion; the
    /// exchanged instances have their availability frozen for good.
    pub fn complete(
        &self,
        id: &ExchangeId,
        acting_user: &UserId,
        actual_date: Option<TimeStamp<Utc>>,
        tracking_info: Option<String>,
    ) -> Result<(), ExchangeError> {
        self.transition(
            id,
            acting_user,
            ExchangeAction::Complete {
                actual_date,
                tracking_info,
            },
        )
    }

    fn transition(
        &self,
        id: &ExchangeId,
        actor: &UserId,
        action: ExchangeAction,
    ) -> Result<(), ExchangeError> {
        let mut exchange = self.load_exchange(id)?;

        // decide first; an illegal or unauthorized transition returns before
        // anything is written
        let plan = exchange.plan_transition(actor, &action)?;

        match action {
            ExchangeAction::Decline { response } => exchange.response_message = response,
            ExchangeAction::Complete {
                actual_date,
                tracking_info,
            } => {
                exchange.actual_date = actual_date;
                exchange.tracking_info = tracking_info;
            }
            ExchangeAction::Accept | ExchangeAction::Cancel => {}
        }
        exchange.status = plan.next;
        exchange.updated_at = TimeStamp::new();

        self.exchanges.update(&exchange)?;

        // every effect is attempted; a failed freeze does not skip the other
        // freeze or the notification, and is reported once all ran
        let mut freeze_failure: Option<StoreError> = None;
        for effect in plan.effects {
            match effect {
                Effect::Freeze(instance) => {
                    if let Err(err) = self.instances.freeze(&instance) {
                        tracing::error!(
                            instance = %instance,
                            exchange = %exchange.id,
                            error = %err,
                            "failed to freeze instance availability",
                        );
                        freeze_failure.get_or_insert(err);
                    }
                }
                Effect::Notify { user, kind } => {
                    self.dispatcher.notify(&user, kind, &exchange.id);
                }
            }
        }

        match freeze_failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}
