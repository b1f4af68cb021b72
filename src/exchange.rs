//! Exchange records and the transition rules that drive them.
//!
//! An exchange is a single negotiation between two users over one puzzle
//! instance (two for trades). It starts in `Proposed` and moves through a
//! closed set of states; `Rejected`, `Completed` and `Cancelled` are terminal.
//! The legality of each move, who may make it, and which side effects it
//! schedules are decided here, in [`Exchange::plan_transition`], with no store
//! access. The service layer executes the returned plan.

use crate::error::ExchangeError;
use crate::notification::NotificationKind;
use crate::types::{ExchangeId, InstanceId, TimeStamp, UserId};
use chrono::Utc;
use std::fmt;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    #[n(0)]
    Trade,
    #[n(1)]
    Sale,
    #[n(2)]
    Loan,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStatus {
    #[n(0)]
    Proposed,
    #[n(1)]
    Accepted,
    #[n(2)]
    Rejected,
    #[n(3)]
    Completed,
    #[n(4)]
    Cancelled,
}

impl ExchangeStatus {
    /// No transition is legal out of a terminal status.
    pub fn is_terminal(&self) -> bool {
        match self {
            ExchangeStatus::Proposed | ExchangeStatus::Accepted => false,
            ExchangeStatus::Rejected | ExchangeStatus::Completed | ExchangeStatus::Cancelled => {
                true
            }
        }
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangeKind::Trade => "trade",
            ExchangeKind::Sale => "sale",
            ExchangeKind::Loan => "loan",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangeStatus::Proposed => "proposed",
            ExchangeStatus::Accepted => "accepted",
            ExchangeStatus::Rejected => "rejected",
            ExchangeStatus::Completed => "completed",
            ExchangeStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

// Also used for constructing drafts; the service turns it into an Exchange
// once validation passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeProposal {
    pub initiator: UserId,
    pub recipient: UserId,
    pub requested_instance: InstanceId,
    pub kind: ExchangeKind,
    pub offered_instance: Option<InstanceId>,
    pub message: Option<String>,
    pub proposed_date: Option<TimeStamp<Utc>>,
    pub shipping_method: Option<String>,
}

impl ExchangeProposal {
    pub fn new(
        initiator: UserId,
        recipient: UserId,
        requested_instance: InstanceId,
        kind: ExchangeKind,
    ) -> Self {
        Self {
            initiator,
            recipient,
            requested_instance,
            kind,
            offered_instance: None,
            message: None,
            proposed_date: None,
            shipping_method: None,
        }
    }
    pub fn set_offered_instance(mut self, instance: InstanceId) -> Self {
        self.offered_instance = Some(instance);
        self
    }
    pub fn set_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
    pub fn set_proposed_date(mut self, date: TimeStamp<Utc>) -> Self {
        self.proposed_date = Some(date);
        self
    }
    pub fn set_shipping_method(mut self, method: &str) -> Self {
        self.shipping_method = Some(method.to_owned());
        self
    }
}

/// One persisted negotiation. Never deleted; terminal records remain as the
/// audit trail of the exchange.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Exchange {
    #[n(0)]
    pub id: ExchangeId,
    #[n(1)]
    pub initiator: UserId,
    #[n(2)]
    pub recipient: UserId,
    #[n(3)]
    pub requested_instance: InstanceId,
    #[n(4)]
    pub offered_instance: Option<InstanceId>,
    #[n(5)]
    pub kind: ExchangeKind,
    #[n(6)]
    pub status: ExchangeStatus,
    #[n(7)]
    pub message: Option<String>,
    #[n(8)]
    pub response_message: Option<String>,
    #[n(9)]
    pub proposed_date: Option<TimeStamp<Utc>>,
    #[n(10)]
    pub actual_date: Option<TimeStamp<Utc>>,
    #[n(11)]
    pub shipping_method: Option<String>,
    #[n(12)]
    pub tracking_info: Option<String>,
    #[n(13)]
    pub created_at: TimeStamp<Utc>,
    #[n(14)]
    pub updated_at: TimeStamp<Utc>,
}

/// A transition requested by one of the parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeAction {
    Accept,
    Decline {
        response: Option<String>,
    },
    Cancel,
    Complete {
        actual_date: Option<TimeStamp<Utc>>,
        tracking_info: Option<String>,
    },
}

impl ExchangeAction {
    pub fn name(&self) -> &'static str {
        match self {
            ExchangeAction::Accept => "accept",
            ExchangeAction::Decline { .. } => "decline",
            ExchangeAction::Cancel => "cancel",
            ExchangeAction::Complete { .. } => "complete",
        }
    }
}

/// Side effects scheduled by a legal transition, applied by the service after
/// the status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Freeze(InstanceId),
    Notify {
        user: UserId,
        kind: NotificationKind,
    },
}

/// The outcome of a legal transition: the next status plus the effects to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub next: ExchangeStatus,
    pub effects: Vec<Effect>,
}

impl Exchange {
    pub fn from_proposal(proposal: ExchangeProposal) -> Self {
        let now = TimeStamp::new();
        Self {
            id: ExchangeId::generate(),
            initiator: proposal.initiator,
            recipient: proposal.recipient,
            requested_instance: proposal.requested_instance,
            offered_instance: proposal.offered_instance,
            kind: proposal.kind,
            status: ExchangeStatus::Proposed,
            message: proposal.message,
            response_message: None,
            proposed_date: proposal.proposed_date,
            actual_date: None,
            shipping_method: proposal.shipping_method,
            tracking_info: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The party other than `user`. Callers must have checked that `user` is
    /// one of the two parties.
    fn counter_party(&self, user: &UserId) -> UserId {
        if *user == self.initiator {
            self.recipient.clone()
        } else {
            self.initiator.clone()
        }
    }

    /// Pure transition decision: checks that the actor is a party, that the
    /// move is legal from the current status, and that the actor holds the
    /// right role for it, then returns the plan. Performs no writes.
    pub fn plan_transition(
        &self,
        actor: &UserId,
        action: &ExchangeAction,
    ) -> Result<TransitionPlan, ExchangeError> {
        if *actor != self.initiator && *actor != self.recipient {
            return Err(ExchangeError::NotAuthorized {
                actor: actor.clone(),
            });
        }

        let illegal = || ExchangeError::InvalidStateTransition {
            from: self.status,
            action: action.name(),
        };
        let wrong_party = || ExchangeError::NotAuthorized {
            actor: actor.clone(),
        };

        match (self.status, action) {
            (ExchangeStatus::Proposed, ExchangeAction::Accept) => {
                if *actor != self.recipient {
                    return Err(wrong_party());
                }
                Ok(TransitionPlan {
                    next: ExchangeStatus::Accepted,
                    effects: vec![Effect::Notify {
                        user: self.initiator.clone(),
                        kind: NotificationKind::ProposalAccepted,
                    }],
                })
            }
            (ExchangeStatus::Proposed, ExchangeAction::Decline { .. }) => {
                if *actor != self.recipient {
                    return Err(wrong_party());
                }
                Ok(TransitionPlan {
                    next: ExchangeStatus::Rejected,
                    effects: vec![Effect::Notify {
                        user: self.initiator.clone(),
                        kind: NotificationKind::ProposalDeclined,
                    }],
                })
            }
            (ExchangeStatus::Proposed, ExchangeAction::Cancel) => {
                // before acceptance only the initiator can withdraw
                if *actor != self.initiator {
                    return Err(wrong_party());
                }
                Ok(TransitionPlan {
                    next: ExchangeStatus::Cancelled,
                    effects: vec![Effect::Notify {
                        user: self.recipient.clone(),
                        kind: NotificationKind::ExchangeCancelled,
                    }],
                })
            }
            (ExchangeStatus::Accepted, ExchangeAction::Cancel) => Ok(TransitionPlan {
                next: ExchangeStatus::Cancelled,
                effects: vec![Effect::Notify {
                    user: self.counter_party(actor),
                    kind: NotificationKind::ExchangeCancelled,
                }],
            }),
            (ExchangeStatus::Accepted, ExchangeAction::Complete { .. }) => {
                let mut effects = vec![Effect::Freeze(self.requested_instance.clone())];
                if self.kind == ExchangeKind::Trade {
                    if let Some(offered) = &self.offered_instance {
                        effects.push(Effect::Freeze(offered.clone()));
                    }
                }
                effects.push(Effect::Notify {
                    user: self.counter_party(actor),
                    kind: NotificationKind::ExchangeCompleted,
                });
                Ok(TransitionPlan {
                    next: ExchangeStatus::Completed,
                    effects,
                })
            }
            _ => Err(illegal()),
        }
    }
}
