//! Proposal validation: a pure, read-only decision over the current
//! ownership/availability state. Rules run in a fixed order and the first
//! failure wins; nothing here writes to the store.

use crate::error::ExchangeError;
use crate::exchange::{ExchangeKind, ExchangeProposal};
use crate::store::{ExchangeStore, InstanceStore, UserDirectory};

pub fn validate(
    proposal: &ExchangeProposal,
    users: &dyn UserDirectory,
    instances: &dyn InstanceStore,
    exchanges: &dyn ExchangeStore,
) -> Result<(), ExchangeError> {
    if proposal.initiator == proposal.recipient {
        return Err(ExchangeError::SelfExchange);
    }

    for user in [&proposal.initiator, &proposal.recipient] {
        if !users.exists(user)? {
            return Err(ExchangeError::UnknownUser(user.clone()));
        }
    }

    let requested = instances
        .get_instance(&proposal.requested_instance)?
        .ok_or_else(|| ExchangeError::InstanceNotFound(proposal.requested_instance.clone()))?;

    if requested.owner != proposal.recipient {
        return Err(ExchangeError::Ownership {
            instance: proposal.requested_instance.clone(),
            expected_owner: proposal.recipient.clone(),
        });
    }

    match proposal.kind {
        ExchangeKind::Trade => {
            let offered_id = proposal
                .offered_instance
                .as_ref()
                .ok_or(ExchangeError::TypeMismatch {
                    kind: proposal.kind,
                })?;
            let offered = instances
                .get_instance(offered_id)?
                .ok_or_else(|| ExchangeError::InstanceNotFound(offered_id.clone()))?;
            if offered.owner != proposal.initiator {
                return Err(ExchangeError::Ownership {
                    instance: offered_id.clone(),
                    expected_owner: proposal.initiator.clone(),
                });
            }
        }
        ExchangeKind::Sale | ExchangeKind::Loan => {
            if proposal.offered_instance.is_some() {
                return Err(ExchangeError::TypeMismatch {
                    kind: proposal.kind,
                });
            }
        }
    }

    // a flag set to false means the owner has not opened the instance to
    // this kind of exchange
    if !requested.availability.permits(proposal.kind) {
        return Err(ExchangeError::Availability {
            instance: proposal.requested_instance.clone(),
            kind: proposal.kind,
        });
    }

    if exchanges
        .find_open_proposal(&proposal.initiator, &proposal.requested_instance)?
        .is_some()
    {
        return Err(ExchangeError::DuplicateProposal);
    }

    Ok(())
}
