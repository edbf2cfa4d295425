//! Pure permission engine.
//!
//! One decision function over a tagged action table. No side effects, no I/O,
//! so the full policy is auditable here and testable in isolation. Actions
//! carry the slice of target state the decision needs (owner ids, the signed
//! flag); callers load that state before asking.

use thiserror::Error;

use banquet_core::UserId;

use crate::department::Department;
use crate::identity::Identity;

/// An operation on a target record, carrying the target state the policy
/// depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a client owned by `owner`.
    CreateClient { owner: UserId },
    /// Update a client currently owned by `owner`. `reassign_owner` is true
    /// when the update changes the owning commercial.
    UpdateClient { owner: UserId, reassign_owner: bool },
    /// Create a contract for a client owned by `client_owner`.
    CreateContract { client_owner: UserId },
    /// Update a contract handled by `commercial`. `reassign_commercial` is
    /// true when the update moves the contract to another commercial.
    UpdateContract {
        commercial: UserId,
        reassign_commercial: bool,
    },
    /// Flip a contract handled by `commercial` to signed.
    SignContract { commercial: UserId },
    /// Create an event for a contract handled by `commercial`.
    CreateEvent {
        commercial: UserId,
        contract_signed: bool,
    },
    /// Update an event's non-assignment fields; `support` is the currently
    /// assigned support user, if any.
    UpdateEvent { support: Option<UserId> },
    /// Staff (or re-staff) an event with a support user.
    AssignSupport,
    /// Create, update, or delete staff users.
    ManageUsers,
    /// Read-only listing of any entity.
    ListRecords,
}

/// Why an action was denied.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Deny {
    /// The actor's department may perform this action, but not on a record it
    /// does not own.
    #[error("actor does not own the target record")]
    NotOwner,

    /// The actor's department never performs this action.
    #[error("actor's department cannot perform this action")]
    WrongDepartment,

    /// A precondition on the target does not hold (e.g. contract not signed).
    #[error("a precondition on the target record does not hold")]
    PreconditionFailed,
}

/// Authorize an action for a validated identity.
///
/// First matching rule wins. Management passes every rule except the ones
/// that explicitly restrict it: the signed-contract precondition for event
/// creation binds every department.
pub fn authorize(identity: &Identity, action: &Action) -> Result<(), Deny> {
    let actor = identity.user_id;

    match (identity.department, *action) {
        // Listing is read-only and open to every department.
        (_, Action::ListRecords) => Ok(()),

        // The signed-before-event rule restricts Management too.
        (
            Department::Management,
            Action::CreateEvent {
                contract_signed, ..
            },
        ) => signed_precondition(contract_signed),
        (Department::Management, _) => Ok(()),

        (Department::Commercial, Action::CreateClient { owner }) => owns(actor, owner),
        (
            Department::Commercial,
            Action::UpdateClient {
                owner,
                reassign_owner,
            },
        ) => {
            if reassign_owner {
                // Ownership transfer is the Management escalation path.
                return Err(Deny::WrongDepartment);
            }
            owns(actor, owner)
        }
        (Department::Commercial, Action::CreateContract { client_owner }) => {
            owns(actor, client_owner)
        }
        (
            Department::Commercial,
            Action::UpdateContract {
                commercial,
                reassign_commercial,
            },
        ) => {
            if reassign_commercial {
                return Err(Deny::WrongDepartment);
            }
            owns(actor, commercial)
        }
        (Department::Commercial, Action::SignContract { commercial }) => owns(actor, commercial),
        (
            Department::Commercial,
            Action::CreateEvent {
                commercial,
                contract_signed,
            },
        ) => {
            owns(actor, commercial)?;
            signed_precondition(contract_signed)
        }
        (Department::Commercial, _) => Err(Deny::WrongDepartment),

        (Department::Support, Action::UpdateEvent { support }) => match support {
            Some(assigned) if assigned == actor => Ok(()),
            _ => Err(Deny::NotOwner),
        },
        (Department::Support, _) => Err(Deny::WrongDepartment),
    }
}

fn owns(actor: UserId, owner: UserId) -> Result<(), Deny> {
    if actor == owner { Ok(()) } else { Err(Deny::NotOwner) }
}

fn signed_precondition(contract_signed: bool) -> Result<(), Deny> {
    if contract_signed {
        Ok(())
    } else {
        Err(Deny::PreconditionFailed)
    }
}
