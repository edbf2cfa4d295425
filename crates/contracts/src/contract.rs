use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use banquet_core::{ClientId, ContractId, DomainError, DomainResult, Entity, StoreResult, UserId};

/// A consulting contract.
///
/// Amounts are in the smallest currency unit (e.g., cents).
///
/// # Invariants
/// - `remaining_amount <= total_amount` at all times; the remaining balance
///   only decreases or stays constant over the contract's life.
/// - `signed` is monotonic: once true it never reverts. The only way to set
///   it is [`Contract::sign`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub client: ClientId,
    /// The handling commercial; equals the client's owning commercial at
    /// creation, reassignable only by Management.
    pub commercial: UserId,
    pub total_amount: u64,
    pub remaining_amount: u64,
    pub signed: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Contract {
    type Id = ContractId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a contract. Always starts unsigned.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub client: ClientId,
    pub commercial: UserId,
    pub total_amount: u64,
    pub remaining_amount: u64,
    pub created_at: DateTime<Utc>,
}

/// Partial update: `None` keeps the existing value.
///
/// The signed flag is deliberately absent; signing goes through
/// [`Contract::sign`] so the transition stays one-directional.
#[derive(Debug, Clone, Default)]
pub struct ContractPatch {
    pub total_amount: Option<u64>,
    pub remaining_amount: Option<u64>,
    /// Commercial reassignment; Management-only, enforced by the policy layer.
    pub commercial: Option<UserId>,
}

impl ContractPatch {
    /// Whether this patch moves the contract to a different commercial.
    pub fn reassigns_commercial(&self) -> bool {
        self.commercial.is_some()
    }
}

impl Contract {
    pub fn create(input: NewContract) -> DomainResult<Contract> {
        check_amounts(input.total_amount, input.remaining_amount)?;

        Ok(Contract {
            id: ContractId::new(),
            client: input.client,
            commercial: input.commercial,
            total_amount: input.total_amount,
            remaining_amount: input.remaining_amount,
            signed: false,
            created_at: input.created_at,
        })
    }

    /// Merge a partial update into a validated copy; the receiver is untouched.
    ///
    /// The amount bounds are re-checked on the merged result, so an update
    /// that would leave `remaining_amount > total_amount` fails as a whole.
    pub fn apply_patch(&self, patch: &ContractPatch) -> DomainResult<Contract> {
        let mut next = self.clone();

        if let Some(total) = patch.total_amount {
            next.total_amount = total;
        }
        if let Some(remaining) = patch.remaining_amount {
            next.remaining_amount = remaining;
        }
        if let Some(commercial) = patch.commercial {
            next.commercial = commercial;
        }

        check_amounts(next.total_amount, next.remaining_amount)?;
        Ok(next)
    }

    /// The one-directional signing transition.
    ///
    /// Re-signing an already-signed contract returns an identical copy, so
    /// the operation is idempotent rather than an error.
    pub fn sign(&self) -> Contract {
        Contract {
            signed: true,
            ..self.clone()
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Whether anything is still owed on this contract.
    pub fn has_balance(&self) -> bool {
        self.remaining_amount > 0
    }
}

fn check_amounts(total: u64, remaining: u64) -> DomainResult<()> {
    if total == 0 {
        return Err(DomainError::validation("total amount must be positive"));
    }
    if remaining > total {
        return Err(DomainError::invariant(
            "remaining amount cannot exceed total amount",
        ));
    }
    Ok(())
}

/// Equality filter for contract listings.
#[derive(Debug, Clone, Default)]
pub struct ContractFilter {
    pub client: Option<ClientId>,
    pub commercial: Option<UserId>,
    pub signed: Option<bool>,
    /// `Some(true)`: only contracts with a remaining balance;
    /// `Some(false)`: only fully paid ones.
    pub has_balance: Option<bool>,
}

/// Contract store port.
pub trait ContractRepository: Send + Sync {
    fn create_contract(&self, contract: &Contract) -> StoreResult<()>;
    fn update_contract(&self, contract: &Contract) -> StoreResult<()>;
    fn contract_by_id(&self, id: ContractId) -> StoreResult<Option<Contract>>;
    fn list_contracts(&self, filter: &ContractFilter) -> StoreResult<Vec<Contract>>;
}
