use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use banquet_core::{ClientId, DomainError, DomainResult, Entity, StoreResult, UserId};

/// A client of the consultancy.
///
/// # Invariants
/// - Exactly one owning commercial, recorded at creation and changed only
///   through an explicit owner reassignment (Management escalation).
/// - `email` is unique across clients (enforced by the repository) and stored
///   trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    /// The owning commercial.
    pub commercial: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub commercial: UserId,
    pub created_at: DateTime<Utc>,
}

/// Partial update: `None` keeps the existing value.
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    /// Owner reassignment; Management-only, enforced by the policy layer.
    pub commercial: Option<UserId>,
}

impl ClientPatch {
    /// Whether this patch moves the client to a different owning commercial.
    pub fn reassigns_owner(&self) -> bool {
        self.commercial.is_some()
    }
}

impl Client {
    pub fn create(input: NewClient) -> DomainResult<Client> {
        Ok(Client {
            id: ClientId::new(),
            full_name: required(&input.full_name, "full name")?,
            email: normalize_email(&input.email)?,
            phone: required(&input.phone, "phone")?,
            company_name: required(&input.company_name, "company name")?,
            commercial: input.commercial,
            created_at: input.created_at,
            updated_at: input.created_at,
        })
    }

    /// Merge a partial update into a validated copy; the receiver is untouched.
    pub fn apply_patch(&self, patch: &ClientPatch, now: DateTime<Utc>) -> DomainResult<Client> {
        let mut next = self.clone();

        if let Some(full_name) = &patch.full_name {
            next.full_name = required(full_name, "full name")?;
        }
        if let Some(email) = &patch.email {
            next.email = normalize_email(email)?;
        }
        if let Some(phone) = &patch.phone {
            next.phone = required(phone, "phone")?;
        }
        if let Some(company_name) = &patch.company_name {
            next.company_name = required(company_name, "company name")?;
        }
        if let Some(commercial) = patch.commercial {
            next.commercial = commercial;
        }
        next.updated_at = now;

        Ok(next)
    }
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

/// Equality filter for client listings.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Only clients owned by this commercial.
    pub commercial: Option<UserId>,
}

/// Client store port.
pub trait ClientRepository: Send + Sync {
    fn create_client(&self, client: &Client) -> StoreResult<()>;
    fn update_client(&self, client: &Client) -> StoreResult<()>;
    fn client_by_id(&self, id: ClientId) -> StoreResult<Option<Client>>;
    fn list_clients(&self, filter: &ClientFilter) -> StoreResult<Vec<Client>>;
}
