//! The lifecycle controller.
//!
//! Every operation runs as: load token from the session cache → validate the
//! session → authorize through the pure permission engine → apply an
//! invariant-preserving mutation on a working copy → persist → report
//! sensitive actions to the audit sink. Panics are caught at this boundary,
//! reported, and converted to [`CrmError::Internal`].

use std::any::Any;
use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};

use banquet_auth::{
    Action, AuthConfig, Authenticator, Department, Identity, NewUser, SessionStore,
    SessionValidator, User, UserPatch, UserRepository, authorize, password,
};
use banquet_clients::{Client, ClientFilter, ClientPatch, ClientRepository, NewClient};
use banquet_contracts::{Contract, ContractFilter, ContractPatch, ContractRepository, NewContract};
use banquet_core::{ClientId, ContractId, EventId, UserId};
use banquet_events::{Event, EventFilter, EventPatch, EventRepository, NewEvent};
use banquet_observability::{AuditAction, AuditEvent, AuditSink};

use crate::error::CrmError;

/// Input for creating a staff user.
#[derive(Debug, Clone)]
pub struct NewStaffInput {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub password: String,
}

/// Partial staff update: `None` keeps the existing value.
#[derive(Debug, Clone, Default)]
pub struct StaffPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<Department>,
    pub password: Option<String>,
}

/// Input for creating a client.
///
/// `owner` may be omitted by a Commercial actor (they become the owner);
/// Management must name the owning commercial explicitly.
#[derive(Debug, Clone)]
pub struct NewClientInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub owner: Option<UserId>,
}

/// Input for creating a contract. The handling commercial is always the
/// client's owning commercial; reassignment is a separate Management update.
#[derive(Debug, Clone)]
pub struct NewContractInput {
    pub client: ClientId,
    pub total_amount: u64,
    pub remaining_amount: u64,
}

/// Input for creating an event. Events start unstaffed; staffing is a
/// separate Management-only operation.
#[derive(Debug, Clone)]
pub struct NewEventInput {
    pub contract: ContractId,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    pub attendees: u32,
    pub notes: Option<String>,
}

/// Orchestrates every privileged operation against the repository ports, the
/// local session cache, and the audit sink.
pub struct LifecycleController<R, S, A> {
    store: R,
    sessions: S,
    audit: A,
    auth: AuthConfig,
}

impl<R, S, A> LifecycleController<R, S, A>
where
    R: UserRepository + ClientRepository + ContractRepository + EventRepository,
    S: SessionStore,
    A: AuditSink,
{
    pub fn new(store: R, sessions: S, audit: A, auth: AuthConfig) -> Self {
        Self {
            store,
            sessions,
            audit,
            auth,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Authenticate and persist the issued token to the session cache,
    /// replacing any previous session.
    pub fn login(&self, email: &str, password: &str) -> Result<Identity, CrmError> {
        self.guarded("login", || {
            let now = Utc::now();
            let token =
                Authenticator::new(&self.store, &self.auth).authenticate(email, password, now)?;
            self.sessions.save(&token)?;

            let identity = SessionValidator::new(&self.store, &self.auth).validate(&token, now)?;
            tracing::info!(user = %identity.user_id, department = %identity.department, "logged in");
            Ok(identity)
        })
    }

    /// Clear the session cache unconditionally.
    pub fn logout(&self) -> Result<(), CrmError> {
        self.sessions.clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// The identity behind the cached token, if any.
    pub fn whoami(&self) -> Result<Identity, CrmError> {
        self.current_identity()
    }

    fn current_identity(&self) -> Result<Identity, CrmError> {
        let token = self.sessions.load()?.ok_or(CrmError::NotAuthenticated)?;
        let identity =
            SessionValidator::new(&self.store, &self.auth).validate(&token, Utc::now())?;
        Ok(identity)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clients
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_client(&self, input: NewClientInput) -> Result<Client, CrmError> {
        self.guarded("create_client", || {
            let actor = self.current_identity()?;

            let owner = match input.owner {
                Some(owner) => owner,
                None if actor.department == Department::Management => {
                    return Err(CrmError::PreconditionFailed(
                        "an owning commercial must be specified".to_string(),
                    ));
                }
                None => actor.user_id,
            };

            authorize(&actor, &Action::CreateClient { owner })?;
            self.ensure_department(owner, Department::Commercial, "owning commercial")?;

            let client = Client::create(NewClient {
                full_name: input.full_name,
                email: input.email,
                phone: input.phone,
                company_name: input.company_name,
                commercial: owner,
                created_at: Utc::now(),
            })?;
            self.store.create_client(&client)?;

            tracing::info!(client = %client.id, owner = %owner, "client created");
            Ok(client)
        })
    }

    pub fn update_client(&self, id: ClientId, patch: ClientPatch) -> Result<Client, CrmError> {
        self.guarded("update_client", || {
            let actor = self.current_identity()?;
            let client = self.store.client_by_id(id)?.ok_or(CrmError::NotFound)?;

            authorize(
                &actor,
                &Action::UpdateClient {
                    owner: client.commercial,
                    reassign_owner: patch.reassigns_owner(),
                },
            )?;
            if let Some(new_owner) = patch.commercial {
                self.ensure_department(new_owner, Department::Commercial, "owning commercial")?;
            }

            let next = client.apply_patch(&patch, Utc::now())?;
            self.store.update_client(&next)?;

            tracing::info!(client = %next.id, "client updated");
            Ok(next)
        })
    }

    pub fn list_clients(&self, filter: &ClientFilter) -> Result<Vec<Client>, CrmError> {
        let actor = self.current_identity()?;
        authorize(&actor, &Action::ListRecords)?;
        Ok(self.store.list_clients(filter)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Contracts
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_contract(&self, input: NewContractInput) -> Result<Contract, CrmError> {
        self.guarded("create_contract", || {
            let actor = self.current_identity()?;
            let client = self
                .store
                .client_by_id(input.client)?
                .ok_or(CrmError::NotFound)?;

            authorize(
                &actor,
                &Action::CreateContract {
                    client_owner: client.commercial,
                },
            )?;

            let contract = Contract::create(NewContract {
                client: client.id,
                commercial: client.commercial,
                total_amount: input.total_amount,
                remaining_amount: input.remaining_amount,
                created_at: Utc::now(),
            })?;
            self.store.create_contract(&contract)?;

            tracing::info!(contract = %contract.id, client = %client.id, "contract created");
            Ok(contract)
        })
    }

    pub fn update_contract(
        &self,
        id: ContractId,
        patch: ContractPatch,
    ) -> Result<Contract, CrmError> {
        self.guarded("update_contract", || {
            let actor = self.current_identity()?;
            let contract = self.store.contract_by_id(id)?.ok_or(CrmError::NotFound)?;

            authorize(
                &actor,
                &Action::UpdateContract {
                    commercial: contract.commercial,
                    reassign_commercial: patch.reassigns_commercial(),
                },
            )?;
            if let Some(new_commercial) = patch.commercial {
                self.ensure_department(
                    new_commercial,
                    Department::Commercial,
                    "handling commercial",
                )?;
            }

            let next = contract.apply_patch(&patch)?;
            self.store.update_contract(&next)?;

            tracing::info!(contract = %next.id, "contract updated");
            Ok(next)
        })
    }

    /// The one-directional signing transition; re-signing is a no-op rather
    /// than an error, and only an actual transition is reported.
    pub fn sign_contract(&self, id: ContractId) -> Result<Contract, CrmError> {
        self.guarded("sign_contract", || {
            let actor = self.current_identity()?;
            let contract = self.store.contract_by_id(id)?.ok_or(CrmError::NotFound)?;

            authorize(
                &actor,
                &Action::SignContract {
                    commercial: contract.commercial,
                },
            )?;

            let newly_signed = !contract.is_signed();
            let signed = contract.sign();
            self.store.update_contract(&signed)?;

            if newly_signed {
                self.audit.emit(AuditEvent::new(
                    AuditAction::ContractSigned,
                    Some(actor.user_id),
                    format!(
                        "contract {} signed (client {}, total {})",
                        signed.id, signed.client, signed.total_amount
                    ),
                ));
                tracing::info!(contract = %signed.id, "contract signed");
            }
            Ok(signed)
        })
    }

    pub fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, CrmError> {
        let actor = self.current_identity()?;
        authorize(&actor, &Action::ListRecords)?;
        Ok(self.store.list_contracts(filter)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_event(&self, input: NewEventInput) -> Result<Event, CrmError> {
        self.guarded("create_event", || {
            let actor = self.current_identity()?;
            let contract = self
                .store
                .contract_by_id(input.contract)?
                .ok_or(CrmError::NotFound)?;

            authorize(
                &actor,
                &Action::CreateEvent {
                    commercial: contract.commercial,
                    contract_signed: contract.is_signed(),
                },
            )?;

            let event = Event::create(NewEvent {
                contract: contract.id,
                name: input.name,
                start: input.start,
                end: input.end,
                location: input.location,
                attendees: input.attendees,
                notes: input.notes,
            })?;
            self.store.create_event(&event)?;

            tracing::info!(event = %event.id, contract = %contract.id, "event created");
            Ok(event)
        })
    }

    /// Update an event's non-assignment fields.
    pub fn update_event(&self, id: EventId, patch: EventPatch) -> Result<Event, CrmError> {
        self.guarded("update_event", || {
            let actor = self.current_identity()?;
            let event = self.store.event_by_id(id)?.ok_or(CrmError::NotFound)?;

            authorize(
                &actor,
                &Action::UpdateEvent {
                    support: event.support,
                },
            )?;

            let next = event.apply_patch(&patch)?;
            self.store.update_event(&next)?;

            tracing::info!(event = %next.id, "event updated");
            Ok(next)
        })
    }

    /// Staff an event with a Support user; reassignment overwrites.
    pub fn assign_support(&self, id: EventId, support: UserId) -> Result<Event, CrmError> {
        self.guarded("assign_support", || {
            let actor = self.current_identity()?;
            authorize(&actor, &Action::AssignSupport)?;

            let event = self.store.event_by_id(id)?.ok_or(CrmError::NotFound)?;
            self.ensure_department(support, Department::Support, "assigned support")?;

            let next = event.with_support(support);
            self.store.update_event(&next)?;

            tracing::info!(event = %next.id, support = %support, "support assigned");
            Ok(next)
        })
    }

    pub fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, CrmError> {
        let actor = self.current_identity()?;
        authorize(&actor, &Action::ListRecords)?;
        Ok(self.store.list_events(filter)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_user(&self, input: NewStaffInput) -> Result<User, CrmError> {
        self.guarded("create_user", || {
            let actor = self.current_identity()?;
            authorize(&actor, &Action::ManageUsers)?;

            let user = User::create(NewUser {
                employee_id: input.employee_id,
                name: input.name,
                email: input.email,
                password_hash: password::hash_password(&input.password)?,
                department: input.department,
                created_at: Utc::now(),
            })?;
            self.store.create_user(&user)?;

            self.audit.emit(AuditEvent::new(
                AuditAction::UserCreated,
                Some(actor.user_id),
                format!(
                    "created user {} ({}) in {}",
                    user.name, user.email, user.department
                ),
            ));
            tracing::info!(user = %user.id, department = %user.department, "user created");
            Ok(user)
        })
    }

    pub fn update_user(&self, id: UserId, patch: StaffPatch) -> Result<User, CrmError> {
        self.guarded("update_user", || {
            let actor = self.current_identity()?;
            authorize(&actor, &Action::ManageUsers)?;

            let user = self.store.user_by_id(id)?.ok_or(CrmError::NotFound)?;

            let mut changed: Vec<&str> = Vec::new();
            if patch.name.is_some() {
                changed.push("name");
            }
            if patch.email.is_some() {
                changed.push("email");
            }
            if patch.department.is_some() {
                changed.push("department");
            }
            if patch.password.is_some() {
                changed.push("password");
            }

            let password_hash = match &patch.password {
                Some(password) => Some(password::hash_password(password)?),
                None => None,
            };
            let next = user.apply_patch(&UserPatch {
                name: patch.name,
                email: patch.email,
                department: patch.department,
                password_hash,
            })?;
            self.store.update_user(&next)?;

            self.audit.emit(AuditEvent::new(
                AuditAction::UserUpdated,
                Some(actor.user_id),
                format!("updated user {}: {}", next.name, changed.join(", ")),
            ));
            tracing::info!(user = %next.id, "user updated");
            Ok(next)
        })
    }

    /// Delete a user. Cascading is prohibited: the delete fails while the
    /// user still owns clients or contracts or is staffed on events.
    pub fn delete_user(&self, id: UserId) -> Result<(), CrmError> {
        self.guarded("delete_user", || {
            let actor = self.current_identity()?;
            authorize(&actor, &Action::ManageUsers)?;

            let user = self.store.user_by_id(id)?.ok_or(CrmError::NotFound)?;

            let owned_clients = self
                .store
                .list_clients(&ClientFilter {
                    commercial: Some(id),
                })?
                .len();
            if owned_clients > 0 {
                return Err(CrmError::PreconditionFailed(format!(
                    "user still owns {owned_clients} client(s); reassign them first"
                )));
            }

            let owned_contracts = self
                .store
                .list_contracts(&ContractFilter {
                    commercial: Some(id),
                    ..Default::default()
                })?
                .len();
            if owned_contracts > 0 {
                return Err(CrmError::PreconditionFailed(format!(
                    "user still handles {owned_contracts} contract(s); reassign them first"
                )));
            }

            let staffed_events = self
                .store
                .list_events(&EventFilter {
                    support: Some(id),
                    ..Default::default()
                })?
                .len();
            if staffed_events > 0 {
                return Err(CrmError::PreconditionFailed(format!(
                    "user is still staffed on {staffed_events} event(s); reassign them first"
                )));
            }

            self.store.delete_user(id)?;

            self.audit.emit(AuditEvent::new(
                AuditAction::UserDeleted,
                Some(actor.user_id),
                format!("deleted user {} ({})", user.name, user.email),
            ));
            tracing::info!(user = %id, "user deleted");
            Ok(())
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>, CrmError> {
        let actor = self.current_identity()?;
        authorize(&actor, &Action::ManageUsers)?;
        Ok(self.store.list_users()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Check that a referenced user exists and sits in the expected
    /// department.
    fn ensure_department(
        &self,
        id: UserId,
        department: Department,
        role: &str,
    ) -> Result<(), CrmError> {
        let user = self.store.user_by_id(id)?.ok_or_else(|| {
            CrmError::PreconditionFailed(format!("{role} user does not exist"))
        })?;
        if user.department != department {
            return Err(CrmError::PreconditionFailed(format!(
                "{role} must be in the {department} department"
            )));
        }
        Ok(())
    }

    /// Panic boundary: report and convert instead of unwinding into the
    /// command surface.
    fn guarded<T>(
        &self,
        op: &'static str,
        f: impl FnOnce() -> Result<T, CrmError>,
    ) -> Result<T, CrmError> {
        match std::panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result,
            Err(panic) => {
                let detail = panic_detail(panic.as_ref());
                tracing::error!(op, detail = %detail, "operation panicked");
                self.audit.emit(AuditEvent::new(
                    AuditAction::InternalError,
                    None,
                    format!("{op}: {detail}"),
                ));
                Err(CrmError::Internal)
            }
        }
    }
}

fn panic_detail(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
