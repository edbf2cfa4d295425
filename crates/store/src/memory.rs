//! In-memory implementation of all repository ports.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use banquet_auth::{User, UserRepository};
use banquet_clients::{Client, ClientFilter, ClientRepository};
use banquet_contracts::{Contract, ContractFilter, ContractRepository};
use banquet_core::{ClientId, ContractId, EventId, StoreError, StoreResult, UserId};
use banquet_events::{Event, EventFilter, EventRepository};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    clients: HashMap<ClientId, Client>,
    contracts: HashMap<ContractId, Contract>,
    events: HashMap<EventId, Event>,
}

/// Hash-map backed store.
///
/// Each repository call takes the lock once, giving the same
/// one-call-one-transaction shape the real engine provides. The handle is
/// cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UserRepository for InMemoryStore {
    fn create_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.write();
        for existing in inner.users.values() {
            if existing.email == user.email {
                return Err(StoreError::conflict("email already exists"));
            }
            if existing.employee_id == user.employee_id {
                return Err(StoreError::conflict("employee id already exists"));
            }
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.write();
        if !inner.users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        for existing in inner.users.values() {
            if existing.id == user.id {
                continue;
            }
            if existing.email == user.email {
                return Err(StoreError::conflict("email already exists"));
            }
            if existing.employee_id == user.employee_id {
                return Err(StoreError::conflict("employee id already exists"));
            }
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    fn delete_user(&self, id: UserId) -> StoreResult<()> {
        match self.write().users.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read().users.get(&id).cloned())
    }

    fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.read().users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_uuid().cmp(b.id.as_uuid())));
        Ok(users)
    }
}

impl ClientRepository for InMemoryStore {
    fn create_client(&self, client: &Client) -> StoreResult<()> {
        let mut inner = self.write();
        if inner.clients.values().any(|c| c.email == client.email) {
            return Err(StoreError::conflict("client email already exists"));
        }
        inner.clients.insert(client.id, client.clone());
        Ok(())
    }

    fn update_client(&self, client: &Client) -> StoreResult<()> {
        let mut inner = self.write();
        if !inner.clients.contains_key(&client.id) {
            return Err(StoreError::NotFound);
        }
        if inner
            .clients
            .values()
            .any(|c| c.id != client.id && c.email == client.email)
        {
            return Err(StoreError::conflict("client email already exists"));
        }
        inner.clients.insert(client.id, client.clone());
        Ok(())
    }

    fn client_by_id(&self, id: ClientId) -> StoreResult<Option<Client>> {
        Ok(self.read().clients.get(&id).cloned())
    }

    fn list_clients(&self, filter: &ClientFilter) -> StoreResult<Vec<Client>> {
        let mut clients: Vec<Client> = self
            .read()
            .clients
            .values()
            .filter(|c| filter.commercial.is_none_or(|id| c.commercial == id))
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_uuid().cmp(b.id.as_uuid())));
        Ok(clients)
    }
}

impl ContractRepository for InMemoryStore {
    fn create_contract(&self, contract: &Contract) -> StoreResult<()> {
        self.write().contracts.insert(contract.id, contract.clone());
        Ok(())
    }

    fn update_contract(&self, contract: &Contract) -> StoreResult<()> {
        let mut inner = self.write();
        if !inner.contracts.contains_key(&contract.id) {
            return Err(StoreError::NotFound);
        }
        inner.contracts.insert(contract.id, contract.clone());
        Ok(())
    }

    fn contract_by_id(&self, id: ContractId) -> StoreResult<Option<Contract>> {
        Ok(self.read().contracts.get(&id).cloned())
    }

    fn list_contracts(&self, filter: &ContractFilter) -> StoreResult<Vec<Contract>> {
        let mut contracts: Vec<Contract> = self
            .read()
            .contracts
            .values()
            .filter(|c| filter.client.is_none_or(|id| c.client == id))
            .filter(|c| filter.commercial.is_none_or(|id| c.commercial == id))
            .filter(|c| filter.signed.is_none_or(|signed| c.signed == signed))
            .filter(|c| filter.has_balance.is_none_or(|wanted| c.has_balance() == wanted))
            .cloned()
            .collect();
        contracts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_uuid().cmp(b.id.as_uuid())));
        Ok(contracts)
    }
}

impl EventRepository for InMemoryStore {
    fn create_event(&self, event: &Event) -> StoreResult<()> {
        self.write().events.insert(event.id, event.clone());
        Ok(())
    }

    fn update_event(&self, event: &Event) -> StoreResult<()> {
        let mut inner = self.write();
        if !inner.events.contains_key(&event.id) {
            return Err(StoreError::NotFound);
        }
        inner.events.insert(event.id, event.clone());
        Ok(())
    }

    fn event_by_id(&self, id: EventId) -> StoreResult<Option<Event>> {
        Ok(self.read().events.get(&id).cloned())
    }

    fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .read()
            .events
            .values()
            .filter(|e| filter.contract.is_none_or(|id| e.contract == id))
            .filter(|e| filter.support.is_none_or(|id| e.support == Some(id)))
            .filter(|e| !filter.unassigned || e.support.is_none())
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.as_uuid().cmp(b.id.as_uuid())));
        Ok(events)
    }
}
