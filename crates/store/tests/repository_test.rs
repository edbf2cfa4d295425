//! Repository behavior tests against the in-memory store.

use chrono::{Duration, Utc};

use banquet_auth::{Department, NewUser, User, UserRepository};
use banquet_clients::{Client, ClientFilter, ClientRepository, NewClient};
use banquet_contracts::{Contract, ContractFilter, ContractRepository, NewContract};
use banquet_core::{EventId, StoreError, UserId};
use banquet_events::{Event, EventFilter, EventRepository, NewEvent};
use banquet_store::InMemoryStore;

fn user(employee_id: &str, email: &str, department: Department) -> User {
    User::create(NewUser {
        employee_id: employee_id.to_string(),
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$stub".to_string(),
        department,
        created_at: Utc::now(),
    })
    .unwrap()
}

fn client(owner: UserId, email: &str) -> Client {
    Client::create(NewClient {
        full_name: "Kevin Casey".to_string(),
        email: email.to_string(),
        phone: "+678 123 456 78".to_string(),
        company_name: "Cool Startup LLC".to_string(),
        commercial: owner,
        created_at: Utc::now(),
    })
    .unwrap()
}

fn contract(client: &Client, total: u64, remaining: u64) -> Contract {
    Contract::create(NewContract {
        client: client.id,
        commercial: client.commercial,
        total_amount: total,
        remaining_amount: remaining,
        created_at: Utc::now(),
    })
    .unwrap()
}

fn event(contract: &Contract, name: &str) -> Event {
    let start = Utc::now();
    Event::create(NewEvent {
        contract: contract.id,
        name: name.to_string(),
        start,
        end: start + Duration::hours(2),
        location: "Main hall".to_string(),
        attendees: 50,
        notes: None,
    })
    .unwrap()
}

#[test]
fn duplicate_user_email_conflicts() {
    let store = InMemoryStore::new();
    store
        .create_user(&user("COM001", "bill@epic.com", Department::Commercial))
        .unwrap();

    let err = store
        .create_user(&user("COM002", "bill@epic.com", Department::Commercial))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn duplicate_employee_id_conflicts() {
    let store = InMemoryStore::new();
    store
        .create_user(&user("COM001", "bill@epic.com", Department::Commercial))
        .unwrap();

    let err = store
        .create_user(&user("COM001", "other@epic.com", Department::Commercial))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn update_keeps_uniqueness_but_allows_own_row() {
    let store = InMemoryStore::new();
    let bill = user("COM001", "bill@epic.com", Department::Commercial);
    let kate = user("SUP001", "kate@epic.com", Department::Support);
    store.create_user(&bill).unwrap();
    store.create_user(&kate).unwrap();

    // Re-saving the same row with unchanged email is fine.
    store.update_user(&bill).unwrap();

    // Stealing another user's email is not.
    let mut kate2 = kate.clone();
    kate2.email = "bill@epic.com".to_string();
    assert!(matches!(
        store.update_user(&kate2),
        Err(StoreError::Conflict(_))
    ));
}

#[test]
fn email_lookup_is_case_insensitive() {
    let store = InMemoryStore::new();
    store
        .create_user(&user("COM001", "bill@epic.com", Department::Commercial))
        .unwrap();

    let found = store.user_by_email("Bill@Epic.COM").unwrap();
    assert!(found.is_some());
}

#[test]
fn delete_missing_user_is_not_found() {
    let store = InMemoryStore::new();
    assert!(matches!(
        store.delete_user(UserId::new()),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn duplicate_client_email_conflicts() {
    let store = InMemoryStore::new();
    let owner = UserId::new();
    store.create_client(&client(owner, "kevin@startup.io")).unwrap();

    let err = store
        .create_client(&client(owner, "kevin@startup.io"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn clients_filter_by_owner() {
    let store = InMemoryStore::new();
    let bill = UserId::new();
    let other = UserId::new();
    store.create_client(&client(bill, "a@acme.com")).unwrap();
    store.create_client(&client(bill, "b@acme.com")).unwrap();
    store.create_client(&client(other, "c@acme.com")).unwrap();

    let mine = store
        .list_clients(&ClientFilter {
            commercial: Some(bill),
        })
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|c| c.commercial == bill));

    let all = store.list_clients(&ClientFilter::default()).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn contracts_filter_by_signed_and_balance() {
    let store = InMemoryStore::new();
    let owner = UserId::new();
    let acme = client(owner, "kevin@startup.io");
    store.create_client(&acme).unwrap();

    let unsigned = contract(&acme, 100_000, 100_000);
    let signed_paid = contract(&acme, 50_000, 0).sign();
    let signed_open = contract(&acme, 80_000, 30_000).sign();
    store.create_contract(&unsigned).unwrap();
    store.create_contract(&signed_paid).unwrap();
    store.create_contract(&signed_open).unwrap();

    let unsigned_only = store
        .list_contracts(&ContractFilter {
            signed: Some(false),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(unsigned_only.len(), 1);
    assert_eq!(unsigned_only[0].id, unsigned.id);

    let open_balance = store
        .list_contracts(&ContractFilter {
            signed: Some(true),
            has_balance: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(open_balance.len(), 1);
    assert_eq!(open_balance[0].id, signed_open.id);
}

#[test]
fn events_filter_by_assignment() {
    let store = InMemoryStore::new();
    let owner = UserId::new();
    let acme = client(owner, "kevin@startup.io");
    let deal = contract(&acme, 100_000, 0).sign();
    store.create_client(&acme).unwrap();
    store.create_contract(&deal).unwrap();

    let kate = UserId::new();
    let staffed = event(&deal, "Assembly").with_support(kate);
    let open = event(&deal, "Afterparty");
    store.create_event(&staffed).unwrap();
    store.create_event(&open).unwrap();

    let kates = store
        .list_events(&EventFilter {
            support: Some(kate),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(kates.len(), 1);
    assert_eq!(kates[0].id, staffed.id);

    let unassigned = store
        .list_events(&EventFilter {
            unassigned: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(unassigned.len(), 1);
    assert_eq!(unassigned[0].id, open.id);
}

#[test]
fn update_missing_event_is_not_found() {
    let store = InMemoryStore::new();
    let owner = UserId::new();
    let acme = client(owner, "kevin@startup.io");
    let deal = contract(&acme, 100_000, 0).sign();
    let mut ghost = event(&deal, "Ghost");
    ghost.id = EventId::new();

    assert!(matches!(
        store.update_event(&ghost),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn clones_share_state() {
    let store = InMemoryStore::new();
    let handle = store.clone();

    store
        .create_user(&user("COM001", "bill@epic.com", Department::Commercial))
        .unwrap();
    assert_eq!(handle.list_users().unwrap().len(), 1);
}
