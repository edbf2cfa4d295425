use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use banquet_core::{ContractId, DomainError, DomainResult, Entity, EventId, StoreResult, UserId};

/// An event run for a client under a contract.
///
/// # Invariants
/// - `end >= start`.
/// - Created only for a signed contract (enforced by the policy layer, which
///   holds the contract state).
/// - `support`, when set, references a Support-department user; staffing is
///   a Management-only transition and reassignment overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub contract: ContractId,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The assigned support user, once staffed.
    pub support: Option<UserId>,
    pub location: String,
    pub attendees: u32,
    pub notes: Option<String>,
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an event. Events always start unstaffed.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub contract: ContractId,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    pub attendees: u32,
    pub notes: Option<String>,
}

/// Partial update of the non-assignment fields: `None` keeps the existing
/// value. Staffing goes through [`Event::with_support`] so the
/// Management-only rule has a single entry point.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub attendees: Option<u32>,
    pub notes: Option<String>,
}

impl Event {
    pub fn create(input: NewEvent) -> DomainResult<Event> {
        check_window(input.start, input.end)?;

        Ok(Event {
            id: EventId::new(),
            contract: input.contract,
            name: required(&input.name, "name")?,
            start: input.start,
            end: input.end,
            support: None,
            location: required(&input.location, "location")?,
            attendees: input.attendees,
            notes: input.notes,
        })
    }

    /// Merge a partial update into a validated copy; the receiver is untouched.
    pub fn apply_patch(&self, patch: &EventPatch) -> DomainResult<Event> {
        let mut next = self.clone();

        if let Some(name) = &patch.name {
            next.name = required(name, "name")?;
        }
        if let Some(start) = patch.start {
            next.start = start;
        }
        if let Some(end) = patch.end {
            next.end = end;
        }
        if let Some(location) = &patch.location {
            next.location = required(location, "location")?;
        }
        if let Some(attendees) = patch.attendees {
            next.attendees = attendees;
        }
        if let Some(notes) = &patch.notes {
            next.notes = Some(notes.clone());
        }

        check_window(next.start, next.end)?;
        Ok(next)
    }

    /// Staff (or re-staff) this event; a previous assignment is overwritten.
    pub fn with_support(&self, support: UserId) -> Event {
        Event {
            support: Some(support),
            ..self.clone()
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.support.is_some()
    }
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<()> {
    if end < start {
        return Err(DomainError::invariant("event cannot end before it starts"));
    }
    Ok(())
}

/// Equality filter for event listings.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub contract: Option<ContractId>,
    /// Only events assigned to this support user.
    pub support: Option<UserId>,
    /// Only events with no support assigned yet.
    pub unassigned: bool,
}

/// Event store port.
pub trait EventRepository: Send + Sync {
    fn create_event(&self, event: &Event) -> StoreResult<()>;
    fn update_event(&self, event: &Event) -> StoreResult<()>;
    fn event_by_id(&self, id: EventId) -> StoreResult<Option<Event>>;
    fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>>;
}
