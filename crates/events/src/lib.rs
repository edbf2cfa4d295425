//! `banquet-events` — staffed events held under a signed contract.

pub mod event;

pub use event::{Event, EventFilter, EventPatch, EventRepository, NewEvent};
