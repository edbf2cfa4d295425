//! `banquet-service` — the lifecycle layer.
//!
//! One controller orchestrates every operation as
//! validate session → authorize → mutate → persist → audit, on top of the
//! repository ports, the session cache, and the audit sink.

pub mod config;
pub mod controller;
pub mod error;

pub use config::{Config, ConfigError};
pub use controller::{
    LifecycleController, NewClientInput, NewContractInput, NewEventInput, NewStaffInput,
    StaffPatch,
};
pub use error::CrmError;
