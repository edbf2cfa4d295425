//! Audit event shipping.
//!
//! Sensitive actions (user management, contract signing) and unhandled
//! failures are reported to an external collector. Delivery is
//! fire-and-forget: a sink must never fail the operation that produced the
//! event.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use banquet_core::UserId;

/// The reportable action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UserCreated,
    UserUpdated,
    UserDeleted,
    ContractSigned,
    InternalError,
}

impl AuditAction {
    /// Dotted tag used by collectors for routing/grouping.
    pub fn as_tag(&self) -> &'static str {
        match self {
            AuditAction::UserCreated => "crm.user.created",
            AuditAction::UserUpdated => "crm.user.updated",
            AuditAction::UserDeleted => "crm.user.deleted",
            AuditAction::ContractSigned => "crm.contract.signed",
            AuditAction::InternalError => "crm.internal.error",
        }
    }
}

/// One reportable occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    /// The acting user; absent for failures caught outside a session.
    pub actor: Option<UserId>,
    pub detail: String,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action: AuditAction, actor: Option<UserId>, detail: impl Into<String>) -> Self {
        Self {
            action,
            actor,
            detail: detail.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Outbound audit channel.
///
/// `emit` is infallible by contract: implementations log and swallow their
/// own delivery problems.
pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

/// Ships audit events as structured tracing events.
///
/// The collector address travels with the subscriber configuration; this sink
/// only tags and serializes.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        let actor = event.actor.map(|id| id.to_string()).unwrap_or_default();
        match event.action {
            AuditAction::InternalError => {
                tracing::error!(
                    audit = event.action.as_tag(),
                    actor = %actor,
                    detail = %event.detail,
                    "audit event"
                );
            }
            _ => {
                tracing::info!(
                    audit = event.action.as_tag(),
                    actor = %actor,
                    detail = %event.detail,
                    "audit event"
                );
            }
        }
    }
}

/// Records events for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Actions recorded so far, in emission order.
    pub fn actions(&self) -> Vec<AuditAction> {
        self.recorded().iter().map(|e| e.action).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&self, event: AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
