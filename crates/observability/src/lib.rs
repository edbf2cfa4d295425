//! `banquet-observability` — logging initialization and the audit boundary.

pub mod audit;
pub mod tracing;

pub use audit::{AuditAction, AuditEvent, AuditSink, MemoryAuditSink, TracingAuditSink};
