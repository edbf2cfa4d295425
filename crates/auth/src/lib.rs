//! `banquet-auth` — authentication, session, and authorization boundary.
//!
//! This crate is intentionally decoupled from storage engines and the command
//! surface: it owns the staff directory model, credential verification, the
//! signed session token, the pure permission engine, and the local session
//! cache abstraction.

pub mod authorize;
pub mod config;
pub mod department;
pub mod error;
pub mod identity;
pub mod password;
pub mod service;
pub mod session;
pub mod token;
pub mod user;

pub use authorize::{Action, Deny, authorize};
pub use config::AuthConfig;
pub use department::Department;
pub use error::{AuthError, SessionError, TokenValidationError};
pub use identity::Identity;
pub use service::{Authenticator, SessionValidator};
pub use session::{FileSessionStore, InMemorySessionStore, SessionStore, SessionStoreError};
pub use token::{Token, TokenClaims, validate_claims};
pub use user::{NewUser, User, UserPatch, UserRepository};
