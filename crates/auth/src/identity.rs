use serde::{Deserialize, Serialize};

use banquet_core::UserId;

use crate::Department;

/// A validated actor identity.
///
/// Produced only by [`crate::SessionValidator`]; the department always comes
/// from the credential store, never from the token alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub department: Department,
    pub name: String,
}
