//! The authenticated caller of an operation.

use serde::{Deserialize, Serialize};

use easyshop_core::{Role, UserId};

/// A verified identity handed to the engine by the authenticating gateway.
///
/// Cart operations are scoped to `user_id`; catalog writes require an admin role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub username: Option<String>,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(user_id: UserId, username: Option<String>, role: Role) -> Self {
        Self {
            user_id,
            username,
            role,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
