use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by access-control use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is granted to a user.
    RoleAssigned,
    /// Emitted when a role is revoked from a user.
    RoleRevoked,
    /// Emitted when a permission category is expanded into explicit codes.
    CategoryExpanded,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleAssigned => "rbac.role.assigned",
            Self::RoleRevoked => "rbac.role.revoked",
            Self::CategoryExpanded => "rbac.category.expanded",
        }
    }
}
