use std::collections::BTreeSet;

use async_trait::async_trait;
use sanad_core::AppResult;
use sanad_domain::{PermissionCode, RoleName};

/// Role listing with grants resolved against the live catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    /// Role name.
    pub name: RoleName,
    /// Human-readable name.
    pub display_name: String,
    /// Role description.
    pub description: String,
    /// Indicates a seeded, non-deletable role.
    pub is_system: bool,
    /// Effective role grants.
    pub permissions: BTreeSet<PermissionCode>,
}

/// Stored custom role as read from persistence, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRoleRecord {
    /// Stored role name.
    pub name: String,
    /// Stored display name.
    pub display_name: String,
    /// Stored description.
    pub description: String,
    /// Stored permission codes.
    pub permissions: Vec<String>,
}

/// Repository port for loading administrator-defined roles.
#[async_trait]
pub trait RoleDefinitionRepository: Send + Sync {
    /// Lists every non-system role with its stored grants.
    async fn list_custom_roles(&self) -> AppResult<Vec<CustomRoleRecord>>;
}
