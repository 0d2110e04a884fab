//! Role-based authorization decisions.
//!
//! [`RbacPolicy`] pairs the permission catalog with the role definitions and
//! answers membership questions. It performs no I/O and holds no interior
//! mutability, so one instance is shared across request handlers.

use std::collections::BTreeSet;

use sanad_core::AppResult;

use crate::catalog::PermissionCatalog;
use crate::permission::{PermissionCode, PermissionDefinition};
use crate::role::{RoleDefinition, RoleDefinitionSet};


/// Immutable permission catalog plus role definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbacPolicy {
    catalog: PermissionCatalog,
    roles: RoleDefinitionSet,
}

impl RbacPolicy {
    /// Returns the policy shipped with the product.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            catalog: PermissionCatalog::builtin(),
            roles: RoleDefinitionSet::system(),
        }
    }

    /// Returns a policy whose catalog gained one permission.
    ///
    /// No role other than SUPER_ADMIN receives the new permission.
    pub fn with_permission(self, definition: PermissionDefinition) -> AppResult<Self> {
        Ok(Self {
            catalog: self.catalog.with_permission(definition)?,
            roles: self.roles,
        })
    }

    /// Returns a policy extended with a custom role.
    pub fn with_custom_role(self, definition: RoleDefinition) -> AppResult<Self> {
        let roles = self.roles.with_custom_role(&self.catalog, definition)?;
        Ok(Self {
            catalog: self.catalog,
            roles,
        })
    }

    /// Returns the permission catalog.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Returns the role definitions.
    #[must_use]
    pub fn roles(&self) -> &RoleDefinitionSet {
        &self.roles
    }

    /// Answers whether any of `actor_roles` grants `permission`.
    ///
    /// SUPER_ADMIN short-circuits to `true`. Unknown role names contribute
    /// nothing and unknown permission codes are never held by enumerated
    /// roles, so both degrade to `false`.
    pub fn has_permission<I, R>(&self, actor_roles: I, permission: impl AsRef<str>) -> bool
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let permission = permission.as_ref();

        actor_roles.into_iter().any(|role_name| {
            self.roles
                .find(role_name.as_ref())
                .is_some_and(|role| role.grants().allows(permission))
        })
    }

    /// Returns the union of permissions granted by `actor_roles`.
    pub fn effective_permissions<I, R>(&self, actor_roles: I) -> BTreeSet<PermissionCode>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        actor_roles
            .into_iter()
            .filter_map(|role_name| self.roles.find(role_name.as_ref()))
            .flat_map(|role| role.grants().resolve(&self.catalog))
            .collect()
    }

    /// Lists every permission ordered by category, then code.
    #[must_use]
    pub fn list_permissions(&self) -> Vec<&PermissionDefinition> {
        self.catalog.list_permissions()
    }

    /// Returns metadata for one permission code.
    pub fn get_permission_metadata(&self, code: &str) -> AppResult<&PermissionDefinition> {
        self.catalog.get_permission_metadata(code)
    }

    /// Returns the permission codes held by one role.
    pub fn get_role_permissions(&self, role_name: &str) -> AppResult<BTreeSet<PermissionCode>> {
        self.roles.get_role_permissions(&self.catalog, role_name)
    }

    /// Returns whether the role name is a seeded system role.
    #[must_use]
    pub fn is_system_role(&self, role_name: &str) -> bool {
        self.roles.is_system_role(role_name)
    }
}

impl Default for RbacPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}
