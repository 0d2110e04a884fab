//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod catalog;
mod permission;
mod policy;
mod role;

pub use audit::AuditAction;
pub use catalog::PermissionCatalog;
pub use permission::{Permission, PermissionCategory, PermissionCode, PermissionDefinition};
pub use policy::RbacPolicy;
pub use role::{RoleDefinition, RoleDefinitionSet, RoleGrants, RoleName, SystemRole};
