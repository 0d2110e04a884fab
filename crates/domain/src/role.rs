use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use sanad_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::catalog::PermissionCatalog;
use crate::permission::{Permission, PermissionCode};

/// Validated role name in UPPER_SNAKE_CASE.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Maximum accepted role name length.
    pub const MAX_LENGTH: usize = 64;

    /// Creates a validated role name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        let starts_with_letter = value
            .chars()
            .next()
            .is_some_and(|character| character.is_ascii_uppercase());
        let is_upper_snake = value.chars().all(|character| {
            character.is_ascii_uppercase() || character.is_ascii_digit() || character == '_'
        });

        if !starts_with_letter || !is_upper_snake || value.len() > Self::MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name '{value}' must be UPPER_SNAKE_CASE and at most {} characters",
                Self::MAX_LENGTH
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for RoleName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for RoleName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl From<SystemRole> for RoleName {
    fn from(value: SystemRole) -> Self {
        Self(value.as_str().to_owned())
    }
}

/// Built-in roles seeded with the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemRole {
    /// Holds every permission in the catalog, including ones added later.
    SuperAdmin,
    /// Runs day-to-day operations without destructive or role-granting rights.
    Admin,
    /// Handles client requests.
    Staff,
    /// A client of the firm.
    Customer,
}

impl SystemRole {
    /// Returns the stored role name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Admin => "ADMIN",
            Self::Staff => "STAFF",
            Self::Customer => "CUSTOMER",
        }
    }

    /// Returns the label shown in administrative screens.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super administrator",
            Self::Admin => "Administrator",
            Self::Staff => "Staff",
            Self::Customer => "Customer",
        }
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Full access to every capability of the platform.",
            Self::Admin => "Operates the platform without deletion or role management rights.",
            Self::Staff => "Processes client service requests and subscriptions.",
            Self::Customer => "Submits and tracks the organisation's own service requests.",
        }
    }

    /// Returns the grants seeded for this role.
    #[must_use]
    pub fn grants(&self) -> RoleGrants {
        let explicit = |permissions: &[Permission]| {
            RoleGrants::Explicit(
                permissions
                    .iter()
                    .copied()
                    .map(PermissionCode::from)
                    .collect(),
            )
        };

        match self {
            Self::SuperAdmin => RoleGrants::AllPermissions,
            Self::Admin => explicit(ADMIN_PERMISSIONS),
            Self::Staff => explicit(STAFF_PERMISSIONS),
            Self::Customer => explicit(CUSTOMER_PERMISSIONS),
        }
    }

    /// Returns the role definition seeded for this role.
    #[must_use]
    pub fn definition(&self) -> RoleDefinition {
        RoleDefinition {
            name: RoleName::from(*self),
            display_name: self.display_name().to_owned(),
            description: self.description().to_owned(),
            is_system: true,
            grants: self.grants(),
        }
    }

    /// Returns all system roles, most privileged first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemRole] = &[
            SystemRole::SuperAdmin,
            SystemRole::Admin,
            SystemRole::Staff,
            SystemRole::Customer,
        ];

        ALL
    }
}

impl FromStr for SystemRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::NotFound(format!("system role '{value}' does not exist")))
    }
}

// ADMIN is an explicit list; new catalog permissions are not granted here automatically.
const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ServicesView,
    Permission::ServicesCreate,
    Permission::ServicesUpdate,
    Permission::UsersView,
    Permission::UsersCreate,
    Permission::UsersUpdate,
    Permission::RequestsViewAll,
    Permission::RequestsViewOwn,
    Permission::RequestsCreate,
    Permission::RequestsUpdateAll,
    Permission::RequestsUpdateOwn,
    Permission::RequestsChangeStatus,
    Permission::SubscriptionsViewAll,
    Permission::SubscriptionsViewOwn,
    Permission::SubscriptionsCreate,
    Permission::SubscriptionsUpdate,
    Permission::AnalyticsView,
    Permission::AnalyticsExport,
    Permission::SettingsView,
    Permission::AiResumeBuilder,
    Permission::AiDocumentGenerator,
    Permission::AiChat,
    Permission::AuditView,
    Permission::NotificationsView,
    Permission::NotificationsSend,
];

const STAFF_PERMISSIONS: &[Permission] = &[
    Permission::ServicesView,
    Permission::UsersView,
    Permission::RequestsViewAll,
    Permission::RequestsUpdateAll,
    Permission::RequestsChangeStatus,
    Permission::SubscriptionsViewAll,
    Permission::AiResumeBuilder,
    Permission::AiDocumentGenerator,
    Permission::AiChat,
    Permission::NotificationsView,
];

const CUSTOMER_PERMISSIONS: &[Permission] = &[
    Permission::ServicesView,
    Permission::RequestsViewOwn,
    Permission::RequestsCreate,
    Permission::RequestsUpdateOwn,
    Permission::SubscriptionsViewOwn,
    Permission::AiResumeBuilder,
    Permission::AiDocumentGenerator,
    Permission::AiChat,
    Permission::NotificationsView,
];

/// Permission grants carried by a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleGrants {
    /// Every permission the live catalog defines, evaluated at check time.
    AllPermissions,
    /// An enumerated set of permission codes.
    Explicit(BTreeSet<PermissionCode>),
}

impl RoleGrants {
    /// Returns whether these grants allow the permission code.
    #[must_use]
    pub fn allows(&self, permission: &str) -> bool {
        match self {
            Self::AllPermissions => true,
            Self::Explicit(codes) => codes.contains(permission),
        }
    }

    /// Resolves the grants into concrete codes against a catalog.
    #[must_use]
    pub fn resolve(&self, catalog: &PermissionCatalog) -> BTreeSet<PermissionCode> {
        match self {
            Self::AllPermissions => catalog.codes().cloned().collect(),
            Self::Explicit(codes) => codes.clone(),
        }
    }
}

/// A named bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    name: RoleName,
    display_name: String,
    description: String,
    is_system: bool,
    grants: RoleGrants,
}

impl RoleDefinition {
    /// Creates a custom role with an administrator-chosen permission set.
    pub fn custom(
        name: RoleName,
        display_name: impl Into<String>,
        description: impl Into<String>,
        permissions: impl IntoIterator<Item = PermissionCode>,
    ) -> AppResult<Self> {
        let display_name = NonEmptyString::new(display_name)?;

        Ok(Self {
            name,
            display_name: display_name.into(),
            description: description.into(),
            is_system: false,
            grants: RoleGrants::Explicit(permissions.into_iter().collect()),
        })
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns whether the role ships with the product.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Returns the role's grants.
    #[must_use]
    pub fn grants(&self) -> &RoleGrants {
        &self.grants
    }
}

/// Every role known to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinitionSet {
    roles: BTreeMap<RoleName, RoleDefinition>,
}

impl RoleDefinitionSet {
    /// Returns the set containing only the system roles.
    #[must_use]
    pub fn system() -> Self {
        let roles = SystemRole::all()
            .iter()
            .map(|role| {
                let definition = role.definition();
                (definition.name().clone(), definition)
            })
            .collect();

        Self { roles }
    }

    /// Returns a set extended with a custom role.
    ///
    /// Every granted code must exist in `catalog`.
    pub fn with_custom_role(
        mut self,
        catalog: &PermissionCatalog,
        definition: RoleDefinition,
    ) -> AppResult<Self> {
        if self.roles.contains_key(definition.name().as_str()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                definition.name()
            )));
        }

        let RoleGrants::Explicit(codes) = definition.grants() else {
            return Err(AppError::Validation(format!(
                "custom role '{}' must enumerate its permissions",
                definition.name()
            )));
        };

        for code in codes {
            catalog.get_permission_metadata(code.as_str())?;
        }

        self.roles.insert(definition.name().clone(), definition);
        Ok(self)
    }

    /// Returns a role definition by name.
    pub fn get(&self, role_name: &str) -> AppResult<&RoleDefinition> {
        self.roles
            .get(role_name)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))
    }

    /// Returns a role definition by name, if defined.
    #[must_use]
    pub fn find(&self, role_name: &str) -> Option<&RoleDefinition> {
        self.roles.get(role_name)
    }

    /// Returns the permission codes held by a role against the live catalog.
    pub fn get_role_permissions(
        &self,
        catalog: &PermissionCatalog,
        role_name: &str,
    ) -> AppResult<BTreeSet<PermissionCode>> {
        self.get(role_name).map(|role| role.grants().resolve(catalog))
    }

    /// Returns whether the role name is one of the seeded system roles.
    #[must_use]
    pub fn is_system_role(&self, role_name: &str) -> bool {
        self.roles
            .get(role_name)
            .is_some_and(RoleDefinition::is_system)
    }

    /// Lists system roles in privilege order, then custom roles by name.
    #[must_use]
    pub fn list_roles(&self) -> Vec<&RoleDefinition> {
        let system = SystemRole::all()
            .iter()
            .filter_map(|role| self.roles.get(role.as_str()));
        let custom = self.roles.values().filter(|role| !role.is_system());

        system.chain(custom).collect()
    }
}

impl Default for RoleDefinitionSet {
    fn default() -> Self {
        Self::system()
    }
}
