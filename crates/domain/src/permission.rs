use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use sanad_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Grouping label used by administrative screens.
///
/// Categories carry no authorization meaning. Access is always evaluated per
/// permission code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// Service catalog management.
    Services,
    /// User account management.
    Users,
    /// Client service requests.
    Requests,
    /// Client subscriptions.
    Subscriptions,
    /// Reporting dashboards.
    Analytics,
    /// Platform settings.
    Settings,
    /// AI-assisted tools.
    Ai,
    /// Audit trail.
    Audit,
    /// In-app notifications.
    Notifications,
    /// Invoices and payments.
    Billing,
}

impl PermissionCategory {
    /// Returns the code prefix used by permissions in this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Users => "users",
            Self::Requests => "requests",
            Self::Subscriptions => "subscriptions",
            Self::Analytics => "analytics",
            Self::Settings => "settings",
            Self::Ai => "ai",
            Self::Audit => "audit",
            Self::Notifications => "notifications",
            Self::Billing => "billing",
        }
    }

    /// Returns the label shown in administrative screens.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Services => "Services",
            Self::Users => "Users",
            Self::Requests => "Requests",
            Self::Subscriptions => "Subscriptions",
            Self::Analytics => "Analytics",
            Self::Settings => "Settings",
            Self::Ai => "AI",
            Self::Audit => "Audit",
            Self::Notifications => "Notifications",
            Self::Billing => "Billing",
        }
    }

    /// Returns all categories in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionCategory] = &[
            PermissionCategory::Services,
            PermissionCategory::Users,
            PermissionCategory::Requests,
            PermissionCategory::Subscriptions,
            PermissionCategory::Analytics,
            PermissionCategory::Settings,
            PermissionCategory::Ai,
            PermissionCategory::Audit,
            PermissionCategory::Notifications,
            PermissionCategory::Billing,
        ];

        ALL
    }
}

impl Display for PermissionCategory {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PermissionCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission category '{value}'")))
    }
}

/// Validated permission code in `<category>.<action>` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Creates a permission code after checking its shape.
    ///
    /// The category segment must name a known [`PermissionCategory`]; the
    /// action segment is lowercase ASCII letters, digits and underscores.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let Some((category, action)) = value.split_once('.') else {
            return Err(AppError::Validation(format!(
                "permission code '{value}' must have the form '<category>.<action>'"
            )));
        };

        PermissionCategory::from_str(category)?;

        let action_is_valid = !action.is_empty()
            && action.chars().all(|character| {
                character.is_ascii_lowercase() || character.is_ascii_digit() || character == '_'
            });
        if !action_is_valid {
            return Err(AppError::Validation(format!(
                "permission code '{value}' has an invalid action segment"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the category the code is namespaced under.
    #[must_use]
    pub fn category(&self) -> PermissionCategory {
        // The prefix was validated in `new`, the fallback is unreachable.
        self.0
            .split_once('.')
            .and_then(|(category, _)| PermissionCategory::from_str(category).ok())
            .unwrap_or(PermissionCategory::Settings)
    }

    /// Returns the action segment after the category prefix.
    #[must_use]
    pub fn action(&self) -> &str {
        self.0
            .split_once('.')
            .map(|(_, action)| action)
            .unwrap_or_default()
    }
}

impl Display for PermissionCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl AsRef<str> for PermissionCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for PermissionCode {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for PermissionCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.0
    }
}

impl From<Permission> for PermissionCode {
    fn from(value: Permission) -> Self {
        Self(value.as_str().to_owned())
    }
}

/// Catalog entry describing one permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDefinition {
    code: PermissionCode,
    category: PermissionCategory,
    display_name: String,
    description: String,
}

impl PermissionDefinition {
    /// Creates a definition, rejecting codes filed under a foreign category.
    pub fn new(
        code: PermissionCode,
        category: PermissionCategory,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        if code.category() != category {
            return Err(AppError::Validation(format!(
                "permission '{code}' cannot be filed under category '{category}'"
            )));
        }

        Ok(Self {
            code,
            category,
            display_name: display_name.into(),
            description: description.into(),
        })
    }

    /// Returns the permission code.
    #[must_use]
    pub fn code(&self) -> &PermissionCode {
        &self.code
    }

    /// Returns the grouping category.
    #[must_use]
    pub fn category(&self) -> PermissionCategory {
        self.category
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the long-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Permissions shipped with the product and checked by application services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows browsing the service catalog.
    ServicesView,
    /// Allows adding services to the catalog.
    ServicesCreate,
    /// Allows editing catalog services.
    ServicesUpdate,
    /// Allows removing catalog services.
    ServicesDelete,
    /// Allows listing user accounts.
    UsersView,
    /// Allows creating user accounts.
    UsersCreate,
    /// Allows editing user accounts.
    UsersUpdate,
    /// Allows deleting user accounts.
    UsersDelete,
    /// Allows granting and revoking roles.
    UsersManageRoles,
    /// Allows reading every client's requests.
    RequestsViewAll,
    /// Allows reading the caller's own requests.
    RequestsViewOwn,
    /// Allows submitting new requests.
    RequestsCreate,
    /// Allows editing any request.
    RequestsUpdateAll,
    /// Allows editing the caller's own requests.
    RequestsUpdateOwn,
    /// Allows moving requests through their workflow.
    RequestsChangeStatus,
    /// Allows deleting requests.
    RequestsDelete,
    /// Allows reading every subscription.
    SubscriptionsViewAll,
    /// Allows reading the caller's own subscriptions.
    SubscriptionsViewOwn,
    /// Allows creating subscriptions.
    SubscriptionsCreate,
    /// Allows editing subscriptions.
    SubscriptionsUpdate,
    /// Allows cancelling and deleting subscriptions.
    SubscriptionsDelete,
    /// Allows reading analytics dashboards.
    AnalyticsView,
    /// Allows exporting analytics data.
    AnalyticsExport,
    /// Allows reading platform settings.
    SettingsView,
    /// Allows changing platform settings.
    SettingsUpdate,
    /// Allows using the resume builder.
    AiResumeBuilder,
    /// Allows using the document generator.
    AiDocumentGenerator,
    /// Allows using the AI chat assistant.
    AiChat,
    /// Allows reading the audit trail.
    AuditView,
    /// Allows reading notifications.
    NotificationsView,
    /// Allows sending notifications to users.
    NotificationsSend,
    /// Allows reading invoices and payments.
    BillingView,
    /// Allows issuing invoices and recording payments.
    BillingManage,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServicesView => "services.view",
            Self::ServicesCreate => "services.create",
            Self::ServicesUpdate => "services.update",
            Self::ServicesDelete => "services.delete",
            Self::UsersView => "users.view",
            Self::UsersCreate => "users.create",
            Self::UsersUpdate => "users.update",
            Self::UsersDelete => "users.delete",
            Self::UsersManageRoles => "users.manage_roles",
            Self::RequestsViewAll => "requests.view_all",
            Self::RequestsViewOwn => "requests.view_own",
            Self::RequestsCreate => "requests.create",
            Self::RequestsUpdateAll => "requests.update_all",
            Self::RequestsUpdateOwn => "requests.update_own",
            Self::RequestsChangeStatus => "requests.change_status",
            Self::RequestsDelete => "requests.delete",
            Self::SubscriptionsViewAll => "subscriptions.view_all",
            Self::SubscriptionsViewOwn => "subscriptions.view_own",
            Self::SubscriptionsCreate => "subscriptions.create",
            Self::SubscriptionsUpdate => "subscriptions.update",
            Self::SubscriptionsDelete => "subscriptions.delete",
            Self::AnalyticsView => "analytics.view",
            Self::AnalyticsExport => "analytics.export",
            Self::SettingsView => "settings.view",
            Self::SettingsUpdate => "settings.update",
            Self::AiResumeBuilder => "ai.resume_builder",
            Self::AiDocumentGenerator => "ai.document_generator",
            Self::AiChat => "ai.chat",
            Self::AuditView => "audit.view",
            Self::NotificationsView => "notifications.view",
            Self::NotificationsSend => "notifications.send",
            Self::BillingView => "billing.view",
            Self::BillingManage => "billing.manage",
        }
    }

    /// Returns the category the permission belongs to.
    #[must_use]
    pub fn category(&self) -> PermissionCategory {
        match self {
            Self::ServicesView
            | Self::ServicesCreate
            | Self::ServicesUpdate
            | Self::ServicesDelete => PermissionCategory::Services,
            Self::UsersView
            | Self::UsersCreate
            | Self::UsersUpdate
            | Self::UsersDelete
            | Self::UsersManageRoles => PermissionCategory::Users,
            Self::RequestsViewAll
            | Self::RequestsViewOwn
            | Self::RequestsCreate
            | Self::RequestsUpdateAll
            | Self::RequestsUpdateOwn
            | Self::RequestsChangeStatus
            | Self::RequestsDelete => PermissionCategory::Requests,
            Self::SubscriptionsViewAll
            | Self::SubscriptionsViewOwn
            | Self::SubscriptionsCreate
            | Self::SubscriptionsUpdate
            | Self::SubscriptionsDelete => PermissionCategory::Subscriptions,
            Self::AnalyticsView | Self::AnalyticsExport => PermissionCategory::Analytics,
            Self::SettingsView | Self::SettingsUpdate => PermissionCategory::Settings,
            Self::AiResumeBuilder | Self::AiDocumentGenerator | Self::AiChat => {
                PermissionCategory::Ai
            }
            Self::AuditView => PermissionCategory::Audit,
            Self::NotificationsView | Self::NotificationsSend => PermissionCategory::Notifications,
            Self::BillingView | Self::BillingManage => PermissionCategory::Billing,
        }
    }

    /// Returns the label shown in role editing screens.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ServicesView => "View services",
            Self::ServicesCreate => "Create services",
            Self::ServicesUpdate => "Update services",
            Self::ServicesDelete => "Delete services",
            Self::UsersView => "View users",
            Self::UsersCreate => "Create users",
            Self::UsersUpdate => "Update users",
            Self::UsersDelete => "Delete users",
            Self::UsersManageRoles => "Manage user roles",
            Self::RequestsViewAll => "View all requests",
            Self::RequestsViewOwn => "View own requests",
            Self::RequestsCreate => "Create requests",
            Self::RequestsUpdateAll => "Update all requests",
            Self::RequestsUpdateOwn => "Update own requests",
            Self::RequestsChangeStatus => "Change request status",
            Self::RequestsDelete => "Delete requests",
            Self::SubscriptionsViewAll => "View all subscriptions",
            Self::SubscriptionsViewOwn => "View own subscriptions",
            Self::SubscriptionsCreate => "Create subscriptions",
            Self::SubscriptionsUpdate => "Update subscriptions",
            Self::SubscriptionsDelete => "Delete subscriptions",
            Self::AnalyticsView => "View analytics",
            Self::AnalyticsExport => "Export analytics",
            Self::SettingsView => "View settings",
            Self::SettingsUpdate => "Update settings",
            Self::AiResumeBuilder => "Use resume builder",
            Self::AiDocumentGenerator => "Use document generator",
            Self::AiChat => "Use AI chat",
            Self::AuditView => "View audit log",
            Self::NotificationsView => "View notifications",
            Self::NotificationsSend => "Send notifications",
            Self::BillingView => "View billing",
            Self::BillingManage => "Manage billing",
        }
    }

    /// Returns the long-form description shown next to the checkbox.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ServicesView => {
                "Browse the HR, government relations, accounting and legal service catalog."
            }
            Self::ServicesCreate => "Add new services to the catalog.",
            Self::ServicesUpdate => "Edit service names, pricing and descriptions.",
            Self::ServicesDelete => "Remove services from the catalog.",
            Self::UsersView => "List user accounts and their profiles.",
            Self::UsersCreate => "Create user accounts.",
            Self::UsersUpdate => "Edit user account details.",
            Self::UsersDelete => "Delete user accounts.",
            Self::UsersManageRoles => "Grant and revoke roles on user accounts.",
            Self::RequestsViewAll => "Read service requests submitted by any client.",
            Self::RequestsViewOwn => "Read service requests the caller submitted.",
            Self::RequestsCreate => "Submit new service requests.",
            Self::RequestsUpdateAll => "Edit service requests submitted by any client.",
            Self::RequestsUpdateOwn => "Edit service requests the caller submitted.",
            Self::RequestsChangeStatus => "Move service requests between workflow states.",
            Self::RequestsDelete => "Delete service requests.",
            Self::SubscriptionsViewAll => "Read every client subscription.",
            Self::SubscriptionsViewOwn => "Read the caller's own subscriptions.",
            Self::SubscriptionsCreate => "Create client subscriptions.",
            Self::SubscriptionsUpdate => "Change subscription plans and terms.",
            Self::SubscriptionsDelete => "Cancel and delete subscriptions.",
            Self::AnalyticsView => "Read analytics dashboards.",
            Self::AnalyticsExport => "Export analytics data.",
            Self::SettingsView => "Read platform settings and the role catalog.",
            Self::SettingsUpdate => "Change platform settings.",
            Self::AiResumeBuilder => "Generate and refine resumes with the AI assistant.",
            Self::AiDocumentGenerator => "Draft business documents with the AI assistant.",
            Self::AiChat => "Chat with the AI business assistant.",
            Self::AuditView => "Read the audit trail of administrative actions.",
            Self::NotificationsView => "Read in-app notifications.",
            Self::NotificationsSend => "Send notifications to users.",
            Self::BillingView => "Read invoices and payment history.",
            Self::BillingManage => "Issue invoices and record payments.",
        }
    }

    /// Returns the catalog entry for this permission.
    #[must_use]
    pub fn definition(&self) -> PermissionDefinition {
        PermissionDefinition {
            code: PermissionCode::from(*self),
            category: self.category(),
            display_name: self.display_name().to_owned(),
            description: self.description().to_owned(),
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::ServicesView,
            Permission::ServicesCreate,
            Permission::ServicesUpdate,
            Permission::ServicesDelete,
            Permission::UsersView,
            Permission::UsersCreate,
            Permission::UsersUpdate,
            Permission::UsersDelete,
            Permission::UsersManageRoles,
            Permission::RequestsViewAll,
            Permission::RequestsViewOwn,
            Permission::RequestsCreate,
            Permission::RequestsUpdateAll,
            Permission::RequestsUpdateOwn,
            Permission::RequestsChangeStatus,
            Permission::RequestsDelete,
            Permission::SubscriptionsViewAll,
            Permission::SubscriptionsViewOwn,
            Permission::SubscriptionsCreate,
            Permission::SubscriptionsUpdate,
            Permission::SubscriptionsDelete,
            Permission::AnalyticsView,
            Permission::AnalyticsExport,
            Permission::SettingsView,
            Permission::SettingsUpdate,
            Permission::AiResumeBuilder,
            Permission::AiDocumentGenerator,
            Permission::AiChat,
            Permission::AuditView,
            Permission::NotificationsView,
            Permission::NotificationsSend,
            Permission::BillingView,
            Permission::BillingManage,
        ];

        ALL
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}
