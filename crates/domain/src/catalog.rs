use std::collections::BTreeMap;

use sanad_core::{AppError, AppResult};

use crate::permission::{Permission, PermissionCategory, PermissionCode, PermissionDefinition};

/// Closed set of permission codes known to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCatalog {
    definitions: BTreeMap<PermissionCode, PermissionDefinition>,
}

impl PermissionCatalog {
    /// Returns the catalog shipped with the product.
    #[must_use]
    pub fn builtin() -> Self {
        let definitions = Permission::all()
            .iter()
            .map(|permission| {
                let definition = permission.definition();
                (definition.code().clone(), definition)
            })
            .collect();

        Self { definitions }
    }

    /// Returns a catalog extended with one more permission.
    pub fn with_permission(mut self, definition: PermissionDefinition) -> AppResult<Self> {
        if self.definitions.contains_key(definition.code().as_str()) {
            return Err(AppError::Conflict(format!(
                "permission '{}' is already defined",
                definition.code()
            )));
        }

        self.definitions.insert(definition.code().clone(), definition);
        Ok(self)
    }

    /// Lists every permission ordered by category, then code.
    #[must_use]
    pub fn list_permissions(&self) -> Vec<&PermissionDefinition> {
        let mut definitions = self.definitions.values().collect::<Vec<_>>();
        definitions.sort_by(|left, right| {
            left.category()
                .cmp(&right.category())
                .then_with(|| left.code().cmp(right.code()))
        });
        definitions
    }

    /// Returns metadata for one permission code.
    pub fn get_permission_metadata(&self, code: &str) -> AppResult<&PermissionDefinition> {
        self.definitions
            .get(code)
            .ok_or_else(|| AppError::NotFound(format!("permission '{code}' is not in the catalog")))
    }

    /// Returns whether the code is part of the catalog.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.definitions.contains_key(code)
    }

    /// Expands a category into the explicit list of codes filed under it.
    ///
    /// Callers grant and audit the returned codes individually.
    #[must_use]
    pub fn expand_category(&self, category: PermissionCategory) -> Vec<PermissionCode> {
        self.definitions
            .values()
            .filter(|definition| definition.category() == category)
            .map(|definition| definition.code().clone())
            .collect()
    }

    /// Iterates every code in the catalog.
    pub fn codes(&self) -> impl Iterator<Item = &PermissionCode> {
        self.definitions.keys()
    }

    /// Returns the number of defined permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use sanad_core::AppError;

    use super::PermissionCatalog;
    use crate::permission::{
        Permission, PermissionCategory, PermissionCode, PermissionDefinition,
    };

    #[test]
    fn builtin_catalog_contains_every_permission() {
        let catalog = PermissionCatalog::builtin();
        assert_eq!(catalog.len(), Permission::all().len());
        assert!(
            Permission::all()
                .iter()
                .all(|permission| catalog.contains(permission.as_str()))
        );
    }

    #[test]
    fn list_permissions_is_ordered_by_category_then_code() {
        let catalog = PermissionCatalog::builtin();
        let listed = catalog.list_permissions();

        assert_eq!(listed.len(), catalog.len());
        assert!(listed.windows(2).all(|pair| {
            (pair[0].category(), pair[0].code()) < (pair[1].category(), pair[1].code())
        }));
        assert_eq!(
            listed.first().map(|definition| definition.code().as_str()),
            Some("services.create")
        );
        assert_eq!(
            listed.last().map(|definition| definition.code().as_str()),
            Some("billing.view")
        );
    }

    #[test]
    fn metadata_lookup_fails_for_unknown_code() {
        let catalog = PermissionCatalog::builtin();

        let known = catalog.get_permission_metadata("requests.view_all");
        assert!(known.is_ok());
        assert_eq!(
            known.map(|definition| definition.category()).ok(),
            Some(PermissionCategory::Requests)
        );

        let unknown = catalog.get_permission_metadata("services.edit");
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
    }

    #[test]
    fn expand_category_returns_explicit_codes() {
        let catalog = PermissionCatalog::builtin();
        let codes = catalog.expand_category(PermissionCategory::Ai);
        let codes = codes.iter().map(PermissionCode::as_str).collect::<Vec<_>>();

        assert_eq!(codes, vec!["ai.chat", "ai.document_generator", "ai.resume_builder"]);
    }

    #[test]
    fn with_permission_rejects_duplicates() {
        let duplicate = Permission::AuditView.definition();
        let result = PermissionCatalog::builtin().with_permission(duplicate);
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn with_permission_extends_catalog() {
        let code = PermissionCode::new("billing.refund");
        assert!(code.is_ok());
        let definition = code.and_then(|code| {
            PermissionDefinition::new(
                code,
                PermissionCategory::Billing,
                "Refund payments",
                "Issue refunds against recorded payments.",
            )
        });
        assert!(definition.is_ok());

        let extended = definition
            .and_then(|definition| PermissionCatalog::builtin().with_permission(definition));
        assert!(extended.is_ok());
        let extended = extended.unwrap_or_default();
        assert!(extended.contains("billing.refund"));
        assert_eq!(extended.len(), Permission::all().len() + 1);
    }
}
