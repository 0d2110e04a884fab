use sanad_core::AppResult;
use sanad_domain::{PermissionCode, RbacPolicy, RoleDefinition, RoleName};
use tracing::{info, warn};

use crate::{CustomRoleRecord, RoleDefinitionRepository};

/// Builds the process-wide policy from the shipped catalog plus stored custom roles.
///
/// Stored rows that no longer match the catalog are skipped rather than
/// failing startup, so a removed permission never widens access.
pub async fn load_rbac_policy(repository: &dyn RoleDefinitionRepository) -> AppResult<RbacPolicy> {
    let mut policy = RbacPolicy::builtin();

    for record in repository.list_custom_roles().await? {
        let Some(definition) = custom_role_definition(&policy, record) else {
            continue;
        };

        let role_name = definition.name().clone();
        policy = match policy.clone().with_custom_role(definition) {
            Ok(extended) => extended,
            Err(error) => {
                warn!(role = %role_name, %error, "skipping stored custom role");
                continue;
            }
        };
    }

    info!(
        permissions = policy.catalog().len(),
        roles = policy.roles().list_roles().len(),
        "rbac policy loaded"
    );
    Ok(policy)
}

fn custom_role_definition(policy: &RbacPolicy, record: CustomRoleRecord) -> Option<RoleDefinition> {
    let name = match RoleName::new(record.name.as_str()) {
        Ok(name) => name,
        Err(error) => {
            warn!(role = %record.name, %error, "skipping stored role with invalid name");
            return None;
        }
    };

    let permissions = record
        .permissions
        .into_iter()
        .filter_map(|code| {
            if !policy.catalog().contains(code.as_str()) {
                warn!(
                    role = %name,
                    permission = %code,
                    "ignoring stored grant missing from catalog"
                );
                return None;
            }
            PermissionCode::new(code).ok()
        })
        .collect::<Vec<_>>();

    let display_name = if record.display_name.trim().is_empty() {
        name.as_str().to_owned()
    } else {
        record.display_name
    };

    match RoleDefinition::custom(name.clone(), display_name, record.description, permissions) {
        Ok(definition) => Some(definition),
        Err(error) => {
            warn!(role = %name, %error, "skipping invalid stored role");
            None
        }
    }
}
