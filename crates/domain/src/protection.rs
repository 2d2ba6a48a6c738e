use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::ResourceKind;

/// Sentinel records that may never be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionPolicy {
    default_account_id: i64,
    administrator_role_id: i64,
    administrator_slug: NonEmptyString,
}

impl ProtectionPolicy {
    /// Creates a policy from configured sentinels.
    pub fn new(
        default_account_id: i64,
        administrator_role_id: i64,
        administrator_slug: impl Into<String>,
    ) -> AppResult<Self> {
        if default_account_id <= 0 || administrator_role_id <= 0 {
            return Err(AppError::Validation(
                "protected sentinel ids must be positive".to_owned(),
            ));
        }

        Ok(Self {
            default_account_id,
            administrator_role_id,
            administrator_slug: NonEmptyString::new(administrator_slug)?,
        })
    }

    /// Returns whether the record with this id is protected from deletion.
    #[must_use]
    pub fn is_protected(&self, resource: ResourceKind, id: i64) -> bool {
        match resource {
            ResourceKind::Account => id == self.default_account_id,
            ResourceKind::Role => id == self.administrator_role_id,
        }
    }

    /// Returns whether a role slug names the administrator role.
    #[must_use]
    pub fn is_administrator_slug(&self, slug: &str) -> bool {
        slug == self.administrator_slug.as_str()
    }

    /// Returns whether a role row is protected by id or by slug.
    #[must_use]
    pub fn is_protected_role(&self, id: i64, slug: &str) -> bool {
        self.is_protected(ResourceKind::Role, id) || self.is_administrator_slug(slug)
    }

    /// Returns the bootstrap account id.
    #[must_use]
    pub fn default_account_id(&self) -> i64 {
        self.default_account_id
    }

    /// Returns the administrator role id.
    #[must_use]
    pub fn administrator_role_id(&self) -> i64 {
        self.administrator_role_id
    }

    /// Returns the administrator role slug.
    #[must_use]
    pub fn administrator_slug(&self) -> &str {
        self.administrator_slug.as_str()
    }
}
