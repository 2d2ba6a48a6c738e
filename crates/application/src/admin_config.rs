//! Typed administration settings resolved once at startup.

use warden_core::{AppError, AppResult};
use warden_domain::{ProtectionPolicy, UniqueTarget};

/// Table identifiers used by the administration screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminTables {
    /// Administrator accounts.
    pub users: String,
    /// Roles.
    pub roles: String,
    /// Permission nodes.
    pub permissions: String,
    /// Menu nodes.
    pub menu: String,
    /// Account to role pivot.
    pub role_users: String,
    /// Role to permission pivot.
    pub role_permissions: String,
    /// Role to menu pivot.
    pub role_menu: String,
}

impl Default for AdminTables {
    fn default() -> Self {
        Self {
            users: "admin_users".to_owned(),
            roles: "admin_roles".to_owned(),
            permissions: "admin_permissions".to_owned(),
            menu: "admin_menu".to_owned(),
            role_users: "admin_role_users".to_owned(),
            role_permissions: "admin_role_permissions".to_owned(),
            role_menu: "admin_role_menu".to_owned(),
        }
    }
}

impl AdminTables {
    /// Checks every table name is a plain SQL identifier.
    pub fn validate(&self) -> AppResult<()> {
        for name in [
            &self.users,
            &self.roles,
            &self.permissions,
            &self.menu,
            &self.role_users,
            &self.role_permissions,
            &self.role_menu,
        ] {
            validate_identifier(name)?;
        }

        Ok(())
    }
}

/// Administration feature switches, storage names, and protected sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    connection: String,
    tables: AdminTables,
    permission_enabled: bool,
    role_bind_menu: bool,
    protection: ProtectionPolicy,
}

impl AdminConfig {
    /// Creates a validated configuration.
    pub fn new(
        connection: impl Into<String>,
        tables: AdminTables,
        permission_enabled: bool,
        role_bind_menu: bool,
        protection: ProtectionPolicy,
    ) -> AppResult<Self> {
        let connection = connection.into();
        validate_identifier(&connection)?;
        tables.validate()?;

        Ok(Self {
            connection,
            tables,
            permission_enabled,
            role_bind_menu,
            protection,
        })
    }

    /// Returns the named connection uniqueness checks run against.
    #[must_use]
    pub fn connection(&self) -> &str {
        self.connection.as_str()
    }

    /// Returns the table identifiers.
    #[must_use]
    pub fn tables(&self) -> &AdminTables {
        &self.tables
    }

    /// Returns whether role and permission screens are enabled.
    #[must_use]
    pub fn permission_enabled(&self) -> bool {
        self.permission_enabled
    }

    /// Returns whether roles are bound to menu entries.
    #[must_use]
    pub fn role_bind_menu(&self) -> bool {
        self.role_bind_menu
    }

    /// Returns the deletion protection policy.
    #[must_use]
    pub fn protection(&self) -> &ProtectionPolicy {
        &self.protection
    }

    /// Returns the uniqueness target for account usernames.
    #[must_use]
    pub fn username_target(&self) -> UniqueTarget {
        UniqueTarget {
            connection: self.connection.clone(),
            table: self.tables.users.clone(),
            column: "username".to_owned(),
        }
    }

    /// Returns the uniqueness target for role slugs.
    #[must_use]
    pub fn slug_target(&self) -> UniqueTarget {
        UniqueTarget {
            connection: self.connection.clone(),
            table: self.tables.roles.clone(),
            column: "slug".to_owned(),
        }
    }
}

/// Checks a value is safe to splice into SQL as an identifier.
pub fn validate_identifier(value: &str) -> AppResult<()> {
    let mut characters = value.chars();
    let starts_well = characters
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
    let rest_ok = characters.all(|character| character.is_ascii_alphanumeric() || character == '_');

    if !starts_well || !rest_ok || value.len() > 63 {
        return Err(AppError::Validation(format!(
            "'{value}' is not a valid identifier"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use warden_domain::ProtectionPolicy;

    use super::{AdminConfig, AdminTables, validate_identifier};

    fn protection() -> ProtectionPolicy {
        ProtectionPolicy::new(1, 1, "administrator").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn default_tables_are_valid() {
        assert!(AdminTables::default().validate().is_ok());
    }

    #[test]
    fn identifiers_reject_sql_fragments() {
        assert!(validate_identifier("admin_users").is_ok());
        assert!(validate_identifier("admin_users; DROP TABLE x").is_err());
        assert!(validate_identifier("1users").is_err());
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn config_rejects_invalid_table_names() {
        let tables = AdminTables {
            users: "admin users".to_owned(),
            ..AdminTables::default()
        };
        assert!(AdminConfig::new("main", tables, true, true, protection()).is_err());
    }

    #[test]
    fn unique_targets_use_configured_tables() {
        let config = AdminConfig::new("main", AdminTables::default(), true, true, protection())
            .unwrap_or_else(|_| unreachable!());
        let target = config.username_target();
        assert_eq!(target.connection, "main");
        assert_eq!(target.table, "admin_users");
        assert_eq!(target.column, "username");
        assert_eq!(config.slug_target().table, "admin_roles");
    }
}
