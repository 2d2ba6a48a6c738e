use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use warden_application::{AdminConfig, AdminTables};
use warden_core::AppError;
use warden_domain::ProtectionPolicy;

/// Startup command selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    Seed,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub menu_cache_prefix: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub seed_admin_password: Option<String>,
    pub admin: AdminConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = match env::args().nth(1).as_deref() {
            None | Some("serve") => ApiCommand::Serve,
            Some("migrate") => ApiCommand::Migrate,
            Some("seed") => ApiCommand::Seed,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown command '{other}', expected 'serve', 'migrate' or 'seed'"
                )));
            }
        };

        let database_url = required_env("DATABASE_URL")?;
        let redis_url = optional_env("REDIS_URL");
        let menu_cache_prefix =
            optional_env("MENU_CACHE_PREFIX").unwrap_or_else(|| "warden".to_owned());
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let seed_admin_password = if command == ApiCommand::Seed {
            Some(required_non_empty_env("SEED_ADMIN_PASSWORD")?)
        } else {
            None
        };

        Ok(Self {
            command,
            database_url,
            redis_url,
            menu_cache_prefix,
            frontend_url,
            api_host,
            api_port,
            seed_admin_password,
            admin: load_admin_config()?,
        })
    }

    /// Whether any admin table name differs from the migrated schema.
    pub fn uses_custom_tables(&self) -> bool {
        self.admin.tables() != &AdminTables::default()
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

fn load_admin_config() -> Result<AdminConfig, AppError> {
    let defaults = AdminTables::default();
    let tables = AdminTables {
        users: env_or("ADMIN_USERS_TABLE", defaults.users),
        roles: env_or("ADMIN_ROLES_TABLE", defaults.roles),
        permissions: env_or("ADMIN_PERMISSIONS_TABLE", defaults.permissions),
        menu: env_or("ADMIN_MENU_TABLE", defaults.menu),
        role_users: env_or("ADMIN_ROLE_USERS_TABLE", defaults.role_users),
        role_permissions: env_or("ADMIN_ROLE_PERMISSIONS_TABLE", defaults.role_permissions),
        role_menu: env_or("ADMIN_ROLE_MENU_TABLE", defaults.role_menu),
    };

    let protection = ProtectionPolicy::new(
        env_number("ADMIN_DEFAULT_ACCOUNT_ID", 1)?,
        env_number("ADMIN_ADMINISTRATOR_ROLE_ID", 1)?,
        env_or("ADMIN_ADMINISTRATOR_SLUG", "administrator".to_owned()),
    )?;

    AdminConfig::new(
        env_or("ADMIN_CONNECTION", "default".to_owned()),
        tables,
        env_flag("ADMIN_PERMISSION_ENABLED", true)?,
        env_flag("ADMIN_ROLE_BIND_MENU", true)?,
        protection,
    )
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_or(name: &str, default: String) -> String {
    optional_env(name).unwrap_or(default)
}

fn env_flag(name: &str, default: bool) -> Result<bool, AppError> {
    optional_env(name)
        .map(|value| parse_flag(name, &value))
        .transpose()
        .map(|value| value.unwrap_or(default))
}

fn env_number(name: &str, default: i64) -> Result<i64, AppError> {
    optional_env(name)
        .map(|value| {
            value
                .trim()
                .parse::<i64>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Validation(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}
