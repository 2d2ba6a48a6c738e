//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_admin_store;
mod in_memory_menu_cache;
mod postgres_account_repository;
mod postgres_listing;
mod postgres_node_repository;
mod postgres_role_repository;
mod postgres_uniqueness_probe;
mod redis_menu_cache;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_admin_store::{InMemoryAdminStore, InMemoryNodeRepository};
pub use in_memory_menu_cache::InMemoryMenuCache;
pub use postgres_account_repository::PostgresAccountRepository;
pub use postgres_node_repository::{PostgresMenuNodeRepository, PostgresPermissionNodeRepository};
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_uniqueness_probe::PostgresUniquenessProbe;
pub use redis_menu_cache::RedisMenuCache;
