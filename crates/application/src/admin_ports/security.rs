use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::UniqueTarget;

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Port answering "unique except self" questions.
#[async_trait]
pub trait UniquenessProbe: Send + Sync {
    /// Returns whether a row other than `except_id` already holds `value`.
    async fn value_exists(
        &self,
        target: &UniqueTarget,
        value: &str,
        except_id: Option<i64>,
    ) -> AppResult<bool>;
}
