mod accounts;
mod listing;
mod nodes;
mod roles;
mod security;

pub use accounts::{AccountDraft, AccountRecord, AccountRepository, RoleSummary};
pub use listing::{ListQuery, Page};
pub use nodes::{MenuCache, MenuNodeRepository, PermissionNodeRepository};
pub use roles::{RoleDraft, RoleRecord, RoleRepository};
pub use security::{PasswordHasher, UniquenessProbe};
