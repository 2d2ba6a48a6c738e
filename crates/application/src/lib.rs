//! Application services and ports.

#![forbid(unsafe_code)]

mod account_admin_service;
mod admin_config;
mod admin_ports;
mod admin_screens;
mod admin_views;
mod form_submission;
mod form_validator;
mod menu_service;
mod role_admin_service;

#[cfg(test)]
mod test_support;

pub use account_admin_service::AccountAdminService;
pub use admin_config::{AdminConfig, AdminTables, validate_identifier};
pub use admin_ports::{
    AccountDraft, AccountRecord, AccountRepository, ListQuery, MenuCache, MenuNodeRepository,
    Page, PasswordHasher, PermissionNodeRepository, RoleDraft, RoleRecord, RoleRepository,
    RoleSummary, UniquenessProbe,
};
pub use admin_screens::{
    account_detail, account_form, account_grid, role_detail, role_form, role_grid,
};
pub use admin_views::{
    DEFAULT_PER_PAGE, DetailScreen, FormScreen, GridRequest, GridRow, GridScreen, MAX_PER_PAGE,
};
pub use form_submission::FormSubmission;
pub use form_validator::FormValidator;
pub use menu_service::MenuService;
pub use role_admin_service::RoleAdminService;
