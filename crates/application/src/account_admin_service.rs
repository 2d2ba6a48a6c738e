//! Administrator account screens and save workflow.

use std::sync::Arc;

use tracing::info;

use warden_core::{AppError, AppResult};
use warden_domain::{
    AccountId, END_AFTER_START_MESSAGE, FormDeclaration, FormMode, ResourceKind, RoleId,
    TreeSelection, ValidityWindow, WINDOW_WITHIN_YEAR_MESSAGE, WindowViolation, build_tree,
};

use crate::{
    AccountDraft, AccountRecord, AccountRepository, AdminConfig, DetailScreen, FormScreen,
    FormSubmission, FormValidator, GridRequest, GridRow, GridScreen, PasswordHasher,
    PermissionNodeRepository, RoleRepository, account_detail, account_form, account_grid,
};

/// Application service behind the account administration screens.
#[derive(Clone)]
pub struct AccountAdminService {
    config: AdminConfig,
    accounts: Arc<dyn AccountRepository>,
    roles: Arc<dyn RoleRepository>,
    permission_nodes: Arc<dyn PermissionNodeRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    validator: FormValidator,
}

impl AccountAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        accounts: Arc<dyn AccountRepository>,
        roles: Arc<dyn RoleRepository>,
        permission_nodes: Arc<dyn PermissionNodeRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        validator: FormValidator,
    ) -> Self {
        Self {
            config,
            accounts,
            roles,
            permission_nodes,
            password_hasher,
            validator,
        }
    }

    /// Returns the create or edit form with initial values.
    pub async fn form_screen(&self, mode: FormMode) -> AppResult<FormScreen> {
        let existing = self.existing(mode).await?;
        let declaration = self.declaration(mode).await?;

        let record = existing
            .as_ref()
            .map(AccountRecord::to_screen_values)
            .unwrap_or_default();
        let values = declaration.prefill(&record);

        Ok(FormScreen {
            declaration,
            values,
        })
    }

    /// Returns one rendered page of the account grid.
    pub async fn grid_screen(&self, request: GridRequest) -> AppResult<GridScreen> {
        let declaration = account_grid();
        let query = request.into_query(&declaration)?;
        let page = self.accounts.list_accounts(&query).await?;

        let rows = page
            .items
            .iter()
            .map(|account| {
                let id = account.id.as_i64();
                GridRow {
                    id,
                    cells: declaration.render_row(&account.to_screen_values()),
                    actions: declaration.row_actions(
                        self.config
                            .protection()
                            .is_protected(ResourceKind::Account, id),
                    ),
                }
            })
            .collect();

        Ok(GridScreen {
            declaration,
            rows,
            total: page.total,
            page: query.page,
            per_page: query.per_page,
        })
    }

    /// Returns the detail view of one account, including its effective
    /// permission tree when the permission feature is enabled.
    pub async fn detail_screen(&self, account_id: AccountId) -> AppResult<DetailScreen> {
        let account = self.find(account_id).await?;

        let permissions = if self.config.permission_enabled() {
            let nodes = self.permission_nodes.all_nodes().await?;
            let selection = self.permission_selection(&account).await?;
            Some(build_tree(&nodes, &selection))
        } else {
            None
        };

        let declaration = account_detail(&self.config, account_id.as_i64(), permissions);
        let values = declaration.render(&account.to_screen_values());

        Ok(DetailScreen {
            declaration,
            values,
        })
    }

    /// Validates and persists a submitted account form.
    pub async fn save(
        &self,
        mode: FormMode,
        submission: FormSubmission,
    ) -> AppResult<AccountRecord> {
        let existing = self.existing(mode).await?;
        let declaration = self.declaration(mode).await?;
        self.validator.validate(&declaration, &submission).await?;

        let window = validity_window(&submission)?;
        let password_hash = self.submitted_password_hash(&submission, existing.as_ref())?;

        let role_ids = match declaration.field_named("roles") {
            Some(field) if field.mutability().submits() => Some(
                submission
                    .ids("roles")?
                    .into_iter()
                    .map(RoleId::new)
                    .collect(),
            ),
            _ => None,
        };

        let draft = AccountDraft {
            username: submission.text_or_empty("username").trim().to_owned(),
            name: submission.text_or_empty("name").trim().to_owned(),
            avatar: submission
                .text("avatar")
                .filter(|avatar| !avatar.trim().is_empty()),
            start_time: window.start(),
            end_time: window.end(),
            password_hash,
            role_ids,
        };

        let account = match existing {
            None => {
                if draft.password_hash.is_none() {
                    return Err(AppError::Validation(
                        "a password is required for new accounts".to_owned(),
                    ));
                }
                self.accounts.create_account(draft).await?
            }
            Some(existing) => self.accounts.update_account(existing.id, draft).await?,
        };

        info!(
            account_id = %account.id,
            username = %account.username,
            created = mode.is_creating(),
            "saved administrator account"
        );

        Ok(account)
    }

    /// Deletes an account unless it is the protected default account.
    pub async fn delete(&self, account_id: AccountId) -> AppResult<()> {
        if self
            .config
            .protection()
            .is_protected(ResourceKind::Account, account_id.as_i64())
        {
            return Err(AppError::Forbidden(format!(
                "account '{account_id}' is protected and cannot be deleted"
            )));
        }

        self.find(account_id).await?;
        self.accounts.delete_account(account_id).await?;

        info!(account_id = %account_id, "deleted administrator account");
        Ok(())
    }

    async fn declaration(&self, mode: FormMode) -> AppResult<FormDeclaration> {
        let roles = if self.config.permission_enabled() {
            self.roles.all_roles().await?
        } else {
            Vec::new()
        };

        account_form(&self.config, mode, &roles)
    }

    async fn existing(&self, mode: FormMode) -> AppResult<Option<AccountRecord>> {
        match mode.record_id() {
            None => Ok(None),
            Some(id) => self.find(AccountId::new(id)).await.map(Some),
        }
    }

    async fn find(&self, account_id: AccountId) -> AppResult<AccountRecord> {
        self.accounts
            .find_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{account_id}' does not exist")))
    }

    async fn permission_selection(&self, account: &AccountRecord) -> AppResult<TreeSelection> {
        let protection = self.config.protection();
        if account
            .roles
            .iter()
            .any(|role| protection.is_administrator_slug(&role.slug))
        {
            return Ok(TreeSelection::All);
        }

        let role_ids: Vec<RoleId> = account.roles.iter().map(|role| role.id).collect();
        let permission_ids = self.roles.permission_ids_for_roles(&role_ids).await?;
        Ok(TreeSelection::ids(permission_ids))
    }

    /// Hashes the submitted password when it is non-empty and differs from
    /// the stored hash. `None` keeps the stored hash.
    ///
    /// The edit form never prefills the hash, and Argon2 hashes exceed the
    /// password length rule, so the stored-hash match only applies to stored
    /// values that fit that rule.
    fn submitted_password_hash(
        &self,
        submission: &FormSubmission,
        existing: Option<&AccountRecord>,
    ) -> AppResult<Option<String>> {
        let password = submission.text_or_empty("password");
        if password.is_empty() {
            return Ok(None);
        }

        if existing.is_some_and(|account| account.password_hash == password) {
            return Ok(None);
        }

        self.password_hasher.hash_password(&password).map(Some)
    }
}

fn validity_window(submission: &FormSubmission) -> AppResult<ValidityWindow> {
    let start = submission
        .datetime("start_time")?
        .ok_or_else(|| AppError::Validation("start_time is required".to_owned()))?;
    let end = submission
        .datetime("end_time")?
        .ok_or_else(|| AppError::Validation("end_time is required".to_owned()))?;

    ValidityWindow::new(start, end).map_err(|violation| {
        AppError::Validation(
            match violation {
                WindowViolation::EndNotAfterStart => END_AFTER_START_MESSAGE,
                WindowViolation::ExceedsOneYear => WINDOW_WITHIN_YEAR_MESSAGE,
            }
            .to_owned(),
        )
    })
}

#[cfg(test)]
mod tests;
