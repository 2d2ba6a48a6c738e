use std::sync::Arc;

use serde_json::json;

use warden_core::{AppError, AppResult};
use warden_domain::{AccountId, DetailWidget, FormMode, TreeViewModel};

use crate::test_support::{
    FakeAccountRepository, FakeNodeRepository, FakePasswordHasher, FakeRoleRepository,
    FakeUniquenessProbe, account, config, permission_nodes, role, summary,
};
use crate::{FormSubmission, FormValidator, GridRequest};

use super::AccountAdminService;

struct Fixture {
    service: AccountAdminService,
    accounts: Arc<FakeAccountRepository>,
}

fn fixture(permission_enabled: bool) -> Fixture {
    let administrator = role(1, "administrator", Vec::new());
    let auditor = role(2, "auditor", vec![2, 5]);
    let editor = role(3, "editor", vec![3, 5]);

    let accounts = Arc::new(FakeAccountRepository::new(
        vec![
            account(1, "admin", vec![summary(&administrator)]),
            account(2, "grace", vec![summary(&auditor), summary(&editor)]),
            account(3, "ada", Vec::new()),
        ],
        vec![administrator.clone(), auditor.clone(), editor.clone()],
    ));
    let roles = Arc::new(FakeRoleRepository::new(vec![administrator, auditor, editor]));
    let probe = Arc::new(FakeUniquenessProbe {
        taken: vec![
            ("username".to_owned(), 1, "admin".to_owned()),
            ("username".to_owned(), 2, "grace".to_owned()),
            ("username".to_owned(), 3, "ada".to_owned()),
        ],
    });

    let service = AccountAdminService::new(
        config(permission_enabled, true),
        accounts.clone(),
        roles,
        Arc::new(FakeNodeRepository::new(permission_nodes())),
        Arc::new(FakePasswordHasher),
        FormValidator::new(probe),
    );

    Fixture { service, accounts }
}

fn submission(value: serde_json::Value) -> FormSubmission {
    FormSubmission::from_json(value).unwrap_or_else(|_| unreachable!())
}

fn new_account(start_time: &str, end_time: &str) -> FormSubmission {
    submission(json!({
        "username": "hopper",
        "name": "Grace Hopper",
        "start_time": start_time,
        "end_time": end_time,
        "password": "cobol59",
        "password_confirmation": "cobol59",
        "roles": 2,
    }))
}

fn edited_grace(password: &str) -> FormSubmission {
    submission(json!({
        "username": "grace",
        "name": "Grace",
        "start_time": "2026-02-01 00:00:00",
        "end_time": "2026-08-01 00:00:00",
        "password": password,
        "password_confirmation": password,
    }))
}

fn invalid_field(result: AppResult<impl std::fmt::Debug>, field: &str) -> bool {
    match result {
        Err(AppError::InvalidFields(errors)) => errors.iter().any(|error| error.field() == field),
        _ => false,
    }
}

fn permission_tree(screen: &crate::DetailScreen) -> TreeViewModel {
    match screen
        .declaration
        .field_named("permissions")
        .map(|field| field.widget_kind())
    {
        Some(DetailWidget::Tree(tree)) => tree.clone(),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn create_stores_hash_and_selected_role() {
    let fixture = fixture(true);
    let created = fixture
        .service
        .save(
            FormMode::Creating,
            new_account("2026-01-01 00:00:00", "2026-12-31 23:59:59"),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(created.id, AccountId::new(4));
    assert_eq!(created.password_hash, "hashed:cobol59");
    assert_eq!(created.roles.len(), 1);
    assert_eq!(created.roles[0].slug, "auditor");
}

#[tokio::test]
async fn create_rejects_end_before_start_and_windows_over_a_year() {
    let fixture = fixture(true);

    let reversed = fixture
        .service
        .save(
            FormMode::Creating,
            new_account("2026-05-01 00:00:00", "2026-04-01 00:00:00"),
        )
        .await;
    assert!(invalid_field(reversed, "end_time"));

    let too_long = fixture
        .service
        .save(
            FormMode::Creating,
            new_account("2026-01-01 00:00:00", "2027-01-02 00:00:00"),
        )
        .await;
    assert!(invalid_field(too_long, "end_time"));

    assert!(fixture.accounts.drafts.lock().await.is_empty());
}

#[tokio::test]
async fn usernames_are_unique_except_for_the_edited_account() {
    let fixture = fixture(true);

    let duplicate = submission(json!({
        "username": "grace",
        "name": "Another Grace",
        "start_time": "2026-01-01 00:00:00",
        "end_time": "2026-02-01 00:00:00",
        "password": "cobol59",
        "password_confirmation": "cobol59",
        "roles": 2,
    }));
    let created = fixture.service.save(FormMode::Creating, duplicate).await;
    assert!(invalid_field(created, "username"));

    let edited = fixture
        .service
        .save(FormMode::Editing(2), edited_grace(""))
        .await;
    assert!(edited.is_ok());
}

#[tokio::test]
async fn empty_password_on_edit_keeps_stored_hash() {
    let fixture = fixture(true);
    let updated = fixture
        .service
        .save(FormMode::Editing(2), edited_grace(""))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.password_hash, "hashed:grace-password");
    let drafts = fixture.accounts.drafts.lock().await;
    assert_eq!(drafts[0].password_hash, None);
    assert_eq!(drafts[0].role_ids, None);
}

#[tokio::test]
async fn changed_password_on_edit_is_hashed() {
    let fixture = fixture(true);
    let updated = fixture
        .service
        .save(FormMode::Editing(2), edited_grace("fortran"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.password_hash, "hashed:fortran");
    assert_ne!(updated.password_hash, "fortran");
}

#[tokio::test]
async fn resubmitted_stored_hash_is_not_hashed_again() {
    let fixture = fixture(true);
    let updated = fixture
        .service
        .save(
            FormMode::Editing(3),
            submission(json!({
                "username": "ada",
                "name": "Ada",
                "start_time": "2026-02-01 00:00:00",
                "end_time": "2026-08-01 00:00:00",
                "password": "hashed:ada-password",
                "password_confirmation": "hashed:ada-password",
            })),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.password_hash, "hashed:ada-password");
}

#[tokio::test]
async fn resubmitted_argon2_hash_fails_the_length_rule() {
    let fixture = fixture(true);
    let argon2_hash = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
        q1bYl0mWkR3v7xZJc0l7p3m8YkqkzO2m9XH0hN4cJ1E";
    let result = fixture
        .service
        .save(
            FormMode::Editing(3),
            submission(json!({
                "username": "ada",
                "name": "Ada",
                "start_time": "2026-02-01 00:00:00",
                "end_time": "2026-08-01 00:00:00",
                "password": argon2_hash,
                "password_confirmation": argon2_hash,
            })),
        )
        .await;

    assert!(invalid_field(result, "password"));
    let accounts = fixture.accounts.accounts.lock().await;
    let ada = accounts
        .iter()
        .find(|account| account.id.as_i64() == 3)
        .unwrap_or_else(|| unreachable!());
    assert_eq!(ada.password_hash, "hashed:ada-password");
}

#[tokio::test]
async fn default_account_cannot_be_deleted() {
    let fixture = fixture(true);

    let result = fixture.service.delete(AccountId::new(1)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(fixture.accounts.accounts.lock().await.len(), 3);

    assert!(fixture.service.delete(AccountId::new(3)).await.is_ok());
    assert!(matches!(
        fixture.service.delete(AccountId::new(3)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn administrator_detail_checks_every_permission() {
    let fixture = fixture(true);
    let screen = fixture
        .service
        .detail_screen(AccountId::new(1))
        .await
        .unwrap_or_else(|_| unreachable!());

    let tree = permission_tree(&screen);
    assert_eq!(tree.checked_ids().len(), permission_nodes().len());
    assert!(!screen.declaration.delete_enabled());
    assert_eq!(screen.values.get("roles"), Some(&json!(["ADMINISTRATOR"])));
    assert!(screen.values.get("password").is_none());
}

#[tokio::test]
async fn detail_checks_union_of_role_permissions() {
    let fixture = fixture(true);
    let screen = fixture
        .service
        .detail_screen(AccountId::new(2))
        .await
        .unwrap_or_else(|_| unreachable!());

    let checked: Vec<i64> = permission_tree(&screen).checked_ids().into_iter().collect();
    assert_eq!(checked, vec![2, 3, 5]);
    assert!(screen.declaration.delete_enabled());
}

#[tokio::test]
async fn edit_form_hides_stored_hash() {
    let fixture = fixture(true);
    let screen = fixture
        .service
        .form_screen(FormMode::Editing(2))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(screen.values.get("password"), Some(&json!("")));
    assert_eq!(screen.values.get("roles"), Some(&json!(2)));
    assert_eq!(screen.values.get("username"), Some(&json!("grace")));
}

#[tokio::test]
async fn grid_lists_newest_first_and_protects_default_account() {
    let fixture = fixture(true);
    let screen = fixture
        .service
        .grid_screen(GridRequest::default())
        .await
        .unwrap_or_else(|_| unreachable!());

    let ids: Vec<i64> = screen.rows.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(screen.total, 3);
    assert!(screen.rows[0].actions.delete);
    assert!(!screen.rows[2].actions.delete);
    assert_eq!(screen.rows[1].cells.get("roles"), Some(&json!("AUDITOR")));

    let searched = fixture
        .service
        .grid_screen(GridRequest {
            search: Some("GRA".to_owned()),
            ..GridRequest::default()
        })
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(searched.rows.len(), 1);
    assert_eq!(searched.rows[0].id, 2);
}

#[tokio::test]
async fn roles_are_skipped_when_permission_feature_is_off() {
    let fixture = fixture(false);
    fixture
        .service
        .save(
            FormMode::Creating,
            new_account("2026-01-01 00:00:00", "2026-03-01 00:00:00"),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let drafts = fixture.accounts.drafts.lock().await;
    assert_eq!(drafts[0].role_ids, None);
}
