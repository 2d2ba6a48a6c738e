use std::sync::Arc;

use serde_json::json;

use warden_core::AppError;
use warden_domain::{DataScope, DetailWidget, FormMode, RoleId, TreeNode};

use crate::test_support::{
    FakeMenuCache, FakeNodeRepository, FakeRoleRepository, FakeUniquenessProbe, config,
    permission_nodes, role,
};
use crate::{DetailScreen, FormSubmission, FormValidator, GridRequest};

use super::RoleAdminService;

struct Fixture {
    service: RoleAdminService,
    roles: Arc<FakeRoleRepository>,
    menu_cache: Arc<FakeMenuCache>,
}

fn menu_nodes() -> Vec<TreeNode> {
    vec![
        TreeNode::new(10, None, "Dashboard", 0),
        TreeNode::new(11, None, "Admin", 1),
        TreeNode::new(12, Some(11), "Users", 0),
    ]
}

fn fixture_with(role_bind_menu: bool, menu_cache: FakeMenuCache) -> Fixture {
    let roles = Arc::new(FakeRoleRepository::new(vec![
        role(1, "administrator", Vec::new()),
        role(2, "auditor", vec![2, 5]),
        role(3, "administrator", Vec::new()),
    ]));
    let menu_cache = Arc::new(menu_cache);
    let probe = Arc::new(FakeUniquenessProbe {
        taken: vec![
            ("slug".to_owned(), 1, "administrator".to_owned()),
            ("slug".to_owned(), 2, "auditor".to_owned()),
        ],
    });

    let service = RoleAdminService::new(
        config(true, role_bind_menu),
        roles.clone(),
        Arc::new(FakeNodeRepository::new(permission_nodes())),
        Arc::new(FakeNodeRepository::new(menu_nodes())),
        menu_cache.clone(),
        FormValidator::new(probe),
    );

    Fixture {
        service,
        roles,
        menu_cache,
    }
}

fn fixture() -> Fixture {
    fixture_with(true, FakeMenuCache::default())
}

fn submission(value: serde_json::Value) -> FormSubmission {
    FormSubmission::from_json(value).unwrap_or_else(|_| unreachable!())
}

fn checked_permissions(screen: &DetailScreen) -> Vec<i64> {
    match screen
        .declaration
        .field_named("permissions")
        .map(|field| field.widget_kind())
    {
        Some(DetailWidget::Tree(tree)) => tree.checked_ids().into_iter().collect(),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn save_persists_grants_and_invalidates_menu_once() {
    let fixture = fixture();
    let created = fixture
        .service
        .save(
            FormMode::Creating,
            submission(json!({
                "slug": "editor",
                "name": "Editor",
                "data_scope": "2",
                "permissions": "2,3",
                "menus": [10, 12],
            })),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(created.data_scope, DataScope::All);
    assert_eq!(created.permission_ids, vec![2, 3]);
    assert_eq!(created.menu_ids, vec![10, 12]);
    assert_eq!(*fixture.menu_cache.invalidations.lock().await, 1);
}

#[tokio::test]
async fn data_scope_defaults_to_self_and_created() {
    let fixture = fixture();
    let created = fixture
        .service
        .save(
            FormMode::Creating,
            submission(json!({ "slug": "viewer", "name": "Viewer" })),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(created.data_scope, DataScope::SelfAndCreated);
    assert!(created.permission_ids.is_empty());

    let form = fixture
        .service
        .form_screen(FormMode::Creating)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(form.values.get("data_scope"), Some(&json!(1)));
}

#[tokio::test]
async fn invalid_submission_does_not_touch_menu_cache() {
    let fixture = fixture();
    let result = fixture
        .service
        .save(
            FormMode::Creating,
            submission(json!({ "slug": "auditor", "name": "", "permissions": [99] })),
        )
        .await;

    match result {
        Err(AppError::InvalidFields(errors)) => {
            let fields: Vec<&str> = errors.iter().map(|error| error.field()).collect();
            assert_eq!(fields, vec!["slug", "name", "permissions"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(*fixture.menu_cache.invalidations.lock().await, 0);
}

#[tokio::test]
async fn cache_failure_does_not_fail_the_save() {
    let fixture = fixture_with(
        true,
        FakeMenuCache {
            fail: true,
            ..FakeMenuCache::default()
        },
    );

    let updated = fixture
        .service
        .save(
            FormMode::Editing(2),
            submission(json!({ "slug": "auditor", "name": "Auditors", "permissions": [5] })),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.name, "Auditors");
    assert_eq!(updated.permission_ids, vec![5]);
    assert_eq!(*fixture.menu_cache.invalidations.lock().await, 1);
}

#[tokio::test]
async fn menus_are_left_alone_without_menu_binding() {
    let fixture = fixture_with(false, FakeMenuCache::default());
    fixture
        .roles
        .roles
        .lock()
        .await
        .iter_mut()
        .for_each(|role| role.menu_ids = vec![10]);

    let updated = fixture
        .service
        .save(
            FormMode::Editing(2),
            submission(json!({ "slug": "auditor", "name": "Auditor", "menus": [11] })),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.menu_ids, vec![10]);
}

#[tokio::test]
async fn detail_checks_exactly_stored_permissions() {
    let fixture = fixture();
    let screen = fixture
        .service
        .detail_screen(RoleId::new(2))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(checked_permissions(&screen), vec![2, 5]);
    assert_eq!(screen.values.get("data_scope"), Some(&json!("Self and self-created users")));
    assert!(screen.declaration.delete_enabled());
}

#[tokio::test]
async fn administrator_slug_checks_every_permission() {
    let fixture = fixture();
    let screen = fixture
        .service
        .detail_screen(RoleId::new(3))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(checked_permissions(&screen).len(), permission_nodes().len());
}

#[tokio::test]
async fn protected_roles_cannot_be_deleted() {
    let fixture = fixture();

    assert!(matches!(
        fixture.service.delete(RoleId::new(1)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        fixture.service.delete(RoleId::new(3)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(fixture.service.delete(RoleId::new(2)).await.is_ok());
    assert_eq!(fixture.roles.roles.lock().await.len(), 2);
    assert_eq!(*fixture.menu_cache.invalidations.lock().await, 0);
}

#[tokio::test]
async fn screens_offer_delete_only_when_delete_succeeds() {
    for id in [1, 2, 3] {
        let fixture = fixture();
        let detail = fixture
            .service
            .detail_screen(RoleId::new(id))
            .await
            .unwrap_or_else(|_| unreachable!());
        let form = fixture
            .service
            .form_screen(FormMode::Editing(id))
            .await
            .unwrap_or_else(|_| unreachable!());
        let deleted = fixture.service.delete(RoleId::new(id)).await.is_ok();

        assert_eq!(detail.declaration.delete_enabled(), deleted, "role {id}");
        assert_eq!(form.declaration.delete_enabled(), deleted, "role {id}");
    }
}

#[tokio::test]
async fn grid_hides_delete_for_administrator_slugs() {
    let fixture = fixture();
    let screen = fixture
        .service
        .grid_screen(GridRequest::default())
        .await
        .unwrap_or_else(|_| unreachable!());

    let deletable: Vec<(i64, bool)> = screen
        .rows
        .iter()
        .map(|row| (row.id, row.actions.delete))
        .collect();
    assert_eq!(deletable, vec![(1, false), (2, true), (3, false)]);
    assert_eq!(
        screen.rows[1].cells.get("slug"),
        Some(&json!({ "badge": "primary", "text": "auditor" }))
    );
}

#[tokio::test]
async fn edit_form_prefills_grants() {
    let fixture = fixture();
    let screen = fixture
        .service
        .form_screen(FormMode::Editing(2))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(screen.values.get("permissions"), Some(&json!([2, 5])));
    assert_eq!(screen.values.get("menus"), Some(&json!([])));
    assert!(screen.declaration.delete_enabled());
}
