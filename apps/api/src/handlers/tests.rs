use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;
use warden_application::{AdminConfig, AdminTables, MenuCache, PasswordHasher};
use warden_core::AppResult;
use warden_domain::{ProtectionPolicy, TreeNode};
use warden_infrastructure::{InMemoryAdminStore, InMemoryMenuCache, InMemoryNodeRepository};

use crate::api_router::build_router;
use crate::api_services::{AdminPorts, assemble_state};

struct PlainTestHasher;

impl PasswordHasher for PlainTestHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

#[derive(Default)]
struct CountingMenuCache {
    inner: InMemoryMenuCache,
    invalidations: Mutex<u32>,
}

#[async_trait]
impl MenuCache for CountingMenuCache {
    async fn get_menu(&self) -> AppResult<Option<Vec<TreeNode>>> {
        self.inner.get_menu().await
    }

    async fn put_menu(&self, nodes: &[TreeNode]) -> AppResult<()> {
        self.inner.put_menu(nodes).await
    }

    async fn invalidate(&self) -> AppResult<()> {
        *self.invalidations.lock().await += 1;
        self.inner.invalidate().await
    }
}

fn test_router(permission_enabled: bool) -> Router {
    test_router_with_cache(permission_enabled, Arc::new(InMemoryMenuCache::new()))
}

fn test_router_with_cache(permission_enabled: bool, menu_cache: Arc<dyn MenuCache>) -> Router {
    let tables = AdminTables::default();
    let protection =
        ProtectionPolicy::new(1, 1, "administrator").unwrap_or_else(|_| unreachable!());
    let admin = AdminConfig::new("default", tables.clone(), permission_enabled, true, protection)
        .unwrap_or_else(|_| unreachable!());

    let store = Arc::new(InMemoryAdminStore::new(tables));
    let permission_nodes = Arc::new(InMemoryNodeRepository::new(vec![
        TreeNode::new(1, None, "Auth management", 1),
        TreeNode::new(2, Some(1), "Users", 2),
        TreeNode::new(3, Some(1), "Roles", 3),
    ]));
    let menu_nodes = Arc::new(InMemoryNodeRepository::new(vec![
        TreeNode::new(10, None, "Index", 1),
        TreeNode::new(11, None, "Admin", 2),
        TreeNode::new(12, Some(11), "Users", 3),
    ]));

    let state = assemble_state(
        &admin,
        AdminPorts {
            accounts: store.clone(),
            roles: store.clone(),
            permission_nodes,
            menu_nodes,
            menu_cache,
            password_hasher: Arc::new(PlainTestHasher),
            uniqueness_probe: store,
        },
        None,
        None,
    );

    build_router(state, "http://localhost:3000", permission_enabled)
        .unwrap_or_else(|_| unreachable!())
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|_| unreachable!());

    let response = router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|_| unreachable!());
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, payload)
}

fn account_submission(username: &str, end_time: &str) -> Value {
    json!({
        "username": username,
        "name": "Grace Hopper",
        "start_time": "2026-01-01 09:00:00",
        "end_time": end_time,
        "password": "cobol59",
        "password_confirmation": "cobol59",
        "roles": 1,
    })
}

async fn seed_administrator_role(router: &Router) {
    let (status, _) = send(
        router,
        Method::POST,
        "/api/admin/roles",
        Some(json!({
            "slug": "administrator",
            "name": "Administrator",
            "data_scope": 2,
            "permissions": [],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn rejected_fields(payload: &Value) -> Vec<String> {
    payload["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|field| field["field"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn health_reports_disabled_dependencies_as_ready() {
    let router = test_router(true);

    let (status, payload) = send(&router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["postgres"]["status"], "disabled");
    assert_eq!(payload["ready"], true);
}

#[tokio::test]
async fn account_create_then_duplicate_username_is_unprocessable() {
    let router = test_router(true);
    seed_administrator_role(&router).await;

    let (status, created) = send(
        &router,
        Method::POST,
        "/api/admin/accounts",
        Some(account_submission("grace", "2026-06-01 09:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "grace");
    assert_eq!(created["roles"][0]["slug"], "administrator");
    assert!(created.get("password").is_none());

    let (status, payload) = send(
        &router,
        Method::POST,
        "/api/admin/accounts",
        Some(account_submission("grace", "2026-06-01 09:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(rejected_fields(&payload), vec!["username".to_owned()]);
}

#[tokio::test]
async fn account_saves_leave_the_menu_cache_alone() {
    let menu_cache = Arc::new(CountingMenuCache::default());
    let router = test_router_with_cache(true, menu_cache.clone());
    seed_administrator_role(&router).await;
    assert_eq!(*menu_cache.invalidations.lock().await, 1);

    let (created, _) = send(
        &router,
        Method::POST,
        "/api/admin/accounts",
        Some(account_submission("grace", "2026-06-01 09:00:00")),
    )
    .await;
    let (updated, _) = send(
        &router,
        Method::PUT,
        "/api/admin/accounts/1",
        Some(account_submission("grace", "2026-07-01 09:00:00")),
    )
    .await;

    assert_eq!(created, StatusCode::CREATED);
    assert_eq!(updated, StatusCode::OK);
    assert_eq!(*menu_cache.invalidations.lock().await, 1);
}

#[tokio::test]
async fn validity_window_violations_name_the_end_time() {
    let router = test_router(true);
    seed_administrator_role(&router).await;

    let (before_start, payload) = send(
        &router,
        Method::POST,
        "/api/admin/accounts",
        Some(account_submission("ada", "2025-12-31 09:00:00")),
    )
    .await;
    assert_eq!(before_start, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(rejected_fields(&payload).contains(&"end_time".to_owned()));

    let (too_long, payload) = send(
        &router,
        Method::POST,
        "/api/admin/accounts",
        Some(account_submission("ada", "2027-01-02 09:00:00")),
    )
    .await;
    assert_eq!(too_long, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(rejected_fields(&payload).contains(&"end_time".to_owned()));
}

#[tokio::test]
async fn default_account_cannot_be_deleted() {
    let router = test_router(true);
    seed_administrator_role(&router).await;
    for username in ["admin", "grace"] {
        let (status, _) = send(
            &router,
            Method::POST,
            "/api/admin/accounts",
            Some(account_submission(username, "2026-06-01 09:00:00")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (protected, _) = send(&router, Method::DELETE, "/api/admin/accounts/1", None).await;
    let (removed, _) = send(&router, Method::DELETE, "/api/admin/accounts/2", None).await;
    let (missing, _) = send(&router, Method::GET, "/api/admin/accounts/2", None).await;

    assert_eq!(protected, StatusCode::FORBIDDEN);
    assert_eq!(removed, StatusCode::NO_CONTENT);
    assert_eq!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn administrator_detail_checks_every_permission() {
    let router = test_router(true);
    seed_administrator_role(&router).await;

    let (status, payload) = send(&router, Method::GET, "/api/admin/roles/1", None).await;

    assert_eq!(status, StatusCode::OK);
    let permissions = payload["declaration"]["fields"]
        .as_array()
        .and_then(|fields| {
            fields
                .iter()
                .find(|field| field["name"] == "permissions")
                .cloned()
        })
        .unwrap_or_default();
    let tree = permissions["widget"]["tree"]["roots"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["checked"], true);
    assert_eq!(tree[0]["children"][1]["checked"], true);
}

#[tokio::test]
async fn grid_lists_rows_with_protected_delete_hidden() {
    let router = test_router(true);
    seed_administrator_role(&router).await;
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/admin/roles",
        Some(json!({ "slug": "editor", "name": "Editor", "permissions": "2,3" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, payload) = send(
        &router,
        Method::GET,
        "/api/admin/roles?sort=id&direction=asc&per_page=10",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["total"], 2);
    assert_eq!(payload["rows"][0]["actions"]["delete"], false);
    assert_eq!(payload["rows"][1]["actions"]["delete"], true);
}

#[tokio::test]
async fn form_declaration_requires_a_mode_consistent_id() {
    let router = test_router(true);

    let (create, payload) =
        send(&router, Method::GET, "/api/admin/accounts/form?mode=create", None).await;
    let (bad, _) = send(&router, Method::GET, "/api/admin/accounts/form?mode=edit", None).await;

    assert_eq!(create, StatusCode::OK);
    assert!(payload["declaration"].is_object());
    assert_eq!(bad, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_routes_are_absent_without_permissions() {
    let router = test_router(false);

    let (roles, _) = send(&router, Method::GET, "/api/admin/roles", None).await;
    let (menu, payload) = send(&router, Method::GET, "/api/admin/menu", None).await;

    assert_eq!(roles, StatusCode::NOT_FOUND);
    assert_eq!(menu, StatusCode::OK);
    assert_eq!(payload["items"].as_array().map(Vec::len), Some(2));
}
