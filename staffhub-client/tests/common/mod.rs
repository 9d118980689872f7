//! In-process mock of the `StaffHub` backend used by the integration tests.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use client::{ApiClient, MemoryNavigator, SessionStore, TokenStore};
use serde_json::{Value, json};
use shared::{config::ClientConfig, models::LoginCredentials};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{net::TcpListener, task::JoinHandle};
use uuid::Uuid;

pub const MANAGER_EMAIL: &str = "admin@empresa.com";
pub const COLLABORATOR_EMAIL: &str = "joao@empresa.com";
pub const PASSWORD: &str = "123456";
/// Token the mock takes a while to reject, leaving room for a concurrent login.
pub const SLOW_REJECTED_TOKEN: &str = "slow-rejected-token";

#[derive(Default)]
pub struct MockState {
    tokens: Mutex<HashMap<String, Value>>,
    pub protected_calls: AtomicUsize,
    pub rejected_calls: AtomicUsize,
}

impl MockState {
    /// Register a token for the user with `email` without going through login.
    pub fn issue_token(&self, email: &str) -> String {
        let token = Uuid::new_v4().to_string();
        if let Some(user) = account(email) {
            self.tokens.lock().unwrap().insert(token.clone(), user);
        }
        token
    }

    /// Invalidate every issued token, as a backend restart with a new secret would.
    pub fn revoke_all(&self) {
        self.tokens.lock().unwrap().clear();
    }

    pub fn active_tokens(&self) -> HashSet<String> {
        self.tokens.lock().unwrap().keys().cloned().collect()
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<Value> {
        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.tokens.lock().unwrap().get(token).cloned()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<Value, Response> {
        self.protected_calls.fetch_add(1, Ordering::SeqCst);
        self.user_for(headers).ok_or_else(|| {
            self.rejected_calls.fetch_add(1, Ordering::SeqCst);
            failure(StatusCode::UNAUTHORIZED, "Invalid or expired token")
        })
    }
}

pub struct MockBackend {
    pub state: Arc<MockState>,
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/validate", get(validate))
            .route("/auth/logout", post(logout))
            .route("/users", get(list_users))
            .route("/users/me", get(me))
            .route("/users/{id}", get(get_user))
            .route("/areas", get(list_areas))
            .route("/uploads", post(upload))
            .route("/slow", get(slow))
            .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
            .with_state(state.clone());
        let app = Router::new().nest("/api", api);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{addr}/api"),
            handle,
        }
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::with_defaults();
        config.api_url = self.base_url.parse().unwrap();
        config.request_timeout_secs = 1;
        config
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.config()).unwrap()
    }

    pub fn session_store(
        &self,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<MemoryNavigator>,
    ) -> SessionStore {
        SessionStore::new(self.api(), tokens, navigator)
    }
}

pub fn credentials(email: &str) -> LoginCredentials {
    LoginCredentials::new(email, PASSWORD)
}

pub fn user_json(id: &str, name: &str, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": email,
        "age": 34,
        "contractType": "CLT",
        "role": role,
        "areas": [{ "id": "area-eng", "name": "Engineering" }],
        "createdAt": "2024-01-10T12:00:00.000Z",
        "updatedAt": "2024-03-02T08:30:00.000Z"
    })
}

fn account(email: &str) -> Option<Value> {
    match email {
        MANAGER_EMAIL => Some(user_json("u-1", "Admin", MANAGER_EMAIL, "MANAGER")),
        COLLABORATOR_EMAIL => Some(user_json("u-2", "João Silva", COLLABORATOR_EMAIL, "NORMAL")),
        _ => None,
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn success(data: Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "errors": ["email is required", "password is required"] })),
        )
            .into_response();
    }
    match account(email) {
        Some(user) if password == PASSWORD => {
            let token = state.issue_token(email);
            success(json!({ "user": user, "token": token }))
        }
        _ => failure(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn validate(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if bearer == Some(SLOW_REJECTED_TOKEN) {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    match state.authorize(&headers) {
        Ok(user) => success(json!({ "user": user })),
        Err(response) => response,
    }
}

async fn logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize(&headers) {
        return response;
    }
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        state.tokens.lock().unwrap().remove(token);
    }
    Json(json!({ "success": true, "message": "Logged out" })).into_response()
}

async fn list_users(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.authorize(&headers) {
        return response;
    }
    let users: Vec<Value> = [MANAGER_EMAIL, COLLABORATOR_EMAIL]
        .into_iter()
        .filter_map(account)
        .filter(|user| params.get("role").is_none_or(|role| user["role"] == *role))
        .collect();
    let total = users.len();
    success(json!({
        "data": users,
        "pagination": { "page": 1, "limit": 10, "total": total, "totalPages": 1 }
    }))
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    match state.authorize(&headers) {
        Ok(user) => success(user),
        Err(response) => response,
    }
}

async fn get_user(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(response) = state.authorize(&headers) {
        return response;
    }
    [MANAGER_EMAIL, COLLABORATOR_EMAIL]
        .into_iter()
        .filter_map(account)
        .find(|user| user["id"] == id.as_str())
        .map_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"), success)
}

async fn list_areas(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize(&headers) {
        return response;
    }
    success(json!([
        { "id": "area-eng", "name": "Engineering" },
        { "id": "area-ops", "name": "Operations", "description": "Infra and support" }
    ]))
}

async fn slow(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize(&headers) {
        return response;
    }
    tokio::time::sleep(Duration::from_secs(3)).await;
    success(json!({}))
}

async fn upload(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = state.authorize(&headers) {
        return response;
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            return success(json!({ "fileName": file_name, "size": bytes.len() }));
        }
    }
    failure(StatusCode::BAD_REQUEST, "file is required")
}
