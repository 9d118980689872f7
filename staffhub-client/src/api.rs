//! Authenticated request pipeline for the `StaffHub` REST API.
//!
//! Every backend call goes through [`ApiClient`]. The client carries the bearer token
//! as an explicit field shared by its clones, attaches it to each request, logs
//! traffic outside production, and applies a single cross-cutting rule: a `401` for
//! the currently attached token detaches it and fires the registered
//! [`UnauthorizedHook`] exactly once.

use reqwest::{
    Client, Method, RequestBuilder, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue},
    multipart::{Form, Part},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use shared::{
    config::ClientConfig,
    models::{
        ApiResponse, Area, AuthPayload, CreateProjectRequest, CreateUserRequest,
        LoginCredentials, Page, Project, ProjectFilters, UpdateProjectRequest,
        UpdateUserRequest, User, UserFilters, ValidatePayload,
    },
};
use std::{
    fmt,
    sync::{Arc, Mutex},
};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("staffhub-client/", env!("CARGO_PKG_VERSION"));
const REDACTED_FIELDS: [&str; 2] = ["password", "token"];

/// Reaction to the backend rejecting the attached token.
pub trait UnauthorizedHook: Send + Sync {
    /// Called once per rejected token, after the pipeline has detached it.
    ///
    /// `rejected_token` is the token the failing request carried. By the time the hook
    /// runs a newer login may already have replaced it, so implementors must only tear
    /// down state that still belongs to this token.
    fn on_unauthorized(&self, rejected_token: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Authenticated,
}

struct Reply<T> {
    status: StatusCode,
    body: ApiResponse<T>,
}

impl<T> Reply<T> {
    fn into_result(self, path: &str) -> ClientResult<Option<T>> {
        let status = self.status;
        self.body.into_result("").map_err(|message| {
            warn!(path, status = status.as_u16(), %message, "backend reported failure");
            ClientError::Api { status, message }
        })
    }

    fn into_data(self, path: &str) -> ClientResult<T> {
        self.into_result(path)?.ok_or_else(|| ClientError::MissingData {
            path: path.to_string(),
        })
    }

    fn into_unit(self, path: &str) -> ClientResult<()> {
        self.into_result(path).map(|_| ())
    }
}

/// HTTP client for the backend, shared by every resource call.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    token: Arc<Mutex<Option<String>>>,
    unauthorized: Option<Arc<dyn UnauthorizedHook>>,
    log_traffic: bool,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_token", &self.has_token())
            .field("has_unauthorized_hook", &self.unauthorized.is_some())
            .field("log_traffic", &self.log_traffic)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client from the resolved configuration.
    ///
    /// # Errors
    /// Returns [`ClientError::Build`] if the underlying HTTP client cannot be created.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            base_url: config.api_url.clone(),
            http,
            token: Arc::new(Mutex::new(None)),
            unauthorized: None,
            log_traffic: config.logs_traffic(),
        })
    }

    /// Copy of this client that reports rejected tokens to `hook`.
    ///
    /// The copy shares the token slot with `self`.
    #[must_use]
    pub fn with_unauthorized_hook(mut self, hook: Arc<dyn UnauthorizedHook>) -> Self {
        self.unauthorized = Some(hook);
        self
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Attach `token` to every subsequent request.
    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.into());
        }
    }

    /// Stop attaching a token.
    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }

    /// Stop attaching a token, but only if `token` is the one attached.
    ///
    /// Returns whether the slot was cleared.
    pub fn clear_token_if(&self, token: &str) -> bool {
        match self.token.lock() {
            Ok(mut guard) if guard.as_deref() == Some(token) => {
                *guard = None;
                true
            }
            _ => false,
        }
    }

    /// Currently attached token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    /// Whether a token is attached.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Detach `sent` if it is still the attached token, and report it once.
    fn reject_token(&self, sent: &str) {
        if self.clear_token_if(sent) {
            warn!("backend rejected the session token; signing out");
            if let Some(hook) = &self.unauthorized {
                hook.on_unauthorized(sent);
            }
        } else {
            debug!("ignoring 401 for a token that is no longer attached");
        }
    }

    /// Token to attach for `access`, failing pre-flight when one is required but absent.
    fn credentials_for(
        &self,
        method: &Method,
        path: &str,
        access: Access,
    ) -> ClientResult<Option<String>> {
        match access {
            Access::Public => Ok(None),
            Access::Authenticated => self.token().map(Some).ok_or_else(|| {
                debug!(%method, %path, "refusing authenticated call without a token");
                ClientError::NotAuthenticated
            }),
        }
    }

    async fn send<T, Q, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&Q>,
        body: Option<&B>,
        access: Access,
    ) -> ClientResult<Reply<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let path = display_path(segments);
        let sent_token = self.credentials_for(&method, &path, access)?;

        let mut request = self.http.request(method.clone(), self.endpoint(segments)?);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        if self.log_traffic {
            let payload = body.and_then(|body| serde_json::to_value(body).ok()).map(redact);
            info!(%method, %path, payload = ?payload, "api request");
        }

        self.dispatch(method, &path, request, sent_token).await
    }

    /// Attach `sent_token`, perform `request` and interpret the response.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        mut request: RequestBuilder,
        sent_token: Option<String>,
    ) -> ClientResult<Reply<T>> {
        if let Some(token) = &sent_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| transport_error(path, err))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| transport_error(path, err))?;

        if self.log_traffic {
            info!(%method, %path, status = status.as_u16(), "api response");
        }

        if status == StatusCode::UNAUTHORIZED {
            if let Some(sent) = sent_token.as_deref() {
                self.reject_token(sent);
                return Err(ClientError::SessionExpired);
            }
        }

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiResponse<Value>>(&bytes)
                .ok()
                .and_then(|envelope| envelope.failure_message())
                .unwrap_or_default();
            warn!(%method, %path, status = status.as_u16(), %message, "api request failed");
            return Err(ClientError::Api { status, message });
        }

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            ApiResponse {
                success: true,
                data: None,
                message: None,
                errors: None,
                error: None,
            }
        } else {
            serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode {
                path: path.to_string(),
                message: err.to_string(),
            })?
        };

        Ok(Reply { status, body })
    }

    // Generic verbs. Each requires an attached token and returns the raw envelope.

    /// `GET path`.
    ///
    /// # Errors
    /// Fails pre-flight without a token; otherwise see [`ClientError`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        self.send::<T, (), ()>(Method::GET, &split_path(path), None, None, Access::Authenticated)
            .await
            .map(|reply| reply.body)
    }

    /// `GET path?params`.
    ///
    /// # Errors
    /// Fails pre-flight without a token; otherwise see [`ClientError`].
    pub async fn get_with_params<T, Q>(&self, path: &str, params: &Q) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send::<T, Q, ()>(
            Method::GET,
            &split_path(path),
            Some(params),
            None,
            Access::Authenticated,
        )
        .await
        .map(|reply| reply.body)
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    /// Fails pre-flight without a token; otherwise see [`ClientError`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send::<T, (), B>(
            Method::POST,
            &split_path(path),
            None,
            Some(body),
            Access::Authenticated,
        )
        .await
        .map(|reply| reply.body)
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    /// Fails pre-flight without a token; otherwise see [`ClientError`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send::<T, (), B>(
            Method::PUT,
            &split_path(path),
            None,
            Some(body),
            Access::Authenticated,
        )
        .await
        .map(|reply| reply.body)
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    /// Fails pre-flight without a token; otherwise see [`ClientError`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send::<T, (), B>(
            Method::PATCH,
            &split_path(path),
            None,
            Some(body),
            Access::Authenticated,
        )
        .await
        .map(|reply| reply.body)
    }

    /// `DELETE path`.
    ///
    /// # Errors
    /// Fails pre-flight without a token; otherwise see [`ClientError`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        self.send::<T, (), ()>(
            Method::DELETE,
            &split_path(path),
            None,
            None,
            Access::Authenticated,
        )
        .await
        .map(|reply| reply.body)
    }

    /// `POST path` with `contents` as the multipart field `file`.
    ///
    /// # Errors
    /// Fails pre-flight without a token; otherwise see [`ClientError`].
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> ClientResult<ApiResponse<T>> {
        let segments = split_path(path);
        let path = display_path(&segments);
        let sent_token = self.credentials_for(&Method::POST, &path, Access::Authenticated)?;

        let size = contents.len();
        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name.to_string()));
        let request = self
            .http
            .request(Method::POST, self.endpoint(&segments)?)
            .multipart(form);

        if self.log_traffic {
            info!(method = %Method::POST, %path, file_name, size, "api upload");
        }

        self.dispatch(Method::POST, &path, request, sent_token)
            .await
            .map(|reply| reply.body)
    }

    // Authentication

    /// Exchange credentials for an identity and token. Does not attach the token.
    ///
    /// # Errors
    /// Returns [`ClientError::Api`] carrying the backend message on rejection.
    pub async fn login(&self, credentials: &LoginCredentials) -> ClientResult<AuthPayload> {
        const PATH: &[&str] = &["auth", "login"];
        self.send::<AuthPayload, (), _>(Method::POST, PATH, None, Some(credentials), Access::Public)
            .await?
            .into_data("/auth/login")
    }

    /// Identity behind the attached token.
    ///
    /// # Errors
    /// Fails pre-flight without a token, or with [`ClientError::SessionExpired`] on `401`.
    pub async fn validate_token(&self) -> ClientResult<User> {
        const PATH: &[&str] = &["auth", "validate"];
        self.send::<ValidatePayload, (), ()>(Method::GET, PATH, None, None, Access::Authenticated)
            .await?
            .into_data("/auth/validate")
            .map(|payload| payload.user)
    }

    /// Tell the backend to revoke the attached token.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn logout_remote(&self) -> ClientResult<()> {
        const PATH: &[&str] = &["auth", "logout"];
        self.send::<Value, (), ()>(Method::POST, PATH, None, None, Access::Authenticated)
            .await?
            .into_unit("/auth/logout")
    }

    // Users

    /// `GET /users` with optional filters.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn list_users(&self, filters: &UserFilters) -> ClientResult<Page<User>> {
        self.send::<Page<User>, _, ()>(
            Method::GET,
            &["users"],
            Some(filters),
            None,
            Access::Authenticated,
        )
        .await?
        .into_data("/users")
    }

    /// `GET /users/{id}`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn get_user(&self, id: &str) -> ClientResult<User> {
        self.send::<User, (), ()>(Method::GET, &["users", id], None, None, Access::Authenticated)
            .await?
            .into_data("/users/{id}")
    }

    /// `GET /users/me`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn current_user(&self) -> ClientResult<User> {
        self.send::<User, (), ()>(Method::GET, &["users", "me"], None, None, Access::Authenticated)
            .await?
            .into_data("/users/me")
    }

    /// `POST /users`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn create_user(&self, request: &CreateUserRequest) -> ClientResult<User> {
        self.send::<User, (), _>(
            Method::POST,
            &["users"],
            None,
            Some(request),
            Access::Authenticated,
        )
        .await?
        .into_data("/users")
    }

    /// `PUT /users/{id}`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn update_user(&self, id: &str, request: &UpdateUserRequest) -> ClientResult<User> {
        self.send::<User, (), _>(
            Method::PUT,
            &["users", id],
            None,
            Some(request),
            Access::Authenticated,
        )
        .await?
        .into_data("/users/{id}")
    }

    /// `DELETE /users/{id}`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn delete_user(&self, id: &str) -> ClientResult<()> {
        self.send::<Value, (), ()>(
            Method::DELETE,
            &["users", id],
            None,
            None,
            Access::Authenticated,
        )
        .await?
        .into_unit("/users/{id}")
    }

    // Areas

    /// `GET /areas`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn list_areas(&self) -> ClientResult<Vec<Area>> {
        self.send::<Page<Area>, (), ()>(Method::GET, &["areas"], None, None, Access::Authenticated)
            .await?
            .into_data("/areas")
            .map(|page| page.items)
    }

    // Projects

    /// `GET /projects` with optional filters.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn list_projects(&self, filters: &ProjectFilters) -> ClientResult<Page<Project>> {
        self.send::<Page<Project>, _, ()>(
            Method::GET,
            &["projects"],
            Some(filters),
            None,
            Access::Authenticated,
        )
        .await?
        .into_data("/projects")
    }

    /// `GET /projects/{id}`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn get_project(&self, id: &str) -> ClientResult<Project> {
        self.send::<Project, (), ()>(
            Method::GET,
            &["projects", id],
            None,
            None,
            Access::Authenticated,
        )
        .await?
        .into_data("/projects/{id}")
    }

    /// `POST /projects`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn create_project(&self, request: &CreateProjectRequest) -> ClientResult<Project> {
        self.send::<Project, (), _>(
            Method::POST,
            &["projects"],
            None,
            Some(request),
            Access::Authenticated,
        )
        .await?
        .into_data("/projects")
    }

    /// `PUT /projects/{id}`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn update_project(
        &self,
        id: &str,
        request: &UpdateProjectRequest,
    ) -> ClientResult<Project> {
        self.send::<Project, (), _>(
            Method::PUT,
            &["projects", id],
            None,
            Some(request),
            Access::Authenticated,
        )
        .await?
        .into_data("/projects/{id}")
    }

    /// `DELETE /projects/{id}`.
    ///
    /// # Errors
    /// See [`ClientError`].
    pub async fn delete_project(&self, id: &str) -> ClientResult<()> {
        self.send::<Value, (), ()>(
            Method::DELETE,
            &["projects", id],
            None,
            None,
            Access::Authenticated,
        )
        .await?
        .into_unit("/projects/{id}")
    }

    // Health

    /// `GET /health`. Public; succeeds on any 2xx regardless of body shape.
    ///
    /// # Errors
    /// Returns [`ClientError::Api`] for non-2xx answers, or a transport error.
    pub async fn health_check(&self) -> ClientResult<StatusCode> {
        let url = self.endpoint(&["health"])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error("/health", err))?;
        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(ClientError::Api {
                status,
                message: status
                    .canonical_reason()
                    .unwrap_or("health check failed")
                    .to_string(),
            })
        }
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn display_path(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

fn transport_error(path: &str, err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        warn!(path, "request timed out");
        ClientError::Timeout {
            path: path.to_string(),
        }
    } else {
        warn!(path, error = %err, "request failed");
        ClientError::Transport {
            path: path.to_string(),
            source: err,
        }
    }
}

fn redact(mut payload: Value) -> Value {
    if let Value::Object(map) = &mut payload {
        for field in REDACTED_FIELDS {
            if let Some(value) = map.get_mut(field) {
                *value = Value::String("<redacted>".to_string());
            }
        }
    }
    payload
}
