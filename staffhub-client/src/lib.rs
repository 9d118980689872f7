#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)] // TODO(deps-001): remove once transitive dependencies converge.

//! Session lifecycle and authenticated request pipeline for the `StaffHub` API.
//!
//! [`api::ApiClient`] performs every backend call and owns the bearer token.
//! [`session::SessionStore`] restores, establishes and ends sessions, and is the only
//! component that changes the token outside the pipeline's own `401` rule.

pub mod api;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod permissions;
pub mod routes;
pub mod session;
pub mod storage;

pub use api::{ApiClient, UnauthorizedHook};
pub use error::{ClientError, ClientResult, SessionError, StorageError};
pub use navigation::{MemoryNavigator, NavigationKind, Navigator};
pub use routes::Route;
pub use session::{Session, SessionState, SessionStore};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};

#[cfg(test)]
pub(crate) mod test_support {
    use reqwest::Url;
    use shared::{
        config::ClientConfig,
        models::{Timestamp, User, UserRole},
    };

    use crate::api::ApiClient;

    pub fn sample_user(role: UserRole) -> User {
        User {
            id: format!("user-{}", role.as_str().to_lowercase()),
            name: "Ana Souza".into(),
            email: "ana@empresa.com".into(),
            age: 31,
            contract_type: None,
            role,
            areas: Vec::new(),
            projects: None,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    /// Pipeline pointed at a port nothing listens on.
    pub fn offline_api() -> ApiClient {
        let mut config = ClientConfig::with_defaults();
        config.api_url = Url::parse("http://127.0.0.1:9/api").expect("static url");
        config.request_timeout_secs = 2;
        ApiClient::new(&config).expect("client builds")
    }
}
