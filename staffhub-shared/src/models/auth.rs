use serde::{Deserialize, Serialize};
use std::fmt;

use super::User;

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginCredentials {
    /// Account e-mail.
    pub email: String,
    /// Plain-text password; only ever sent over the wire.
    pub password: String,
}

impl LoginCredentials {
    /// Build credentials from any string-like inputs.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `data` of a successful login: the identity plus its bearer token.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthPayload {
    /// Authenticated identity.
    pub user: User,
    /// Opaque bearer credential.
    pub token: String,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// `data` of `GET /auth/validate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatePayload {
    /// Identity the token belongs to.
    pub user: User,
}
