use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{Area, ProjectStatus, Timestamp};

/// Coarse authorization tier attached to every account.
///
/// The client only uses the role to decide which affordances to show; the backend
/// remains the authority on what a caller may actually do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Ordinary collaborator.
    #[default]
    Normal,
    /// Privileged manager with administrative affordances.
    Manager,
}

impl UserRole {
    /// Every role, in display order.
    pub const ALL: [Self; 2] = [Self::Normal, Self::Manager];

    /// Return the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Manager => "MANAGER",
        }
    }

    /// Human label used in listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Collaborator",
            Self::Manager => "Manager",
        }
    }

    /// Whether this role unlocks the administrative affordances.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Manager)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "MANAGER" => Ok(Self::Manager),
            _ => Err("unknown user role"),
        }
    }
}

/// Employment contract of a collaborator.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ContractType {
    /// Salaried employee.
    Clt,
    /// Contractor invoicing through a company.
    Pj,
    /// Independent freelancer.
    Freelancer,
}

impl ContractType {
    /// Human label used in listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clt => "CLT",
            Self::Pj => "PJ",
            Self::Freelancer => "Freelancer",
        }
    }
}

/// A collaborator account as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// Age in years.
    #[serde(default)]
    pub age: u32,
    /// Employment contract, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<ContractType>,
    /// Authorization tier.
    pub role: UserRole,
    /// Areas the collaborator belongs to.
    #[serde(default)]
    pub areas: Vec<Area>,
    /// Projects the collaborator takes part in, when the endpoint embeds them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectSummary>>,
    /// Creation instant.
    pub created_at: Timestamp,
    /// Last modification instant.
    pub updated_at: Timestamp,
}

impl User {
    /// Whether the account carries the manager role.
    #[must_use]
    pub const fn is_manager(&self) -> bool {
        self.role.is_privileged()
    }
}

/// Compact project reference embedded in a [`User`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Project identifier.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Free-form role the collaborator plays in the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_in_project: Option<String>,
}

/// Compact collaborator reference embedded in a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Collaborator identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// Areas the collaborator belongs to.
    #[serde(default)]
    pub areas: Vec<Area>,
    /// Free-form role the collaborator plays in the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_in_project: Option<String>,
}

/// Payload for `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Full name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Age in years.
    pub age: u32,
    /// Employment contract.
    pub contract_type: ContractType,
    /// Authorization tier; the backend defaults to [`UserRole::Normal`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Areas to attach the collaborator to.
    #[serde(default)]
    pub area_ids: Vec<String>,
}

/// Payload for `PUT /users/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New login e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New age.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// New employment contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<ContractType>,
    /// New authorization tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Replacement set of areas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_ids: Option<Vec<String>>,
}

impl UpdateUserRequest {
    /// True when no field would be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.age.is_none()
            && self.contract_type.is_none()
            && self.role.is_none()
            && self.area_ids.is_none()
    }
}

/// Query parameters accepted by `GET /users`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserFilters {
    /// One-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Name substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// E-mail substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Exact role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Area membership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
}
