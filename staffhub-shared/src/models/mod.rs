//! Wire models exchanged with the `StaffHub` backend.

pub mod area;
pub mod auth;
pub mod project;
pub mod response;
pub mod timestamp;
pub mod user;

pub use area::Area;
pub use auth::{AuthPayload, LoginCredentials, ValidatePayload};
pub use project::{
    CreateProjectRequest, Project, ProjectFilters, ProjectStatus, UpdateProjectRequest,
};
pub use response::{ApiResponse, Page, Pagination};
pub use timestamp::Timestamp;
pub use user::{
    ContractType, CreateUserRequest, ProjectSummary, UpdateUserRequest, User, UserFilters,
    UserRole, UserSummary,
};
