//! Advisory permissions derived from the signed-in role.
//!
//! These only decide which affordances the client offers; the backend enforces the
//! real authorization rules.

use shared::models::User;

/// What the current user may do, as far as the client is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Permissions {
    /// Create collaborator accounts.
    pub create_user: bool,
    /// Delete collaborator accounts.
    pub delete_user: bool,
    /// Open collaborator detail pages.
    pub view_user_details: bool,
    /// See sensitive contract data.
    pub view_user_salary: bool,
    /// Create projects.
    pub create_project: bool,
    /// Edit projects.
    pub update_project: bool,
    /// Delete projects.
    pub delete_project: bool,
    /// Browse projects.
    pub view_projects: bool,
    /// Assign collaborators to projects.
    pub assign_users: bool,
    /// Open reports.
    pub access_reports: bool,
    /// Change application settings.
    pub manage_settings: bool,
    is_manager: bool,
}

impl Permissions {
    /// Permissions for `user`; anonymous callers get read-only affordances.
    #[must_use]
    pub fn for_user(user: Option<&User>) -> Self {
        let is_manager = user.is_some_and(User::is_manager);
        Self {
            create_user: is_manager,
            delete_user: is_manager,
            view_user_details: true,
            view_user_salary: is_manager,
            create_project: is_manager,
            update_project: is_manager,
            delete_project: is_manager,
            view_projects: true,
            assign_users: is_manager,
            access_reports: is_manager,
            manage_settings: is_manager,
            is_manager,
        }
    }

    /// Whether the signed-in user is a manager.
    #[must_use]
    pub const fn is_manager(&self) -> bool {
        self.is_manager
    }

    /// Managers may edit anyone; everyone else only themselves.
    #[must_use]
    pub fn update_user(&self, current: Option<&User>, target_id: &str) -> bool {
        self.is_manager || current.is_some_and(|user| user.id == target_id)
    }
}
