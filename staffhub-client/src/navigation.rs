//! Navigation seam and the role-filtered navigation menu.

use shared::models::UserRole;
use std::{fmt, sync::Mutex};

use crate::routes::Route;

/// How the host moved to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// In-app transition that keeps in-memory state.
    Push,
    /// Full reload, discarding in-memory state.
    Redirect,
}

/// Host-provided navigation, injected into the session store.
pub trait Navigator: Send + Sync {
    /// Route currently displayed, if it is one the client knows.
    fn current_route(&self) -> Option<Route>;

    /// In-app navigation to `route`.
    fn push(&self, route: Route);

    /// Forced full navigation to `route`.
    fn redirect(&self, route: Route);
}

/// Navigator that only records where it was sent.
#[derive(Default)]
pub struct MemoryNavigator {
    inner: Mutex<MemoryNavigatorState>,
}

#[derive(Debug, Default)]
struct MemoryNavigatorState {
    current: Option<Route>,
    history: Vec<(NavigationKind, Route)>,
}

impl MemoryNavigator {
    /// Navigator with no current route.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator already displaying `route`.
    #[must_use]
    pub fn at(route: Route) -> Self {
        Self {
            inner: Mutex::new(MemoryNavigatorState {
                current: Some(route),
                history: Vec::new(),
            }),
        }
    }

    /// Every navigation performed so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<(NavigationKind, Route)> {
        self.inner
            .lock()
            .map(|state| state.history.clone())
            .unwrap_or_default()
    }

    /// Number of navigations of `kind` to `route`.
    #[must_use]
    pub fn count(&self, kind: NavigationKind, route: Route) -> usize {
        self.history()
            .into_iter()
            .filter(|entry| *entry == (kind, route))
            .count()
    }

    fn record(&self, kind: NavigationKind, route: Route) {
        if let Ok(mut state) = self.inner.lock() {
            state.current = Some(route);
            state.history.push((kind, route));
        }
    }
}

impl fmt::Debug for MemoryNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNavigator")
            .field("current", &self.current_route())
            .field("history", &self.history())
            .finish()
    }
}

impl Navigator for MemoryNavigator {
    fn current_route(&self) -> Option<Route> {
        self.inner.lock().ok().and_then(|state| state.current)
    }

    fn push(&self, route: Route) {
        self.record(NavigationKind::Push, route);
    }

    fn redirect(&self, route: Route) {
        self.record(NavigationKind::Redirect, route);
    }
}

/// One entry of the dashboard navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    /// Menu label.
    pub label: &'static str,
    /// Destination.
    pub route: Route,
    /// Roles the entry is shown to.
    pub roles: &'static [UserRole],
}

impl NavItem {
    /// Whether the entry is shown to `role`.
    #[must_use]
    pub fn visible_to(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

const EVERYONE: &[UserRole] = &[UserRole::Normal, UserRole::Manager];
const MANAGERS: &[UserRole] = &[UserRole::Manager];

/// The full dashboard menu, in display order.
pub const NAVIGATION: &[NavItem] = &[
    NavItem {
        label: "Dashboard",
        route: Route::Dashboard,
        roles: EVERYONE,
    },
    NavItem {
        label: "Collaborators",
        route: Route::Collaborators,
        roles: EVERYONE,
    },
    NavItem {
        label: "Projects",
        route: Route::Projects,
        roles: EVERYONE,
    },
    NavItem {
        label: "My profile",
        route: Route::Profile,
        roles: EVERYONE,
    },
    NavItem {
        label: "Reports",
        route: Route::Reports,
        roles: MANAGERS,
    },
];

/// Menu entries shown to `role`.
#[must_use]
pub fn navigation_for(role: UserRole) -> Vec<NavItem> {
    NAVIGATION
        .iter()
        .copied()
        .filter(|item| item.visible_to(role))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managers_see_reports() {
        let routes: Vec<Route> = navigation_for(UserRole::Manager)
            .into_iter()
            .map(|item| item.route)
            .collect();
        assert_eq!(
            routes,
            vec![
                Route::Dashboard,
                Route::Collaborators,
                Route::Projects,
                Route::Profile,
                Route::Reports
            ]
        );
    }

    #[test]
    fn collaborators_do_not_see_manager_entries() {
        let items = navigation_for(UserRole::Normal);
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|item| item.route != Route::Reports));
    }

    #[test]
    fn memory_navigator_records_history() {
        let navigator = MemoryNavigator::at(Route::Login);
        assert_eq!(navigator.current_route(), Some(Route::Login));

        navigator.push(Route::Dashboard);
        navigator.redirect(Route::Login);

        assert_eq!(navigator.current_route(), Some(Route::Login));
        assert_eq!(
            navigator.history(),
            vec![
                (NavigationKind::Push, Route::Dashboard),
                (NavigationKind::Redirect, Route::Login)
            ]
        );
        assert_eq!(navigator.count(NavigationKind::Redirect, Route::Login), 1);
    }
}
