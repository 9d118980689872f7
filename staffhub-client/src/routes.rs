//! Application routes the session lifecycle navigates between.

use std::fmt;

/// Every route the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Route {
    /// `/`: decides between dashboard and login once the session is restored.
    Home,
    /// `/login`
    Login,
    /// `/dashboard`
    Dashboard,
    /// `/dashboard/colaboradores`
    Collaborators,
    /// `/dashboard/projetos`
    Projects,
    /// `/dashboard/perfil`
    Profile,
    /// `/dashboard/relatorios`
    Reports,
}

impl Route {
    /// Canonical path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Collaborators => "/dashboard/colaboradores",
            Self::Projects => "/dashboard/projetos",
            Self::Profile => "/dashboard/perfil",
            Self::Reports => "/dashboard/relatorios",
        }
    }

    /// Resolve a location path to a route by exact comparison.
    ///
    /// Query strings, fragments and a single trailing slash are ignored; anything else
    /// must match a canonical path exactly, so `/login-help` is not the login route.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let trimmed = match path.strip_suffix('/') {
            Some("") | None => path,
            Some(rest) => rest,
        };
        <Self as strum::IntoEnumIterator>::iter().find(|route| route.path() == trimmed)
    }

    /// Whether `path` is exactly the login route.
    #[must_use]
    pub fn is_login_path(path: &str) -> bool {
        Self::from_path(path) == Some(Self::Login)
    }

    /// Whether the route requires an authenticated session.
    #[must_use]
    pub const fn requires_session(self) -> bool {
        !matches!(self, Self::Home | Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_route_round_trips_through_its_path() {
        for route in Route::iter() {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn dashboard_sections_use_portuguese_paths() {
        assert_eq!(Route::Collaborators.path(), "/dashboard/colaboradores");
        assert_eq!(Route::Projects.path(), "/dashboard/projetos");
        assert_eq!(Route::Profile.path(), "/dashboard/perfil");
        assert_eq!(Route::from_path("/dashboard/perfil/"), Some(Route::Profile));
        assert_eq!(Route::from_path("/dashboard/profile"), None);
    }

    #[test]
    fn trailing_slash_query_and_fragment_are_ignored() {
        assert_eq!(Route::from_path("/login/"), Some(Route::Login));
        assert_eq!(Route::from_path("/login?next=/dashboard"), Some(Route::Login));
        assert_eq!(Route::from_path("/dashboard#top"), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/"), Some(Route::Home));
        assert_eq!(Route::from_path(""), None);
    }

    #[test]
    fn login_match_is_exact_not_substring() {
        assert!(Route::is_login_path("/login"));
        assert!(!Route::is_login_path("/login-help"));
        assert!(!Route::is_login_path("/dashboard/login"));
        assert!(!Route::is_login_path("/blogin"));
    }

    #[test]
    fn public_routes_do_not_require_session() {
        assert!(!Route::Home.requires_session());
        assert!(!Route::Login.requires_session());
        assert!(Route::Reports.requires_session());
    }
}
