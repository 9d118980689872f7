//! Access decisions for protected routes.

use shared::models::UserRole;

use crate::{routes::Route, session::SessionState};

/// What the host should do before rendering a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restoration is still running; show a loading affordance.
    Loading,
    /// No session; navigate to the given route.
    Redirect(Route),
    /// Signed in, but the role is insufficient; send the user back to `fallback`.
    Forbidden {
        /// Where to send the user.
        fallback: Route,
    },
    /// Render the route.
    Allow,
}

/// Decide access for a route that optionally requires `required_role`.
#[must_use]
pub fn guard(state: &SessionState, required_role: Option<UserRole>) -> GuardDecision {
    if state.loading {
        return GuardDecision::Loading;
    }
    let Some(role) = state.role() else {
        return GuardDecision::Redirect(Route::Login);
    };
    match required_role {
        Some(required) if required != role => GuardDecision::Forbidden {
            fallback: Route::Dashboard,
        },
        _ => GuardDecision::Allow,
    }
}

/// Where `/` should send the user, or `None` while the session is still loading.
#[must_use]
pub fn landing_route(state: &SessionState) -> Option<Route> {
    if state.loading {
        None
    } else if state.is_authenticated() {
        Some(Route::Dashboard)
    } else {
        Some(Route::Login)
    }
}
