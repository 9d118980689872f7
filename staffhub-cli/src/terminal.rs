//! Terminal implementation of the client's navigation seam.

use client::{Navigator, Route};
use std::sync::Mutex;
use tracing::debug;

/// Navigator for a one-shot CLI process: there is no screen to switch, so route
/// changes become hints on stderr.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    current: Mutex<Option<Route>>,
}

impl TerminalNavigator {
    fn set(&self, route: Route) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = Some(route);
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_route(&self) -> Option<Route> {
        self.current.lock().ok().and_then(|guard| *guard)
    }

    fn push(&self, route: Route) {
        debug!(%route, "navigate");
        self.set(route);
    }

    fn redirect(&self, route: Route) {
        self.set(route);
        if route == Route::Login {
            eprintln!("Your session has ended. Run `staffhub session login` to sign in again.");
        } else {
            debug!(%route, "redirect");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_last_route() {
        let navigator = TerminalNavigator::default();
        assert_eq!(navigator.current_route(), None);
        navigator.push(Route::Dashboard);
        assert_eq!(navigator.current_route(), Some(Route::Dashboard));
        navigator.redirect(Route::Login);
        assert_eq!(navigator.current_route(), Some(Route::Login));
    }
}
