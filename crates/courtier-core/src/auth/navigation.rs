use std::sync::Mutex;

use tracing::info;

/// Route of the login screen
pub const LOGIN_ROUTE: &str = "/login";

/// The front end's notion of "where the user is".
///
/// The API client uses it to send the user back to the login screen when
/// the server rejects the session.
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> String;
    fn navigate(&self, route: &str);
}

/// Navigate to the login route unless already there.
/// Returns whether a navigation happened.
pub fn redirect_to_login(navigator: &dyn Navigator) -> bool {
    if navigator.current_route() == LOGIN_ROUTE {
        return false;
    }
    info!(from = %navigator.current_route(), "Redirecting to login");
    navigator.navigate(LOGIN_ROUTE);
    true
}

/// Navigator that only remembers the current route and the visited ones.
#[derive(Debug)]
pub struct RouteTracker {
    history: Mutex<Vec<String>>,
}

impl RouteTracker {
    pub fn new(initial_route: &str) -> Self {
        Self {
            history: Mutex::new(vec![initial_route.to_string()]),
        }
    }

    /// Every route visited, initial route first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl Navigator for RouteTracker {
    fn current_route(&self) -> String {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().cloned())
            .unwrap_or_default()
    }

    fn navigate(&self, route: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push(route.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirects_from_other_route() {
        let nav = RouteTracker::new("/clients");
        assert!(redirect_to_login(&nav));
        assert_eq!(nav.current_route(), "/login");
        assert_eq!(nav.history(), vec!["/clients", "/login"]);
    }

    #[test]
    fn test_no_redirect_when_on_login() {
        let nav = RouteTracker::new(LOGIN_ROUTE);
        assert!(!redirect_to_login(&nav));
        assert_eq!(nav.history(), vec!["/login"]);
    }
}
