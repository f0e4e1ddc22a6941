//! Which screen is reachable, given the session.
//!
//! Branch context lives only inside the `Translate`/`Changes` screens, and the
//! only way into them is selecting a branch from `Branches`. Logging out drops
//! the route back to `Unauthenticated`, so nothing carries across sessions.

use std::fmt;

use tracing::info;

use crate::auth::validation::is_blank;
use crate::error::NavigationError;
use crate::store::{CredentialStore, SELECTED_BRANCH_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Branches,
    Translate { branch: String },
    Changes { branch: String },
}

impl Screen {
    pub fn branch(&self) -> Option<&str> {
        match self {
            Screen::Branches => None,
            Screen::Translate { branch } | Screen::Changes { branch } => Some(branch),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Bootstrapping,
    Unauthenticated,
    Authenticated(Screen),
}

impl Route {
    pub fn screen(&self) -> Option<&Screen> {
        match self {
            Route::Authenticated(screen) => Some(screen),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Bootstrapping => write!(f, "bootstrapping"),
            Route::Unauthenticated => write!(f, "login"),
            Route::Authenticated(Screen::Branches) => write!(f, "branches"),
            Route::Authenticated(Screen::Translate { branch }) => write!(f, "translate({})", branch),
            Route::Authenticated(Screen::Changes { branch }) => write!(f, "changes({})", branch),
        }
    }
}

/// What the renderer should draw for the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    /// Session still resolving; draw nothing rather than flash the login screen.
    Placeholder,
    Login,
    Screen(&'a Screen),
}

#[derive(Debug, Default)]
pub struct Navigator {
    route: Route,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn view(&self) -> View<'_> {
        match &self.route {
            Route::Bootstrapping => View::Placeholder,
            Route::Unauthenticated => View::Login,
            Route::Authenticated(screen) => View::Screen(screen),
        }
    }

    pub fn bootstrap_completed(&mut self, authenticated: bool) -> Result<(), NavigationError> {
        if self.route != Route::Bootstrapping {
            return Err(self.invalid("finish bootstrap"));
        }
        if authenticated {
            self.go(Route::Authenticated(Screen::Branches));
        } else {
            self.go(Route::Unauthenticated);
        }
        Ok(())
    }

    /// Error unless a login may start from here.
    pub fn ensure_can_log_in(&self) -> Result<(), NavigationError> {
        match self.route {
            Route::Unauthenticated => Ok(()),
            _ => Err(self.invalid("log in")),
        }
    }

    pub fn logged_in(&mut self) -> Result<(), NavigationError> {
        self.ensure_can_log_in()?;
        self.go(Route::Authenticated(Screen::Branches));
        Ok(())
    }

    /// Persist `branch` as the selected branch, then open it for translation.
    pub fn select_branch(
        &mut self,
        store: &dyn CredentialStore,
        branch: &str,
    ) -> Result<(), NavigationError> {
        if self.route != Route::Authenticated(Screen::Branches) {
            return Err(self.invalid("select a branch"));
        }
        if is_blank(branch) {
            return Err(NavigationError::EmptyBranch);
        }

        store.set(SELECTED_BRANCH_KEY, branch)?;
        self.go(Route::Authenticated(Screen::Translate {
            branch: branch.to_string(),
        }));
        Ok(())
    }

    pub fn view_changes(&mut self) -> Result<(), NavigationError> {
        let Route::Authenticated(Screen::Translate { branch }) = &self.route else {
            return Err(self.invalid("view changes"));
        };
        let branch = branch.clone();
        self.go(Route::Authenticated(Screen::Changes { branch }));
        Ok(())
    }

    /// One step back: `Changes` -> `Translate` -> `Branches`.
    pub fn back(&mut self) -> Result<(), NavigationError> {
        let next = match &self.route {
            Route::Authenticated(Screen::Changes { branch }) => Screen::Translate {
                branch: branch.clone(),
            },
            Route::Authenticated(Screen::Translate { .. }) => Screen::Branches,
            _ => return Err(self.invalid("go back")),
        };
        self.go(Route::Authenticated(next));
        Ok(())
    }

    pub fn back_to_branches(&mut self) -> Result<(), NavigationError> {
        if !matches!(self.route, Route::Authenticated(_)) {
            return Err(self.invalid("return to branches"));
        }
        self.go(Route::Authenticated(Screen::Branches));
        Ok(())
    }

    /// Always succeeds; any branch context is dropped.
    pub fn logged_out(&mut self) {
        self.go(Route::Unauthenticated);
    }

    fn go(&mut self, route: Route) {
        info!("Navigating {} -> {}", self.route, route);
        self.route = route;
    }

    fn invalid(&self, action: &'static str) -> NavigationError {
        NavigationError::InvalidTransition {
            from: self.route.to_string(),
            action,
        }
    }
}
