use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    errors::AppError,
    storage::{LocalStorage, JWT_KEY, USER_KEY},
    stores::Store,
    structs::User,
};

pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Performs the full navigation that follows a cleared session.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator for headless use; records the target in the log only.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        log::info!("Navigating to {}", path);
    }
}

#[derive(Debug, Clone)]
pub struct ClearOptions {
    pub clear_storage: bool,
    pub redirect: bool,
    pub path: String,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            clear_storage: true,
            redirect: true,
            path: DEFAULT_LOGIN_PATH.to_owned(),
        }
    }
}

pub struct SessionManager {
    state: Store<Session>,
    storage: Arc<dyn LocalStorage>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn LocalStorage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            state: Store::default(),
            storage,
            navigator,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Reinstates a session mirrored by a previous run. Returns whether one was found.
    pub fn restore(&self) -> bool {
        let (Some(token), Some(raw_user)) = (self.storage.get(JWT_KEY), self.storage.get(USER_KEY))
        else {
            return false;
        };
        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => {
                log::info!("Restored session for {}", user.email);
                self.state.set(Session {
                    user: Some(user),
                    token: Some(token),
                });
                true
            }
            Err(e) => {
                log::warn!("Ignoring stored session, user record unreadable: {}", e);
                false
            }
        }
    }

    /// Installs a session taken from a successful auth response.
    ///
    /// The in-memory session is always replaced. A failure to mirror it into
    /// storage is returned after the replacement has happened.
    pub fn set_session(&self, user: User, token: String) -> Result<(), AppError> {
        let serialized = serde_json::to_string(&user)?;
        log::info!("Session established for {}", user.email);
        self.state.set(Session {
            user: Some(user),
            token: Some(token.clone()),
        });
        let mirrored = self
            .storage
            .set(USER_KEY, &serialized)
            .and_then(|_| self.storage.set(JWT_KEY, &token));
        if let Err(e) = mirrored {
            // A half-written pair must not be restorable.
            log::error!("Failed to store session, dropping stored pair: {}", e);
            if let Err(cleanup) = self.remove_stored() {
                log::error!("Failed to drop stored session: {}", cleanup);
            }
            return Err(e);
        }
        Ok(())
    }

    pub fn clear_session(&self, options: ClearOptions) -> Result<(), AppError> {
        self.state.set(Session::default());
        log::info!("Session cleared");

        let mut result = Ok(());
        if options.clear_storage {
            result = self.remove_stored();
        }
        if options.redirect {
            self.navigator.navigate(&options.path);
        }
        result
    }

    /// Removes both keys even when the first removal fails; reports the first error.
    fn remove_stored(&self) -> Result<(), AppError> {
        let jwt = self.storage.remove(JWT_KEY);
        let user = self.storage.remove(USER_KEY);
        jwt.and(user)
    }

    /// Clears everything and sends the user to the configured login path.
    pub fn sign_out(&self) -> Result<(), AppError> {
        self.clear_session(ClearOptions {
            path: self.login_path.clone(),
            ..ClearOptions::default()
        })
    }

    pub fn session(&self) -> Session {
        self.state.get()
    }

    pub fn token(&self) -> Option<String> {
        self.state.get().token
    }

    pub fn email(&self) -> Option<String> {
        self.state.get().user.map(|user| user.email)
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}
