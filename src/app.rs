//! View-model tying session, navigation and drafts to the backend.
//!
//! A renderer reads state from here and forwards user actions to it; nothing
//! in this module draws anything. Dependencies are injected once at
//! construction and shared by the parts that need them.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{Backend, TranslationFile, UserProfile};
use crate::auth::{AccessToken, BootstrapOutcome, Session, SessionManager};
use crate::branches::BranchSummary;
use crate::changes::DiffFile;
use crate::drafts::DraftManager;
use crate::error::{AppError, NavigationError, SessionError};
use crate::navigation::{Navigator, Route, Screen, View};
use crate::store::CredentialStore;

pub struct TranslationApp {
    store: Arc<dyn CredentialStore>,
    backend: Arc<dyn Backend>,
    session: SessionManager,
    navigator: Navigator,
    drafts: DraftManager,
    branches: Vec<BranchSummary>,
    changes: Vec<DiffFile>,
}

impl TranslationApp {
    pub fn new(store: Arc<dyn CredentialStore>, backend: Arc<dyn Backend>) -> Self {
        Self {
            session: SessionManager::new(store.clone(), backend.clone()),
            drafts: DraftManager::new(backend.clone()),
            navigator: Navigator::new(),
            store,
            backend,
            branches: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn route(&self) -> &Route {
        self.navigator.route()
    }

    pub fn view(&self) -> View<'_> {
        self.navigator.view()
    }

    pub fn session(&self) -> &Session {
        self.session.session()
    }

    pub fn drafts(&self) -> &DraftManager {
        &self.drafts
    }

    pub fn branches(&self) -> &[BranchSummary] {
        &self.branches
    }

    pub fn changes(&self) -> &[DiffFile] {
        &self.changes
    }

    /// Resolve the stored session and leave `Bootstrapping`.
    ///
    /// The route is settled even when bootstrap reports an error.
    pub async fn start(&mut self) -> Result<BootstrapOutcome, AppError> {
        let outcome = match self.session.bootstrap().await {
            Err(SessionError::AlreadyBootstrapped) => {
                return Err(SessionError::AlreadyBootstrapped.into())
            }
            other => other,
        };
        self.navigator
            .bootstrap_completed(self.session.is_authenticated())?;
        Ok(outcome?)
    }

    pub fn login(&mut self, token: AccessToken, user: UserProfile) -> Result<(), AppError> {
        self.navigator.ensure_can_log_in()?;
        self.session.login(token, user)?;
        self.enter_session()
    }

    pub async fn login_with_code(&mut self, code: &str, redirect_uri: &str) -> Result<(), AppError> {
        self.navigator.ensure_can_log_in()?;
        self.session.login_with_code(code, redirect_uri).await?;
        self.enter_session()
    }

    fn enter_session(&mut self) -> Result<(), AppError> {
        self.reset_screen_data();
        self.navigator.logged_in()?;
        Ok(())
    }

    /// Sign out and return to the login screen. Local state is always
    /// cleared; a store failure is still reported.
    pub fn logout(&mut self) -> Result<(), AppError> {
        let result = self.session.logout();
        self.navigator.logged_out();
        self.reset_screen_data();
        result.map_err(AppError::from)
    }

    /// Fetch the branch list. Calling again refreshes it.
    pub async fn load_branches(&mut self) -> Result<&[BranchSummary], AppError> {
        let token = self.token()?;
        self.branches = self.backend.list_branches(&token).await.map_err(|e| {
            warn!("Failed to load branches: {}", e);
            AppError::from(e)
        })?;
        Ok(&self.branches)
    }

    pub fn select_branch(&mut self, branch: &str) -> Result<(), AppError> {
        self.token()?;
        self.navigator.select_branch(self.store.as_ref(), branch)?;
        self.drafts.clear();
        self.changes.clear();
        Ok(())
    }

    /// Load the translatable files for the branch on the translate screen.
    pub async fn load_translations(&mut self) -> Result<&[TranslationFile], AppError> {
        let token = self.token()?;
        let branch = self.translate_branch("load translations")?;
        Ok(self.drafts.load_for_branch(&token, &branch).await?)
    }

    pub fn edit_entry(&mut self, filename: &str, key: &str, value: &str) -> Result<(), AppError> {
        self.translate_branch("edit an entry")?;
        self.drafts.edit_entry(filename, key, value);
        Ok(())
    }

    pub async fn save_all(&mut self) -> Result<usize, AppError> {
        let token = self.token()?;
        let branch = self.translate_branch("save translations")?;
        Ok(self.drafts.save_all(&token, &branch).await?)
    }

    /// Open the changes screen for the current branch and load its diff.
    pub async fn view_changes(&mut self) -> Result<&[DiffFile], AppError> {
        self.token()?;
        self.navigator.view_changes()?;
        self.changes.clear();
        self.refresh_changes().await
    }

    pub async fn refresh_changes(&mut self) -> Result<&[DiffFile], AppError> {
        let token = self.token()?;
        let branch = match self.navigator.route().screen() {
            Some(Screen::Changes { branch }) => branch.clone(),
            _ => return Err(self.wrong_screen("load changes")),
        };

        self.changes = self
            .backend
            .changed_files(&token, &branch)
            .await
            .map_err(|e| {
                warn!("Failed to load changes for {}: {}", branch, e);
                AppError::from(e)
            })?;
        info!("Loaded {} changed files for {}", self.changes.len(), branch);
        Ok(&self.changes)
    }

    pub fn back(&mut self) -> Result<(), AppError> {
        self.navigator.back()?;
        Ok(())
    }

    pub fn back_to_branches(&mut self) -> Result<(), AppError> {
        self.navigator.back_to_branches()?;
        Ok(())
    }

    fn token(&self) -> Result<AccessToken, AppError> {
        self.session
            .token()
            .cloned()
            .ok_or(AppError::NotAuthenticated)
    }

    fn translate_branch(&self, action: &'static str) -> Result<String, AppError> {
        match self.navigator.route().screen() {
            Some(Screen::Translate { branch }) => Ok(branch.clone()),
            _ => Err(self.wrong_screen(action)),
        }
    }

    fn wrong_screen(&self, action: &'static str) -> AppError {
        NavigationError::InvalidTransition {
            from: self.navigator.route().to_string(),
            action,
        }
        .into()
    }

    fn reset_screen_data(&mut self) {
        self.branches.clear();
        self.changes.clear();
        self.drafts.clear();
    }
}
