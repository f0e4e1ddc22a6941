#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use transbranch::activity::Indicator;
use transbranch::api::{Backend, BranchDiff, TranslationFile, TranslationMap, UserProfile};
use transbranch::auth::AccessToken;
use transbranch::branches::{BranchStats, BranchSummary};
use transbranch::changes::DiffFile;
use transbranch::error::{ApiError, StoreError};
use transbranch::store::{CredentialStore, MemoryStore};

pub const STORED_TOKEN: &str = "Bearer gho_stored";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ExchangeCode(String),
    CurrentUser(String),
    ListBranches,
    BranchDiff(String),
    ChangedFiles(String),
    UpdateFile {
        branch: String,
        filename: String,
        translations: TranslationMap,
    },
}

pub fn rejected(path: &str) -> ApiError {
    ApiError::Status {
        path: path.to_string(),
        status: 401,
        message: Some("Bad credentials".to_string()),
    }
}

pub fn server_error(path: &str) -> ApiError {
    ApiError::Status {
        path: path.to_string(),
        status: 500,
        message: None,
    }
}

pub fn translations(pairs: &[(&str, &str)]) -> TranslationMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn file(filename: &str, pairs: &[(&str, &str)]) -> TranslationFile {
    TranslationFile {
        filename: filename.to_string(),
        translations: Some(translations(pairs)),
    }
}

/// Scripted backend that records every call it receives.
pub struct FakeBackend {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub branches: Vec<BranchSummary>,
    pub diff: BranchDiff,
    pub changes: Vec<DiffFile>,
    pub fail_diff: AtomicBool,
    pub fail_updates_for: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
    watched: Mutex<Option<Indicator>>,
    observed: Mutex<Vec<bool>>,
}

impl FakeBackend {
    /// Accepts any token and knows a single user, `octocat`.
    pub fn new() -> Self {
        Self {
            user: Some(UserProfile::new(json!({"login": "octocat", "id": 1}))),
            access_token: Some("gho_fresh".to_string()),
            branches: vec![
                BranchSummary {
                    name: "feature-x".to_string(),
                    stats: Some(BranchStats {
                        total: 10,
                        approved: 3,
                    }),
                },
                BranchSummary {
                    name: "main".to_string(),
                    stats: None,
                },
            ],
            diff: BranchDiff::default(),
            changes: Vec::new(),
            fail_diff: AtomicBool::new(false),
            fail_updates_for: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            watched: Mutex::new(None),
            observed: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_tokens(mut self) -> Self {
        self.user = None;
        self
    }

    pub fn with_files(mut self, files: Vec<TranslationFile>) -> Self {
        self.diff = BranchDiff { files };
        self
    }

    pub fn with_changes(mut self, changes: Vec<DiffFile>) -> Self {
        self.changes = changes;
        self
    }

    pub fn without_access_token(mut self) -> Self {
        self.access_token = None;
        self
    }

    pub fn fail_update_for(&self, filename: &str) {
        self.fail_updates_for
            .lock()
            .expect("fail set lock")
            .insert(filename.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn update_calls(&self) -> Vec<(String, TranslationMap)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateFile {
                    filename,
                    translations,
                    ..
                } => Some((filename, translations)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    /// Sample `indicator` from inside every code exchange, diff fetch and update.
    pub fn watch(&self, indicator: Indicator) {
        *self.watched.lock().expect("watch lock") = Some(indicator);
    }

    pub fn observed(&self) -> Vec<bool> {
        self.observed.lock().expect("observed lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }

    /// Sample the watched indicator, then suspend once like a real request would.
    async fn in_flight(&self) {
        if let Some(indicator) = self.watched.lock().expect("watch lock").as_ref() {
            self.observed
                .lock()
                .expect("observed lock")
                .push(indicator.is_active());
        }
        tokio::task::yield_now().await;
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<String, ApiError> {
        self.record(Call::ExchangeCode(code.to_string()));
        self.in_flight().await;
        self.access_token.clone().ok_or(ApiError::MissingAccessToken)
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, ApiError> {
        self.record(Call::CurrentUser(token.as_header_value().to_string()));
        self.user.clone().ok_or_else(|| rejected("/api/github/user"))
    }

    async fn list_branches(&self, _token: &AccessToken) -> Result<Vec<BranchSummary>, ApiError> {
        self.record(Call::ListBranches);
        Ok(self.branches.clone())
    }

    async fn branch_diff(&self, _token: &AccessToken, branch: &str) -> Result<BranchDiff, ApiError> {
        self.record(Call::BranchDiff(branch.to_string()));
        self.in_flight().await;
        if self.fail_diff.load(Ordering::SeqCst) {
            return Err(server_error("/api/github/diff"));
        }
        Ok(self.diff.clone())
    }

    async fn changed_files(&self, _token: &AccessToken, branch: &str) -> Result<Vec<DiffFile>, ApiError> {
        self.record(Call::ChangedFiles(branch.to_string()));
        Ok(self.changes.clone())
    }

    async fn update_file(
        &self,
        _token: &AccessToken,
        branch: &str,
        filename: &str,
        translations: &TranslationMap,
    ) -> Result<(), ApiError> {
        self.record(Call::UpdateFile {
            branch: branch.to_string(),
            filename: filename.to_string(),
            translations: translations.clone(),
        });
        self.in_flight().await;
        if self
            .fail_updates_for
            .lock()
            .expect("fail set lock")
            .contains(filename)
        {
            return Err(server_error("/api/github/update"));
        }
        Ok(())
    }
}

/// MemoryStore with switchable failures.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.inner = self.inner.with_entry(key, value);
        self
    }
}

impl CredentialStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read {
                key: key.to_string(),
                message: "keychain locked".to_string(),
            });
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                key: key.to_string(),
                message: "keychain locked".to_string(),
            });
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Delete {
                key: key.to_string(),
                message: "keychain locked".to_string(),
            });
        }
        self.inner.delete(key)
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
