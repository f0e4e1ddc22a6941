//! Gateway to the translation backend.
//!
//! The backend proxies GitHub; this crate treats its payloads as opaque beyond
//! the few fields the client core needs. Every authenticated call takes the
//! token (and branch, where relevant) as an explicit argument.

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use self::client::ApiClient;
pub use self::types::{ApproveFile, BranchDiff, TranslationFile, TranslationMap, UserProfile};

use crate::auth::AccessToken;
use crate::branches::BranchSummary;
use crate::changes::DiffFile;
use crate::error::ApiError;

/// The slice of the backend the session, navigation and draft logic depend on.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Trade an OAuth authorization code for a raw access token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, ApiError>;

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, ApiError>;

    async fn list_branches(&self, token: &AccessToken) -> Result<Vec<BranchSummary>, ApiError>;

    async fn branch_diff(&self, token: &AccessToken, branch: &str) -> Result<BranchDiff, ApiError>;

    async fn changed_files(&self, token: &AccessToken, branch: &str) -> Result<Vec<DiffFile>, ApiError>;

    /// Replace the translations of one file on `branch` with `translations`.
    async fn update_file(
        &self,
        token: &AccessToken,
        branch: &str,
        filename: &str,
        translations: &TranslationMap,
    ) -> Result<(), ApiError>;
}
