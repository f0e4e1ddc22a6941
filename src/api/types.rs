use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entry key -> translated string for a single file.
pub type TranslationMap = BTreeMap<String, String>;

/// Whatever the backend returns for the signed-in user. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Value);

impl UserProfile {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// GitHub login name, when the payload carries one.
    pub fn login(&self) -> Option<&str> {
        self.0.get("login").and_then(Value::as_str)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

/// One translatable file on a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationFile {
    pub filename: String,
    #[serde(default)]
    pub translations: Option<TranslationMap>,
}

/// Response of the branch diff endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchDiff {
    #[serde(default)]
    pub files: Vec<TranslationFile>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenExchangeRequest<'a> {
    pub code: &'a str,
    pub redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenExchangeResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateFileRequest<'a> {
    pub repo: &'a str,
    pub translations: &'a TranslationMap,
    pub filename: &'a str,
    pub branch: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AutoUpdateRequest<'a> {
    pub repo: &'a str,
    pub branch: &'a str,
    pub before: &'a Value,
    pub after: &'a Value,
}

/// Reviewer approval of one file in a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproveFile {
    pub sha: String,
    pub lang: String,
    pub label_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApproveFileRequest<'a> {
    pub repo: &'a str,
    #[serde(flatten)]
    pub approval: &'a ApproveFile,
}
