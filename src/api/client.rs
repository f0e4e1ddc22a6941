use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{
    ApproveFile, ApproveFileRequest, AutoUpdateRequest, BranchDiff, TokenExchangeRequest,
    TokenExchangeResponse, TranslationMap, UpdateFileRequest, UserProfile,
};
use super::Backend;
use crate::auth::AccessToken;
use crate::branches::BranchSummary;
use crate::changes::DiffFile;
use crate::error::ApiError;

const OAUTH_TOKEN_PATH: &str = "/api/github/oauth/token";
const USER_PATH: &str = "/api/github/user";
const BRANCHES_PATH: &str = "/api/github/branches";
const DIFF_PATH: &str = "/api/github/diff";
const CHANGED_PATH: &str = "/api/github/changed";
const UPDATE_PATH: &str = "/api/github/update";
const AUTO_UPDATE_PATH: &str = "/api/github/auto-update";
const COMMITS_PATH: &str = "/api/github/commits";
const CONTENT_PATH: &str = "/api/github/content";
const REVIEWERS_PATH: &str = "/api/github/reviewers";
const PR_COMMENTS_PATH: &str = "/api/github/pr/comments";

/// HTTP client for the translation backend.
///
/// Request construction is split from sending: every endpoint has a
/// `*_request` builder returning the exact `reqwest::Request` that will go on
/// the wire, and an async method that sends it and decodes the response.
/// No timeout is set; transport defaults apply.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    repo: String,
}

impl ApiClient {
    pub fn new(base_url: Url, repo: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("transbranch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                path: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            repo: repo.into(),
        })
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    // -- Request builders --

    pub fn token_exchange_request(&self, code: &str, redirect_uri: &str) -> Result<Request, ApiError> {
        let builder = self
            .http
            .post(self.endpoint(OAUTH_TOKEN_PATH)?)
            .json(&TokenExchangeRequest { code, redirect_uri });
        build(OAUTH_TOKEN_PATH, builder)
    }

    pub fn current_user_request(&self, token: &AccessToken) -> Result<Request, ApiError> {
        build(USER_PATH, self.authorized(Method::GET, USER_PATH, token)?)
    }

    pub fn branches_request(&self, token: &AccessToken) -> Result<Request, ApiError> {
        let builder = self
            .authorized(Method::GET, BRANCHES_PATH, token)?
            .query(&[("repo", self.repo.as_str())]);
        build(BRANCHES_PATH, builder)
    }

    pub fn branch_diff_request(&self, token: &AccessToken, branch: &str) -> Result<Request, ApiError> {
        let builder = self
            .authorized(Method::GET, DIFF_PATH, token)?
            .query(&[("repo", self.repo.as_str()), ("branch", branch)]);
        build(DIFF_PATH, builder)
    }

    pub fn changed_files_request(&self, token: &AccessToken, branch: &str) -> Result<Request, ApiError> {
        let builder = self
            .authorized(Method::GET, CHANGED_PATH, token)?
            .query(&[("repo", self.repo.as_str()), ("branch", branch)]);
        build(CHANGED_PATH, builder)
    }

    pub fn update_file_request(
        &self,
        token: &AccessToken,
        branch: &str,
        filename: &str,
        translations: &TranslationMap,
    ) -> Result<Request, ApiError> {
        let builder = self
            .authorized(Method::PUT, UPDATE_PATH, token)?
            .json(&UpdateFileRequest {
                repo: &self.repo,
                translations,
                filename,
                branch,
            });
        build(UPDATE_PATH, builder)
    }

    pub fn auto_update_request(
        &self,
        token: &AccessToken,
        branch: &str,
        before: &Value,
        after: &Value,
    ) -> Result<Request, ApiError> {
        let builder = self
            .authorized(Method::PUT, AUTO_UPDATE_PATH, token)?
            .json(&AutoUpdateRequest {
                repo: &self.repo,
                branch,
                before,
                after,
            });
        build(AUTO_UPDATE_PATH, builder)
    }

    pub fn commits_request(&self, token: &AccessToken, branch: &str) -> Result<Request, ApiError> {
        let builder = self
            .authorized(Method::GET, COMMITS_PATH, token)?
            .query(&[("repo", self.repo.as_str()), ("branch", branch)]);
        build(COMMITS_PATH, builder)
    }

    pub fn content_request(&self, token: &AccessToken, path: &str) -> Result<Request, ApiError> {
        let builder = self
            .authorized(Method::GET, CONTENT_PATH, token)?
            .query(&[("repo", self.repo.as_str()), ("path", path)]);
        build(CONTENT_PATH, builder)
    }

    pub fn file_approval_request(
        &self,
        token: &AccessToken,
        branch: &str,
        pr_number: u64,
        file_path: &str,
    ) -> Result<Request, ApiError> {
        let path = pr_file_path(pr_number, file_path, "approved");
        let builder = self
            .authorized(Method::GET, &path, token)?
            .query(&[("repo", self.repo.as_str()), ("branch", branch)]);
        build(&path, builder)
    }

    pub fn approve_file_request(
        &self,
        token: &AccessToken,
        pr_number: u64,
        file_path: &str,
        approval: &ApproveFile,
    ) -> Result<Request, ApiError> {
        let path = pr_file_path(pr_number, file_path, "approve");
        let builder = self
            .authorized(Method::POST, &path, token)?
            .json(&ApproveFileRequest {
                repo: &self.repo,
                approval,
            });
        build(&path, builder)
    }

    pub fn reviewers_request(&self, token: &AccessToken, branch: &str) -> Result<Request, ApiError> {
        let builder = self
            .authorized(Method::GET, REVIEWERS_PATH, token)?
            .query(&[("repo", self.repo.as_str()), ("branch", branch)]);
        build(REVIEWERS_PATH, builder)
    }

    pub fn pr_comments_request(&self, token: &AccessToken, pr_number: u64) -> Result<Request, ApiError> {
        let pr = pr_number.to_string();
        let builder = self
            .authorized(Method::GET, PR_COMMENTS_PATH, token)?
            .query(&[("repo", self.repo.as_str()), ("prNumber", pr.as_str())]);
        build(PR_COMMENTS_PATH, builder)
    }

    // -- Endpoints outside the core seam; payloads are passed through as JSON --

    /// Ask the backend to rewrite a translation in place (`before` -> `after`).
    pub async fn auto_update(
        &self,
        token: &AccessToken,
        branch: &str,
        before: &Value,
        after: &Value,
    ) -> Result<(), ApiError> {
        let request = self.auto_update_request(token, branch, before, after)?;
        self.execute(AUTO_UPDATE_PATH, request).await?;
        info!("Auto-update request sent for branch {}", branch);
        Ok(())
    }

    pub async fn commits(&self, token: &AccessToken, branch: &str) -> Result<Value, ApiError> {
        let request = self.commits_request(token, branch)?;
        self.fetch_json(COMMITS_PATH, request).await
    }

    pub async fn content(&self, token: &AccessToken, path: &str) -> Result<Value, ApiError> {
        let request = self.content_request(token, path)?;
        self.fetch_json(CONTENT_PATH, request).await
    }

    pub async fn file_approval_status(
        &self,
        token: &AccessToken,
        branch: &str,
        pr_number: u64,
        file_path: &str,
    ) -> Result<Value, ApiError> {
        let request = self.file_approval_request(token, branch, pr_number, file_path)?;
        let path = pr_file_path(pr_number, file_path, "approved");
        self.fetch_json(&path, request).await
    }

    pub async fn approve_file(
        &self,
        token: &AccessToken,
        pr_number: u64,
        file_path: &str,
        approval: &ApproveFile,
    ) -> Result<Value, ApiError> {
        let request = self.approve_file_request(token, pr_number, file_path, approval)?;
        let path = pr_file_path(pr_number, file_path, "approve");
        let result = self.fetch_json(&path, request).await?;
        info!("Approved {} in PR #{} ({})", file_path, pr_number, approval.lang);
        Ok(result)
    }

    pub async fn reviewers(&self, token: &AccessToken, branch: &str) -> Result<Value, ApiError> {
        let request = self.reviewers_request(token, branch)?;
        self.fetch_json(REVIEWERS_PATH, request).await
    }

    pub async fn pr_comments(&self, token: &AccessToken, pr_number: u64) -> Result<Value, ApiError> {
        let request = self.pr_comments_request(token, pr_number)?;
        self.fetch_json(PR_COMMENTS_PATH, request).await
    }

    // -- Plumbing --

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        // Plain concatenation keeps any path prefix on the base URL.
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| ApiError::InvalidRequest {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn authorized(
        &self,
        method: Method,
        path: &str,
        token: &AccessToken,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .http
            .request(method, self.endpoint(path)?)
            .header(AUTHORIZATION, token.as_header_value()))
    }

    async fn execute(&self, path: &str, request: Request) -> Result<Response, ApiError> {
        debug!("{} {}", request.method(), path);
        let response = self.http.execute(request).await.map_err(|source| {
            warn!("Request to {} failed: {}", path, source);
            ApiError::Transport {
                path: path.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("API error for {} ({}): {}", path, status, body);
        Err(ApiError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            message: server_message(&body),
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str, request: Request) -> Result<T, ApiError> {
        let response = self.execute(path, request).await?;
        let body = response.text().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, ApiError> {
        info!("Exchanging OAuth code for access token");
        let request = self.token_exchange_request(code, redirect_uri)?;
        let response: TokenExchangeResponse = self.fetch_json(OAUTH_TOKEN_PATH, request).await?;
        response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingAccessToken)
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, ApiError> {
        let request = self.current_user_request(token)?;
        self.fetch_json(USER_PATH, request).await
    }

    async fn list_branches(&self, token: &AccessToken) -> Result<Vec<BranchSummary>, ApiError> {
        let request = self.branches_request(token)?;
        let branches: Vec<BranchSummary> = self.fetch_json(BRANCHES_PATH, request).await?;
        info!("Fetched {} branches for {}", branches.len(), self.repo);
        Ok(branches)
    }

    async fn branch_diff(&self, token: &AccessToken, branch: &str) -> Result<BranchDiff, ApiError> {
        let request = self.branch_diff_request(token, branch)?;
        self.fetch_json(DIFF_PATH, request).await
    }

    async fn changed_files(&self, token: &AccessToken, branch: &str) -> Result<Vec<DiffFile>, ApiError> {
        let request = self.changed_files_request(token, branch)?;
        let files: Option<Vec<DiffFile>> = self.fetch_json(CHANGED_PATH, request).await?;
        Ok(files.unwrap_or_default())
    }

    async fn update_file(
        &self,
        token: &AccessToken,
        branch: &str,
        filename: &str,
        translations: &TranslationMap,
    ) -> Result<(), ApiError> {
        let request = self.update_file_request(token, branch, filename, translations)?;
        self.execute(UPDATE_PATH, request).await?;
        Ok(())
    }
}

fn build(path: &str, builder: RequestBuilder) -> Result<Request, ApiError> {
    builder.build().map_err(|e| ApiError::InvalidRequest {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// `/api/github/pr/{n}/file/{path}/{action}` with the file path as one encoded segment.
fn pr_file_path(pr_number: u64, file_path: &str, action: &str) -> String {
    format!(
        "/api/github/pr/{}/file/{}/{}",
        pr_number,
        urlencoding::encode(file_path),
        action
    )
}

/// Pull a human-readable `message` out of an error body, if there is one.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
