use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the device's secure credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read '{key}' from secure store: {message}")]
    Read { key: String, message: String },

    #[error("Failed to write '{key}' to secure store: {message}")]
    Write { key: String, message: String },

    #[error("Failed to delete '{key}' from secure store: {message}")]
    Delete { key: String, message: String },
}

/// Failure of a request against the translation backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error ({status}) from {path}")]
    Status {
        path: String,
        status: u16,
        message: Option<String>,
    },

    #[error("Failed to parse response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Invalid request for {path}: {message}")]
    InvalidRequest { path: String, message: String },

    #[error("No access token received from OAuth exchange")]
    MissingAccessToken,
}

impl ApiError {
    /// Short notice suitable for showing to the user.
    ///
    /// Server-provided messages win, then the HTTP reason phrase. Transport
    /// failures collapse to a generic connectivity notice.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                status, message, ..
            } => message.clone().unwrap_or_else(|| {
                StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Server error")
                    .to_string()
            }),
            ApiError::Transport { .. } => "Network error. Please check your connection.".to_string(),
            ApiError::MissingAccessToken => "Could not complete GitHub authentication".to_string(),
            ApiError::Decode { .. } | ApiError::InvalidRequest { .. } => {
                "An unexpected error occurred".to_string()
            }
        }
    }
}

impl StoreError {
    pub fn user_message(&self) -> String {
        "Could not access secure storage on this device".to_string()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Persistence(#[from] StoreError),

    #[error("Token rejected by backend: {0}")]
    AuthInvalid(#[source] ApiError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Token format not recognised")]
    InvalidToken,

    #[error("Session has already been bootstrapped")]
    AlreadyBootstrapped,
}

impl SessionError {
    /// A rejected token is reported only as a request to sign in again.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Persistence(e) => e.user_message(),
            SessionError::AuthInvalid(_) => "Please log in again.".to_string(),
            SessionError::Api(e) => e.user_message(),
            SessionError::InvalidToken => "Token format not recognised".to_string(),
            SessionError::AlreadyBootstrapped => "An unexpected error occurred".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Cannot {action} from {from}")]
    InvalidTransition { from: String, action: &'static str },

    #[error("Branch name cannot be empty")]
    EmptyBranch,

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl NavigationError {
    pub fn user_message(&self) -> String {
        match self {
            NavigationError::InvalidTransition { .. } => {
                "That action is not available on this screen".to_string()
            }
            NavigationError::EmptyBranch => "Please choose a branch".to_string(),
            NavigationError::Persistence(e) => e.user_message(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Failed to load translations for '{branch}': {source}")]
    Load {
        branch: String,
        #[source]
        source: ApiError,
    },

    /// Earlier files in the batch may already be committed; later ones were not sent.
    #[error("Saving translations failed: {0}")]
    PartialSaveFailure(#[source] ApiError),

    #[error("A save is already in progress")]
    SaveInProgress,
}

impl DraftError {
    pub fn user_message(&self) -> String {
        match self {
            DraftError::Load { source, .. } => source.user_message(),
            DraftError::PartialSaveFailure(source) => {
                format!("Saving failed: {}", source.user_message())
            }
            DraftError::SaveInProgress => "A save is already in progress".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AppError {
    /// Generic notice for display. Paths, status codes and store keys stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotAuthenticated => "Please log in first.".to_string(),
            AppError::Session(e) => e.user_message(),
            AppError::Navigation(e) => e.user_message(),
            AppError::Draft(e) => e.user_message(),
            AppError::Api(e) => e.user_message(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing required config value: {0}")]
    MissingField(&'static str),

    #[error("Invalid API base URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}
