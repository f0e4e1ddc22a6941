use std::fmt;

const BEARER_PREFIX: &str = "Bearer ";

/// Authorization header value sent on every authenticated request.
///
/// Stored exactly as sent, `Bearer ` prefix included, so the persisted value
/// can be used without reformatting.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw OAuth access token.
    pub fn bearer(raw: &str) -> Self {
        Self(format!("{}{}", BEARER_PREFIX, raw))
    }

    /// Rehydrate a token previously written to the credential store.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Prefix a bare `ghp_`/`gho_` token with `Bearer `; header-ready values pass through.
    pub fn with_bearer_scheme(self) -> Self {
        if self.0.starts_with(BEARER_PREFIX) {
            self
        } else {
            Self::bearer(&self.0)
        }
    }

    pub fn as_header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}
