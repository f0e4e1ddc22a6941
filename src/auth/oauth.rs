use url::Url;

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// Scopes requested from GitHub: repository write access plus the user profile.
pub const OAUTH_SCOPES: &[&str] = &["repo", "user"];

/// Build the GitHub authorization URL the user is sent to before login.
/// GitHub redirects back to `redirect_uri` with a `code` to exchange.
pub fn authorize_url(client_id: &str, redirect_uri: &str) -> Result<Url, url::ParseError> {
    let scope = OAUTH_SCOPES.join(" ");
    Url::parse_with_params(
        GITHUB_AUTHORIZE_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
        ],
    )
}
