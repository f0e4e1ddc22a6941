/// True for empty or whitespace-only input.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Accepts header-ready `Bearer ` tokens and bare GitHub personal/OAuth tokens.
pub fn is_valid_token(token: &str) -> bool {
    if is_blank(token) {
        return false;
    }
    token.starts_with("Bearer ") || token.starts_with("ghp_") || token.starts_with("gho_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \t"));
        assert!(!is_blank("main"));
    }

    #[test]
    fn test_token_prefixes() {
        assert!(is_valid_token("Bearer gho_abc"));
        assert!(is_valid_token("ghp_personal"));
        assert!(is_valid_token("gho_oauth"));
        assert!(!is_valid_token("token abc"));
        assert!(!is_valid_token(""));
    }
}
