//! Credential acquisition for requests against the definition authority.

#[cfg(test)]
use mockall::automock;

/// Supplies the current bearer credential, if one is configured.
///
/// Called once per fetch attempt; no caching happens on this side of the
/// seam. An absent credential is valid and means requests go out without
/// an `Authorization` header.
#[cfg_attr(test, automock)]
pub trait TokenProvider: Send + Sync {
    /// Returns the current credential, or `None` when none is configured.
    fn get(&self) -> Option<String>;
}

/// A `TokenProvider` handing out one fixed credential from configuration.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    /// Creates a provider for the given (possibly absent) credential.
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn get(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Returns the loggable prefix of a credential. Log lines must never carry
/// the full secret.
pub fn credential_prefix(token: &str) -> String {
    token.chars().take(3).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_returns_configured_token() {
        let provider = StaticTokenProvider::new(Some("secret-token".to_string()));
        assert_eq!(provider.get(), Some("secret-token".to_string()));

        let provider = StaticTokenProvider::new(None);
        assert_eq!(provider.get(), None);
    }

    #[test]
    fn credential_prefix_truncates_the_secret() {
        assert_eq!(credential_prefix("abcdef123456"), "abc");
        assert_eq!(credential_prefix("ab"), "ab");
        assert_eq!(credential_prefix(""), "");
    }
}
