use std::time::{Duration, Instant};

use ureq::Agent;

use crate::config::ZohoConfig;
use crate::error::{CommissionError, Result};

/// Renew this many seconds before the token actually expires.
const RENEWAL_MARGIN_SECS: u64 = 60;

/// In-memory OAuth access token obtained via the refresh-token grant.
///
/// Check-then-use: a stale read at worst triggers one extra refresh, so no
/// locking is needed for the single-threaded CLI.
#[derive(Debug, Default)]
pub struct TokenCache {
    cached: Option<CachedToken>,
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn valid_token(&self, now: Instant) -> Option<&str> {
        self.cached
            .as_ref()
            .filter(|c| now < c.expires_at)
            .map(|c| c.token.as_str())
    }

    fn store(&mut self, token: String, expires_in_secs: u64, now: Instant) {
        let lifetime = expires_in_secs.saturating_sub(RENEWAL_MARGIN_SECS);
        self.cached = Some(CachedToken {
            token,
            expires_at: now + Duration::from_secs(lifetime),
        });
    }

    /// Return a valid access token, refreshing against the Zoho accounts
    /// server when the cached one is missing or about to expire.
    pub fn access_token(&mut self, agent: &Agent, config: &ZohoConfig) -> Result<String> {
        let now = Instant::now();
        if let Some(token) = self.valid_token(now) {
            return Ok(token.to_string());
        }

        let url = format!("{}/oauth/v2/token", config.accounts_domain);
        let body = agent
            .post(&url)
            .send_form([
                ("grant_type", "refresh_token"),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
                ("refresh_token", config.refresh_token.as_str()),
            ])?
            .body_mut()
            .read_to_string()?;

        let payload: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| CommissionError::TokenRefresh(format!("invalid response: {e}")))?;

        let token = payload["access_token"]
            .as_str()
            .ok_or_else(|| {
                CommissionError::TokenRefresh("no access_token in response".to_string())
            })?
            .to_string();
        let expires_in = payload["expires_in"].as_u64().unwrap_or(3600);

        self.store(token.clone(), expires_in, now);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_reused_while_valid() {
        let mut cache = TokenCache::new();
        let now = Instant::now();
        cache.store("abc".to_string(), 3600, now);

        assert_eq!(cache.valid_token(now), Some("abc"));
        assert_eq!(
            cache.valid_token(now + Duration::from_secs(3000)),
            Some("abc")
        );
    }

    #[test]
    fn token_expires_with_renewal_margin() {
        let mut cache = TokenCache::new();
        let now = Instant::now();
        cache.store("abc".to_string(), 3600, now);

        // Valid lifetime is expires_in minus the 60s margin.
        assert_eq!(cache.valid_token(now + Duration::from_secs(3541)), None);
    }

    #[test]
    fn empty_cache_has_no_token() {
        let cache = TokenCache::new();
        assert_eq!(cache.valid_token(Instant::now()), None);
    }
}
