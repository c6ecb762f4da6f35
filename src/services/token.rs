// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth2 token cache.
//!
//! Tokens are cached per (source, athlete) with no expiry: the cache is
//! the system of record, not a TTL cache. Reads run the caller-supplied
//! refresh capability and re-save the entry when the upstream rotates the
//! access token.

use crate::cache::Cacher;
use crate::error::AppError;
use crate::models::OAuthToken;
use std::future::Future;
use std::time::Duration;

/// Token source identifier for Strava.
pub const STRAVA_SOURCE: &str = "strava";

/// Bound on the refresh round-trip, independent of the caller's deadline.
const REFRESH_TIMEOUT: Duration = Duration::from_secs(60);

/// Cache-backed token store with refresh-on-read.
#[derive(Clone)]
pub struct TokenStore {
    cacher: Cacher,
}

impl TokenStore {
    pub fn new(cacher: Cacher) -> Self {
        Self { cacher }
    }

    fn key(source: &str, athlete_id: i64) -> String {
        format!("oauth2:{}:{}", source, athlete_id)
    }

    /// Unconditionally overwrite the cached token.
    pub async fn save_token(
        &self,
        token: &OAuthToken,
        source: &str,
        athlete_id: i64,
    ) -> Result<(), AppError> {
        self.cacher
            .set_object(&Self::key(source, athlete_id), token)
            .await
    }

    /// Look up the cached token and run `refresh` on it.
    ///
    /// A cache miss and a refresh failure both propagate to the caller;
    /// no retry happens here — retry policy belongs to the caller. When
    /// the refreshed access token differs from the cached one the entry
    /// is re-saved before returning.
    pub async fn get_token<F, Fut>(
        &self,
        source: &str,
        athlete_id: i64,
        refresh: F,
    ) -> Result<OAuthToken, AppError>
    where
        F: FnOnce(OAuthToken) -> Fut,
        Fut: Future<Output = Result<OAuthToken, AppError>>,
    {
        let key = Self::key(source, athlete_id);
        let cached: OAuthToken = self
            .cacher
            .get_object(&key)
            .await?
            .ok_or_else(|| AppError::Token(format!("no cached token for {}:{}", source, athlete_id)))?;

        let refreshed = tokio::time::timeout(REFRESH_TIMEOUT, refresh(cached.clone()))
            .await
            .map_err(|_| AppError::Token(format!("token refresh timed out for {}", athlete_id)))??;

        if refreshed.access_token != cached.access_token {
            tracing::info!(athlete_id, source, "Access token rotated, re-caching");
            self.save_token(&refreshed, source, athlete_id).await?;
        }

        Ok(refreshed)
    }

    /// Drop the cached token (deauthorization).
    pub async fn delete_token(&self, source: &str, athlete_id: i64) -> Result<(), AppError> {
        self.cacher.del(&Self::key(source, athlete_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn token(access: &str) -> OAuthToken {
        OAuthToken {
            access_token: access.to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + ChronoDuration::hours(6),
        }
    }

    fn store() -> TokenStore {
        TokenStore::new(Cacher::new_memory())
    }

    #[tokio::test]
    async fn test_cache_miss_is_an_error() {
        let store = store();
        let result = store
            .get_token(STRAVA_SOURCE, 42, |t| async move { Ok(t) })
            .await;
        assert!(matches!(result, Err(AppError::Token(_))));
    }

    #[tokio::test]
    async fn test_unchanged_token_passes_through() {
        let store = store();
        store
            .save_token(&token("abc"), STRAVA_SOURCE, 42)
            .await
            .unwrap();

        let got = store
            .get_token(STRAVA_SOURCE, 42, |t| async move { Ok(t) })
            .await
            .unwrap();
        assert_eq!(got.access_token, "abc");
    }

    #[tokio::test]
    async fn test_rotated_token_is_recached() {
        let store = store();
        store
            .save_token(&token("old"), STRAVA_SOURCE, 42)
            .await
            .unwrap();

        let got = store
            .get_token(STRAVA_SOURCE, 42, |_| async move { Ok(token("new")) })
            .await
            .unwrap();
        assert_eq!(got.access_token, "new");

        // The rotated token replaced the cached entry.
        let cached = store
            .get_token(STRAVA_SOURCE, 42, |t| async move { Ok(t) })
            .await
            .unwrap();
        assert_eq!(cached.access_token, "new");
    }

    #[tokio::test]
    async fn test_refresh_failure_propagates() {
        let store = store();
        store
            .save_token(&token("abc"), STRAVA_SOURCE, 42)
            .await
            .unwrap();

        let result = store
            .get_token(STRAVA_SOURCE, 42, |_| async move {
                Err(AppError::StravaApi("invalid_grant".to_string()))
            })
            .await;
        assert!(matches!(result, Err(AppError::StravaApi(_))));
    }

    #[tokio::test]
    async fn test_keys_are_scoped_per_athlete() {
        let store = store();
        store
            .save_token(&token("a1"), STRAVA_SOURCE, 1)
            .await
            .unwrap();

        let other = store
            .get_token(STRAVA_SOURCE, 2, |t| async move { Ok(t) })
            .await;
        assert!(other.is_err());
    }
}
