// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth2 token pair, owned exclusively by the token cache.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Serialized OAuth2 token pair. Other components treat this as opaque:
/// only the token cache reads or writes its fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthToken {
    /// Whether the access token is still usable `margin` from now.
    pub fn valid_for(&self, margin: Duration) -> bool {
        Utc::now() + margin < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_for_margin() {
        let token = OAuthToken {
            access_token: "a".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        };
        assert!(token.valid_for(Duration::minutes(5)));
        assert!(!token.valid_for(Duration::minutes(15)));
    }

    #[test]
    fn test_token_type_defaults_on_deserialize() {
        let token: OAuthToken = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","expires_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(token.token_type, "Bearer");
    }
}
