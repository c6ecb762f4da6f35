// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Activity detail fetching (parsed + raw body)
//! - Activity stream-set fetching
//! - Token refresh when expired

use crate::error::AppError;
use crate::models::{OAuthToken, StreamSet};
use chrono::{DateTime, Duration};
use serde::Deserialize;

/// Streams requested from the upstream API, keyed by type.
const STREAM_KEYS: &str =
    "time,distance,latlng,altitude,velocity_smooth,heartrate,cadence,watts,temp,moving,grade_smooth";

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://www.strava.com/api/v3".to_string(),
            token_url: "https://www.strava.com/oauth/token".to_string(),
            client_id,
            client_secret,
        }
    }

    /// Point the client at a different API base URL (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Point the client at a different OAuth token URL (tests).
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self
    }

    /// Get a detailed activity by ID, returning both the parsed detail and
    /// the raw response body (persisted verbatim).
    pub async fn activity(
        &self,
        access_token: &str,
        activity_id: i64,
    ) -> Result<(DetailedActivity, String), AppError> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        let body = self.check_response_text(response).await?;
        let detail: DetailedActivity = serde_json::from_str(&body)
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))?;

        Ok((detail, body))
    }

    /// Get an activity's stream set, keyed by type.
    pub async fn activity_streams(
        &self,
        access_token: &str,
        activity_id: i64,
    ) -> Result<StreamSet, AppError> {
        let url = format!(
            "{}/activities/{}/streams?key_by_type=true&keys={}",
            self.base_url, activity_id, STREAM_KEYS
        );
        self.get_json(&url, access_token).await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Refresh capability handed to the token cache: returns the token
    /// untouched while it is still valid, otherwise performs the refresh
    /// grant and maps the response back into an [`OAuthToken`].
    pub async fn refresh_if_needed(&self, token: OAuthToken) -> Result<OAuthToken, AppError> {
        if token.valid_for(Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)) {
            return Ok(token);
        }

        tracing::info!("Access token expired, refreshing");
        let refreshed = self.refresh_token(&token.refresh_token).await?;

        Ok(OAuthToken {
            access_token: refreshed.access_token,
            token_type: token.token_type,
            refresh_token: refreshed.refresh_token,
            expires_at: DateTime::from_timestamp(refreshed.expires_at, 0).unwrap_or_default(),
        })
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and return the body text.
    async fn check_response_text(&self, response: reqwest::Response) -> Result<String, AppError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            return Ok(body);
        }

        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
            return Err(AppError::StravaApi("rate limited".to_string()));
        }

        if status.as_u16() == 401 {
            return Err(AppError::Token("upstream rejected access token".to_string()));
        }

        Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let body = self.check_response_text(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Detailed Strava activity response (the fields we persist).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailedActivity {
    pub id: i64,
    #[serde(default)]
    pub athlete: MetaAthlete,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub moving_time: i32,
    #[serde(default)]
    pub elapsed_time: i32,
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub start_date_local: String,
    #[serde(default)]
    pub elev_high: f64,
    #[serde(default)]
    pub elev_low: f64,
    #[serde(default)]
    pub average_speed: f64,
    #[serde(default)]
    pub max_speed: f64,
    #[serde(default)]
    pub average_heartrate: f64,
    #[serde(default)]
    pub max_heartrate: f64,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub map: StravaMap,
    #[serde(default)]
    pub splits_metric: Option<serde_json::Value>,
    #[serde(default)]
    pub best_efforts: Option<serde_json::Value>,
}

/// Activity owner reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaAthlete {
    pub id: i64,
}

/// Activity map data with polylines.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StravaMap {
    #[serde(default)]
    pub polyline: Option<String>,
    #[serde(default)]
    pub summary_polyline: Option<String>,
}
