//! REST client for the hosted `clubs` and `communities` tables.
//!
//! The database exposes each table under `{base}/rest/v1/{table}` using the
//! PostgREST conventions: filters and ordering travel as query parameters,
//! upserts are a POST with a merge-duplicates preference, deletes carry an
//! `id=eq.{id}` filter. Every call here is exactly one HTTP request.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{Club, Community};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of the REST interface on the hosted database
const REST_PATH: &str = "rest/v1";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const CLUBS_TABLE: &str = "clubs";
pub const COMMUNITIES_TABLE: &str = "communities";

/// Clubs are listed alphabetically.
const CLUBS_ORDER: &str = "name.asc";

/// Communities are listed largest first.
const COMMUNITIES_ORDER: &str = "members.desc";

/// Upserts merge on the primary key and skip echoing the row back.
const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

/// Client for the hosted directory database.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    api_key: Arc<String>,
}

impl DirectoryClient {
    /// Create a client for the database at `base_url`, authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::NotConfigured.into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: Arc::new(api_key.into()),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, table)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if !self.api_key.is_empty() {
            headers.insert("apikey", header::HeaderValue::from_str(&self.api_key)?);
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn list<T: DeserializeOwned>(&self, table: &str, order: &str) -> Result<Vec<T>> {
        let url = self.table_url(table);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(&[("select", "*"), ("order", order)])
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", table))?;
        let rows: Vec<T> = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} rows: {}", table, e)))?;
        debug!(table, count = rows.len(), "Rows fetched");
        Ok(rows)
    }

    async fn upsert<B: Serialize>(&self, table: &str, record: &B) -> Result<()> {
        let url = self.table_url(table);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .header("Prefer", UPSERT_PREFERENCE)
            .query(&[("on_conflict", "id")])
            .json(record)
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        let url = self.table_url(table);
        let filter = format!("eq.{}", id);
        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers()?)
            .query(&[("id", filter.as_str())])
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Clubs =====

    /// Fetch all clubs, ordered by name
    pub async fn fetch_clubs(&self) -> Result<Vec<Club>> {
        self.list(CLUBS_TABLE, CLUBS_ORDER).await
    }

    /// Insert a club or replace the row with the same id
    pub async fn upsert_club(&self, club: &Club) -> Result<()> {
        self.upsert(CLUBS_TABLE, club).await
    }

    pub async fn delete_club(&self, id: &str) -> Result<()> {
        self.delete(CLUBS_TABLE, id).await
    }

    // ===== Communities =====

    /// Fetch all communities, largest member count first
    pub async fn fetch_communities(&self) -> Result<Vec<Community>> {
        self.list(COMMUNITIES_TABLE, COMMUNITIES_ORDER).await
    }

    /// Insert a community or replace the row with the same id
    pub async fn upsert_community(&self, community: &Community) -> Result<()> {
        self.upsert(COMMUNITIES_TABLE, community).await
    }

    pub async fn delete_community(&self, id: &str) -> Result<()> {
        self.delete(COMMUNITIES_TABLE, id).await
    }
}

// ============================================================================
// Tests
// ============================================================================
