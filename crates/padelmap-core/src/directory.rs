//! Data source selection.
//!
//! `load_directory` decides, once per load, whether the listings come from
//! the hosted database or from the bundled files. The decision is all or
//! nothing: both collections come from the same place, there is no retry and
//! no merging of partial results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::DirectoryClient;
use crate::bundle::Bundle;
use crate::gateway::Gateway;
use crate::models::{sort_by_members, Club, Community};
use crate::utils::format_age;

/// Where the displayed listings came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Remote,
    Bundled,
}

/// Whether writes go to the database (`Live`) or only to memory (`Local`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    Live,
    Local,
}

/// Why the selector settled on its data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadReason {
    NotConfigured,
    ConnectionFailed,
    DatabaseEmpty,
    Loaded,
}

/// One loaded view of the directory.
#[derive(Debug, Clone, Serialize)]
pub struct Directory {
    pub source: DataSource,
    pub connection: Connection,
    pub reason: LoadReason,
    pub loaded_at: DateTime<Utc>,
    pub clubs: Vec<Club>,
    pub communities: Vec<Community>,
}

impl Directory {
    pub fn from_bundle(bundle: &Bundle, connection: Connection, reason: LoadReason) -> Self {
        Self::new(
            DataSource::Bundled,
            connection,
            reason,
            bundle.clubs.clone(),
            bundle.communities.clone(),
        )
    }

    pub fn from_remote(clubs: Vec<Club>, communities: Vec<Community>) -> Self {
        Self::new(DataSource::Remote, Connection::Live, LoadReason::Loaded, clubs, communities)
    }

    fn new(
        source: DataSource,
        connection: Connection,
        reason: LoadReason,
        clubs: Vec<Club>,
        mut communities: Vec<Community>,
    ) -> Self {
        sort_by_members(&mut communities);
        Self {
            source,
            connection,
            reason,
            loaded_at: Utc::now(),
            clubs,
            communities,
        }
    }

    pub fn is_live(&self) -> bool {
        self.connection == Connection::Live
    }

    /// The database is reachable but has no rows, so bundled data is shown.
    pub fn can_seed(&self) -> bool {
        self.is_live() && self.reason == LoadReason::DatabaseEmpty
    }

    /// Status banner text describing how this directory was loaded.
    pub fn status_message(&self) -> String {
        match self.reason {
            LoadReason::NotConfigured => {
                "Database not configured. Using local data (read-only).".to_string()
            }
            LoadReason::ConnectionFailed => "Connection failed. Using local data.".to_string(),
            LoadReason::DatabaseEmpty => "Connected! Database empty. Press [S] to seed.".to_string(),
            LoadReason::Loaded => format!(
                "Connected! {} clubs, {} communities",
                self.clubs.len(),
                self.communities.len()
            ),
        }
    }

    pub fn age_display(&self) -> String {
        format_age((Utc::now() - self.loaded_at).num_minutes())
    }

    pub fn club(&self, id: &str) -> Option<&Club> {
        self.clubs.iter().find(|c| c.id == id)
    }

    // ===== Local-mode edits =====

    /// Replace the club with the same id, or append it.
    pub fn upsert_club_local(&mut self, club: Club) {
        match self.clubs.iter_mut().find(|c| c.id == club.id) {
            Some(existing) => *existing = club,
            None => self.clubs.push(club),
        }
    }

    /// Replace the community with the same id, or append it.
    pub fn upsert_community_local(&mut self, community: Community) {
        match self.communities.iter_mut().find(|c| c.id == community.id) {
            Some(existing) => *existing = community,
            None => self.communities.push(community),
        }
        sort_by_members(&mut self.communities);
    }

    /// Returns false when no club had that id.
    pub fn remove_club_local(&mut self, id: &str) -> bool {
        let before = self.clubs.len();
        self.clubs.retain(|c| c.id != id);
        self.clubs.len() != before
    }

    /// Returns false when no community had that id.
    pub fn remove_community_local(&mut self, id: &str) -> bool {
        let before = self.communities.len();
        self.communities.retain(|c| c.id != id);
        self.communities.len() != before
    }

    pub fn to_bundle(&self) -> Bundle {
        Bundle {
            clubs: self.clubs.clone(),
            communities: self.communities.clone(),
        }
    }
}

/// Pick the data source and load both collections.
///
/// `client` is `None` when no database endpoint is configured. Otherwise
/// both tables are read concurrently; any failure, or two empty tables,
/// substitutes the bundled listings.
pub async fn load_directory(client: Option<&DirectoryClient>, bundle: &Bundle) -> Directory {
    let Some(client) = client else {
        info!("Database not configured, using bundled listings");
        return Directory::from_bundle(bundle, Connection::Local, LoadReason::NotConfigured);
    };

    let (clubs, communities) =
        futures::future::join(client.fetch_clubs(), client.fetch_communities()).await;

    match (clubs, communities) {
        (Ok(clubs), Ok(communities)) => {
            if clubs.is_empty() && communities.is_empty() {
                info!("Database is empty, using bundled listings");
                Directory::from_bundle(bundle, Connection::Live, LoadReason::DatabaseEmpty)
            } else {
                info!(clubs = clubs.len(), communities = communities.len(), "Loaded listings from database");
                Directory::from_remote(clubs, communities)
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Failed to load listings, using bundled listings");
            Directory::from_bundle(bundle, Connection::Local, LoadReason::ConnectionFailed)
        }
    }
}

/// Outcome of copying the bundled listings into the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub clubs_saved: usize,
    pub communities_saved: usize,
    pub failed: usize,
}

impl SeedReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Upsert every bundled club, then every bundled community, one at a time.
pub async fn seed_database(gateway: &Gateway, bundle: &Bundle) -> SeedReport {
    let mut report = SeedReport::default();

    for club in &bundle.clubs {
        if gateway.upsert_club(club).await {
            report.clubs_saved += 1;
        } else {
            report.failed += 1;
        }
    }

    for community in &bundle.communities {
        if gateway.upsert_community(community).await {
            report.communities_saved += 1;
        } else {
            report.failed += 1;
        }
    }

    info!(
        clubs = report.clubs_saved,
        communities = report.communities_saved,
        failed = report.failed,
        "Seeding finished"
    );
    report
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use httpmock::prelude::*;
    use serde_json::json;

    fn community(id: &str, members: u32) -> Community {
        Community {
            id: id.to_string(),
            name: format!("Group {id}"),
            platform: Platform::Telegram,
            members,
            link: String::new(),
            description: String::new(),
            country: "AE".to_string(),
            location: None,
        }
    }

    fn club_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "location": {"lat": 25.1, "lng": 55.2, "address": "", "zone": "alquoz"},
            "rating": 4.0,
            "reviews_count": 0,
            "price_per_hour": 200,
            "price_level": 2
        })
    }

    async fn mock_tables(server: &MockServer, clubs: serde_json::Value, communities: serde_json::Value) {
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/rest/v1/clubs");
                then.status(200).json_body(clubs);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/rest/v1/communities");
                then.status(200).json_body(communities);
            })
            .await;
    }

    #[tokio::test]
    async fn test_unconfigured_uses_bundle_exactly() {
        let bundle = Bundle::embedded().unwrap();
        let dir = load_directory(None, &bundle).await;

        assert_eq!(dir.source, DataSource::Bundled);
        assert_eq!(dir.connection, Connection::Local);
        assert_eq!(dir.reason, LoadReason::NotConfigured);
        assert_eq!(dir.clubs, bundle.clubs);
        assert_eq!(dir.communities, bundle.communities);
    }

    #[tokio::test]
    async fn test_empty_database_falls_back_and_offers_seed() {
        let server = MockServer::start_async().await;
        mock_tables(&server, json!([]), json!([])).await;

        let bundle = Bundle::embedded().unwrap();
        let client = DirectoryClient::new(&server.base_url(), "k").unwrap();
        let dir = load_directory(Some(&client), &bundle).await;

        assert_eq!(dir.source, DataSource::Bundled);
        assert!(dir.can_seed());
        assert_eq!(dir.clubs, bundle.clubs);
        assert_eq!(dir.communities, bundle.communities);
    }

    #[tokio::test]
    async fn test_failed_read_falls_back_to_local() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/rest/v1/clubs");
                then.status(200).json_body(json!([club_json("c1", "Remote Club")]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/rest/v1/communities");
                then.status(500).body("boom");
            })
            .await;

        let bundle = Bundle::embedded().unwrap();
        let client = DirectoryClient::new(&server.base_url(), "k").unwrap();
        let dir = load_directory(Some(&client), &bundle).await;

        assert_eq!(dir.reason, LoadReason::ConnectionFailed);
        assert!(!dir.is_live());
        assert_eq!(dir.clubs, bundle.clubs);
    }

    #[tokio::test]
    async fn test_one_empty_table_is_not_merged() {
        let server = MockServer::start_async().await;
        mock_tables(&server, json!([club_json("c1", "Remote Club")]), json!([])).await;

        let bundle = Bundle::embedded().unwrap();
        let client = DirectoryClient::new(&server.base_url(), "k").unwrap();
        let dir = load_directory(Some(&client), &bundle).await;

        assert_eq!(dir.source, DataSource::Remote);
        assert_eq!(dir.clubs.len(), 1);
        assert!(dir.communities.is_empty());
        assert_eq!(dir.status_message(), "Connected! 1 clubs, 0 communities");
    }

    #[tokio::test]
    async fn test_remote_communities_are_resorted_by_members() {
        let server = MockServer::start_async().await;
        mock_tables(
            &server,
            json!([]),
            json!([
                {"id": "small", "name": "Small", "platform": "App", "members": 5},
                {"id": "big", "name": "Big", "platform": "App", "members": 50}
            ]),
        )
        .await;

        let client = DirectoryClient::new(&server.base_url(), "k").unwrap();
        let dir = load_directory(Some(&client), &Bundle::default()).await;

        let ids: Vec<&str> = dir.communities.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["big", "small"]);
    }

    #[tokio::test]
    async fn test_null_columns_still_load_remotely() {
        let server = MockServer::start_async().await;
        let mut club = club_json("c1", "Sparse Club");
        club["images"] = serde_json::Value::Null;
        club["booking_url"] = serde_json::Value::Null;
        club["socials"] = serde_json::Value::Null;
        mock_tables(
            &server,
            json!([club]),
            json!([{"id": "g1", "name": "Group", "platform": "Telegram",
                    "members": 12, "description": null, "link": null}]),
        )
        .await;

        let client = DirectoryClient::new(&server.base_url(), "k").unwrap();
        let dir = load_directory(Some(&client), &Bundle::embedded().unwrap()).await;

        assert_eq!(dir.reason, LoadReason::Loaded);
        assert_eq!(dir.source, DataSource::Remote);
        assert!(dir.clubs[0].images.is_empty());
        assert!(!dir.clubs[0].has_booking());
        assert!(dir.communities[0].description.is_empty());
    }

    #[test]
    fn test_local_upsert_replaces_or_appends() {
        let mut dir = Directory::from_bundle(&Bundle::default(), Connection::Local, LoadReason::NotConfigured);
        dir.upsert_community_local(community("a", 10));
        dir.upsert_community_local(community("b", 20));
        let mut renamed = community("a", 30);
        renamed.name = "Renamed".to_string();
        dir.upsert_community_local(renamed);

        assert_eq!(dir.communities.len(), 2);
        assert_eq!(dir.communities[0].name, "Renamed");
        assert_eq!(dir.communities[1].id, "b");
    }

    #[test]
    fn test_local_remove() {
        let bundle = Bundle::embedded().unwrap();
        let mut dir = Directory::from_bundle(&bundle, Connection::Local, LoadReason::NotConfigured);
        let id = bundle.clubs[0].id.clone();

        assert!(dir.remove_club_local(&id));
        assert!(dir.club(&id).is_none());
        assert!(!dir.remove_club_local(&id));
    }

    #[tokio::test]
    async fn test_seed_upserts_every_bundled_record() {
        let server = MockServer::start_async().await;
        let clubs_mock = server
            .mock_async(|when, then| {
                when.method(Method::POST).path("/rest/v1/clubs");
                then.status(201);
            })
            .await;
        let communities_mock = server
            .mock_async(|when, then| {
                when.method(Method::POST).path("/rest/v1/communities");
                then.status(201);
            })
            .await;

        let bundle = Bundle::embedded().unwrap();
        let gateway = Gateway::new(DirectoryClient::new(&server.base_url(), "k").unwrap());
        let report = seed_database(&gateway, &bundle).await;

        assert!(report.is_complete());
        assert_eq!(report.clubs_saved, bundle.clubs.len());
        assert_eq!(report.communities_saved, bundle.communities.len());
        clubs_mock.assert_hits_async(bundle.clubs.len()).await;
        communities_mock.assert_hits_async(bundle.communities.len()).await;
    }

    #[tokio::test]
    async fn test_seed_counts_failed_upserts() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::POST).path("/rest/v1/clubs");
                then.status(201);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(Method::POST).path("/rest/v1/communities");
                then.status(500).body("write rejected");
            })
            .await;

        let bundle = Bundle::embedded().unwrap();
        let gateway = Gateway::new(DirectoryClient::new(&server.base_url(), "k").unwrap());
        let report = seed_database(&gateway, &bundle).await;

        assert!(!report.is_complete());
        assert_eq!(report.clubs_saved, bundle.clubs.len());
        assert_eq!(report.communities_saved, 0);
        assert_eq!(report.failed, bundle.communities.len());
    }
}
