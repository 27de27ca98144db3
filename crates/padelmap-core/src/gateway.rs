//! Read/write gateway over the directory database.
//!
//! Each operation issues exactly one remote call through `DirectoryClient`.
//! Failures are logged and flattened: reads return an empty list, writes
//! return `false`. Callers that need to tell "failed" apart from "empty" use
//! the client directly.

use tracing::{error, info};

use crate::api::DirectoryClient;
use crate::models::{Club, Community};

#[derive(Clone)]
pub struct Gateway {
    client: DirectoryClient,
}

impl Gateway {
    pub fn new(client: DirectoryClient) -> Self {
        Self { client }
    }

    pub async fn list_clubs(&self) -> Vec<Club> {
        match self.client.fetch_clubs().await {
            Ok(clubs) => clubs,
            Err(e) => {
                error!(error = %e, "Error fetching clubs");
                Vec::new()
            }
        }
    }

    pub async fn list_communities(&self) -> Vec<Community> {
        match self.client.fetch_communities().await {
            Ok(communities) => communities,
            Err(e) => {
                error!(error = %e, "Error fetching communities");
                Vec::new()
            }
        }
    }

    pub async fn upsert_club(&self, club: &Club) -> bool {
        match self.client.upsert_club(club).await {
            Ok(()) => {
                info!(id = %club.id, "Club saved");
                true
            }
            Err(e) => {
                error!(id = %club.id, error = %e, "Error saving club");
                false
            }
        }
    }

    pub async fn upsert_community(&self, community: &Community) -> bool {
        match self.client.upsert_community(community).await {
            Ok(()) => {
                info!(id = %community.id, "Community saved");
                true
            }
            Err(e) => {
                error!(id = %community.id, error = %e, "Error saving community");
                false
            }
        }
    }

    pub async fn delete_club(&self, id: &str) -> bool {
        match self.client.delete_club(id).await {
            Ok(()) => {
                info!(id, "Club deleted");
                true
            }
            Err(e) => {
                error!(id, error = %e, "Error deleting club");
                false
            }
        }
    }

    pub async fn delete_community(&self, id: &str) -> bool {
        match self.client.delete_community(id).await {
            Ok(()) => {
                info!(id, "Community deleted");
                true
            }
            Err(e) => {
                error!(id, error = %e, "Error deleting community");
                false
            }
        }
    }
}
