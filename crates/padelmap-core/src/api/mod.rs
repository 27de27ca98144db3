//! REST client module for the hosted directory database.
//!
//! This module provides the `DirectoryClient` for reading and writing the
//! `clubs` and `communities` tables, and the `ApiError` type that maps HTTP
//! failures to something a caller can match on.
//!
//! Requests authenticate with the project API key, sent both as the `apikey`
//! header and as a bearer token.

pub mod client;
pub mod error;

pub use client::{DirectoryClient, CLUBS_TABLE, COMMUNITIES_TABLE};
pub use error::ApiError;
