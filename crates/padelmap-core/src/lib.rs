//! Core library for padelmap.
//!
//! Holds everything the directory needs below the user interface:
//!
//! - `models`: clubs and communities as stored in the hosted tables
//! - `api`: the REST client for those tables
//! - `gateway`: fire-and-report wrappers around the client
//! - `directory`: picks remote or bundled data and holds the loaded listings
//! - `bundle`: the static listings compiled into the binary
//! - `forms`: text drafts used by the admin editor
//! - `config` and `credentials`: settings file, environment and keychain

pub mod api;
pub mod bundle;
pub mod config;
pub mod credentials;
pub mod directory;
pub mod forms;
pub mod gateway;
pub mod models;
pub mod utils;

pub use api::{ApiError, DirectoryClient};
pub use bundle::Bundle;
pub use config::Config;
pub use credentials::CredentialStore;
pub use directory::{load_directory, seed_database, Connection, DataSource, Directory, LoadReason, SeedReport};
pub use gateway::Gateway;
