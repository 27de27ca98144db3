use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "padelmap";

/// Database API keys kept in the OS keychain, one entry per database URL.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the API key for a database URL in the OS keychain
    pub fn store(database_url: &str, api_key: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, database_url)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(api_key)
            .context("Failed to store API key in keychain")?;
        Ok(())
    }

    /// Retrieve the API key for a database URL from the OS keychain
    pub fn get_key(database_url: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, database_url)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve API key from keychain")
    }

    /// Delete the stored API key for a database URL
    pub fn delete(database_url: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, database_url)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete API key from keychain")?;
        Ok(())
    }
}
