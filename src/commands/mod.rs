pub mod generate;
pub mod init;
pub mod models;
pub mod push;
pub mod serve;
pub mod session;
pub mod settings;

use crate::config::Config;
use crate::error::Result;
use crate::store::Store;
use crate::types::UserSettings;

async fn open_store(config: &Config) -> Result<Store> {
    Store::open(config.database_path()?).await
}

/// Stored settings for `user`, when one was named.
async fn user_settings(config: &Config, user: Option<&str>) -> Result<Option<UserSettings>> {
    match user {
        Some(user) => open_store(config).await?.load_settings(user).await,
        None => Ok(None),
    }
}
