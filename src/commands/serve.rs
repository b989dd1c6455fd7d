use std::sync::Arc;

use tracing::info;

use crate::azure::AzureDevOpsClient;
use crate::cli::ServeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::generator::OpenRouterClient;
use crate::server::{self, AppState};
use crate::store::Store;

pub async fn run(config: &Config, args: ServeArgs) -> Result<()> {
    let db_path = match args.db {
        Some(path) => path,
        None => config.database_path()?,
    };
    let store = Store::open(&db_path).await?;
    info!(db = %store.path().display(), "Opened settings database");

    let state = AppState {
        store,
        generator: Arc::new(OpenRouterClient::new(
            config.openrouter_base_url(),
            config.public_url(),
        )),
        sink: Arc::new(AzureDevOpsClient::new(config.azure_base_url())),
        defaults: Arc::new(config.defaults()),
    };

    let addr = args.bind.unwrap_or_else(|| config.bind_addr());
    server::serve(state, &addr).await
}
