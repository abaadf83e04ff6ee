#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use queue_desk::config::{Config, init_logging};
    use queue_desk::{ExclusionScopes, http_api};

    init_logging();
    let config = Config::from_env()?;

    #[cfg(feature = "sqlite")]
    let state = match &config.store_path {
        Some(path) => {
            use queue_desk::{ScopeStore, SqliteScopeStore};
            use std::sync::Arc;
            let store = SqliteScopeStore::new(path)?;
            let scopes = store.load_scopes()?.unwrap_or_default();
            log::info!("scopes persisted to {}", path.display());
            http_api::AppState::new(scopes).with_store(Arc::new(store))
        }
        None => http_api::AppState::new(ExclusionScopes::default()),
    };
    #[cfg(not(feature = "sqlite"))]
    let state = http_api::AppState::new(ExclusionScopes::default());

    println!(
        "queue-desk HTTP API listening on http://{}",
        config.http_addr
    );
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
