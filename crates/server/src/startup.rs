use std::{env, net::SocketAddr, path::Path};

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::{catalogue::CatalogueService, runtime, storage::catalogue_store::CatalogueStore};

use crate::routes::{self, ServerState};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

/// Restrict CORS to the configured frontend origin, GET/POST, Content-Type.
pub fn build_cors(frontend_origin: &str) -> CorsLayer {
    match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
        Err(_) => {
            warn!(%frontend_origin, "unparseable CORS origin, falling back to permissive");
            CorsLayer::very_permissive()
        }
    }
}

fn load_config() -> configs::AppConfig {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "no usable config file, using built-in defaults");
            configs::AppConfig::default()
        }
    }
}

/// Load host/port from config, with env var overrides taking precedence
fn load_bind_addr(cfg: &configs::AppConfig) -> anyhow::Result<SocketAddr> {
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| cfg.server.host.clone());
    let port = env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(cfg.server.port);
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config();

    let data_dir = Path::new(&cfg.storage.catalogue_file)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".into());
    runtime::ensure_env(&data_dir, &cfg.storage.uploads_dir).await?;

    // Fatal on a malformed catalogue file: no partial recovery at startup
    let store = CatalogueStore::new(&cfg.storage.catalogue_file).await?;
    let catalogue = CatalogueService::new(store, &cfg.storage.uploads_dir);

    let state = ServerState {
        catalogue,
        uploads_dir: cfg.storage.uploads_dir.clone().into(),
        public_base_url: cfg.http.public_base_url.clone(),
    };

    let cors = build_cors(&cfg.http.frontend_origin);
    let app: Router = routes::build_router(state, cors);

    let addr = load_bind_addr(&cfg)?;
    info!(%addr, catalogue_file = %cfg.storage.catalogue_file, uploads_dir = %cfg.storage.uploads_dir, "starting catalogue server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
