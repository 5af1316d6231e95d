//! Web server for hotspot visualization
//!
//! Provides an HTTP server using Axum to serve the scatter UI
//! and JSON API endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::model::HotspotTable;

use super::routes;

/// Shared application state
pub struct AppState {
    pub table: HotspotTable,
    pub api_endpoint: Option<String>,
}

/// Configuration for the web server
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
    pub api_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            open_browser: true,
            api_endpoint: None,
        }
    }
}

/// Build the application router
pub fn app(state: Arc<AppState>) -> Router {
    let cross_origin = state.api_endpoint.is_some();

    let router = Router::new()
        .merge(routes::api_routes())
        .merge(routes::static_routes())
        .with_state(state);

    // A separately deployed frontend calls the API from another origin
    if cross_origin {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Start the web server and serve the visualization
pub async fn start_server(
    table: HotspotTable,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = Arc::new(AppState {
        table,
        api_endpoint: config.api_endpoint.clone(),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;

    let url = format!("http://localhost:{}", config.port);
    eprintln!("Starting web server at {}", url);

    if config.open_browser {
        eprintln!("Opening browser...");
        if let Err(e) = open::that(&url) {
            eprintln!("Warning: Could not open browser: {}", e);
            eprintln!("Please open {} manually", url);
        }
    }

    eprintln!("Press Ctrl+C to stop the server");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
