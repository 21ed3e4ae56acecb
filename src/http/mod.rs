//! HTTP routing layer
//!
//! JSON API under `/api`, the templated entry page at `/` and the rest of
//! the public directory as static files.

pub mod comments;
pub mod movies;
pub mod pages;
pub mod rate_limit;
pub mod response;

pub use pages::{FrontendSettings, Pages};
pub use rate_limit::RateLimiter;

use crate::config::ServerConfig;
use crate::controllers::Envelope;
use crate::{Catalog, Result};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use chrono::{SecondsFormat, Utc};
use response::Reply;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub pages: Arc<Pages>,
}

/// Build the application router
pub fn router(catalog: Catalog, config: &ServerConfig) -> Result<Router> {
    let pages = Pages::load(&config.public_dir, &FrontendSettings::from(config))?;
    let state = AppState {
        catalog,
        pages: Arc::new(pages),
    };
    let limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window())
        .trust_proxy(config.trust_proxy);

    let api = Router::new()
        .route("/filmes", get(movies::list).post(movies::create))
        .route("/filmes/estatisticas", get(movies::statistics))
        .route("/filmes/genero/{genero}", get(movies::by_genre))
        .route(
            "/filmes/{id}",
            get(movies::get).put(movies::update).delete(movies::delete),
        )
        .route("/comentarios", post(comments::create))
        .route(
            "/comentarios/filme/{filme_id}",
            get(comments::list_by_movie).delete(comments::delete_all_for_movie),
        )
        .route("/comentarios/filme/{filme_id}/stats", get(comments::statistics))
        .route(
            "/comentarios/{id}",
            get(comments::get)
                .put(comments::update)
                .delete(comments::delete),
        )
        .route("/health", get(health))
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(limiter, rate_limit::enforce));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Ok(Router::new()
        .nest("/api", api)
        .route("/", get(pages::index))
        .route("/index.html", get(pages::index))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub store: &'static str,
    pub timestamp: String,
}

async fn health(State(state): State<AppState>) -> Reply<Health> {
    let store = if state.catalog.store.is_connected() {
        "connected"
    } else {
        "disconnected"
    };

    Reply::ok(Envelope::ok(
        "Server is running",
        Health {
            status: "ok",
            store,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        },
    ))
}

async fn api_not_found() -> (StatusCode, Json<Envelope<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::failure("Route not found")),
    )
}

/// Serve until Ctrl+C or SIGTERM, then close the store
pub async fn serve(catalog: Catalog, config: &ServerConfig) -> anyhow::Result<()> {
    let address = config.bind_address()?;
    let app = router(catalog.clone(), config)?;

    let listener = TcpListener::bind(address).await?;
    info!(%address, public_dir = %config.public_dir.display(), "server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    catalog.close();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
