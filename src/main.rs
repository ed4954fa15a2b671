use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn_with_state, map_response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use rest_base::api::{method_not_allowed_envelope, not_found_fallback};
use rest_base::config::{AppConfig, Environment};
use rest_base::prelude::*;

mod notes;

use notes::{LoginState, NotesService, UserDirectory};

#[derive(Debug, Parser)]
#[command(name = "rest-base", version, about = "Reference server for the rest-base building blocks")]
struct Args {
    /// Port to listen on (overrides API_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SECURITY_JWT_SECRET etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = rest_base::config::config();
    tracing::info!("Starting rest-base in {:?} mode", config.environment);

    let admin_password = admin_password(config.environment, std::env::var("ADMIN_PASSWORD").ok())?;
    let users = Arc::new(UserDirectory::with_admin(&admin_password)?);

    let app = app(config, users);

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Only development may fall back to the well-known default password
fn admin_password(environment: Environment, configured: Option<String>) -> anyhow::Result<String> {
    match configured.filter(|password| !password.is_empty()) {
        Some(password) => Ok(password),
        None if environment == Environment::Development => {
            tracing::warn!("ADMIN_PASSWORD is not set; the admin account uses the default password 'admin'");
            Ok("admin".to_string())
        }
        None => anyhow::bail!("ADMIN_PASSWORD must be set when running in {:?}", environment),
    }
}

fn app(config: &AppConfig, users: Arc<UserDirectory>) -> Router {
    let jwt = JwtService::from_config(config);
    let gate = AuthGate::new(Arc::new(jwt.clone()), users.clone());

    let notes = ResourceRouter::new(NotesService::new(users.clone())).crud().build();

    let login = Router::new()
        .route("/auth/login", post(notes::login))
        .with_state(LoginState { users, jwt });

    let router = Router::new()
        .route("/health", get(health))
        .merge(login)
        .nest("/api/notes", notes)
        .fallback(not_found_fallback)
        .layer(
            ServiceBuilder::new()
                .layer(map_response(method_not_allowed_envelope))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(from_fn_with_state(gate, authentication_gate)),
        );

    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security.cors_origins))
    } else {
        router
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn health() -> ServerResponse {
    ServerResponse::ok(format!("rest-base {} is up", env!("CARGO_PKG_VERSION")))
}
