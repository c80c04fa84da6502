#![warn(clippy::all, clippy::pedantic)]

//! HTTP API over the result store: latest-record queries and host
//! registration. The daemon owns the schema; this binary never migrates.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use hostpulse::config::Config;
use hostpulse::{HostRegistry, LibsqlRegistry, LibsqlStore, PingProber, Prober, ResultStore};
use logger::init_tracing;

mod auth;
mod error;
mod routes;

use auth::SessionStore;
use error::AppError;

/// Shared handles behind the route handlers
pub struct AppState {
    pub store: Arc<dyn ResultStore>,
    pub registry: Arc<dyn HostRegistry>,
    pub prober: Arc<dyn Prober>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_config(std::env::var("HOSTPULSE_CONFIG").ok().as_deref())?;

    let pool =
        hostpulse::pool::connect(&config.database.path).await.map_err(AppError::Database)?;

    let state = web::Data::new(AppState {
        store: Arc::new(LibsqlStore::new(pool.clone())),
        registry: Arc::new(LibsqlRegistry::new(pool)),
        prober: Arc::new(PingProber::new(config.probe_config())),
    });

    let sessions = web::Data::new(SessionStore::from_config(&config.auth));
    if sessions.is_open() {
        tracing::warn!("no sessions configured; API runs in open single-user mode");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    run_server(addr, state, sessions).await
}

async fn run_server(
    addr: SocketAddr,
    state: web::Data<AppState>,
    sessions: web::Data<SessionStore>,
) -> Result<(), AppError> {
    HttpServer::new(move || {
        App::new().app_data(state.clone()).app_data(sessions.clone()).configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
