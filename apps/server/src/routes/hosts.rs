use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::auth::SessionUser;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    hostname: String,
}

/// All hosts currently under monitoring
#[get("/hosts")]
pub async fn list_hosts_route(
    state: web::Data<AppState>,
    _user: SessionUser,
) -> Result<HttpResponse, ApiError> {
    let hosts = state.registry.list_hosts().await.map_err(ApiError::Store)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "hosts": hosts })))
}

/// Register a host. One exploratory probe gates acceptance; monitoring
/// starts from the next scheduler run.
#[post("/hosts")]
pub async fn register_host_route(
    state: web::Data<AppState>,
    user: SessionUser,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let hostname = body.into_inner().hostname.trim().to_string();

    hostpulse::register_host(state.registry.as_ref(), state.prober.as_ref(), &hostname).await?;

    info!(user = %user.user, host = %hostname, "host registered");
    Ok(HttpResponse::Created().json(serde_json::json!({ "hostname": hostname })))
}
