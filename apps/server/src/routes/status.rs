use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use crate::AppState;
use crate::auth::SessionUser;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    host: Option<String>,
}

/// Latest probe record for a host. A pure read: never triggers a probe.
#[get("/status")]
pub async fn latest_route(
    state: web::Data<AppState>,
    query: web::Query<StatusQuery>,
    _user: SessionUser,
) -> Result<HttpResponse, ApiError> {
    let host = query
        .into_inner()
        .host
        .filter(|host| !host.trim().is_empty())
        .ok_or(ApiError::MissingParam)?;

    match state.store.latest(&host).await.map_err(ApiError::Store)? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(ApiError::NotFound(host)),
    }
}
