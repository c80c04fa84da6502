//! Session guard composed ahead of the query and registration handlers.
//!
//! The guard is a pure function of the request context: it resolves the
//! bearer token against the configured sessions and stores the resulting
//! identity in the request extensions, where handlers extract it. There is
//! no process-wide session state.

use std::collections::HashMap;
use std::future::{Ready, ready};

use actix_web::body::MessageBody;
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, web};
use hostpulse::config::AuthSection;

use crate::error::ApiError;

/// Request-scoped authenticated identity
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: String,
}

/// Configured bearer tokens and the users they map to
pub struct SessionStore {
    tokens: HashMap<String, String>,
}

impl SessionStore {
    pub fn from_config(auth: &AuthSection) -> Self {
        let tokens =
            auth.sessions.iter().map(|s| (s.token.clone(), s.user.clone())).collect();
        Self { tokens }
    }

    /// With no sessions configured the API runs in open single-user mode
    pub fn is_open(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Resolve an Authorization header value into an identity
    pub fn resolve(&self, header: Option<&str>) -> Option<SessionUser> {
        if self.is_open() {
            return Some(SessionUser { user: "anonymous".to_string() });
        }

        let token = header?.strip_prefix("Bearer ")?;
        self.tokens.get(token).map(|user| SessionUser { user: user.clone() })
    }
}

/// Middleware rejecting unauthenticated requests before the handler runs
pub async fn require_session(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let user = req
        .app_data::<web::Data<SessionStore>>()
        .and_then(|sessions| sessions.resolve(header.as_deref()));

    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        None => Err(ApiError::Unauthorized.into()),
    }
}

impl FromRequest for SessionUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<SessionUser>()
                .cloned()
                .ok_or_else(|| ApiError::Unauthorized.into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostpulse::config::Session;

    fn store_with(token: &str, user: &str) -> SessionStore {
        SessionStore::from_config(&AuthSection {
            sessions: vec![Session { token: token.into(), user: user.into() }],
        })
    }

    #[test]
    fn test_open_store_admits_anonymous() {
        let store = SessionStore::from_config(&AuthSection::default());
        assert!(store.is_open());
        assert_eq!(store.resolve(None).unwrap().user, "anonymous");
    }

    #[test]
    fn test_configured_store_requires_bearer_token() {
        let store = store_with("t0k3n", "ops");

        assert!(store.resolve(None).is_none());
        assert!(store.resolve(Some("t0k3n")).is_none());
        assert!(store.resolve(Some("Bearer wrong")).is_none());
        assert_eq!(store.resolve(Some("Bearer t0k3n")).unwrap().user, "ops");
    }
}
