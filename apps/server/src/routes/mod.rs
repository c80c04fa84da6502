use actix_web::middleware::from_fn;
use actix_web::web;

pub mod health;
pub mod hosts;
pub mod status;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_route).service(
        web::scope("")
            .wrap(from_fn(crate::auth::require_session))
            .service(status::latest_route)
            .service(hosts::list_hosts_route)
            .service(hosts::register_host_route),
    );
}
