use actix_web::web;

pub mod health;
pub mod matches;
pub mod realtime;

/// All routes, shared by `main` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes))
        .service(web::scope("/api/matches").configure(matches::configure_routes))
        .service(web::scope("/api/ws").configure(realtime::configure_routes));
}
