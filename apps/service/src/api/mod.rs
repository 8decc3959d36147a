//! HTTP API: thin glue between the store, the checker, and the wire.

mod handlers;

use actix_web::web;

pub use handlers::AppState;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::websites_status).service(handlers::websites_check);
}
