// Route exports
pub mod coverage;
pub mod extractors;

use actix_web::web;

pub use coverage::AppState;
pub use extractors::configure_extractors;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(coverage::configure),
    );
}
