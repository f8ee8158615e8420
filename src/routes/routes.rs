use actix_web::web;

use crate::handlers::health_handlers::health_check;
use crate::handlers::qr_handlers::{
    build_payload, download_qr, get_defaults, preview_qr, render_qr,
};

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health/check", web::get().to(health_check))
            .service(
                web::scope("/qr")
                    .route("/defaults", web::get().to(get_defaults))
                    .route("/payload", web::post().to(build_payload))
                    .route("/preview", web::post().to(preview_qr))
                    .route("/download", web::post().to(download_qr))
                    .route("/render", web::post().to(render_qr)),
            ),
    );
}
