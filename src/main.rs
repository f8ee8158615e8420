mod handlers;
mod models;
mod render;
mod routes;
mod state;
mod structs;
mod utils;

use crate::state::app_state::AppState;
use crate::utils::settings::Settings;
use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;
use routes::init_routes;

/// Logos arrive base64-encoded inside the JSON body.
const JSON_BODY_LIMIT: usize = 8 * 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Create shared state
    let app_state = web::Data::new(AppState::from_settings(&settings));
    log::info!(
        "starting QR render service on {}:{} with the {} renderer",
        settings.bind_address,
        settings.port,
        settings.backend
    );

    let origins = settings.cors_origins.clone();
    HttpServer::new(move || {
        // Create a logger with a custom format instead
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![http::header::ACCEPT, http::header::IF_NONE_MATCH])
            .allowed_header(http::header::CONTENT_TYPE)
            .expose_headers(vec![
                http::header::ETAG,
                http::header::CONTENT_DISPOSITION,
                http::header::LOCATION,
            ])
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().limit(JSON_BODY_LIMIT))
            .configure(init_routes)
    })
    .bind((settings.bind_address.as_str(), settings.port))?
    .run()
    .await
}
