mod config;
mod error;
mod routes;

use actix_cors::Cors;
use actix_web::{ web, App, HttpServer };
use config::ServerConfig;
use routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = ServerConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    match &config.detect_upstream {
        Some(upstream) => log::info!("Forwarding /detect to {}", upstream),
        None => log::warn!("DETECT_UPSTREAM_URL is not set; /detect will report the model as unavailable"),
    }
    log::info!("Serving frontend from {}", config.frontend_dir);

    let bind_address = config.bind_address();
    let frontend_dir = config.frontend_dir.clone();
    let config = web::Data::new(config);
    let client = web::Data::new(reqwest::Client::new());

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(config.clone())
            .app_data(client.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
