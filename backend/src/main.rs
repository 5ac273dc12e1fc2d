mod config;
mod db;
mod prediction;
mod processing;
mod routes;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use sqlx::postgres::PgPoolOptions;

use config::Settings;
use db::image_repository::ImageRepository;
use prediction::client::{ReplicateClient, StableDiffusionClient};
use processing::service::ProcessingService;
use routes::configure_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let settings = Settings::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await
        .map_err(|e| {
            std::io::Error::other(format!("Database connection failed: {e}"))
        })?;

    let repository = ImageRepository::new(pool);
    let replicate = ReplicateClient::new(
        settings.replicate.base_url.clone(),
        settings.replicate.api_token.clone(),
        settings.replicate.model_version.clone(),
    );
    let stable_diffusion = StableDiffusionClient::new(settings.integrations_url.clone());

    let service = ProcessingService::new(
        Arc::new(replicate),
        Arc::new(stable_diffusion),
        Arc::new(repository),
        settings.poll.clone(),
    );

    log::info!(
        "Polling predictions every {:?} for up to {} attempts",
        settings.poll.interval,
        settings.poll.max_attempts
    );
    log::info!("Starting server on {}", settings.bind_address);

    let frontend_dir = settings.frontend_dir.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(service.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&settings.bind_address)?
    .run()
    .await
}
