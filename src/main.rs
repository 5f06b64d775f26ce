mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::database::MongoDB;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting Workout API...");
    log::info!("📊 Database: {}", config.database_name);

    let db = MongoDB::new(&config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    // The server still starts when MongoDB is down; /api/test-db reports it
    if let Err(e) = db.connect().await {
        log::warn!("⚠️  MongoDB not reachable at startup: {}", e);
    }

    let db_data = web::Data::new(db.clone());
    let cors_origins = config.cors_allowed_origins.clone();
    let openapi = api::swagger::ApiDoc::openapi();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(db_data.clone())
            .wrap(Logger::default())
            .wrap(middleware::cors(&cors_origins))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api::configure)
            .default_service(web::to(api::not_found))
    })
    .bind(config.bind_address())?
    .run();

    log::info!("✅ API ready on http://localhost:{}", config.port);
    log::info!("📚 Swagger UI available at: http://localhost:{}/swagger-ui/", config.port);

    let result = server.await;

    db.shutdown().await;
    result
}
