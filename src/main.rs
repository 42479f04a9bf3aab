//! Anime Catalog Server
//!
//! Main entry point for the anime catalog web service.

use std::io;

use actix_web::{web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use anime_catalog::config::Config;
use anime_catalog::db::Database;
use anime_catalog::routes::{configure_routes, ApiDoc, AppState};
use anime_catalog::seed::run_seeds;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(io::Error::other)?;
    let bind_address = config.bind_address();

    info!("Connecting to database...");
    let db = Database::new(&config.database_url)
        .await
        .map_err(io::Error::other)?;

    info!("Running database migrations...");
    db.run_migrations().await.map_err(io::Error::other)?;

    info!("Seeding database...");
    run_seeds(db.pool(), &config.anime_csv_path)
        .await
        .inspect_err(|e| error!("Seeding failed: {}", e))
        .map_err(io::Error::other)?;

    info!("Database ready");

    let app_state = web::Data::new(AppState { db, config });

    info!("Starting Anime Catalog server on {}", bind_address);

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
