use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{bail, Result};

use shiftclock::database::init_database;
use shiftclock::database::models::Location;
use shiftclock::database::repositories::{
    InMemoryLocationDirectory, InMemoryShiftStore, LocationDirectory, PgLocationRepository,
    PgShiftRepository, ShiftStore,
};
use shiftclock::services::SystemClock;
use shiftclock::{routes, AppState, Config};

#[actix_web::main]
async fn main() -> Result<()> {
    // Loads .env before the logger reads RUST_LOG
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting shiftclock API server...");

    if config.is_production() && config.uses_dev_jwt_secret() {
        bail!("JWT_SECRET must be set when ENVIRONMENT=production");
    }
    log::info!(
        "Configuration loaded (environment: {}, shift time zone: {})",
        config.environment,
        config.shift_timezone.name()
    );

    let (shifts, locations) = match &config.database_url {
        Some(url) => {
            let pool = init_database(url).await?;
            log::info!("Database initialized");

            let shifts: Arc<dyn ShiftStore> = Arc::new(PgShiftRepository::new(pool.clone()));
            let locations: Arc<dyn LocationDirectory> = Arc::new(PgLocationRepository::new(pool));
            (shifts, locations)
        }
        None => {
            log::warn!("DATABASE_URL is not set; shifts are kept in memory and lost on restart");
            let directory = InMemoryLocationDirectory::with_locations(
                config
                    .seed_locations
                    .iter()
                    .map(|name| Location::new(name.as_str(), None)),
            );
            for location in directory.list_all().await? {
                log::info!("Seeded location {} ({})", location.name, location.id);
            }

            let shifts: Arc<dyn ShiftStore> = Arc::new(InMemoryShiftStore::new());
            let locations: Arc<dyn LocationDirectory> = Arc::new(directory);
            (shifts, locations)
        }
    };

    let app_state = web::Data::new(AppState::new(
        shifts,
        locations,
        Arc::new(SystemClock::new(config.shift_timezone)),
    ));
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config.client_base_url)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .max_age(3600),
            )
            .wrap(Logger::new(r#"%a "%r" %s %b "%{User-Agent}i" %T"#))
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
