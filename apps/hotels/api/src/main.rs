//! Hotels API
//!
//! Serves the hotel catalogue and similar-hotel search over Redis Stack.
//! `serve` (the default) migrates the vector index, seeds fixtures into an
//! empty store and runs the HTTP server; `load` pushes a fixture file into
//! the store and exits.

use axum::{Router, middleware, routing::get};
use axum_helpers::server::{create_production_app, create_router, health_router};
use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_hotels::redis::REQUIRED_MODULES;
use domain_hotels::{
    HotelService, RedisHotelRepository, RedisVectorIndex, ServiceSettings, SimilaritySearch,
    build_provider, loader,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::{AppState, Hotels};

#[derive(Parser)]
#[command(name = "hotels-api")]
#[command(about = "Hotel catalogue with similar hotel search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Do not seed fixtures into an empty store
        #[arg(long)]
        skip_seed: bool,
    },

    /// Load a fixture file into the store and exit
    Load {
        /// Fixture file. Defaults to HOTELS_FIXTURE_PATH.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    observability::init_metrics()
        .map_err(|e| eyre::eyre!("Metrics recorder installation failed: {}", e))?;
    observability::record_app_info(config.app.name, config.app.version);

    let mut redis = database::redis::connect_with_retry(&config.redis, None)
        .await
        .map_err(|e| eyre::eyre!("Redis connection failed: {}", e))?;
    database::redis::check_modules(&mut redis, REQUIRED_MODULES).await?;

    let hotels = build_hotels(&config, redis.clone()).await?;

    // Migration step: the vector index must exist before any query
    hotels.search().ensure_index().await?;

    match cli.command.unwrap_or(Commands::Serve { skip_seed: false }) {
        Commands::Load { file } => {
            let path = file.unwrap_or_else(|| config.hotels.fixture_path.clone());
            let loaded = loader::load_fixtures(&hotels, &path).await?;
            info!(count = loaded, path = %path.display(), "Fixture load complete");
            Ok(())
        }
        Commands::Serve { skip_seed } => {
            if skip_seed {
                info!("Skipping fixture seeding");
            } else {
                loader::ensure_data_loaded(&hotels, &config.hotels.fixture_path).await?;
            }

            let state = AppState {
                config,
                redis,
                hotels,
            };
            serve(state).await
        }
    }
}

async fn build_hotels(
    config: &Config,
    conn: database::redis::ConnectionManager,
) -> eyre::Result<Hotels> {
    let index_config = config.hotels.index.clone();
    let embedder = build_provider(&config.hotels.embedding, index_config.dimension).await?;

    let repository = RedisHotelRepository::new(conn.clone(), index_config.key_prefix.clone());
    let index = RedisVectorIndex::new(conn, index_config);

    Ok(HotelService::new(
        repository,
        index,
        embedder,
        ServiceSettings::from(&config.hotels),
    ))
}

async fn serve(state: AppState) -> eyre::Result<()> {
    let api_routes = api::routes(&state);

    let app = create_router::<openapi::ApiDoc>(
        api_routes,
        &state.config.server,
        &state.config.environment,
    )?
    .merge(health_router(state.config.app))
    .merge(api::ready_router(state.clone()))
    .merge(Router::new().route("/metrics", get(observability::metrics_handler)))
    .layer(middleware::from_fn(observability::metrics_middleware));

    info!("Hotels API ready");

    let redis = state.redis.clone();
    create_production_app(app, &state.config.server, Duration::from_secs(30), async move {
        info!("Releasing Redis connection");
        drop(redis);
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Server shutdown complete");
    Ok(())
}
