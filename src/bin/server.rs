use blogpress::config::{self, CliArgs};
use blogpress::{create_app, db, logging, repo, run_migrations, AppState, SiteSettings};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = CliArgs::parse();

    // Logging starts before the config is merged so that its warnings are kept
    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| config::log_dir_from_file(config::config_file_path()));
    let _guard = logging::init_logging(args.debug, log_dir.as_deref().map(Path::new));

    let config = config::get_config(args);
    info!("Using database {}", config.database_url);

    let pool = Arc::new(db::init_pool(&config.database_url)?);
    {
        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
    }

    match repo::purge_expired_sessions(&pool) {
        Ok(n) => info!("Removed {} expired session(s) at startup", n),
        Err(e) => error!("Failed to purge expired sessions: {:#}", e),
    }

    tokio::fs::create_dir_all(&config.media_dir).await?;

    let state = AppState::new(pool, SiteSettings::from_config(&config));
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
