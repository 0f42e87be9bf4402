use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use cms_api::{build_router, AppState};
use cms_core::repositories::{MenuRepository, SettingsRepository};
use cms_core::services::{MenuService, SettingsCache, SettingsService};
use cms_infrastructure::{
    create_pool, run_migrations, InMemoryMenuRepository, InMemorySettingsRepository,
    PgMenuRepository, PgSettingsRepository,
};
use cms_security::{CsrfService, JwtService};
use cms_shared::config::AppConfig;
use cms_shared::StorageBackend;

#[derive(Parser, Debug)]
#[command(name = "cms-server", version, about = "Photo site CMS - admin API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the admin HTTP API (default)
    Serve,
    /// Print an admin bearer token signed with the configured secret
    IssueToken {
        /// Subject recorded in the token
        #[arg(long, default_value = "admin")]
        subject: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = cms_shared::telemetry::init_telemetry(&config.logging)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::IssueToken { subject } => {
            let jwt = JwtService::new(config.auth.jwt_secret.clone(), config.auth.token_ttl_secs);
            println!("{}", jwt.issue_admin(&subject)?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("{} starting ({})...", config.app.name, config.app.env);

    let (menu_repo, settings_repo): (Arc<dyn MenuRepository>, Arc<dyn SettingsRepository>) =
        match config.database.backend {
            StorageBackend::Postgres => {
                info!("Connecting to database...");
                let pool = create_pool(&config.database)
                    .await
                    .context("Failed to connect to database")?;
                if config.database.run_migrations {
                    run_migrations(&pool).await?;
                }
                info!("Database connection established.");
                let menus: Arc<dyn MenuRepository> = Arc::new(PgMenuRepository::new(pool.clone()));
                let settings: Arc<dyn SettingsRepository> = Arc::new(PgSettingsRepository::new(pool));
                (menus, settings)
            }
            StorageBackend::Memory => {
                warn!("Using the in-memory store; data is lost on restart");
                let menus: Arc<dyn MenuRepository> = Arc::new(InMemoryMenuRepository::new());
                let settings: Arc<dyn SettingsRepository> = Arc::new(InMemorySettingsRepository::new());
                (menus, settings)
            }
        };

    let state = AppState {
        menus: Arc::new(MenuService::new(menu_repo, config.menu.clone())),
        settings: Arc::new(SettingsService::new(settings_repo, Arc::new(SettingsCache::new()))),
        jwt: Arc::new(JwtService::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_ttl_secs,
        )),
        csrf: Arc::new(CsrfService::new(config.auth.csrf_secret.clone())?),
    };

    let app = build_router(state, config.app.allowed_origin.as_deref());

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
