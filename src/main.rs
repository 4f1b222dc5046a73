//! rosterd - roster verification and moderation bot for Discord communities.

use rosterd::config::{Config, validation};
use rosterd::handlers::Registry;
use rosterd::platform::events::Bot;
use rosterd::state::Session;
use rosterd::{http, metrics, roster};
use serenity::all::GatewayIntents;
use serenity::Client;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // No .env file is fine.
        if !e.not_found() {
            eprintln!("Failed to read .env: {e}");
        }
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let mut config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;
    config.apply_env();

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {config_path}",
            errors.len()
        ));
    }

    info!(
        guild = %config.bot.guild_id,
        prefix = %config.bot.prefix,
        roles = config.roles.priority.len(),
        "Starting rosterd"
    );

    // Roster must load before anything can be verified.
    let roster = roster::source::load(&config.roster)?;
    info!(
        emails = roster.total_emails(),
        roles = roster.roles().count(),
        "Roster loaded"
    );

    let token = config.bot.token.clone();
    let metrics_port = config.bot.metrics_port.unwrap_or(0);
    let session = Arc::new(Session::new(config, roster));

    // Convention: metrics_port = 0 (or unset) disables the HTTP endpoint.
    if metrics_port == 0 {
        info!("Metrics endpoint disabled");
    } else {
        metrics::init();
        tokio::spawn(async move {
            http::run_http_server(metrics_port).await;
        });
        info!(port = metrics_port, "Prometheus HTTP server started");
    }

    let registry = Arc::new(Registry::new());
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&token, intents)
        .event_handler(Bot::new(Arc::clone(&session), registry))
        .await?;

    let shard_manager = client.shard_manager.clone();
    {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            info!("Shutdown requested");
            if let Err(e) = session.flush() {
                warn!(error = %e, "Failed to flush state on shutdown");
            }
            shard_manager.shutdown_all().await;
        });
    }

    client.start().await?;

    session.flush()?;
    info!("rosterd stopped");
    Ok(())
}
