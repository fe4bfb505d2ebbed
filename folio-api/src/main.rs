use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_api::auth::{CognitoClient, JwksVerifier, SharedSecretVerifier, TokenVerifier};
use folio_api::mail::mailer_from_config;
use folio_api::media::MediaStore;
use folio_api::rate_limit::RateLimiter;
use folio_api::{app_router, logging, metrics, AppState, Config};
use folio_core::content::Content;
use folio_core::storage::{DatabaseStorage, Storage};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio CMS backend")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ./folio.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create or upgrade the database schema
    Migrate,
    /// Insert sample content where none exists
    Seed,
}

async fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    let storage = DatabaseStorage::connect(
        &config.database.url,
        config.database.auth_token.as_deref(),
    )
    .await
    .with_context(|| format!("opening database '{}'", config.database.url))?;
    Ok(Arc::new(storage))
}

fn token_verifier(config: &Config, http: &reqwest::Client) -> Arc<dyn TokenVerifier> {
    if let Some(secret) = &config.auth.dev_shared_secret {
        warn!("Using the development shared-secret token verifier");
        return Arc::new(SharedSecretVerifier::new(secret));
    }
    if config.auth.is_identity_provider_configured() {
        return Arc::new(JwksVerifier::new(
            http.clone(),
            config.auth.jwks_url(),
            config.auth.issuer(),
        ));
    }
    warn!("No identity provider configured; admin endpoints will reject every request");
    // A throwaway secret nobody holds, so no token verifies.
    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();
    Arc::new(SharedSecretVerifier::new(&secret))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if config.metrics.enabled {
        metrics::init_metrics(config.metrics.port);
    }

    let storage = open_storage(&config).await?;
    let http = reqwest::Client::new();
    let limiter = RateLimiter::new();
    limiter.spawn_sweeper();

    let state = AppState {
        content: Content::new(storage),
        verifier: token_verifier(&config, &http),
        identity: config
            .auth
            .is_identity_provider_configured()
            .then(|| CognitoClient::new(http.clone(), &config.auth)),
        media: MediaStore::from_config(&config.storage).context("configuring media storage")?,
        mailer: mailer_from_config(&config.mail).context("configuring mail")?,
        limiter,
        config: Arc::new(config),
    };

    let port = state.config.server.port;
    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding port {port}"))?;

    info!("Folio API listening on http://localhost:{}", port);
    info!("Health check: http://localhost:{}/health", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging);

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
        }
        Commands::Migrate => {
            open_storage(&config).await?;
            info!("Database schema is up to date");
        }
        Commands::Seed => {
            let storage = open_storage(&config).await?;
            let report = folio_core::content::seed(storage).await?;
            info!(
                "Seeded {} documents ({} projects, {} posts, {} skills)",
                report.total(),
                report.projects,
                report.posts,
                report.skills
            );
        }
    }

    Ok(())
}
