mod migrations;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use videoparty_core::{
    bootstrap::{init_database, init_services, load_config},
    logging,
    models::UserId,
};

#[derive(Parser, Debug)]
#[command(name = "videoparty")]
#[command(about = "Watch-together room server", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a signed access token for a user, for operators and smoke tests
    IssueToken {
        /// User id to put in the token subject
        #[arg(long, env = "VIDEOPARTY_TOKEN_USER")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load and validate configuration
    let config = load_config()?;

    if let Some(Command::IssueToken { user }) = args.command {
        let services = init_services(None, &config)?;
        let token = services
            .jwt
            .sign_token(&UserId::from(user))
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {e}"))?;
        println!("{token}");
        return Ok(());
    }

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("VideoParty server starting...");
    info!("HTTP address: {}", config.http_address());

    // 3. Initialize storage
    let pool = if config.uses_database() {
        let pool = init_database(&config).await?;
        migrations::run_migrations(&pool).await?;
        Some(pool)
    } else {
        warn!("database.url is empty, rooms will be kept in memory only");
        None
    };

    // 4. Initialize services
    let services = init_services(pool, &config)?;

    // 5. Serve
    server::run(&config, services).await
}
