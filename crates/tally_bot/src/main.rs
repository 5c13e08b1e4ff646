use anyhow::{Context, Result};
use clap::Parser;
use serenity::client::Client;
use serenity::http::Http;
use serenity::model::gateway::GatewayIntents;
use std::sync::Arc;
use std::time::Duration;
use tally_bot::{
    BotConfig, CommandRunner, ConfirmationFlow, Dispatcher, Messenger, SerenityMessenger,
    SetupManager, TallyHandler,
};
use tally_cache::{ConfirmationCacheConfig, PendingConfirmations, RegistrationIndex};
use tally_database::{PgLedgerStore, establish_connection, run_migrations};
use tally_ledger::DebtService;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// How often expired confirmation tokens get swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(author, version, about = "Tally guild-bank bot", long_about = None)]
struct Args {
    /// Database connection string (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Admin user id for setup and roster commands (overrides TALLY_ADMIN_ID)
    #[arg(long)]
    admin_user_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = BotConfig::from_env()?;
    let config = BotConfig::new(
        config.discord_token().as_str(),
        args.database_url
            .as_deref()
            .unwrap_or_else(|| config.database_url().as_str()),
        args.admin_user_id
            .as_deref()
            .unwrap_or_else(|| config.admin_user_id().as_str()),
    );

    let mut conn = establish_connection(config.database_url())
        .context("could not connect to the database")?;
    run_migrations(&mut conn).context("could not run the database migrations")?;
    let store = Arc::new(PgLedgerStore::new(conn));
    let service = Arc::new(DebtService::new(Arc::clone(&store)));

    let index = Arc::new(RegistrationIndex::new());
    let setups = service.all_setups().await?;
    let hydrated = index.hydrate(
        setups
            .into_iter()
            .map(|setup| setup.registration_message_id),
    );
    info!(registration_messages = hydrated, "hydrated the registration index");

    let http = Arc::new(Http::new(config.discord_token()));
    let messenger = Arc::new(SerenityMessenger::new(Arc::clone(&http))) as Arc<dyn Messenger>;
    let boards = Arc::new(SetupManager::new(
        Arc::clone(&service),
        Arc::clone(&messenger),
        Arc::clone(&index),
    ));

    let pending = Arc::new(PendingConfirmations::new(ConfirmationCacheConfig::default()));
    let sweeper = Arc::clone(&pending);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let swept = sweeper.sweep();
            if swept > 0 {
                debug!(swept, "swept expired confirmation tokens");
            }
        }
    });

    let confirmations = ConfirmationFlow::new(
        Arc::clone(&service),
        Arc::clone(&boards),
        Arc::clone(&messenger),
        pending,
    );
    let dispatcher = Dispatcher::new(
        Arc::clone(&service),
        Arc::clone(&boards),
        confirmations,
        index,
    );
    let runner = CommandRunner::new(
        service,
        boards,
        messenger,
        config.admin_user_id().as_str(),
    );

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGE_REACTIONS;
    info!("connecting the tally bot");
    let mut client = Client::builder(config.discord_token(), intents)
        .event_handler(TallyHandler::new(dispatcher, runner))
        .await
        .context("could not build the Discord client")?;
    client.start().await.context("gateway connection failed")?;
    Ok(())
}
