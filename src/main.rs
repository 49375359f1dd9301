mod api;
mod commands;
mod labels;
mod reminders;
mod router;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use subtrack_channels::telegram::TelegramChannel;
use subtrack_core::{
    config::{self, Config, GeneralConfig, SessionBackend},
    session::MemorySessionStore,
    shellexpand,
    traits::{Channel, SessionStore},
};
use subtrack_store::Store;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "subtrack",
    version,
    about = "Subscription tracker bot served over a Telegram webhook"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, env = "SUBTRACK_CONFIG", default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Telegram webhook.
    Start,
    /// Show configuration and database summary.
    Status,
    /// Run one reminder pass for today.
    Remind {
        /// Log reminders instead of sending them; the database is not written.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_logging(&cfg.subtrack)?;

    match cli.command {
        Commands::Start => start(cfg).await?,
        Commands::Status => status(&cli.config, &cfg).await?,
        Commands::Remind { dry_run } => remind(&cfg, dry_run).await?,
    }

    Ok(())
}

/// Log to stderr, and to a daily file under `{data_dir}/logs` when enabled.
/// The returned guard flushes the file writer on drop.
fn init_logging(cfg: &GeneralConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    if !cfg.log_to_file {
        fmt().with_env_filter(filter).init();
        return Ok(None);
    }

    let dir = PathBuf::from(shellexpand(&cfg.data_dir)).join("logs");
    std::fs::create_dir_all(&dir)?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, "subtrack.log"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}

async fn start(cfg: Config) -> anyhow::Result<()> {
    let channel = TelegramChannel::new(cfg.telegram.clone());
    if !channel.is_configured() {
        anyhow::bail!(
            "Telegram bot_token is empty. Set it in config.toml or the {} env var.",
            config::BOT_TOKEN_ENV
        );
    }

    let store = Store::new(&cfg.storage, &cfg.sessions).await?;
    let sessions: Arc<dyn SessionStore> = match cfg.sessions.backend {
        SessionBackend::Sqlite => Arc::new(store.clone()),
        SessionBackend::Memory => {
            Arc::new(MemorySessionStore::from_minutes(cfg.sessions.timeout_minutes))
        }
    };

    channel.register_commands().await;
    if !cfg.telegram.webhook_url.is_empty() {
        if let Err(e) = channel.set_webhook(&cfg.telegram.webhook_url).await {
            warn!("could not register webhook: {e}");
        }
    }

    let router = Arc::new(router::Router::new(store, sessions, cfg.bot.currency.clone()));
    let channel: Arc<dyn Channel> = Arc::new(channel);
    info!(
        "{} starting (reply mode: {})",
        cfg.subtrack.name,
        cfg.telegram.reply_mode.display_name()
    );

    let state = api::ApiState::new(router, channel, cfg.telegram.reply_mode);
    api::serve(&cfg.server, state).await?;
    Ok(())
}

async fn status(config_path: &str, cfg: &Config) -> anyhow::Result<()> {
    println!("subtrack status\n");
    println!("Config: {config_path}");
    println!("Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("Reply mode: {}", cfg.telegram.reply_mode.display_name());
    println!(
        "Sessions: {:?}, {} min idle timeout",
        cfg.sessions.backend, cfg.sessions.timeout_minutes
    );
    println!(
        "  telegram: {}",
        if cfg.telegram.bot_token.is_empty() {
            "missing bot_token"
        } else {
            "configured"
        }
    );
    println!();

    let store = Store::new(&cfg.storage, &cfg.sessions).await?;
    let active = store.list_all_active_subscriptions().await?;
    println!("Database: {}", shellexpand(&cfg.storage.db_path));
    println!("  size: {} bytes", store.db_size().await?);
    println!("  active subscriptions: {}", active.len());
    Ok(())
}

async fn remind(cfg: &Config, dry_run: bool) -> anyhow::Result<()> {
    let store = Store::new(&cfg.storage, &cfg.sessions).await?;
    let today = chrono::Local::now().date_naive();

    let channel = TelegramChannel::new(cfg.telegram.clone());
    if !dry_run && !channel.is_configured() {
        anyhow::bail!("Telegram bot_token is empty; use --dry-run or configure a token.");
    }
    let channel: Option<&dyn Channel> = if dry_run { None } else { Some(&channel) };

    let summary = reminders::run(&store, channel, &cfg.bot.currency, today).await?;
    println!(
        "{} due, {} sent, {} failed, {} charge dates rolled forward",
        summary.due, summary.sent, summary.failed, summary.rolled_forward
    );
    Ok(())
}
