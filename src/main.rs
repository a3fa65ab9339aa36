use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use dalnoboy::application::messaging::{AdminDispatcher, DriverDispatcher, MessageHandler};
use dalnoboy::application::services::{MessageService, Services};
use dalnoboy::domain::entities::User;
use dalnoboy::domain::traits::Bot;
use dalnoboy::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use dalnoboy::infrastructure::config::Config;
use dalnoboy::infrastructure::database::Database;
use dalnoboy::infrastructure::http;
use dalnoboy::infrastructure::storage::InMemoryStore;

type AppResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "dalnoboy")]
#[command(about = "Freight broker bots for customers and drivers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (falls back to CONFIG_PATH, then config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the enabled bots and the HTTP API
    Run,
    /// Talk to one bot through stdin/stdout
    Console {
        #[arg(long, value_enum, default_value_t = Role::Admin)]
        role: Role,
        /// Use a throwaway in-memory store instead of the database
        #[arg(long)]
        in_memory: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Role {
    Admin,
    Driver,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = Config::resolve_path(cli.config);

    let result = match cli.command {
        Commands::Run => run(config_path).await,
        Commands::Console { role, in_memory } => console(config_path, role, in_memory).await,
        Commands::Version => {
            println!("dalnoboy v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(config_path),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::load_or_default(path)?;
    config.validate()?;
    Ok(config)
}

fn open_database(config: &Config) -> Result<Arc<Database>, Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::open(&config.database.path)?;
    let seeded = db.seed_cities(&config.database.seed_cities)?;
    tracing::info!(path = %config.database.path.display(), seeded, "Database initialized");
    Ok(Arc::new(db))
}

/// A message loop with the configured reply size limit.
fn bot_service<B: Bot, H: MessageHandler + 'static>(name: &str, bot: B, handler: H, config: &Config) -> MessageService<B, H> {
    MessageService::new(name, bot, handler).with_max_message_len(config.messages.max_length)
}

fn spawn_bot<B, H>(service: MessageService<B, H>, shutdown: watch::Receiver<bool>) -> JoinHandle<()>
where
    B: Bot + 'static,
    H: MessageHandler + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = service.run(shutdown).await {
            tracing::error!(error = %e, "Bot terminated");
        }
    })
}

async fn run(config_path: PathBuf) -> AppResult {
    let config = load_config(&config_path)?;
    let services = Services::new(open_database(&config)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    let admin = &config.bots.admin;
    if let (true, Some(token)) = (admin.enabled, admin.token.as_deref()) {
        let bot = TelegramAdapter::new(token, config.bots.poll_timeout_secs)?;
        let handler = AdminDispatcher::new(services.orders.clone(), services.customers.clone(), services.drivers.clone())
            .with_allowed_users(admin.allowed_users.iter().copied());
        let service = bot_service("admin", bot, handler, &config);
        tasks.push(spawn_bot(service, shutdown_rx.clone()));
    }

    let driver = &config.bots.driver;
    if let (true, Some(token)) = (driver.enabled, driver.token.as_deref()) {
        let bot = TelegramAdapter::new(token, config.bots.poll_timeout_secs)?;
        let handler = DriverDispatcher::new(services.orders.clone(), services.drivers.clone());
        let service = bot_service("driver", bot, handler, &config);
        tasks.push(spawn_bot(service, shutdown_rx.clone()));
    }

    if config.http.enabled {
        let addr: SocketAddr = config.http.bind.parse()?;
        let orders = services.orders.clone();
        let rx = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = http::serve(addr, orders, rx).await {
                tracing::error!(error = %e, "HTTP API terminated");
            }
        }));
    }

    if tasks.is_empty() {
        tracing::warn!("Nothing to run: enable a bot or the HTTP API in {}", config_path.display());
        return Ok(());
    }

    shutdown_signal().await;
    tracing::info!("Shutdown requested, finishing in-flight work");
    let _ = shutdown_tx.send(true);

    let grace = Duration::from_secs(config.shutdown.grace_period_secs);
    let aborts: Vec<_> = tasks.iter().map(|t| t.abort_handle()).collect();
    let drain = async {
        for task in tasks {
            let _ = task.await;
        }
    };
    if tokio::time::timeout(grace, drain).await.is_err() {
        tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, aborting remaining tasks");
        for abort in aborts {
            abort.abort();
        }
    }

    tracing::info!("Stopped");
    Ok(())
}

async fn console(config_path: PathBuf, role: Role, in_memory: bool) -> AppResult {
    let config = load_config(&config_path)?;
    let services = if in_memory {
        Services::new(Arc::new(InMemoryStore::with_cities(&config.database.seed_cities)))
    } else {
        Services::new(open_database(&config)?)
    };

    let user = User::new(0).with_username("console").with_name("Console", Some("User"));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let adapter = ConsoleAdapter::stdin(user).with_shutdown(shutdown_tx.clone());

    let interrupt = tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let result = match role {
        Role::Admin => {
            let handler = AdminDispatcher::new(services.orders, services.customers, services.drivers.clone());
            bot_service("console-admin", adapter, handler, &config).run(shutdown_rx).await
        }
        Role::Driver => {
            let handler = DriverDispatcher::new(services.orders, services.drivers);
            bot_service("console-driver", adapter, handler, &config).run(shutdown_rx).await
        }
    };
    interrupt.abort();
    Ok(result?)
}

fn init_config(path: PathBuf) -> AppResult {
    if path.exists() {
        return Err(format!("{} already exists", path.display()).into());
    }
    Config::default().save(&path)?;
    println!("Created {}", path.display());
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dalnoboy::application::errors::BotError;
    use dalnoboy::domain::entities::{Message, Reply, ReplyKeyboard};
    use dalnoboy::domain::traits::BotInfo;
    use std::sync::Mutex;

    struct RecordingBot {
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Bot for RecordingBot {
        async fn start(&self) -> Result<BotInfo, BotError> {
            Ok(BotInfo {
                id: "0".into(),
                name: "test".into(),
                username: "test".into(),
            })
        }
        async fn next_messages(&self) -> Result<Vec<Message>, BotError> {
            Ok(Vec::new())
        }
        async fn send_message(&self, _: i64, text: &str) -> Result<(), BotError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
        async fn send_with_keyboard(&self, chat_id: i64, text: &str, _: &ReplyKeyboard) -> Result<(), BotError> {
            self.send_message(chat_id, text).await
        }
    }

    struct Echo;

    impl MessageHandler for Echo {
        fn handle(&self, message: &Message) -> Reply {
            Reply::text(message.text.clone())
        }
    }

    #[tokio::test]
    async fn test_bot_service_uses_configured_length() {
        let mut config = Config::default();
        config.messages.max_length = 20;
        let sent = Arc::new(Mutex::new(Vec::new()));
        let bot = RecordingBot { sent: sent.clone() };
        let service = bot_service("console-admin", bot, Echo, &config);

        let text = (0..10).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        service.respond(0, &Reply::text(text)).await.unwrap();
        // the default limit would have sent this in one message
        let sent = sent.lock().unwrap();
        assert!(sent.len() > 1);
        assert!(sent.iter().all(|part| part.chars().count() <= 20));
    }

    #[test]
    fn test_load_config_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "messages:\n  max-length: 0\n").unwrap();
        assert!(load_config(&path).is_err());

        std::fs::write(&path, "messages:\n  max-length: 100\n").unwrap();
        assert_eq!(load_config(&path).unwrap().messages.max_length, 100);
    }
}
