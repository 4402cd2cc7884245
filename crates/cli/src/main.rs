//! CLI entrypoint and subcommand orchestration.

mod config;
#[cfg(test)]
mod test_support;
mod tui;

use chat::{Carousel, GameCard};
use clap::{Parser, Subcommand};

#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use chat::{ChatController, ChatRegistry, FALLBACK_REPLY, HttpRelayClient, MemoryStore, TranscriptView};
#[cfg(not(test))]
use config::Config;
#[cfg(not(test))]
use relay::{GeminiProvider, LlmProvider, RelayServer};
#[cfg(not(test))]
use tracing::{info, warn};
#[cfg(not(test))]
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Top-level command-line arguments.
#[derive(Parser)]
#[command(name = "gamechat")]
#[command(about = "Game assistant chat: terminal client and relay server", version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug logging to ~/.gamechat/logs/debug.log
    #[arg(long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the full-screen chat (default when no subcommand is given)
    Chat,

    /// Run the relay server in front of the Gemini API
    Serve {
        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one message through the relay and print the reply
    Ask {
        /// Game the question is about; omitted means general video games
        #[arg(short, long)]
        game: Option<String>,

        /// The question
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

impl Commands {
    fn label(&self) -> &'static str {
        match self {
            Commands::Chat => "chat",
            Commands::Serve { .. } => "serve",
            Commands::Ask { .. } => "ask",
        }
    }
}

/// Carousel for a one-shot question: one card for `game`, or none.
fn ask_carousel(game: Option<&str>) -> Carousel {
    match game.map(str::trim).filter(|g| !g.is_empty()) {
        Some(game) => Carousel::new(vec![GameCard::new(game)]),
        None => Carousel::new(Vec::new()),
    }
}

/// Directory holding the `--debug` log files.
fn log_dir() -> std::path::PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    std::path::PathBuf::from(home).join(".gamechat").join("logs")
}

#[cfg(not(test))]
#[tokio::main]
/// Program entrypoint.
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Chat);
    let is_tui = command == Commands::Chat;

    // Console output is suppressed in TUI mode so it cannot corrupt the display.
    // --debug writes debug-level logs to ~/.gamechat/logs/debug.log.YYYY-MM-DD.
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // WorkerGuard must outlive main() so buffered file writes are flushed on exit.
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>;

    let debug_writer = if cli.debug {
        let log_dir = log_dir();
        std::fs::create_dir_all(&log_dir).ok();
        let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        _file_guard = Some(guard);
        Some(writer)
    } else {
        _file_guard = None;
        None
    };

    match (is_tui, debug_writer) {
        (true, Some(writer)) => {
            let console = fmt::layer()
                .with_writer(std::io::sink)
                .with_target(false)
                .with_filter(console_filter);
            let file = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
            tracing_subscriber::registry()
                .with(console)
                .with(file)
                .init();
        }
        (true, None) => {
            fmt()
                .with_env_filter(console_filter)
                .with_writer(std::io::sink)
                .with_target(false)
                .init();
        }
        (false, Some(writer)) => {
            let console = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter);
            let file = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
            tracing_subscriber::registry()
                .with(console)
                .with(file)
                .init();
        }
        (false, None) => {
            fmt()
                .with_env_filter(console_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }

    if cli.debug {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            command = command.label(),
            log_level = %cli.log_level,
            "========== gamechat session start =========="
        );
    }

    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Failed to load config ({e}), using defaults");
        Config::default()
    });

    match command {
        Commands::Chat => tui::run_tui(config).await,
        Commands::Serve { port } => cmd_serve(config, port).await,
        Commands::Ask { game, message } => cmd_ask(config, game, message.join(" ")).await,
    }
}

#[cfg(not(test))]
/// Runs the relay until Ctrl-C.
async fn cmd_serve(config: Config, port: Option<u16>) -> anyhow::Result<()> {
    let api_key = config.gemini.require_api_key()?;
    let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::with_base_url(
        api_key,
        &config.gemini.model,
        &config.gemini.base_url,
    ));
    let port = port.unwrap_or(config.server.port);
    info!(port, model = %provider.model(), "Starting relay");

    RelayServer::new(port, provider)
        .with_cors_origins(&config.server.cors_origins)
        .with_static_dir(&config.server.static_dir)
        .run()
        .await?;
    Ok(())
}

#[cfg(not(test))]
/// Sends one question through the relay and prints the reply.
async fn cmd_ask(config: Config, game: Option<String>, message: String) -> anyhow::Result<()> {
    let client = HttpRelayClient::new(config.relay.url.clone(), config.relay.timeout())?;
    let mut controller = ChatController::new(
        ChatRegistry::load(MemoryStore::new()),
        ask_carousel(game.as_deref()),
        TranscriptView::new(),
    );

    if !controller.submit(&message, &client).await {
        anyhow::bail!("Nothing to send: the message is empty");
    }
    let reply = controller
        .view()
        .last_bot_text()
        .unwrap_or(FALLBACK_REPLY);
    println!("{reply}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::GENERAL_GAME_CONTEXT;

    #[test]
    fn no_subcommand_defaults_to_chat() {
        let cli = Cli::try_parse_from(["gamechat"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
        assert!(!cli.debug);
    }

    #[test]
    fn ask_joins_message_words() {
        let cli =
            Cli::try_parse_from(["gamechat", "ask", "--game", "Elden Ring", "where", "is", "Ranni"])
                .unwrap();
        match cli.command {
            Some(Commands::Ask { game, message }) => {
                assert_eq!(game.as_deref(), Some("Elden Ring"));
                assert_eq!(message.join(" "), "where is Ranni");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn ask_requires_a_message() {
        assert!(Cli::try_parse_from(["gamechat", "ask", "--game", "Hades"]).is_err());
    }

    #[test]
    fn serve_accepts_port_override() {
        let cli = Cli::try_parse_from(["gamechat", "--debug", "serve", "-p", "9000"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.command, Some(Commands::Serve { port: Some(9000) }));
        assert_eq!(cli.command.unwrap().label(), "serve");
    }

    #[test]
    fn ask_carousel_uses_game_or_sentinel() {
        assert_eq!(ask_carousel(Some("Hades")).context().as_str(), "Hades");
        assert_eq!(ask_carousel(Some("  ")).context().as_str(), GENERAL_GAME_CONTEXT);
        assert_eq!(ask_carousel(None).context().as_str(), GENERAL_GAME_CONTEXT);
    }

    #[test]
    fn log_dir_lives_under_home() {
        let dir = log_dir();
        assert!(dir.ends_with(".gamechat/logs"));
    }
}
