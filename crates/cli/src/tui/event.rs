//! Async event loop for the TUI: interleaves crossterm, relay replies, and the spinner timer.

use std::sync::Arc;

use chat::{Carousel, ChatController, ChatRegistry, Command, FileStore, HttpRelayClient, TranscriptView};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use proto::{RelayError, RelayRequest};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::action::Action;
use super::app::TuiApp;
use crate::config::Config;

type RelayTask = JoinHandle<Result<String, RelayError>>;

/// RAII guard that restores the terminal on drop (even on panic).
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

/// Spawns the relay round trip for `request`.
fn spawn_relay(client: &Arc<HttpRelayClient>, request: RelayRequest) -> RelayTask {
    let client = Arc::clone(client);
    tokio::spawn(async move { client.post(&request).await })
}

/// Flattens a finished relay task into the reply result.
fn join_result(result: Result<Result<String, RelayError>, tokio::task::JoinError>) -> Result<String, RelayError> {
    match result {
        Ok(reply) => reply,
        Err(join_err) => {
            warn!(error = %join_err, "Relay task failed");
            Err(RelayError::Transport(join_err.to_string()))
        }
    }
}

/// Run the full-screen TUI until the user quits.
pub async fn run_tui(config: Config) -> anyhow::Result<()> {
    let store_path = config.storage.resolved_path();
    let registry = ChatRegistry::load(FileStore::open(&store_path));
    let carousel = Carousel::new(config.games.clone());
    let client = Arc::new(HttpRelayClient::new(
        config.relay.url.clone(),
        config.relay.timeout(),
    )?);

    debug!(
        relay = %client.url(),
        store = %store_path.display(),
        sessions = registry.len(),
        games = carousel.cards().len(),
        "TUI started"
    );

    let controller = ChatController::new(registry, carousel, TranscriptView::new());
    let mut app = TuiApp::new(controller, config.render.markup, client.url());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard; // Drop restores terminal

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut crossterm_stream = EventStream::new();
    let mut relay_task: Option<RelayTask> = None;

    // Spinner tick interval (100ms)
    let mut spinner_interval = tokio::time::interval(std::time::Duration::from_millis(100));
    spinner_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            maybe_event = crossterm_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Command::SendToRelay(request) = app.handle_key(key) {
                            debug!(context = %request.context, "Spawning relay request");
                            relay_task = Some(spawn_relay(&client, request));
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Terminal event error");
                    }
                    None => break,
                }
            }

            result = async {
                match relay_task.as_mut() {
                    Some(handle) => handle.await,
                    None => std::future::pending().await,
                }
            } => {
                relay_task = None;
                app.update(Action::RelayCompleted(join_result(result)));
            }

            _ = spinner_interval.tick(), if app.is_pending() => {
                app.update(Action::Tick);
            }
        }

        if app.should_quit {
            break;
        }
    }

    if let Some(handle) = relay_task.take() {
        handle.abort();
    }
    // TerminalGuard::drop handles cleanup
    Ok(())
}
