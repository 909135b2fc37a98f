//! QUAD TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use quad_client::{current_identity, HttpTransport, QueryCache};
use quad_tui::config::TuiConfig;
use quad_tui::events::TuiEvent;
use quad_tui::keys::{map_form_key, map_key, Action};
use quad_tui::notifications::NotificationLevel;
use quad_tui::persistence::{self, PersistedState};
use quad_tui::screen::SubmitOutcome;
use quad_tui::state::{ActiveScreen, App};
use quad_tui::views::render_view;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = TuiConfig::load()?;
    quad_tui::logging::init(&config.error_log_path)?;

    let transport = HttpTransport::new(
        &config.api_base_url,
        config.auth.token.clone(),
        config.auth.refresh_token.clone(),
        Duration::from_millis(config.request_timeout_ms),
    )?;
    let cache = QueryCache::new(Arc::new(transport));

    let mut app = App::new(config, cache.clone());
    app.set_identity(current_identity(&cache).await);

    if let Ok(Some(state)) = persistence::load(&app.config.persistence_path) {
        // A path the identity can no longer reach silently stays on Home.
        app.navigate(&state.last_path);
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard {};

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());

    let tick_rate = Duration::from_millis(app.config.refresh_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {}
            _ = app.screen_changed() => {}
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event).await {
                    break;
                }
            }
        }
    }

    let persisted = PersistedState {
        last_path: app.path.clone(),
    };
    let _ = persistence::save(&app.config.persistence_path, &persisted);

    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                match evt {
                    CrosstermEvent::Key(key) => {
                        let _ = sender.blocking_send(TuiEvent::Input(key));
                    }
                    CrosstermEvent::Resize(width, height) => {
                        let _ = sender.blocking_send(TuiEvent::Resize { width, height });
                    }
                    _ => {}
                }
            }
        }
    });
}

/// Returns true when the application should exit.
async fn handle_event(app: &mut App, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Input(key) => {
            let form_open = matches!(&app.screen, ActiveScreen::Resource(s) if s.form.is_some());
            if form_open {
                match map_form_key(key) {
                    Some(action) => return handle_form_action(app, action).await,
                    None => {
                        if let ActiveScreen::Resource(screen) = &mut app.screen {
                            if let Some(form) = &mut screen.form {
                                form.input(key);
                            }
                        }
                    }
                }
            } else if let Some(action) = map_key(key) {
                return handle_action(app, action).await;
            }
        }
        TuiEvent::Resize { .. } | TuiEvent::Tick => {}
    }
    false
}

async fn handle_action(app: &mut App, action: Action) -> bool {
    match action {
        Action::Quit => return true,
        Action::NextScreen => app.next_screen(),
        Action::PrevScreen => app.prev_screen(),
        Action::SwitchScreen(index) => app.switch_screen(index),
        Action::Refresh => {
            let mut refresh_error = None;
            match &mut app.screen {
                ActiveScreen::Users(query) => {
                    if let Err(err) = query.refresh().await {
                        refresh_error = Some(err);
                    }
                }
                ActiveScreen::Resource(screen) => screen.refresh().await,
                _ => {}
            }
            if let Some(err) = refresh_error {
                app.notify(NotificationLevel::Error, format!("Refresh failed: {err}"));
            }
        }
        other => {
            let message = match &mut app.screen {
                ActiveScreen::Resource(screen) => screen.handle_action(other).await,
                _ => None,
            };
            if let Some(message) = message {
                app.notify(NotificationLevel::Info, message);
            }
        }
    }
    false
}

async fn handle_form_action(app: &mut App, action: Action) -> bool {
    match action {
        Action::Quit => return true,
        Action::Cancel => {
            if let ActiveScreen::Resource(screen) = &mut app.screen {
                screen.close_form().await;
            }
        }
        Action::NextField => {
            if let ActiveScreen::Resource(screen) = &mut app.screen {
                if let Some(form) = &mut screen.form {
                    form.focus_next();
                }
            }
        }
        Action::PrevField => {
            if let ActiveScreen::Resource(screen) = &mut app.screen {
                if let Some(form) = &mut screen.form {
                    form.focus_prev();
                }
            }
        }
        Action::Confirm => {
            let result = match &mut app.screen {
                ActiveScreen::Resource(screen) => Some(screen.submit_form().await),
                _ => None,
            };
            match result {
                Some(Ok(SubmitOutcome::Created)) => {
                    app.notify(NotificationLevel::Success, "Created.");
                }
                Some(Ok(SubmitOutcome::Updated)) => {
                    app.notify(NotificationLevel::Success, "Updated.");
                }
                Some(Ok(SubmitOutcome::Invalid)) => {
                    app.notify(NotificationLevel::Error, "Fix the highlighted fields.");
                }
                Some(Err(err)) => {
                    app.notify(NotificationLevel::Error, format!("Save failed: {err}"));
                }
                None => {}
            }
        }
        _ => {}
    }
    false
}
