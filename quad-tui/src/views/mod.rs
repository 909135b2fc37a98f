//! View rendering dispatch.

pub mod form;
pub mod home;
pub mod table;
pub mod users;

use crate::nav::AuthState;
use crate::notifications::NotificationLevel;
use crate::state::{ActiveScreen, App};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match &app.screen {
        ActiveScreen::Home => home::render_home(f, app, layout[1]),
        ActiveScreen::Profile => home::render_profile(f, app, layout[1]),
        ActiveScreen::Users(query) => users::render(f, query, layout[1]),
        ActiveScreen::Resource(screen) => {
            if screen.form.is_some() {
                form::render(f, screen, layout[1]);
            } else {
                table::render(f, screen, layout[1]);
            }
        }
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let who = app
        .identity
        .as_ref()
        .and_then(|i| i.email.clone())
        .unwrap_or_else(|| "anonymous".to_string());
    let auth = match app.auth {
        AuthState::Unauthenticated => "not signed in",
        AuthState::AuthenticatedUser => "user",
        AuthState::AuthenticatedAdmin => "admin",
    };
    let title = format!("QUAD Admin | {who} ({auth}) | {}", app.path);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(Color::Cyan)));
    f.render_widget(block, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let form_open = matches!(&app.screen, ActiveScreen::Resource(s) if s.form.is_some());
    let help = if form_open {
        "Tab next field • Ctrl-S save • Esc cancel"
    } else {
        "j/k move • Tab switch screen • n new • e edit • d delete • r refresh • q quit"
    };
    let (text, style) = if let Some(note) = app.latest_notification() {
        let (label, color) = match note.level {
            NotificationLevel::Info => ("INFO", Color::Cyan),
            NotificationLevel::Success => ("OK", Color::Green),
            NotificationLevel::Error => ("ERROR", Color::Red),
        };
        (
            format!("{label}: {}", note.message),
            Style::default().fg(color),
        )
    } else {
        (help.to_string(), Style::default().fg(Color::DarkGray))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}
