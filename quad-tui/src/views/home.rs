//! Home and profile screens.

use crate::nav::AuthState;
use crate::state::App;
use quad_core::Role;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_home(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "QUAD Admin Console",
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
    ];
    match app.auth {
        AuthState::Unauthenticated => {
            lines.push(Line::from(
                "Not signed in. Configure an auth token to access resources.",
            ));
        }
        _ => {
            lines.push(Line::from("Screens:"));
            for (index, route) in app.routes.navigable(app.identity.as_ref()).iter().enumerate() {
                lines.push(Line::from(format!("  {index}  {}", route.path)));
            }
        }
    }
    let body = Paragraph::new(lines).block(Block::default().title("Home").borders(Borders::ALL));
    f.render_widget(body, area);
}

pub fn render_profile(f: &mut Frame<'_>, app: &App, area: Rect) {
    let lines = match &app.identity {
        None => vec![Line::from("Not signed in.")],
        Some(identity) => {
            let email = identity.email.as_deref().unwrap_or("(no email)");
            let roles: Vec<&str> = identity
                .roles
                .iter()
                .map(|role| match role {
                    Role::User => "user",
                    Role::Admin => "admin",
                })
                .collect();
            vec![
                Line::from(format!("Email: {email}")),
                Line::from(format!("Roles: {}", roles.join(", "))),
            ]
        }
    };
    let body =
        Paragraph::new(lines).block(Block::default().title("Profile").borders(Borders::ALL));
    f.render_widget(body, area);
}
