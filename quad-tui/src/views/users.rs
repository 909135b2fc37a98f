//! Admin user list.

use quad_client::{BoundQuery, QueryStatus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use serde_json::Value;

pub fn render(f: &mut Frame<'_>, query: &BoundQuery, area: Rect) {
    if let Some(error) = query.error() {
        let body = Paragraph::new(format!("Failed to load users: {error}"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Users").borders(Borders::ALL));
        f.render_widget(body, area);
        return;
    }

    let users = match query.data() {
        Value::Array(users) => users,
        _ => Vec::new(),
    };
    let items: Vec<ListItem> = users.iter().map(|user| ListItem::new(user_line(user))).collect();

    let title = if query.status() == QueryStatus::Loading {
        "Users (loading...)".to_string()
    } else {
        format!("Users ({})", users.len())
    };
    let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(list, area);
}

fn user_line(user: &Value) -> String {
    let email = user
        .get("email")
        .or_else(|| user.pointer("/user/email"))
        .and_then(Value::as_str)
        .unwrap_or("(unknown)");
    let admin = user.get("admin").and_then(Value::as_bool).unwrap_or(false);
    if admin {
        format!("{email} [admin]")
    } else {
        email.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_line_reads_nested_and_flat_emails() {
        assert_eq!(
            user_line(&json!({"email": "a@ucsb.edu", "admin": true})),
            "a@ucsb.edu [admin]"
        );
        assert_eq!(
            user_line(&json!({"user": {"email": "b@ucsb.edu"}})),
            "b@ucsb.edu"
        );
        assert_eq!(user_line(&json!({})), "(unknown)");
    }
}
