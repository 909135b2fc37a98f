//! Generic resource table.

use crate::screen::ResourceScreen;
use quad_client::QueryStatus;
use quad_core::schema::FieldKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use serde_json::Value;

pub fn render(f: &mut Frame<'_>, screen: &ResourceScreen, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let spec = screen.spec;
    let rows = screen.rows();

    let mut header_cells = vec![Cell::from(spec.id_field)];
    header_cells.extend(spec.fields.iter().map(|field| Cell::from(field.label)));
    let header = Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD));

    let body: Vec<Row> = rows
        .iter()
        .map(|record| {
            let mut cells = vec![Cell::from(cell_text(record.get(spec.id_field)))];
            cells.extend(
                spec.fields
                    .iter()
                    .map(|field| Cell::from(field_text(record, field.name, field.kind))),
            );
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(8)];
    widths.extend(spec.fields.iter().map(|field| match field.kind {
        FieldKind::LongText => Constraint::Min(24),
        FieldKind::Bool => Constraint::Length(6),
        _ => Constraint::Min(12),
    }));

    let title = format!("{} ({})", spec.title, rows.len());
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    if !rows.is_empty() {
        state.select(Some(screen.selected.min(rows.len() - 1)));
    }
    f.render_stateful_widget(table, chunks[0], &mut state);

    render_status_line(f, screen, chunks[1]);
}

/// One line below the table: fetch failures (with prior data still shown
/// above), mutation failures, or a loading marker.
fn render_status_line(f: &mut Frame<'_>, screen: &ResourceScreen, area: Rect) {
    let (text, color) = if let Some(error) = &screen.error {
        (error.clone(), Color::Red)
    } else if let Some(error) = screen.query_error() {
        (format!("Fetch failed: {error}"), Color::Red)
    } else if screen.status() == QueryStatus::Loading {
        ("Loading...".to_string(), Color::DarkGray)
    } else {
        (String::new(), Color::Reset)
    };
    let line = Paragraph::new(text).style(Style::default().fg(color));
    f.render_widget(line, area);
}

fn field_text(record: &Value, name: &str, kind: FieldKind) -> String {
    match kind {
        FieldKind::Bool => match record.get(name).and_then(Value::as_bool) {
            Some(true) => "yes".to_string(),
            _ => "no".to_string(),
        },
        _ => cell_text(record.get(name)),
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cell_text_renders_scalars_without_quotes() {
        let record = json!({"id": 7, "name": "Ortega", "open": true});
        assert_eq!(cell_text(record.get("id")), "7");
        assert_eq!(cell_text(record.get("name")), "Ortega");
        assert_eq!(cell_text(record.get("missing")), "");
    }

    #[test]
    fn bool_fields_render_yes_no() {
        let record = json!({"solved": true});
        assert_eq!(field_text(&record, "solved", FieldKind::Bool), "yes");
        assert_eq!(field_text(&record, "absent", FieldKind::Bool), "no");
    }
}
