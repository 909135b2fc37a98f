//! Create/edit form rendering.

use crate::screen::{FieldEditor, FormMode, ResourceScreen};
use quad_core::schema::FieldKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, screen: &ResourceScreen, area: Rect) {
    let Some(form) = &screen.form else {
        return;
    };

    let title = match &form.mode {
        FormMode::Create => format!("New {}", screen.spec.title),
        FormMode::Edit { id } => format!("Edit {} {id}", screen.spec.title),
    };
    let outer = Block::default().title(title).borders(Borders::ALL);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let mut constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|field| match field.spec.kind {
            FieldKind::LongText => Constraint::Length(5),
            _ => Constraint::Length(3),
        })
        .collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (index, field) in form.fields.iter().enumerate() {
        let focused = index == form.focus;
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let label = match &field.error {
            Some(error) => format!("{}: {error}", field.spec.label),
            None => field.spec.label.to_string(),
        };
        let label_style = if field.error.is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(ratatui::text::Span::styled(label, label_style))
            .borders(Borders::ALL)
            .border_style(border_style);
        let field_inner = block.inner(rows[index]);
        f.render_widget(block, rows[index]);

        match &field.editor {
            FieldEditor::Text(textarea) => {
                f.render_widget(textarea, field_inner);
            }
            FieldEditor::Bool(value) => {
                let text = if *value { "[x]" } else { "[ ]" };
                f.render_widget(Paragraph::new(text), field_inner);
            }
        }
    }
}
