//! Grid widget - one row per instrument, playhead column highlighted

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use beatgrid::runtime::Snapshot;
use beatgrid::sequencing::Step;

use super::Cursor;

const LABEL_WIDTH: usize = 12;

/// Render the step grid with the current step and cursor
pub fn render_grid(frame: &mut Frame, area: Rect, state: &Snapshot, cursor: Cursor) {
    if area.height < 2 || area.width < 20 {
        return;
    }

    let mut lines = Vec::with_capacity(state.rows.len() + 1);

    // Beat numbers above each beat's first step
    let mut header = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
    for index in 0..state.steps_per_cycle {
        if state.is_beat_marker(index) {
            header.push(Span::raw(" "));
            header.push(Span::raw(format!("{:<2}", index / 4 + 1)));
        } else {
            header.push(Span::raw("  "));
        }
    }
    lines.push(Line::from(header).style(Style::default().fg(Color::DarkGray)));

    for (row_index, row) in state.rows.iter().enumerate() {
        let selected_row = row_index == cursor.row;
        let mut spans = Vec::with_capacity(state.steps_per_cycle * 2 + 1);

        let name: String = row.instrument.name.chars().take(LABEL_WIDTH - 2).collect();
        spans.push(Span::styled(
            format!("{name:<width$}", width = LABEL_WIDTH),
            Style::default().fg(if selected_row {
                Color::White
            } else {
                Color::Gray
            }),
        ));

        for (index, step) in row.steps.iter().enumerate() {
            if state.is_beat_marker(index) {
                spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
            } else {
                spans.push(Span::raw(" "));
            }

            let mut style = step_style(step);
            if state.is_current(index) {
                style = style.bg(Color::Yellow);
            }
            if selected_row && index == cursor.step {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(step_glyph(step), style));
        }

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

/// Filled for active steps; subdivided steps show their hit count
fn step_glyph(step: &Step) -> String {
    let hits = step.subdivision.get();
    match (step.active, hits) {
        (true, 1) => "■".to_string(),
        (false, 1) => "·".to_string(),
        (_, hits) => hits.to_string(),
    }
}

fn step_style(step: &Step) -> Style {
    if step.active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
