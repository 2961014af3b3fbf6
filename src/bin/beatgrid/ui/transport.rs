//! Transport bar widget - shows BPM, measure, bank and play state

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use beatgrid::runtime::Snapshot;

/// Render the transport bar, with the last error on the right
pub fn render_transport(frame: &mut Frame, area: Rect, state: &Snapshot, status: Option<&str>) {
    let block = Block::default().title(" beatgrid ").borders(Borders::ALL);

    let play_symbol = if state.is_playing { "▶" } else { "■" };
    let play_state_str = if state.is_playing { "Playing" } else { "Stopped" };

    let position = match state.current_step {
        Some(step) => format!("Beat {} | Step {:>2}/{}  ", step / 4 + 1, step + 1, state.steps_per_cycle),
        None => format!("Step --/{}  ", state.steps_per_cycle),
    };

    let mut spans = vec![
        Span::styled(
            format!(" BPM: {:.0}  ", state.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if state.is_playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("{}/4  ", state.measure),
            Style::default().fg(Color::White),
        ),
        Span::styled(position, Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Bank: {}  ", state.bank),
            Style::default().fg(Color::Magenta),
        ),
    ];

    if let Some(message) = status {
        spans.push(Span::styled(message.to_string(), Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
