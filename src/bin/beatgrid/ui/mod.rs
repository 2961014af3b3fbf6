//! TUI module for beatgrid
//!
//! Draws the latest snapshot and turns key presses into intents.

mod grid;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use beatgrid::runtime::{Intent, Snapshot};
use beatgrid::sequencing::instrument::DRUM_KIT;
use beatgrid::sequencing::{CycleConfig, InstrumentId};

use super::app::Notice;
use grid::render_grid;
use transport::render_transport;

/// Tempo change per key press
const TEMPO_STEP: f64 = 5.0;

/// Slowest tempo reachable from the keyboard
const MIN_KEYBOARD_BPM: f64 = 20.0;

/// Grid cursor position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub step: usize,
}

/// UI application state
pub struct UiApp {
    /// Ring buffer sender for user intents
    intent_tx: Producer<Intent>,
    /// Ring buffer receiver for controller snapshots
    state_rx: Consumer<Snapshot>,
    /// Ring buffer receiver for engine output and errors
    notice_rx: Consumer<Notice>,
    /// Latest snapshot (None until the sequencer publishes)
    current_state: Option<Snapshot>,
    /// Last pattern code sent to the engine
    code: String,
    /// Last error, cleared by the next successful key press
    status: Option<String>,
    cursor: Cursor,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        intent_tx: Producer<Intent>,
        state_rx: Consumer<Snapshot>,
        notice_rx: Consumer<Notice>,
    ) -> Self {
        Self {
            intent_tx,
            state_rx,
            notice_rx,
            current_state: None,
            code: "silence".to_string(),
            status: None,
            cursor: Cursor::default(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_state();
            self.poll_notices();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking input, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep only the latest snapshot
    fn poll_state(&mut self) {
        while let Ok(state) = self.state_rx.pop() {
            self.current_state = Some(state);
        }
        self.clamp_cursor();
    }

    fn poll_notices(&mut self) {
        while let Ok(notice) = self.notice_rx.pop() {
            match notice {
                Notice::Code(code) => self.code = code,
                Notice::Error(message) => self.status = Some(message),
            }
        }
    }

    fn clamp_cursor(&mut self) {
        let Some(state) = &self.current_state else {
            return;
        };
        self.cursor.row = self.cursor.row.min(state.rows.len().saturating_sub(1));
        self.cursor.step = self.cursor.step.min(state.steps_per_cycle.saturating_sub(1));
    }

    /// Instrument under the cursor
    fn selected(&self) -> Option<InstrumentId> {
        let state = self.current_state.as_ref()?;
        state.rows.get(self.cursor.row).map(|row| row.id().clone())
    }

    fn send(&mut self, intent: Intent) {
        if self.intent_tx.push(intent).is_err() {
            self.status = Some("sequencer is busy, try again".to_string());
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
            self.should_quit = true;
            return;
        }
        let Some(state) = self.current_state.clone() else {
            return;
        };
        self.status = None;

        match key {
            KeyCode::Up => self.cursor.row = self.cursor.row.saturating_sub(1),
            KeyCode::Down => self.cursor.row += 1,
            KeyCode::Left => self.cursor.step = self.cursor.step.saturating_sub(1),
            KeyCode::Right => self.cursor.step += 1,
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(instrument) = self.selected() {
                    self.send(Intent::ToggleStep {
                        instrument,
                        index: self.cursor.step,
                    });
                }
            }
            KeyCode::Char(digit @ '1'..='4') => {
                if let (Some(instrument), Some(subdivision)) = (self.selected(), digit.to_digit(10))
                {
                    self.send(Intent::SetSubdivision {
                        instrument,
                        index: self.cursor.step,
                        subdivision: subdivision as u8,
                    });
                }
            }
            KeyCode::Char('p') => {
                let intent = if state.is_playing {
                    Intent::Stop
                } else {
                    Intent::Play
                };
                self.send(intent);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.send(Intent::UpdateTempo(state.bpm + TEMPO_STEP));
            }
            KeyCode::Char('-') => {
                let bpm = (state.bpm - TEMPO_STEP).max(MIN_KEYBOARD_BPM);
                self.send(Intent::UpdateTempo(bpm));
            }
            KeyCode::Char('m') => {
                if let Ok(cycle) = CycleConfig::new(state.measure) {
                    self.send(Intent::UpdateMeasure(cycle.next().measure()));
                }
            }
            KeyCode::Char('b') => {
                if let Some(bank) = next_bank(&state) {
                    self.send(Intent::UpdateBank(bank));
                }
            }
            KeyCode::Char('a') => {
                if let Some(instrument) = next_instrument(&state) {
                    self.send(Intent::AddInstrument(instrument));
                }
            }
            KeyCode::Char('x') => {
                if let Some(instrument) = self.selected() {
                    self.send(Intent::RemoveInstrument(instrument));
                }
            }
            KeyCode::Char('c') => self.send(Intent::Clear),
            _ => {}
        }

        self.clamp_cursor();
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(6),    // Grid
                Constraint::Length(8), // Engine output
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let Some(state) = &self.current_state else {
            let waiting = Paragraph::new(" waiting for sequencer...")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(waiting, chunks[1]);
            return;
        };

        render_transport(frame, chunks[0], state, self.status.as_deref());

        let grid_block = Block::default().title(" Grid ").borders(Borders::ALL);
        let grid_inner = grid_block.inner(chunks[1]);
        frame.render_widget(grid_block, chunks[1]);
        render_grid(frame, grid_inner, state, self.cursor);

        let code = Paragraph::new(self.code.as_str())
            .block(Block::default().title(" Engine ").borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: false });
        frame.render_widget(code, chunks[2]);

        let help = Paragraph::new(
            " [←↑↓→] Move  [Space] Toggle  [1-4] Subdivide  [P] Play/Stop  [+/-] Tempo  \
             [M] Measure  [B] Bank  [A/X] Add/Remove  [C] Clear  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

/// Bank after the current one, wrapping around
fn next_bank(state: &Snapshot) -> Option<String> {
    let position = state.banks.iter().position(|bank| *bank == state.bank)?;
    state.banks.get((position + 1) % state.banks.len()).cloned()
}

/// First kit instrument not already on the grid
fn next_instrument(state: &Snapshot) -> Option<InstrumentId> {
    DRUM_KIT
        .iter()
        .filter_map(|(code, _)| InstrumentId::new(*code).ok())
        .find(|id| state.instruments().all(|existing| existing != id))
}
