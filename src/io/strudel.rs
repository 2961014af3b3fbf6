//! Render compiled tracks as Strudel pattern code.
//!
//! Each track becomes one `s(..).beat(..)` expression and the full request is
//! wrapped in `stack(..)`, which is exactly what a Strudel REPL needs to play
//! the grid:
//!
//! ```text
//! stack(
//!   s("hh").beat("0,2,4,6", 16).bank("RolandTR909").cpm(60),
//!   s("bd").beat("-", 16).bank("RolandTR909").cpm(60)
//! )
//! ```

use super::engine::{AudioEngine, EngineError, TrackPattern};

/// Code for one track
pub fn render_track(track: &TrackPattern) -> String {
    format!(
        "s({}).beat({}, {}).bank({}).cpm({})",
        quote(track.instrument.as_str()),
        quote(&track.pattern.to_string()),
        track.steps_per_cycle,
        quote(&track.bank),
        track.bpm
    )
}

/// Code for a full stacked play request
pub fn render_stack(tracks: &[TrackPattern]) -> String {
    if tracks.is_empty() {
        return "silence".to_string();
    }
    let body: Vec<String> = tracks
        .iter()
        .map(|track| format!("  {}", render_track(track)))
        .collect();
    format!("stack(\n{}\n)", body.join(",\n"))
}

/// Quote a string as a JavaScript string literal
fn quote(text: &str) -> String {
    // JSON string syntax is valid JavaScript
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

/// Engine that renders each play request as Strudel code instead of sound.
///
/// Keeps the most recent code so a front end can display or copy it.
#[derive(Debug, Default, Clone)]
pub struct StrudelEngine {
    code: Option<String>,
    plays: usize,
}

impl StrudelEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Code for the current play request (None while stopped)
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Number of play requests received
    pub fn plays(&self) -> usize {
        self.plays
    }
}

impl AudioEngine for StrudelEngine {
    fn play(&mut self, tracks: &[TrackPattern]) -> Result<(), EngineError> {
        let code = render_stack(tracks);
        log::debug!(target: "beatgrid::strudel", "{}", code);
        self.code = Some(code);
        self.plays += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.code = None;
    }
}
