//! Beatgrid - application builder and runner
//!
//! The controller lives on its own thread. The UI talks to it only through
//! ring buffers:
//!
//! ```text
//!   UI thread ── Intent ──▶ sequencer thread
//!   UI thread ◀── Snapshot ─┤
//!   UI thread ◀── Notice ───┘  (pattern code, errors)
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::{Consumer, Producer, RingBuffer};

use beatgrid::io::{
    AudioEngine, BankCatalog, CatalogError, EngineError, JsonBankCatalog, StaticCatalog,
    StrudelEngine, TrackPattern,
};
use beatgrid::runtime::{Intent, SequencerConfig, SequencerController, Snapshot, SnapshotProducer};

use super::ui::UiApp;

/// Sleep between controller polls while stopped, in milliseconds
const IDLE_POLL_MS: f64 = 16.0;

const INTENT_CAPACITY: usize = 64;
const SNAPSHOT_CAPACITY: usize = 16;
const NOTICE_CAPACITY: usize = 16;

/// Messages from the sequencer thread that are not part of a snapshot
#[derive(Debug, Clone)]
pub enum Notice {
    /// Pattern code sent to the engine ("silence" once stopped)
    Code(String),
    /// A rejected intent
    Error(String),
}

/// Where the bank list comes from
enum Banks {
    SampleMap(JsonBankCatalog),
    Builtin(StaticCatalog),
}

impl BankCatalog for Banks {
    fn load(&mut self) -> Result<Vec<String>, CatalogError> {
        match self {
            Banks::SampleMap(catalog) => catalog.load(),
            Banks::Builtin(catalog) => catalog.load(),
        }
    }
}

/// Renders every play request as pattern code and forwards it to the UI
struct ReplEngine {
    inner: StrudelEngine,
    notices: Producer<Notice>,
}

impl ReplEngine {
    fn report(&mut self, notice: Notice) {
        if self.notices.push(notice).is_err() {
            log::warn!(target: "beatgrid::app", "notice buffer full");
        }
    }
}

impl AudioEngine for ReplEngine {
    fn play(&mut self, tracks: &[TrackPattern]) -> Result<(), EngineError> {
        self.inner.play(tracks)?;
        let code = self.inner.code().unwrap_or_default().to_string();
        self.report(Notice::Code(code));
        Ok(())
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.report(Notice::Code("silence".to_string()));
    }
}

/// Main application builder
pub struct Beatgrid {
    config: SequencerConfig,
    sample_map: Option<PathBuf>,
}

impl Beatgrid {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            sample_map: None,
        }
    }

    /// Derive the bank list from a sample-map JSON file
    pub fn sample_map(mut self, path: PathBuf) -> Self {
        self.sample_map = Some(path);
        self
    }

    /// Run the application (takes over the terminal until quit)
    pub fn run(self) -> EyreResult<()> {
        let (intent_tx, intent_rx) = RingBuffer::<Intent>::new(INTENT_CAPACITY);
        let (snapshot_tx, snapshot_rx) = RingBuffer::<Snapshot>::new(SNAPSHOT_CAPACITY);
        let (notice_tx, notice_rx) = RingBuffer::<Notice>::new(NOTICE_CAPACITY);

        let catalog = match self.sample_map {
            Some(path) => Banks::SampleMap(JsonBankCatalog::from_path(path)),
            None => Banks::Builtin(StaticCatalog::builtin()),
        };

        // Validate up front so a bad config fails before the terminal is taken
        self.config.validate().wrap_err("invalid configuration")?;
        let config = self.config;

        let worker = thread::Builder::new()
            .name("sequencer".to_string())
            .spawn(move || run_sequencer(config, catalog, intent_rx, snapshot_tx, notice_tx))
            .wrap_err("failed to start sequencer thread")?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(intent_tx, snapshot_rx, notice_rx).run(&mut terminal);
        ratatui::restore();

        // Dropping the UI's intent producer tells the worker to finish
        let worker_result = worker
            .join()
            .map_err(|_| eyre!("sequencer thread panicked"))?;
        result.and(worker_result)
    }
}

/// Sequencer thread: apply intents, poll the highlight, publish snapshots
fn run_sequencer(
    config: SequencerConfig,
    catalog: Banks,
    mut intents: Consumer<Intent>,
    snapshots: Producer<Snapshot>,
    notices: Producer<Notice>,
) -> EyreResult<()> {
    let engine = ReplEngine {
        inner: StrudelEngine::new(),
        notices,
    };
    let mut controller = SequencerController::with_defaults(config, engine, catalog)
        .wrap_err("failed to create sequencer")?
        .with_sink(SnapshotProducer::new(snapshots));
    controller.init();

    while !intents.is_abandoned() {
        while let Ok(intent) = intents.pop() {
            log::debug!(target: "beatgrid::app", "{intent:?}");
            if let Err(err) = controller.dispatch(intent) {
                log::warn!(target: "beatgrid::app", "{err}");
                controller.engine_mut().report(Notice::Error(err.to_string()));
            }
        }

        controller.poll();

        let wait_ms = controller.poll_interval().unwrap_or(IDLE_POLL_MS);
        thread::sleep(Duration::from_secs_f64(wait_ms / 1000.0));
    }

    controller.stop();
    Ok(())
}
