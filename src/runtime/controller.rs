/*
Sequencer Controller
====================

Owns the grid and drives the two clocks that have to agree: the external audio
engine, which plays the compiled patterns, and the transport scheduler, which
moves the step highlight.

The engine offers no partial update, so any change made while playing replays
everything:

    mutate grid -> engine.stop() -> compile all rows -> engine.play(tracks)
                -> scheduler.start() (new generation, step 0)

If that replay fails the mutation is rolled back, the controller is left
stopped, and the engine error is returned. A failed call never leaves a
half-applied change behind.

The host drives highlighting by calling `poll()` every `poll_interval()`:

    loop {
        controller.poll();
        sleep(controller.poll_interval().unwrap_or(idle));
    }
*/

use crate::error::{Result, SequencerError};
use crate::io::{AudioEngine, BankCatalog, TrackPattern};
use crate::sequencing::instrument::DRUM_KIT;
use crate::sequencing::{BeatPattern, CycleConfig, Grid, InstrumentId, Subdivision};
use crate::transport::{
    step_duration_ms, validate_bpm, Clock, Highlight, MonotonicClock, PollToken, Tick,
    TransportScheduler,
};

use super::config::{ConfigError, SequencerConfig};
use super::state::{Intent, Snapshot, SnapshotSink};

/// State restored when a replay after a mutation fails
struct Checkpoint {
    grid: Grid,
    bpm: f64,
    bank: String,
    preferred_bank: String,
}

pub struct SequencerController<E: AudioEngine, C: Clock = MonotonicClock> {
    grid: Grid,
    engine: E,
    catalog: Box<dyn BankCatalog>,
    scheduler: TransportScheduler<C>,
    sink: Option<Box<dyn SnapshotSink>>,
    bpm: f64,
    bank: String,
    /// Bank to select whenever the active list contains it
    preferred_bank: String,
    banks: Vec<String>,
    fallback_banks: Vec<String>,
    is_playing: bool,
    highlight: Highlight,
    token: Option<PollToken>,
}

impl<E: AudioEngine> SequencerController<E, MonotonicClock> {
    /// Controller on the wall clock
    pub fn with_defaults(
        config: SequencerConfig,
        engine: E,
        catalog: impl BankCatalog + 'static,
    ) -> std::result::Result<Self, ConfigError> {
        Self::new(config, engine, catalog, MonotonicClock::new())
    }
}

impl<E: AudioEngine, C: Clock> SequencerController<E, C> {
    /// Build a stopped controller.
    ///
    /// The bank list starts as the configured fallback until [`init`](Self::init)
    /// consults the catalog.
    pub fn new(
        config: SequencerConfig,
        engine: E,
        catalog: impl BankCatalog + 'static,
        clock: C,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::with_instruments(config.cycle()?, config.instrument_ids()?);

        let mut controller = Self {
            grid,
            engine,
            catalog: Box::new(catalog),
            scheduler: TransportScheduler::new(clock),
            sink: None,
            bpm: config.bpm,
            bank: config.bank.clone(),
            preferred_bank: config.bank,
            banks: Vec::new(),
            fallback_banks: config.fallback_banks,
            is_playing: false,
            highlight: Highlight::Clear,
            token: None,
        };
        let fallback = controller.fallback_banks.clone();
        controller.adopt_banks(fallback);
        Ok(controller)
    }

    /// Attach the renderer's snapshot sink
    pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.set_sink(sink);
        self
    }

    pub fn set_sink(&mut self, sink: impl SnapshotSink + 'static) {
        self.sink = Some(Box::new(sink));
        self.publish();
    }

    /// Load the bank list from the catalog.
    ///
    /// Never fails: an unavailable or empty catalog is logged and the built-in
    /// list is used instead.
    pub fn init(&mut self) {
        let banks = match self.catalog.load() {
            Ok(banks) if !banks.is_empty() => {
                log::info!(target: "beatgrid::runtime", "loaded {} banks from catalog", banks.len());
                banks
            }
            Ok(_) => {
                log::warn!(target: "beatgrid::runtime", "bank catalog is empty, using built-in list");
                self.fallback_banks.clone()
            }
            Err(err) => {
                log::warn!(target: "beatgrid::runtime", "{err}; using built-in bank list");
                self.fallback_banks.clone()
            }
        };
        self.adopt_banks(banks);
        self.publish();
    }

    /// Silence the engine, send every row, and start the highlight.
    ///
    /// On engine failure nothing is playing and no step is highlighted.
    pub fn play(&mut self) -> Result<()> {
        self.halt();

        let tracks = self.tracks();
        for track in &tracks {
            log::debug!(
                target: "beatgrid::runtime",
                "{}: {} ({} steps)",
                track.instrument,
                track.pattern,
                track.steps_per_cycle
            );
        }

        if let Err(err) = self.engine.play(&tracks) {
            log::warn!(target: "beatgrid::runtime", "engine refused to play: {err}");
            self.publish();
            return Err(SequencerError::Engine(err));
        }

        let step_ms = step_duration_ms(self.bpm, self.grid.cycle());
        let (token, tick) = self.scheduler.start(step_ms, self.grid.steps_per_cycle());
        self.token = Some(token);
        self.highlight = Highlight::Step(tick.step);
        self.is_playing = true;

        log::info!(
            target: "beatgrid::runtime",
            "playing {} tracks at {} bpm on {}",
            tracks.len(),
            self.bpm,
            self.bank
        );
        self.publish();
        Ok(())
    }

    /// Silence the engine and clear the highlight. No-op when stopped.
    pub fn stop(&mut self) {
        if !self.is_playing {
            return;
        }
        self.halt();
        log::info!(target: "beatgrid::runtime", "stopped");
        self.publish();
    }

    /// Flip one step, returning its new state
    pub fn toggle_step(&mut self, instrument: &InstrumentId, index: usize) -> Result<bool> {
        let checkpoint = self.checkpoint();
        let active = self.grid.toggle_step(instrument, index)?;
        self.commit(checkpoint)?;
        Ok(active)
    }

    /// Split a step into `hits` evenly spaced triggers (1 to 4)
    pub fn set_subdivision(
        &mut self,
        instrument: &InstrumentId,
        index: usize,
        hits: u8,
    ) -> Result<()> {
        let subdivision = Subdivision::new(hits)?;
        let checkpoint = self.checkpoint();
        self.grid.set_subdivision(instrument, index, subdivision)?;
        self.commit(checkpoint)
    }

    /// Append an instrument row. Returns `false` if it was already there.
    pub fn add_instrument(&mut self, instrument: InstrumentId) -> Result<bool> {
        let checkpoint = self.checkpoint();
        if !self.grid.add_instrument(instrument) {
            return Ok(false);
        }
        self.commit(checkpoint)?;
        Ok(true)
    }

    /// Drop an instrument and all of its steps. Returns `false` if absent.
    pub fn remove_instrument(&mut self, instrument: &InstrumentId) -> Result<bool> {
        let checkpoint = self.checkpoint();
        if !self.grid.remove_instrument(instrument) {
            return Ok(false);
        }
        self.commit(checkpoint)?;
        Ok(true)
    }

    pub fn update_tempo(&mut self, bpm: f64) -> Result<()> {
        let bpm = validate_bpm(bpm)?;
        let checkpoint = self.checkpoint();
        self.bpm = bpm;
        log::info!(target: "beatgrid::runtime", "tempo {bpm} bpm");
        self.commit(checkpoint)
    }

    /// Switch sample bank; the name must be in the active bank list
    pub fn update_bank(&mut self, bank: &str) -> Result<()> {
        if !self.banks.iter().any(|known| known == bank) {
            return Err(SequencerError::UnknownBank(bank.to_string()));
        }
        let checkpoint = self.checkpoint();
        self.bank = bank.to_string();
        self.preferred_bank = bank.to_string();
        log::info!(target: "beatgrid::runtime", "bank {bank}");
        self.commit(checkpoint)
    }

    /// Change beats per cycle, truncating or extending every row
    pub fn update_measure(&mut self, measure: u32) -> Result<()> {
        let cycle = CycleConfig::new(measure)?;
        let checkpoint = self.checkpoint();
        self.grid.set_measure(cycle);
        log::info!(
            target: "beatgrid::runtime",
            "measure {measure} ({} steps)",
            cycle.steps_per_cycle()
        );
        self.commit(checkpoint)
    }

    /// Return every step to its default
    pub fn clear(&mut self) -> Result<()> {
        let checkpoint = self.checkpoint();
        self.grid.reset();
        self.commit(checkpoint)
    }

    /// Apply a renderer intent
    pub fn dispatch(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::ToggleStep { instrument, index } => {
                self.toggle_step(&instrument, index).map(|_| ())
            }
            Intent::SetSubdivision {
                instrument,
                index,
                subdivision,
            } => self.set_subdivision(&instrument, index, subdivision),
            Intent::AddInstrument(instrument) => self.add_instrument(instrument).map(|_| ()),
            Intent::RemoveInstrument(instrument) => {
                self.remove_instrument(&instrument).map(|_| ())
            }
            Intent::UpdateTempo(bpm) => self.update_tempo(bpm),
            Intent::UpdateMeasure(measure) => self.update_measure(measure),
            Intent::UpdateBank(bank) => self.update_bank(&bank),
            Intent::Clear => self.clear(),
            Intent::Play => self.play(),
            Intent::Stop => {
                self.stop();
                Ok(())
            }
        }
    }

    /// Recompute the highlight for the current run.
    ///
    /// Also retries any snapshot the sink could not deliver earlier, so call
    /// it while stopped too.
    pub fn poll(&mut self) -> Option<Tick> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush();
        }
        let token = self.token?;
        self.poll_token(token)
    }

    /// Recompute the highlight for the run identified by `token`.
    ///
    /// A token from an earlier run yields `None` and changes nothing.
    pub fn poll_token(&mut self, token: PollToken) -> Option<Tick> {
        let tick = self.scheduler.poll(token)?;
        self.highlight = Highlight::Step(tick.step);
        self.publish();
        Some(tick)
    }

    /// One compiled track per instrument row, in display order
    pub fn tracks(&self) -> Vec<TrackPattern> {
        let steps_per_cycle = self.grid.steps_per_cycle();
        self.grid
            .rows()
            .iter()
            .map(|row| TrackPattern {
                instrument: row.id().clone(),
                pattern: BeatPattern::from_row(row),
                steps_per_cycle,
                bank: self.bank.clone(),
                bpm: self.bpm,
            })
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.grid.rows().to_vec(),
            steps_per_cycle: self.grid.steps_per_cycle(),
            measure: self.grid.measure(),
            current_step: self.current_step(),
            is_playing: self.is_playing,
            bpm: self.bpm,
            bank: self.bank.clone(),
            banks: self.banks.clone(),
        }
    }

    /// Kit instruments not yet on the grid, in kit order
    pub fn available_to_add(&self) -> Vec<InstrumentId> {
        DRUM_KIT
            .iter()
            .filter_map(|(code, _)| InstrumentId::new(*code).ok())
            .filter(|id| !self.grid.contains(id))
            .collect()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn bank(&self) -> &str {
        &self.bank
    }

    /// Active bank list
    pub fn banks(&self) -> &[String] {
        &self.banks
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Highlighted step, if any
    pub fn current_step(&self) -> Option<usize> {
        self.highlight.step()
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    /// Token of the running generation
    pub fn token(&self) -> Option<PollToken> {
        self.token
    }

    /// How often the host should call [`poll`](Self::poll), in milliseconds
    pub fn poll_interval(&self) -> Option<f64> {
        self.scheduler.poll_interval_ms()
    }

    /// Clock time when playback last started
    pub fn start_time_ms(&self) -> Option<f64> {
        self.scheduler.start_time_ms()
    }

    /// Silence everything without publishing
    fn halt(&mut self) {
        self.engine.stop();
        self.highlight = self.scheduler.stop().unwrap_or(Highlight::Clear);
        self.token = None;
        self.is_playing = false;
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            grid: self.grid.clone(),
            bpm: self.bpm,
            bank: self.bank.clone(),
            preferred_bank: self.preferred_bank.clone(),
        }
    }

    /// Finish a successful mutation: replay if playing, otherwise just publish.
    ///
    /// If the replay fails the checkpoint is restored and the controller stays
    /// stopped.
    fn commit(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if !self.is_playing {
            self.publish();
            return Ok(());
        }

        log::debug!(target: "beatgrid::runtime", "state changed while playing, restarting");
        if let Err(err) = self.play() {
            self.grid = checkpoint.grid;
            self.bpm = checkpoint.bpm;
            self.bank = checkpoint.bank;
            self.preferred_bank = checkpoint.preferred_bank;
            self.publish();
            return Err(err);
        }
        Ok(())
    }

    /// Make `banks` the active list.
    ///
    /// The preferred bank is selected if the list has it, otherwise the first
    /// bank stands in until a later list brings the preferred one back.
    fn adopt_banks(&mut self, banks: Vec<String>) {
        let banks = if banks.is_empty() {
            self.fallback_banks.clone()
        } else {
            banks
        };
        if banks.contains(&self.preferred_bank) {
            self.bank = self.preferred_bank.clone();
        } else if let Some(first) = banks.first() {
            log::warn!(
                target: "beatgrid::runtime",
                "bank {} not available, using {first}",
                self.preferred_bank
            );
            self.bank = first.clone();
        }
        self.banks = banks;
    }

    fn publish(&mut self) {
        if self.sink.is_none() {
            return;
        }
        let snapshot = self.snapshot();
        if let Some(sink) = self.sink.as_mut() {
            sink.publish(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{EngineError, StaticCatalog};
    use crate::transport::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Engine that records every call and can be told to fail
    #[derive(Default)]
    struct Recorder {
        plays: Vec<Vec<TrackPattern>>,
        stops: usize,
        fail: bool,
    }

    impl AudioEngine for Recorder {
        fn play(&mut self, tracks: &[TrackPattern]) -> std::result::Result<(), EngineError> {
            if self.fail {
                return Err(EngineError::new("no output device"));
            }
            self.plays.push(tracks.to_vec());
            Ok(())
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    fn id(code: &str) -> InstrumentId {
        InstrumentId::new(code).unwrap()
    }

    fn controller() -> (ManualClock, SequencerController<Recorder, ManualClock>) {
        let clock = ManualClock::new();
        let controller = SequencerController::new(
            SequencerConfig::new().bpm(120.0),
            Recorder::default(),
            StaticCatalog::builtin(),
            clock.clone(),
        )
        .unwrap();
        (clock, controller)
    }

    fn last_patterns(controller: &SequencerController<Recorder, ManualClock>) -> Vec<String> {
        controller
            .engine()
            .plays
            .last()
            .unwrap()
            .iter()
            .map(|track| track.pattern.to_string())
            .collect()
    }

    #[test]
    fn test_new_uses_config() {
        let (_, c) = controller();
        assert_eq!(c.bpm(), 120.0);
        assert_eq!(c.bank(), "RolandTR909");
        assert_eq!(c.grid().steps_per_cycle(), 16);
        assert_eq!(c.grid().rows().len(), 4);
        assert!(!c.is_playing());
        assert_eq!(c.current_step(), None);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = SequencerController::new(
            SequencerConfig::new().measure(20),
            Recorder::default(),
            StaticCatalog::builtin(),
            ManualClock::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_play_sends_every_row() {
        let (_, mut c) = controller();
        c.toggle_step(&id("bd"), 0).unwrap();
        c.toggle_step(&id("bd"), 8).unwrap();
        c.play().unwrap();

        assert!(c.is_playing());
        assert_eq!(c.current_step(), Some(0));
        assert_eq!(last_patterns(&c), vec!["-", "-", "-", "0,8"]);

        let track = &c.engine().plays[0][3];
        assert_eq!(track.instrument, id("bd"));
        assert_eq!(track.steps_per_cycle, 16);
        assert_eq!(track.bank, "RolandTR909");
        assert_eq!(track.bpm, 120.0);
    }

    #[test]
    fn test_play_silences_engine_first() {
        let (_, mut c) = controller();
        c.play().unwrap();
        assert_eq!(c.engine().stops, 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (_, mut c) = controller();
        c.stop();
        assert_eq!(c.engine().stops, 0);

        c.play().unwrap();
        c.stop();
        c.stop();
        assert_eq!(c.engine().stops, 2);
        assert!(!c.is_playing());
        assert_eq!(c.start_time_ms(), None);
    }

    #[test]
    fn test_highlight_follows_clock() {
        let (clock, mut c) = controller();
        c.play().unwrap();
        assert_eq!(c.poll_interval(), Some(31.25));

        clock.advance(130.0);
        let tick = c.poll().unwrap();
        assert_eq!(tick.step, 2);
        assert_eq!(c.current_step(), Some(2));
    }

    #[test]
    fn test_engine_failure_leaves_stopped() {
        let (_, mut c) = controller();
        c.engine_mut().fail = true;

        let err = c.play().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ExternalEngineFailure);
        assert!(!c.is_playing());
        assert_eq!(c.current_step(), None);
        assert!(c.poll().is_none());
    }

    #[test]
    fn test_mutation_restarts_when_playing() {
        let (clock, mut c) = controller();
        c.play().unwrap();
        clock.advance(200.0);
        c.poll();
        let first_start = c.start_time_ms();

        c.toggle_step(&id("sd"), 4).unwrap();
        assert_eq!(c.engine().plays.len(), 2);
        assert_eq!(c.current_step(), Some(0));
        assert_ne!(c.start_time_ms(), first_start);
        assert_eq!(last_patterns(&c), vec!["-", "-", "4", "-"]);
    }

    #[test]
    fn test_mutation_while_stopped_does_not_play() {
        let (_, mut c) = controller();
        c.toggle_step(&id("hh"), 0).unwrap();
        c.update_tempo(90.0).unwrap();
        assert!(c.engine().plays.is_empty());
    }

    #[test]
    fn test_out_of_range_leaves_grid_untouched() {
        let (_, mut c) = controller();
        c.play().unwrap();
        let before = c.grid().clone();

        let err = c.toggle_step(&id("bd"), 16).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::OutOfRange);
        assert_eq!(c.grid(), &before);
        // No restart
        assert_eq!(c.engine().plays.len(), 1);
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        let (_, mut c) = controller();
        assert!(matches!(
            c.set_subdivision(&id("bd"), 0, 5),
            Err(SequencerError::InvalidSubdivision(5))
        ));
        assert!(matches!(c.update_tempo(0.0), Err(SequencerError::InvalidTempo(_))));
        assert!(matches!(
            c.update_measure(2),
            Err(SequencerError::UnsupportedMeasure(2))
        ));
        assert!(matches!(
            c.toggle_step(&id("cp"), 0),
            Err(SequencerError::UnknownInstrument(_))
        ));
        assert!(matches!(
            c.update_bank("NoSuchBank"),
            Err(SequencerError::UnknownBank(_))
        ));
        assert_eq!(c.bpm(), 120.0);
        assert_eq!(c.grid().measure(), 4);
    }

    #[test]
    fn test_failed_restart_rolls_back() {
        let (_, mut c) = controller();
        c.play().unwrap();
        c.engine_mut().fail = true;

        assert!(c.toggle_step(&id("bd"), 3).is_err());
        assert!(!c.grid().step(&id("bd"), 3).unwrap().active);
        assert!(!c.is_playing());

        assert!(c.update_tempo(140.0).is_ok());
        // Stopped now, so no replay and no failure
        assert_eq!(c.bpm(), 140.0);
    }

    #[test]
    fn test_failed_restart_rolls_back_tempo() {
        let (_, mut c) = controller();
        c.play().unwrap();
        c.engine_mut().fail = true;

        assert!(c.update_tempo(140.0).is_err());
        assert_eq!(c.bpm(), 120.0);
        assert_eq!(c.current_step(), None);
    }

    #[test]
    fn test_subdivision_compiles() {
        let (_, mut c) = controller();
        c.toggle_step(&id("hh"), 0).unwrap();
        c.toggle_step(&id("hh"), 2).unwrap();
        c.set_subdivision(&id("hh"), 2, 4).unwrap();
        c.play().unwrap();
        assert_eq!(last_patterns(&c)[0], "0,2,2.25,2.5,2.75");
    }

    #[test]
    fn test_update_measure_resizes_and_retimes() {
        let (_, mut c) = controller();
        c.toggle_step(&id("bd"), 2).unwrap();
        c.toggle_step(&id("bd"), 14).unwrap();
        c.play().unwrap();

        c.update_measure(3).unwrap();
        assert_eq!(c.grid().steps_per_cycle(), 12);
        assert_eq!(last_patterns(&c)[3], "2");
        assert_eq!(c.engine().plays[1][3].steps_per_cycle, 12);
        // (3 * 500 / 12) / 1.5 = 83.3ms per step, polled every 41.6ms
        let interval = c.poll_interval().unwrap();
        assert!((interval - 41.666_666).abs() < 1e-3);
    }

    #[test]
    fn test_remove_and_readd_resets_row() {
        let (_, mut c) = controller();
        c.toggle_step(&id("sd"), 4).unwrap();
        c.set_subdivision(&id("sd"), 4, 3).unwrap();
        c.play().unwrap();

        assert!(c.remove_instrument(&id("sd")).unwrap());
        let instruments: Vec<_> = c.engine().plays[1]
            .iter()
            .map(|t| t.instrument.to_string())
            .collect();
        assert_eq!(instruments, vec!["hh", "oh", "bd"]);

        assert!(c.add_instrument(id("sd")).unwrap());
        let step = c.grid().step(&id("sd"), 4).unwrap();
        assert!(!step.active);
        assert_eq!(step.subdivision, Subdivision::NONE);
    }

    #[test]
    fn test_add_and_remove_noops_do_not_restart() {
        let (_, mut c) = controller();
        c.play().unwrap();
        assert!(!c.add_instrument(id("bd")).unwrap());
        assert!(!c.remove_instrument(&id("cp")).unwrap());
        assert_eq!(c.engine().plays.len(), 1);
    }

    #[test]
    fn test_init_falls_back_on_catalog_error() {
        let catalog = || {
            Err::<Vec<String>, _>(crate::io::CatalogError::Unavailable("offline".into()))
        };
        let mut c = SequencerController::new(
            SequencerConfig::new(),
            Recorder::default(),
            catalog,
            ManualClock::new(),
        )
        .unwrap();
        c.init();
        assert_eq!(c.banks().len(), 7);
        assert_eq!(c.bank(), "RolandTR909");
    }

    #[test]
    fn test_init_keeps_bank_a_member() {
        let mut c = SequencerController::new(
            SequencerConfig::new(),
            Recorder::default(),
            StaticCatalog::new(["LinnDrum", "RolandTR808"]),
            ManualClock::new(),
        )
        .unwrap();
        c.init();
        assert_eq!(c.banks(), ["LinnDrum", "RolandTR808"]);
        assert_eq!(c.bank(), "LinnDrum");
    }

    #[test]
    fn test_init_empty_catalog_uses_fallback() {
        let mut c = SequencerController::new(
            SequencerConfig::new(),
            Recorder::default(),
            StaticCatalog::new(Vec::<String>::new()),
            ManualClock::new(),
        )
        .unwrap();
        c.init();
        assert_eq!(c.banks().len(), 7);
    }

    #[test]
    fn test_update_bank_restarts_with_new_bank() {
        let (_, mut c) = controller();
        c.play().unwrap();
        c.update_bank("LinnDrum").unwrap();
        assert_eq!(c.engine().plays[1][0].bank, "LinnDrum");
    }

    #[test]
    fn test_clear_resets_steps() {
        let (_, mut c) = controller();
        c.toggle_step(&id("bd"), 0).unwrap();
        c.set_subdivision(&id("bd"), 0, 2).unwrap();
        c.clear().unwrap();
        assert!(c.grid().rows().iter().all(|row| row.active_count() == 0));
        assert_eq!(c.grid().rows().len(), 4);
    }

    #[test]
    fn test_dispatch() {
        let (_, mut c) = controller();
        c.dispatch(Intent::ToggleStep {
            instrument: id("oh"),
            index: 6,
        })
        .unwrap();
        c.dispatch(Intent::UpdateTempo(100.0)).unwrap();
        c.dispatch(Intent::Play).unwrap();
        assert!(c.is_playing());
        assert_eq!(last_patterns(&c)[1], "6");
        c.dispatch(Intent::Stop).unwrap();
        assert!(!c.is_playing());
    }

    #[test]
    fn test_available_to_add() {
        let (_, c) = controller();
        let codes: Vec<_> = c.available_to_add().iter().map(|i| i.to_string()).collect();
        assert_eq!(codes, vec!["rd", "lt", "mt", "ht", "cr", "cp"]);
    }

    #[test]
    fn test_sink_receives_snapshots() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let (clock, c) = controller();
        let mut c = c.with_sink(move |s: &Snapshot| log.borrow_mut().push(s.current_step));

        c.play().unwrap();
        clock.advance(70.0);
        c.poll();
        // Every tick is published, even without a step change
        clock.advance(1.0);
        c.poll();
        c.stop();

        assert_eq!(*seen.borrow(), vec![None, Some(0), Some(1), Some(1), None]);
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let (clock, mut c) = controller();
        c.play().unwrap();
        let stale = c.token().unwrap();

        c.stop();
        c.play().unwrap();
        clock.advance(200.0);

        assert!(c.poll_token(stale).is_none());
        assert_eq!(c.current_step(), Some(0));
        assert_eq!(c.poll().unwrap().step, 3);
    }
}
