//! beatgrid - terminal drum step sequencer
//!
//! Run with: cargo run -- [config.json] [sample-map.json]
//!
//! Set `BEATGRID_LOG=beatgrid.log` (and `RUST_LOG=debug`) to write logs to a
//! file; the terminal itself belongs to the UI.

mod app;
mod ui;

use std::fs::File;
use std::path::PathBuf;

use app::Beatgrid;
use beatgrid::runtime::SequencerConfig;
use color_eyre::eyre::{Result as EyreResult, WrapErr};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SequencerConfig::from_path(&path)
            .wrap_err_with(|| format!("failed to load config from {path}"))?,
        None => SequencerConfig::default(),
    };

    let mut app = Beatgrid::new(config);
    if let Some(path) = args.next() {
        app = app.sample_map(PathBuf::from(path));
    }
    app.run()
}

fn init_logging() -> EyreResult<()> {
    let Ok(path) = std::env::var("BEATGRID_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).wrap_err_with(|| format!("failed to create log file {path}"))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
