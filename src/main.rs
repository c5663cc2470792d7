mod audio;
mod cli;
mod config;
mod core;
mod error;
mod input;
mod layout;
mod motion;
mod render;
mod session;
mod swarm;
mod types;
mod ui;
mod words;

use std::{fs::File, io, path::Path, process::ExitCode, sync::Mutex};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
    audio::SoundBank, cli::Cli, config::GameConfig, error::GameError, ui::Settings,
    words::WordList,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_file);
    info!("alphabet swarm starting");

    match start(&cli) {
        Ok(()) => {
            info!("bye");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "fatal");
            eprintln!("alphabet-swarm: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// The terminal belongs to the game, so logs go to a file.
fn init_tracing(log_file: &Path) {
    let writer = match File::create(log_file) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(io::sink),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
}

fn start(cli: &Cli) -> Result<(), GameError> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    cli.apply(&mut config);
    let config = config.sanitized();

    let words = WordList::load(&cli.words)?;
    info!(count = words.entries().len(), "words ready");

    let sounds = SoundBank::load(&cli.sounds);
    audio::report(&sounds);

    ui::run(Settings {
        config,
        words,
        sounds,
        seed: cli.seed,
    })
}
