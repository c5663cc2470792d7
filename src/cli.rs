use std::path::PathBuf;

use clap::Parser;

use crate::config::GameConfig;

/// Spell the target word by catching letters out of the swarm.
#[derive(Parser, Debug)]
#[command(name = "alphabet-swarm")]
#[command(version)]
#[command(
    about = "Letters drift around the screen; press a letter to preview it, press it again to confirm it."
)]
pub struct Cli {
    /// Word list, one `word` or `word,clue` per line
    #[arg(short, long, default_value = "words.txt")]
    pub words: PathBuf,

    /// TOML file overriding game tunables
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding correct.wav, incorrect.wav and word_complete.wav
    #[arg(long, default_value = ".")]
    pub sounds: PathBuf,

    /// Seed for letter placement and word choice
    #[arg(long)]
    pub seed: Option<u64>,

    /// Frame rate cap
    #[arg(long)]
    pub fps: Option<u32>,

    /// Words each player spells per match
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Log output file (the terminal is owned by the game)
    #[arg(long, default_value = "alphabet-swarm.log")]
    pub log_file: PathBuf,
}

impl Cli {
    /// Applies flags on top of file/default configuration.
    pub fn apply(&self, config: &mut GameConfig) {
        if let Some(fps) = self.fps {
            config.tick_hz = fps;
        }
        if let Some(rounds) = self.rounds {
            config.rounds_per_player = rounds;
        }
    }
}
