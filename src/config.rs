use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::GameError;

pub const TICK_HZ: u32 = 120;

pub const WORLD_WIDTH: f32 = 1000.0;
pub const WORLD_HEIGHT: f32 = 700.0;

pub const LETTER_SIZE: f32 = 40.0;
pub const PREVIEW_SIZE_FACTOR: f32 = 5.0;
pub const MAX_SPEED: f32 = 2.0;
pub const MIN_SPEED: f32 = 1.0;
pub const ANIMATION_SPEED: f32 = 10.0;
pub const PREVIEW_SPEED_FACTOR: f32 = 0.5;

pub const PREVIEW_MS: u64 = 3_000;
pub const FLASH_MS: u64 = 500;
pub const WORD_COMPLETE_DELAY_MS: u64 = 2_000;
pub const HINT_MS: u64 = 30_000;
pub const MAX_HINTS: u8 = 3;

pub const ROUNDS_PER_PLAYER: u32 = 3;

pub const COLOR_CHANNEL_MIN: u8 = 50;
pub const COLOR_CHANNEL_MAX: u8 = 200;

/// Y coordinate of the word display row in world units.
pub const WORD_ROW_Y: f32 = 30.0;

pub const NAME_MAX_LEN: usize = 12;

/// Tunables for one game. Every field falls back to the compiled default.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub tick_hz: u32,
    pub world_width: f32,
    pub world_height: f32,
    pub letter_size: f32,
    pub preview_size_factor: f32,
    pub max_speed: f32,
    pub animation_speed: f32,
    pub preview_speed_factor: f32,
    pub preview_ms: u64,
    pub flash_ms: u64,
    pub word_complete_delay_ms: u64,
    pub hint_ms: u64,
    pub max_hints: u8,
    pub rounds_per_player: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_hz: TICK_HZ,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            letter_size: LETTER_SIZE,
            preview_size_factor: PREVIEW_SIZE_FACTOR,
            max_speed: MAX_SPEED,
            animation_speed: ANIMATION_SPEED,
            preview_speed_factor: PREVIEW_SPEED_FACTOR,
            preview_ms: PREVIEW_MS,
            flash_ms: FLASH_MS,
            word_complete_delay_ms: WORD_COMPLETE_DELAY_MS,
            hint_ms: HINT_MS,
            max_hints: MAX_HINTS,
            rounds_per_player: ROUNDS_PER_PLAYER,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let text = fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = toml::from_str(&text).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    /// Clamps values that would break the simulation.
    pub fn sanitized(mut self) -> Self {
        self.tick_hz = self.tick_hz.clamp(1, 1_000);
        self.letter_size = self.letter_size.max(1.0);
        self.preview_size_factor = self.preview_size_factor.max(1.0);
        let max_letter = self.world_width.min(self.world_height);
        if self.preview_size() > max_letter {
            self.preview_size_factor = (max_letter / self.letter_size).max(1.0);
        }
        self.world_width = self.world_width.max(self.preview_size());
        self.world_height = self.world_height.max(self.preview_size());
        self.max_speed = self.max_speed.max(MIN_SPEED);
        self.animation_speed = self.animation_speed.max(0.1);
        self.preview_speed_factor = self.preview_speed_factor.clamp(0.01, 1.0);
        self.rounds_per_player = self.rounds_per_player.max(1);
        self
    }

    pub fn preview_size(&self) -> f32 {
        self.letter_size * self.preview_size_factor
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz))
    }

    pub fn preview_duration(&self) -> Duration {
        Duration::from_millis(self.preview_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    pub fn word_complete_delay(&self) -> Duration {
        Duration::from_millis(self.word_complete_delay_ms)
    }

    pub fn hint_duration(&self) -> Duration {
        Duration::from_millis(self.hint_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod load {
        use super::*;
        use std::io::Write;

        #[test]
        fn partial_file_keeps_defaults() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "hint_ms = 10000\nmax_hints = 5").unwrap();
            let config = GameConfig::load(file.path()).unwrap();
            assert_eq!(config.hint_ms, 10_000);
            assert_eq!(config.max_hints, 5);
            assert_eq!(config.preview_ms, PREVIEW_MS);
            assert_eq!(config.world_width, WORLD_WIDTH);
        }

        #[test]
        fn missing_file_is_read_error() {
            let err = GameConfig::load(Path::new("/nonexistent/alphabet-swarm.toml")).unwrap_err();
            assert!(matches!(err, GameError::ConfigRead { .. }));
        }

        #[test]
        fn malformed_file_is_parse_error() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "hint_ms = \"soon\"").unwrap();
            let err = GameConfig::load(file.path()).unwrap_err();
            assert!(matches!(err, GameError::ConfigParse { .. }));
        }
    }

    mod sanitized {
        use super::*;

        #[test]
        fn defaults_are_untouched() {
            assert_eq!(GameConfig::default().sanitized(), GameConfig::default());
        }

        #[test]
        fn preview_box_always_fits_the_world() {
            let config = GameConfig {
                world_width: 300.0,
                world_height: 150.0,
                ..GameConfig::default()
            }
            .sanitized();
            assert!(config.preview_size() <= config.world_height);
            assert!(config.preview_size() <= config.world_width);
        }

        #[test]
        fn zero_tick_rate_is_raised() {
            let config = GameConfig {
                tick_hz: 0,
                ..GameConfig::default()
            }
            .sanitized();
            assert_eq!(config.tick_hz, 1);
        }
    }

    mod durations {
        use super::*;

        #[test]
        fn frame_interval_matches_tick_rate() {
            let config = GameConfig::default();
            let interval = config.frame_interval();
            assert!((interval.as_secs_f64() - 1.0 / 120.0).abs() < 1e-9);
        }
    }
}
