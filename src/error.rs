use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no words available: word file and built-in list are both empty")]
    NoWords,

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

impl GameError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            GameError::NoWords => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_words_has_its_own_exit_code() {
        assert_eq!(GameError::NoWords.exit_code(), 2);
        let io_err = GameError::from(io::Error::other("boom"));
        assert_eq!(io_err.exit_code(), 1);
    }

    #[test]
    fn messages_name_the_file() {
        let err = GameError::ConfigRead {
            path: PathBuf::from("game.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("game.toml"));
    }
}
