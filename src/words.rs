use std::{fs, io, path::Path};

use rand::Rng;
use tracing::{debug, info};

use crate::error::GameError;

pub const MIN_WORD_LEN: usize = 3;
pub const MAX_WORD_LEN: usize = 5;

const DEFAULT_WORDS: &[(&str, &str)] = &[
    ("CAT", "A pet that purrs"),
    ("DOG", "A loyal pet that barks"),
    ("SUN", "It rises in the east"),
    ("BIG", "The opposite of small"),
    ("RED", "The color of a ripe tomato"),
    ("FUN", "What games are meant to be"),
    ("EAT", "What you do at dinner"),
    ("RUN", "Faster than walking"),
    ("TOP", "The highest point"),
    ("HOT", "How fire feels"),
    ("POT", "You cook soup in it"),
    ("SKY", "Clouds float across it"),
    ("FLY", "What birds do"),
    ("TRY", "Give it a go"),
    ("APPLE", "A fruit that keeps the doctor away"),
    ("MOON", "It lights up the night"),
    ("FISH", "It swims and has gills"),
    ("TREE", "It grows leaves and bark"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub clue: Option<String>,
}

impl WordEntry {
    /// Parses `word` or `word,clue`. Returns `None` for lines that are not a
    /// 3-5 letter ASCII word.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, clue) = match line.split_once(',') {
            Some((word, clue)) => (word.trim(), Some(clue.trim())),
            None => (line, None),
        };
        if !(MIN_WORD_LEN..=MAX_WORD_LEN).contains(&word.len())
            || !word.chars().all(|ch| ch.is_ascii_alphabetic())
        {
            return None;
        }
        Some(Self {
            word: word.to_ascii_uppercase(),
            clue: clue.filter(|c| !c.is_empty()).map(str::to_string),
        })
    }

    pub fn chars(&self) -> Vec<char> {
        self.word.chars().collect()
    }
}

#[derive(Clone, Debug)]
pub struct WordList {
    entries: Vec<WordEntry>,
}

impl WordList {
    /// Reads the word file, falling back to the built-in list.
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let from_file = match fs::read_to_string(path) {
            Ok(text) => {
                let entries = parse_lines(&text);
                if entries.is_empty() {
                    info!(path = %path.display(), "no valid 3-5 letter words in word file");
                } else {
                    info!(path = %path.display(), count = entries.len(), "loaded words");
                }
                entries
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "word file not found");
                Vec::new()
            }
            Err(err) => {
                info!(path = %path.display(), error = %err, "word file unreadable");
                Vec::new()
            }
        };
        Self::from_sources(from_file, &default_entries())
    }

    pub fn from_sources(primary: Vec<WordEntry>, fallback: &[WordEntry]) -> Result<Self, GameError> {
        if !primary.is_empty() {
            return Ok(Self { entries: primary });
        }
        if fallback.is_empty() {
            return Err(GameError::NoWords);
        }
        info!(count = fallback.len(), "using default word list");
        Ok(Self {
            entries: fallback.to_vec(),
        })
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &WordEntry {
        &self.entries[rng.gen_range(0..self.entries.len())]
    }
}

pub fn parse_lines(text: &str) -> Vec<WordEntry> {
    let mut skipped = 0_usize;
    let entries: Vec<WordEntry> = text
        .lines()
        .filter_map(|line| {
            let entry = WordEntry::parse(line);
            if entry.is_none() {
                skipped += 1;
            }
            entry
        })
        .collect();
    if skipped > 0 {
        debug!(skipped, "skipped invalid word lines");
    }
    entries
}

pub fn default_entries() -> Vec<WordEntry> {
    DEFAULT_WORDS
        .iter()
        .map(|(word, clue)| WordEntry {
            word: (*word).to_string(),
            clue: Some((*clue).to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::io::Write;

    mod parse {
        use super::*;

        #[test]
        fn bare_word_is_uppercased() {
            let entry = WordEntry::parse("  cat ").unwrap();
            assert_eq!(entry.word, "CAT");
            assert_eq!(entry.clue, None);
        }

        #[test]
        fn word_with_clue() {
            let entry = WordEntry::parse("moon, It lights up the night").unwrap();
            assert_eq!(entry.word, "MOON");
            assert_eq!(entry.clue.as_deref(), Some("It lights up the night"));
        }

        #[test]
        fn empty_clue_is_dropped() {
            let entry = WordEntry::parse("fish,").unwrap();
            assert_eq!(entry.clue, None);
        }

        #[test]
        fn rejects_bad_lengths_and_characters() {
            assert!(WordEntry::parse("at").is_none());
            assert!(WordEntry::parse("banana").is_none());
            assert!(WordEntry::parse("c4t").is_none());
            assert!(WordEntry::parse("").is_none());
            assert!(WordEntry::parse("café").is_none());
        }
    }

    mod parse_lines_fn {
        use super::*;

        #[test]
        fn skips_invalid_lines() {
            let entries = parse_lines("cat\n\nxy\nlonger\ndog,barks\n");
            let words: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
            assert_eq!(words, vec!["CAT", "DOG"]);
        }
    }

    mod load {
        use super::*;

        #[test]
        fn reads_file_entries() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "owl,Hoots at night\nbee").unwrap();
            let list = WordList::load(file.path()).unwrap();
            assert_eq!(list.entries().len(), 2);
            assert_eq!(list.entries()[0].clue.as_deref(), Some("Hoots at night"));
        }

        #[test]
        fn missing_file_uses_defaults() {
            let list = WordList::load(Path::new("/nonexistent/words.txt")).unwrap();
            assert_eq!(list.entries(), default_entries().as_slice());
        }

        #[test]
        fn file_without_valid_words_uses_defaults() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "no\nwaytoolong\n1234").unwrap();
            let list = WordList::load(file.path()).unwrap();
            assert_eq!(list.entries().len(), default_entries().len());
        }
    }

    mod from_sources {
        use super::*;

        #[test]
        fn both_empty_is_fatal() {
            let err = WordList::from_sources(Vec::new(), &[]).unwrap_err();
            assert!(matches!(err, GameError::NoWords));
        }

        #[test]
        fn primary_wins_over_fallback() {
            let primary = vec![WordEntry::parse("owl").unwrap()];
            let list = WordList::from_sources(primary, &default_entries()).unwrap();
            assert_eq!(list.entries().len(), 1);
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn every_default_is_a_valid_word() {
            for entry in default_entries() {
                let reparsed = WordEntry::parse(&entry.word).unwrap();
                assert_eq!(reparsed.word, entry.word);
            }
        }
    }

    mod choose {
        use super::*;

        #[test]
        fn always_returns_a_listed_entry() {
            let list = WordList::from_sources(default_entries(), &[]).unwrap();
            let mut rng = StdRng::seed_from_u64(7);
            for _ in 0..50 {
                let entry = list.choose(&mut rng);
                assert!(list.entries().contains(entry));
            }
        }
    }
}
