use std::time::Duration;

use crate::{
    config::GameConfig,
    types::{PLACEHOLDER, Tick},
    words::WordEntry,
};

/// One word being spelled.
#[derive(Clone, Debug)]
pub struct Session {
    entry: WordEntry,
    target: Vec<char>,
    buffer: Vec<char>,
    cursor: usize,
    started_at: Tick,
    hints_used: u8,
    hint_started: Option<Tick>,
}

impl Session {
    pub fn new(entry: WordEntry, now: Tick) -> Self {
        let target = entry.chars();
        let buffer = vec![PLACEHOLDER; target.len()];
        Self {
            entry,
            target,
            buffer,
            cursor: 0,
            started_at: now,
            hints_used: 0,
            hint_started: Some(now),
        }
    }

    pub fn word(&self) -> &str {
        &self.entry.word
    }

    pub fn clue(&self) -> Option<&str> {
        self.entry.clue.as_deref()
    }

    pub fn buffer(&self) -> &[char] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [char] {
        &mut self.buffer
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn elapsed(&self, now: Tick) -> Duration {
        now.since(self.started_at)
    }

    /// The letter the player has to confirm next.
    pub fn expected(&self) -> Option<char> {
        self.target.get(self.cursor).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.target.len()
    }

    /// Moves the cursor past the current slot and returns that slot.
    pub fn advance(&mut self) -> Option<usize> {
        if self.is_complete() {
            return None;
        }
        let slot = self.cursor;
        self.cursor += 1;
        Some(slot)
    }

    /// Writes a letter into the display without an animation.
    pub fn reveal(&mut self, slot: usize, glyph: char) {
        if let Some(cell) = self.buffer.get_mut(slot) {
            *cell = glyph;
        }
    }

    pub fn hints_used(&self) -> u8 {
        self.hints_used
    }

    pub fn hints_left(&self, config: &GameConfig) -> u8 {
        config.max_hints.saturating_sub(self.hints_used)
    }

    pub fn hint_due(&self, now: Tick, config: &GameConfig) -> bool {
        match self.hint_started {
            Some(started) => {
                self.hints_left(config) > 0
                    && !self.is_complete()
                    && now.since(started) >= config.hint_duration()
            }
            None => false,
        }
    }

    pub fn consume_hint(&mut self) {
        self.hints_used = self.hints_used.saturating_add(1);
    }

    pub fn restart_hint_timer(&mut self, now: Tick) {
        self.hint_started = Some(now);
    }

    pub fn disarm_hints(&mut self) {
        self.hint_started = None;
    }

    #[cfg(test)]
    pub fn hint_armed(&self) -> bool {
        self.hint_started.is_some()
    }
}

/// Points for a finished word: 10 per letter, doubled for a fast finish and
/// decaying linearly to 1x at the slow bound.
pub fn score_word(len: usize, time_taken: Duration) -> u32 {
    let base = base_score(len);
    let fast = (len as f64) * 3_000.0;
    let slow = (len as f64) * 8_000.0;
    let ms = time_taken.as_secs_f64() * 1_000.0;
    let multiplier = if ms <= fast {
        2.0
    } else if ms >= slow {
        1.0
    } else {
        2.0 - (ms - fast) / (slow - fast)
    };
    (f64::from(base) * multiplier.clamp(1.0, 2.0)).floor() as u32
}

pub fn base_score(len: usize) -> u32 {
    match len {
        3 => 30,
        4 => 40,
        5 => 50,
        other => u32::try_from(other).unwrap_or(0).saturating_mul(10),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub score: u32,
    pub failed_last: bool,
    pub words_played: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            failed_last: false,
            words_played: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Standing {
    Winner(usize),
    Tie,
}

/// Local, same-keyboard turn order.
#[derive(Clone, Debug)]
pub struct Turns {
    players: Vec<Player>,
    active: usize,
    rounds: u32,
}

impl Turns {
    pub fn new(players: Vec<Player>, rounds: u32) -> Self {
        let players = if players.is_empty() {
            vec![Player::new("Player 1")]
        } else {
            players
        };
        Self {
            players,
            active: 0,
            rounds: rounds.max(1),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Player {
        &self.players[self.active]
    }

    pub fn is_multiplayer(&self) -> bool {
        self.players.len() > 1
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn record_completed(&mut self, points: u32) {
        let player = &mut self.players[self.active];
        player.score = player.score.saturating_add(points);
        player.failed_last = false;
        player.words_played += 1;
    }

    pub fn record_failed(&mut self) {
        let player = &mut self.players[self.active];
        player.failed_last = true;
        player.words_played += 1;
    }

    /// Hands the turn to the next player.
    pub fn advance(&mut self) {
        self.active = (self.active + 1) % self.players.len();
    }

    pub fn is_match_over(&self) -> bool {
        self.players.iter().all(|p| p.words_played >= self.rounds)
    }

    pub fn standing(&self) -> Standing {
        let best = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        let mut leaders = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.score == best)
            .map(|(idx, _)| idx);
        match (leaders.next(), leaders.next()) {
            (Some(idx), None) => Standing::Winner(idx),
            _ => Standing::Tie,
        }
    }
}
