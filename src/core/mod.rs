use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::{
    config::GameConfig,
    input::{self, KeyOutcome, PreviewSelection},
    layout::SlotLayout,
    motion,
    session::{self, Player, Session, Turns},
    swarm::{self, Swarm},
    types::{LetterState, Tick},
    words::WordList,
};

/// Audio feedback requested by the game. Drained by the UI each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Correct,
    Incorrect,
    WordComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Failure,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub text: String,
    pub kind: BannerKind,
    pub until: Tick,
}

/// Everything one match needs: the swarm, the word in play, the players.
pub struct GameWorld {
    config: GameConfig,
    words: WordList,
    swarm: Swarm,
    session: Session,
    selection: PreviewSelection,
    turns: Turns,
    pending_new_word: Option<Tick>,
    banner: Option<Banner>,
    cues: Vec<Cue>,
    finished: bool,
    rng: StdRng,
}

impl GameWorld {
    pub fn new(
        config: GameConfig,
        words: WordList,
        players: Vec<Player>,
        mut rng: StdRng,
        now: Tick,
    ) -> Self {
        let entry = words.choose(&mut rng).clone();
        let turns = Turns::new(players, config.rounds_per_player);
        let mut world = Self {
            swarm: Swarm::new(),
            session: Session::new(entry, now),
            selection: PreviewSelection::default(),
            turns,
            pending_new_word: None,
            banner: None,
            cues: Vec::new(),
            finished: false,
            config,
            words,
            rng,
        };
        debug_assert!(swarm::is_full_alphabet(&world.swarm));
        world.setup_new_word(now);
        if world.turns.is_multiplayer() {
            world.announce_turn(now);
        }
        world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selection(&self) -> &PreviewSelection {
        &self.selection
    }

    pub fn turns(&self) -> &Turns {
        &self.turns
    }

    pub fn banner(&self, now: Tick) -> Option<&Banner> {
        self.banner.as_ref().filter(|b| b.until > now)
    }

    #[cfg(test)]
    pub fn pending_new_word(&self) -> Option<Tick> {
        self.pending_new_word
    }

    /// True once every player has used up their rounds.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn drain_cues(&mut self) -> std::vec::Drain<'_, Cue> {
        self.cues.drain(..)
    }

    pub fn handle_key(&mut self, key: char, now: Tick) -> KeyOutcome {
        if self.pending_new_word.is_some() || self.finished {
            return KeyOutcome::Ignored;
        }
        let outcome =
            self.selection
                .handle_key(key, &mut self.swarm, &mut self.session, now, &self.config);
        match outcome {
            KeyOutcome::Accepted { glyph, slot, .. } => {
                debug!(%glyph, slot, "confirmed correct");
                self.cues.push(Cue::Correct);
                if self.session.is_complete() {
                    self.complete_word(now);
                }
            }
            KeyOutcome::Rejected { glyph, .. } => {
                debug!(%glyph, expected = ?self.session.expected(), "confirmed wrong");
                self.cues.push(Cue::Incorrect);
            }
            KeyOutcome::Previewed { .. } | KeyOutcome::Ignored => {}
        }
        outcome
    }

    /// One simulation step. `now` must be the frame's single clock sample.
    pub fn tick(&mut self, now: Tick, layout: &dyn SlotLayout) {
        if self.finished {
            return;
        }
        if let Some(due) = self.pending_new_word {
            if now >= due {
                self.next_turn(now);
                if self.finished {
                    return;
                }
            }
        }
        self.selection.expire(&mut self.swarm, now);
        self.service_hint(now);
        motion::integrate(
            &mut self.swarm,
            self.session.buffer_mut(),
            layout,
            &self.config,
        );
    }

    fn setup_new_word(&mut self, now: Tick) {
        let entry = self.words.choose(&mut self.rng).clone();
        info!(word = %entry.word, player = %self.turns.active().name, at_ms = now.as_millis(), "new word");
        self.session = Session::new(entry, now);
        self.selection.cancel(&mut self.swarm);
        self.swarm.reset_all(&mut self.rng, &self.config);
        self.pending_new_word = None;
    }

    fn next_turn(&mut self, now: Tick) {
        self.pending_new_word = None;
        if self.turns.is_match_over() {
            info!("match over");
            self.finished = true;
            return;
        }
        self.turns.advance();
        self.setup_new_word(now);
        if self.turns.is_multiplayer() {
            self.announce_turn(now);
        }
    }

    fn announce_turn(&mut self, now: Tick) {
        self.banner = Some(Banner {
            text: format!("{}'s turn", self.turns.active().name),
            kind: BannerKind::Info,
            until: now + self.config.word_complete_delay(),
        });
    }

    fn complete_word(&mut self, now: Tick) {
        let elapsed = self.session.elapsed(now);
        let points = session::score_word(self.session.len(), elapsed);
        info!(
            word = %self.session.word(),
            elapsed_ms = elapsed.as_millis() as u64,
            points,
            "word complete"
        );
        self.turns.record_completed(points);
        self.session.disarm_hints();
        self.cues.push(Cue::WordComplete);
        let until = now + self.config.word_complete_delay();
        self.banner = Some(Banner {
            text: format!("Well Done! +{points}"),
            kind: BannerKind::Success,
            until,
        });
        self.pending_new_word = Some(until);
    }

    fn fail_word(&mut self, now: Tick) {
        info!(word = %self.session.word(), "out of hints");
        self.turns.record_failed();
        self.session.disarm_hints();
        let until = now + self.config.word_complete_delay();
        self.banner = Some(Banner {
            text: format!("Out of hints! The word was {}", self.session.word()),
            kind: BannerKind::Failure,
            until,
        });
        self.pending_new_word = Some(until);
    }

    fn service_hint(&mut self, now: Tick) {
        if self.pending_new_word.is_some() || !self.session.hint_due(now, &self.config) {
            return;
        }
        let Some(expected) = self.session.expected() else {
            self.session.disarm_hints();
            return;
        };
        let Some(idx) = self.hint_candidate(expected) else {
            warn!(%expected, "hint found no free letter");
            self.session.restart_hint_timer(now);
            return;
        };
        if self.swarm.get(idx).is_some_and(|l| l.is_previewed()) {
            self.selection.release(idx, &mut self.swarm);
        }
        // a repeated letter leaves its earlier slot for the next one
        self.swarm.release_placed(idx);
        self.session.consume_hint();
        self.session.restart_hint_timer(now);
        let Some(slot) = input::accept_next(&mut self.swarm, &mut self.session, Some(idx)) else {
            return;
        };
        info!(%expected, slot, hints_used = self.session.hints_used(), "hint revealed letter");
        self.cues.push(Cue::Correct);

        if self.session.is_complete() {
            self.complete_word(now);
        } else if self.session.hints_left(&self.config) == 0 {
            self.fail_word(now);
        }
    }

    /// Prefers a drifting letter, then a previewed one, then one already
    /// sitting in an earlier slot.
    fn hint_candidate(&self, expected: char) -> Option<usize> {
        let indices = self.swarm.indices_of(expected);
        let find = |pred: fn(&LetterState) -> bool| {
            indices
                .iter()
                .copied()
                .find(|&idx| self.swarm.get(idx).is_some_and(|l| pred(&l.state)))
        };
        find(|s| *s == LetterState::Normal)
            .or_else(|| find(|s| matches!(s, LetterState::Previewed { .. })))
            .or_else(|| find(|s| matches!(s, LetterState::Placed { .. })))
    }
}
