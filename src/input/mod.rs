//! Preview/confirm key handling.
//!
//! The first press of a letter previews it: the letter grows, slows down and
//! waits. Pressing the same letter again before the preview expires confirms
//! it and checks it against the next expected letter of the word. Any other
//! letter supersedes the preview.

use tracing::debug;

use crate::{
    config::GameConfig,
    session::Session,
    swarm::Swarm,
    types::{LetterState, Tick},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A new preview started. `count` letters entered preview.
    Previewed { glyph: char, count: usize },
    /// Confirmed and correct. `animated` is the letter flying to `slot`, if
    /// one was free to do so.
    Accepted {
        glyph: char,
        slot: usize,
        animated: Option<usize>,
    },
    /// Confirmed but wrong (or nothing left to spell).
    Rejected { glyph: char, flashed: usize },
    /// Not a letter.
    Ignored,
}

/// The letter currently previewed and the entities previewing it.
///
/// The glyph outlives an empty entity set until `expires_at`, so a letter
/// whose only entity is already flying can still be confirmed.
#[derive(Clone, Debug, Default)]
pub struct PreviewSelection {
    glyph: Option<char>,
    active: Vec<usize>,
    expires_at: Option<Tick>,
}

impl PreviewSelection {
    pub fn glyph(&self) -> Option<char> {
        self.glyph
    }

    pub fn active(&self) -> &[usize] {
        &self.active
    }

    pub fn handle_key(
        &mut self,
        key: char,
        swarm: &mut Swarm,
        session: &mut Session,
        now: Tick,
        config: &GameConfig,
    ) -> KeyOutcome {
        if !key.is_ascii_alphabetic() {
            return KeyOutcome::Ignored;
        }
        let glyph = key.to_ascii_uppercase();

        if self.glyph == Some(glyph) {
            let captured = self.take(swarm);
            if session.expected() == Some(glyph) {
                let animated = captured
                    .iter()
                    .copied()
                    .find(|&idx| swarm.get(idx).is_some_and(|l| l.is_normal()));
                match accept_next(swarm, session, animated) {
                    Some(slot) => KeyOutcome::Accepted {
                        glyph,
                        slot,
                        animated,
                    },
                    None => KeyOutcome::Rejected { glyph, flashed: 0 },
                }
            } else {
                let until = now + config.flash_duration();
                for &idx in &captured {
                    if let Some(letter) = swarm.get_mut(idx) {
                        letter.flash_until = Some(until);
                    }
                }
                KeyOutcome::Rejected {
                    glyph,
                    flashed: captured.len(),
                }
            }
        } else {
            self.cancel(swarm);
            for idx in swarm.indices_of(glyph) {
                let eligible = swarm.get(idx).is_some_and(|l| {
                    matches!(l.state, LetterState::Normal | LetterState::Placed { .. })
                });
                if eligible && swarm.begin_preview(idx, now, config) {
                    self.active.push(idx);
                }
            }
            self.glyph = Some(glyph);
            self.expires_at = Some(now + config.preview_duration());
            debug!(%glyph, count = self.active.len(), "preview");
            KeyOutcome::Previewed {
                glyph,
                count: self.active.len(),
            }
        }
    }

    /// Reverts previews whose time ran out. Returns how many expired.
    pub fn expire(&mut self, swarm: &mut Swarm, now: Tick) -> usize {
        if self.glyph.is_none() {
            return 0;
        }
        let before = self.active.len();
        self.active.retain(|&idx| {
            let expired = swarm
                .get(idx)
                .and_then(|l| l.preview_expiry())
                .is_none_or(|expires_at| now > expires_at);
            if expired {
                swarm.revert_preview(idx);
            }
            !expired
        });
        let expired = before - self.active.len();
        let deadline_passed = self.expires_at.is_none_or(|deadline| now > deadline);
        if self.active.is_empty() && (expired > 0 || deadline_passed) {
            self.glyph = None;
            self.expires_at = None;
        }
        expired
    }

    /// Drops one entity from the selection, reverting it.
    pub fn release(&mut self, idx: usize, swarm: &mut Swarm) {
        if let Some(pos) = self.active.iter().position(|&i| i == idx) {
            self.active.remove(pos);
            swarm.revert_preview(idx);
        }
        if self.active.is_empty() {
            self.glyph = None;
            self.expires_at = None;
        }
    }

    /// Ends the current preview, if any.
    pub fn cancel(&mut self, swarm: &mut Swarm) {
        self.take(swarm);
    }

    fn take(&mut self, swarm: &mut Swarm) -> Vec<usize> {
        let captured = std::mem::take(&mut self.active);
        for &idx in &captured {
            swarm.revert_preview(idx);
        }
        self.glyph = None;
        self.expires_at = None;
        captured
    }
}

/// Resolves the next slot of the word: sends `animate` flying to it, or
/// writes the letter straight into the buffer when no entity is free.
/// Returns the slot, or `None` if the word is already complete.
pub fn accept_next(swarm: &mut Swarm, session: &mut Session, animate: Option<usize>) -> Option<usize> {
    let expected = session.expected()?;
    let slot = session.advance()?;
    match animate {
        Some(idx) if swarm.begin_animation(idx, slot) => {}
        _ => session.reveal(slot, expected),
    }
    Some(slot)
}
