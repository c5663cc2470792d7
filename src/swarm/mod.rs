use rand::Rng;

use crate::{
    config::{self, GameConfig},
    types::{ALPHABET_LEN, Letter, LetterState, Rgb, Tick, Vec2, alphabet_index},
};

/// The 26 swarming letters, indexed by alphabet position.
#[derive(Clone, Debug)]
pub struct Swarm {
    letters: Vec<Letter>,
}

impl Swarm {
    pub fn new() -> Self {
        let letters = (b'A'..=b'Z').map(|b| Letter::new(b as char)).collect();
        Self { letters }
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn get(&self, idx: usize) -> Option<&Letter> {
        self.letters.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Letter> {
        self.letters.get_mut(idx)
    }

    #[cfg(test)]
    pub fn letter(&self, ch: char) -> Option<&Letter> {
        alphabet_index(ch).and_then(|idx| self.letters.get(idx))
    }

    /// Indices of every entity whose identity is `ch`.
    pub fn indices_of(&self, ch: char) -> Vec<usize> {
        let ch = ch.to_ascii_uppercase();
        self.letters
            .iter()
            .enumerate()
            .filter(|(_, letter)| letter.glyph == ch)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Letter> {
        self.letters.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Letter> {
        self.letters.iter_mut()
    }

    /// Scatters every letter with a fresh velocity and color, back to Normal.
    pub fn reset_all<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &GameConfig) {
        let max_x = (config.world_width - config.letter_size).max(0.0);
        let max_y = (config.world_height - config.letter_size).max(0.0);
        for letter in &mut self.letters {
            letter.pos = Vec2::new(rng.gen_range(0.0..=max_x), rng.gen_range(0.0..=max_y));
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = rng.gen_range(config::MIN_SPEED..=config.max_speed);
            letter.vel = Vec2::from_angle(angle, speed);
            letter.base_vel = letter.vel;
            letter.color = random_color(rng);
            letter.state = LetterState::Normal;
            letter.flash_until = None;
        }
    }

    /// Ends a preview on one letter, restoring its pre-preview speed.
    /// Letters that are not previewed are left alone.
    pub fn revert_preview(&mut self, idx: usize) -> bool {
        let Some(letter) = self.letters.get_mut(idx) else {
            return false;
        };
        if !letter.is_previewed() {
            return false;
        }
        letter.state = LetterState::Normal;
        letter.vel = letter.base_vel.with_signs_of(letter.vel);
        letter.base_vel = letter.vel;
        true
    }

    /// Puts one letter into preview: enlarged box clamped on-screen and
    /// slowed down.
    pub fn begin_preview(&mut self, idx: usize, now: Tick, config: &GameConfig) -> bool {
        let Some(letter) = self.letters.get_mut(idx) else {
            return false;
        };
        let size = config.preview_size();
        letter.pos.x = letter.pos.x.clamp(0.0, (config.world_width - size).max(0.0));
        letter.pos.y = letter.pos.y.clamp(0.0, (config.world_height - size).max(0.0));
        if letter.is_normal() {
            letter.base_vel = letter.vel;
        }
        letter.vel = letter.base_vel * config.preview_speed_factor;
        letter.state = LetterState::Previewed {
            expires_at: now + config.preview_duration(),
        };
        true
    }

    /// Lets a placed letter drift again so a repeated letter can reuse it.
    /// The buffer keeps the character it already wrote.
    pub fn release_placed(&mut self, idx: usize) -> bool {
        let Some(letter) = self.letters.get_mut(idx) else {
            return false;
        };
        if !matches!(letter.state, LetterState::Placed { .. }) {
            return false;
        }
        letter.state = LetterState::Normal;
        true
    }

    pub fn begin_animation(&mut self, idx: usize, slot: usize) -> bool {
        let Some(letter) = self.letters.get_mut(idx) else {
            return false;
        };
        letter.state = LetterState::AnimatingToSlot { slot };
        true
    }
}

impl Default for Swarm {
    fn default() -> Self {
        Self::new()
    }
}

fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let range = config::COLOR_CHANNEL_MIN..=config::COLOR_CHANNEL_MAX;
    Rgb::new(
        rng.gen_range(range.clone()),
        rng.gen_range(range.clone()),
        rng.gen_range(range),
    )
}

pub fn is_full_alphabet(swarm: &Swarm) -> bool {
    swarm.len() == ALPHABET_LEN
        && swarm
            .iter()
            .enumerate()
            .all(|(idx, letter)| alphabet_index(letter.glyph) == Some(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn seeded_swarm() -> (Swarm, StdRng, GameConfig) {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut swarm = Swarm::new();
        swarm.reset_all(&mut rng, &config);
        (swarm, rng, config)
    }

    mod new {
        use super::*;

        #[test]
        fn holds_one_letter_per_alphabet_symbol() {
            let swarm = Swarm::new();
            assert!(is_full_alphabet(&swarm));
            assert_eq!(swarm.letter('c').map(|l| l.glyph), Some('C'));
            assert_eq!(swarm.indices_of('z'), vec![25]);
        }
    }

    mod reset_all {
        use super::*;

        #[test]
        fn every_letter_is_normal_with_timers_cleared() {
            let (mut swarm, mut rng, config) = seeded_swarm();
            swarm.begin_preview(2, Tick::from_millis(10), &config);
            swarm.begin_animation(3, 0);
            swarm.get_mut(4).unwrap().flash_until = Some(Tick::from_millis(900));

            swarm.reset_all(&mut rng, &config);

            for letter in swarm.iter() {
                assert_eq!(letter.state, LetterState::Normal);
                assert_eq!(letter.preview_expiry(), None);
                assert_eq!(letter.target_slot(), None);
                assert_eq!(letter.flash_until, None);
            }
        }

        #[test]
        fn positions_speeds_and_colors_are_in_range() {
            let (swarm, _, config) = seeded_swarm();
            for letter in swarm.iter() {
                assert!(letter.pos.x >= 0.0 && letter.pos.x <= config.world_width - config.letter_size);
                assert!(letter.pos.y >= 0.0 && letter.pos.y <= config.world_height - config.letter_size);
                let speed = letter.vel.length();
                assert!(speed >= config::MIN_SPEED - 1e-4 && speed <= config.max_speed + 1e-4);
                assert_eq!(letter.vel, letter.base_vel);
                for channel in [letter.color.r, letter.color.g, letter.color.b] {
                    assert!((config::COLOR_CHANNEL_MIN..=config::COLOR_CHANNEL_MAX).contains(&channel));
                }
            }
        }
    }

    mod begin_preview {
        use super::*;

        #[test]
        fn slows_down_and_sets_expiry() {
            let (mut swarm, _, config) = seeded_swarm();
            let before = swarm.get(0).unwrap().vel;
            swarm.begin_preview(0, Tick::from_millis(1_000), &config);
            let letter = swarm.get(0).unwrap();
            assert_eq!(letter.preview_expiry(), Some(Tick::from_millis(4_000)));
            assert_eq!(letter.vel, before * config.preview_speed_factor);
            assert_eq!(letter.base_vel, before);
        }

        #[test]
        fn clamps_enlarged_box_on_screen() {
            let (mut swarm, _, config) = seeded_swarm();
            swarm.get_mut(1).unwrap().pos = Vec2::new(config.world_width - 10.0, config.world_height - 10.0);
            swarm.begin_preview(1, Tick::ZERO, &config);
            let pos = swarm.get(1).unwrap().pos;
            assert_eq!(pos.x, config.world_width - config.preview_size());
            assert_eq!(pos.y, config.world_height - config.preview_size());
        }
    }

    mod revert_preview {
        use super::*;

        #[test]
        fn restores_pre_preview_speed() {
            let (mut swarm, _, config) = seeded_swarm();
            let before = swarm.get(5).unwrap().vel;
            swarm.begin_preview(5, Tick::ZERO, &config);
            assert!(swarm.revert_preview(5));
            let letter = swarm.get(5).unwrap();
            assert_eq!(letter.state, LetterState::Normal);
            assert_eq!(letter.vel, before);
        }

        #[test]
        fn keeps_direction_after_bounce_while_previewed() {
            let (mut swarm, _, config) = seeded_swarm();
            swarm.get_mut(6).unwrap().vel = Vec2::new(1.5, -1.0);
            swarm.begin_preview(6, Tick::ZERO, &config);
            swarm.get_mut(6).unwrap().vel.x *= -1.0;
            swarm.revert_preview(6);
            assert_eq!(swarm.get(6).unwrap().vel, Vec2::new(-1.5, -1.0));
        }

        #[test]
        fn ignores_letters_not_previewed() {
            let (mut swarm, _, _) = seeded_swarm();
            swarm.begin_animation(7, 1);
            assert!(!swarm.revert_preview(7));
            assert_eq!(swarm.get(7).unwrap().target_slot(), Some(1));
        }
    }

    mod release_placed {
        use super::*;

        #[test]
        fn only_placed_letters_are_freed() {
            let (mut swarm, _, _) = seeded_swarm();
            swarm.get_mut(19).unwrap().state = LetterState::Placed { slot: 0 };
            assert!(swarm.release_placed(19));
            assert!(swarm.get(19).unwrap().is_normal());

            swarm.begin_animation(4, 2);
            assert!(!swarm.release_placed(4));
            assert_eq!(swarm.get(4).unwrap().target_slot(), Some(2));
        }
    }
}
