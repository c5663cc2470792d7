use tracing::trace;

use crate::{
    config::GameConfig,
    layout::SlotLayout,
    swarm::Swarm,
    types::{Letter, LetterState, Vec2},
};

/// Size of the box a letter occupies right now.
pub fn draw_size(letter: &Letter, config: &GameConfig) -> f32 {
    match letter.state {
        LetterState::Previewed { .. } => config.preview_size(),
        LetterState::Normal | LetterState::AnimatingToSlot { .. } | LetterState::Placed { .. } => {
            config.letter_size
        }
    }
}

/// Advances every letter one tick. The only side effect outside the swarm is
/// writing a letter into `buffer` when it lands on its slot.
pub fn integrate(
    swarm: &mut Swarm,
    buffer: &mut [char],
    layout: &dyn SlotLayout,
    config: &GameConfig,
) {
    for letter in swarm.iter_mut() {
        match letter.state {
            LetterState::Normal | LetterState::Previewed { .. } => {
                drift(letter, config);
            }
            LetterState::AnimatingToSlot { slot } => {
                let Some(target) = layout.slot_position(buffer, slot) else {
                    continue;
                };
                if seek(letter, target, config.animation_speed) {
                    letter.state = LetterState::Placed { slot };
                    if let Some(cell) = buffer.get_mut(slot) {
                        *cell = letter.glyph;
                    }
                    trace!(glyph = %letter.glyph, slot, "letter placed");
                }
            }
            LetterState::Placed { .. } => {
                letter.vel = Vec2::ZERO;
            }
        }
    }
}

fn drift(letter: &mut Letter, config: &GameConfig) {
    let size = draw_size(letter, config);
    letter.pos += letter.vel;
    reflect(
        &mut letter.pos.x,
        &mut letter.vel.x,
        (config.world_width - size).max(0.0),
    );
    reflect(
        &mut letter.pos.y,
        &mut letter.vel.y,
        (config.world_height - size).max(0.0),
    );
}

fn reflect(pos: &mut f32, vel: &mut f32, max: f32) {
    if *pos < 0.0 {
        *pos = 0.0;
        *vel = vel.abs();
    } else if *pos > max {
        *pos = max;
        *vel = -vel.abs();
    }
}

/// Constant-speed move toward `target`. Returns true once the letter snaps
/// onto it.
fn seek(letter: &mut Letter, target: Vec2, speed: f32) -> bool {
    let delta = target - letter.pos;
    if delta.length() < speed {
        letter.pos = target;
        letter.vel = Vec2::ZERO;
        return true;
    }
    letter.pos += delta.normalize() * speed;
    false
}
