use std::ops::{Add, AddAssign, Mul, Sub};
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_angle(angle: f32, length: f32) -> Self {
        Self::new(angle.cos() * length, angle.sin() * length)
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::ZERO
        }
    }

    /// Magnitudes of `self` with the signs of `direction`, per axis.
    pub fn with_signs_of(self, direction: Vec2) -> Vec2 {
        Vec2::new(
            self.x.abs().copysign(direction.x),
            self.y.abs().copysign(direction.y),
        )
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Milliseconds since the game clock started. Sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tick(pub u64);

impl Tick {
    #[cfg(test)]
    pub const ZERO: Tick = Tick(0);

    pub fn from_millis(ms: u64) -> Self {
        Tick(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: Tick) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Tick {
    type Output = Tick;

    fn add(self, rhs: Duration) -> Tick {
        let ms = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Tick(self.0.saturating_add(ms))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const ALPHABET_LEN: usize = 26;
pub const PLACEHOLDER: char = '_';

/// Index 0..26 of an ASCII letter, case-insensitive.
pub fn alphabet_index(ch: char) -> Option<usize> {
    if ch.is_ascii_alphabetic() {
        Some((ch.to_ascii_uppercase() as u8 - b'A') as usize)
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LetterState {
    Normal,
    Previewed { expires_at: Tick },
    AnimatingToSlot { slot: usize },
    Placed { slot: usize },
}

#[derive(Clone, Debug)]
pub struct Letter {
    pub glyph: char,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Velocity to restore when a preview ends.
    pub base_vel: Vec2,
    pub color: Rgb,
    pub state: LetterState,
    pub flash_until: Option<Tick>,
}

impl Letter {
    pub fn new(glyph: char) -> Self {
        Self {
            glyph,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            base_vel: Vec2::ZERO,
            color: Rgb::default(),
            state: LetterState::Normal,
            flash_until: None,
        }
    }

    pub fn is_normal(&self) -> bool {
        self.state == LetterState::Normal
    }

    pub fn is_previewed(&self) -> bool {
        matches!(self.state, LetterState::Previewed { .. })
    }

    pub fn preview_expiry(&self) -> Option<Tick> {
        match self.state {
            LetterState::Previewed { expires_at } => Some(expires_at),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn target_slot(&self) -> Option<usize> {
        match self.state {
            LetterState::AnimatingToSlot { slot } => Some(slot),
            _ => None,
        }
    }

    pub fn is_flashing(&self, now: Tick) -> bool {
        self.flash_until.is_some_and(|until| until > now)
    }
}
