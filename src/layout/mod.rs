use crate::types::Vec2;

/// Maps a slot of the word display to the world coordinate a letter should
/// come to rest at. `None` means the slot cannot be placed (out of range).
pub trait SlotLayout {
    fn slot_position(&self, buffer: &[char], slot: usize) -> Option<Vec2>;
}

pub trait GlyphMetrics {
    fn advance(&self, ch: char) -> f32;
}

/// Every glyph occupies one terminal cell.
#[derive(Clone, Copy, Debug)]
pub struct Monospace {
    pub cell_width: f32,
}

impl GlyphMetrics for Monospace {
    fn advance(&self, _ch: char) -> f32 {
        self.cell_width
    }
}

/// Lays the buffer out as "C A _", centered on `center_x` at `row_y`.
/// Positions are the left edge of each glyph, matching how letters anchor.
#[derive(Clone, Copy, Debug)]
pub struct TextRowLayout<M> {
    pub center_x: f32,
    pub row_y: f32,
    pub metrics: M,
}

impl<M: GlyphMetrics> TextRowLayout<M> {
    pub fn new(center_x: f32, row_y: f32, metrics: M) -> Self {
        Self {
            center_x,
            row_y,
            metrics,
        }
    }

    pub fn row_width(&self, buffer: &[char]) -> f32 {
        let glyphs: f32 = buffer.iter().map(|&ch| self.metrics.advance(ch)).sum();
        let gaps = buffer.len().saturating_sub(1) as f32 * self.metrics.advance(' ');
        glyphs + gaps
    }
}

impl<M: GlyphMetrics> SlotLayout for TextRowLayout<M> {
    fn slot_position(&self, buffer: &[char], slot: usize) -> Option<Vec2> {
        if slot >= buffer.len() {
            return None;
        }
        let start = self.center_x - self.row_width(buffer) / 2.0;
        let space = self.metrics.advance(' ');
        let offset: f32 = buffer[..slot]
            .iter()
            .map(|&ch| self.metrics.advance(ch) + space)
            .sum();
        Some(Vec2::new(start + offset, self.row_y))
    }
}
