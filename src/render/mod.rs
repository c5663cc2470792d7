use crate::{
    config::GameConfig,
    core::GameWorld,
    layout::SlotLayout,
    motion,
    types::{Letter, LetterState, PLACEHOLDER, Rgb, Tick, Vec2},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorId {
    Base(Rgb),
    Success,
    Failure,
    Text,
    Dim,
    Frame,
}

/// Draw order; higher layers win a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Empty,
    Frame,
    Swarm,
    Preview,
    Flying,
    WordRow,
}

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderCell {
    pub ch: char,
    pub layer: Layer,
    pub color: ColorId,
    pub bold: bool,
}

impl RenderCell {
    const BLANK: RenderCell = RenderCell {
        ch: ' ',
        layer: Layer::Empty,
        color: ColorId::Text,
        bold: false,
    };
}

#[derive(Debug)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<RenderCell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Self {
            width,
            height,
            cells: Vec::new(),
        };
        buffer.resize(width, height);
        buffer
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let len = (width as usize).saturating_mul(height as usize);
        self.cells.resize(len, RenderCell::BLANK);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.cells.fill(RenderCell::BLANK);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> RenderCell {
        debug_assert!(x < self.width && y < self.height, "get() out of bounds");
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[idx]
    }

    fn set(&mut self, x: i32, y: i32, ch: char, layer: Layer, color: ColorId, bold: bool) {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        let cell = &mut self.cells[idx];
        if layer >= cell.layer {
            *cell = RenderCell {
                ch,
                layer,
                color,
                bold,
            };
        }
    }
}

/// Maps world coordinates onto terminal cells.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    scale_x: f32,
    scale_y: f32,
}

impl Projection {
    pub fn new(config: &GameConfig, viewport: Viewport) -> Self {
        Self {
            scale_x: f32::from(viewport.width) / config.world_width,
            scale_y: f32::from(viewport.height) / config.world_height,
        }
    }

    pub fn cell(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x * self.scale_x).floor() as i32,
            (pos.y * self.scale_y).floor() as i32,
        )
    }

    /// World width of one terminal column.
    pub fn cell_width(&self) -> f32 {
        if self.scale_x > 0.0 { 1.0 / self.scale_x } else { 0.0 }
    }
}

pub fn draw(
    world: &GameWorld,
    layout: &dyn SlotLayout,
    now: Tick,
    viewport: Viewport,
    frame: &mut FrameBuffer,
) {
    if frame.width() != viewport.width || frame.height() != viewport.height {
        frame.resize(viewport.width, viewport.height);
    } else {
        frame.clear();
    }
    let config = world.config();
    let projection = Projection::new(config, viewport);

    for letter in world.swarm().iter() {
        let color = letter_color(letter, now);
        match letter.state {
            LetterState::Placed { .. } => {}
            LetterState::Previewed { .. } => {
                draw_preview(letter, color, config, &projection, frame);
            }
            LetterState::AnimatingToSlot { .. } => {
                let (x, y) = projection.cell(letter.pos);
                frame.set(x, y, letter.glyph, Layer::Flying, color, true);
            }
            LetterState::Normal => {
                let (x, y) = projection.cell(letter.pos);
                frame.set(x, y, letter.glyph, Layer::Swarm, color, false);
            }
        }
    }

    let buffer = world.session().buffer();
    for (slot, &ch) in buffer.iter().enumerate() {
        let Some(pos) = layout.slot_position(buffer, slot) else {
            continue;
        };
        let (x, y) = projection.cell(pos);
        let color = if ch == PLACEHOLDER {
            ColorId::Dim
        } else {
            ColorId::Text
        };
        frame.set(x, y, ch, Layer::WordRow, color, true);
    }
}

fn draw_preview(
    letter: &Letter,
    color: ColorId,
    config: &GameConfig,
    projection: &Projection,
    frame: &mut FrameBuffer,
) {
    let size = motion::draw_size(letter, config);
    let (x0, y0) = projection.cell(letter.pos);
    let (x1, y1) = projection.cell(letter.pos + Vec2::new(size, size));
    let x1 = (x1 - 1).max(x0);
    let y1 = (y1 - 1).max(y0);
    for x in x0..=x1 {
        frame.set(x, y0, '·', Layer::Frame, ColorId::Frame, false);
        frame.set(x, y1, '·', Layer::Frame, ColorId::Frame, false);
    }
    for y in y0..=y1 {
        frame.set(x0, y, '·', Layer::Frame, ColorId::Frame, false);
        frame.set(x1, y, '·', Layer::Frame, ColorId::Frame, false);
    }
    let cx = (x0 + x1) / 2;
    let cy = (y0 + y1) / 2;
    frame.set(cx, cy, letter.glyph, Layer::Preview, color, true);
}

/// Flying letters are always green; a live flash turns anything else red.
pub fn letter_color(letter: &Letter, now: Tick) -> ColorId {
    match letter.state {
        LetterState::AnimatingToSlot { .. } => ColorId::Success,
        _ if letter.is_flashing(now) => ColorId::Failure,
        _ => ColorId::Base(letter.color),
    }
}
