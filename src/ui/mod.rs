use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tracing::{debug, info};

use crate::{
    audio::SoundBank,
    config::{self, GameConfig},
    core::{BannerKind, GameWorld},
    error::GameError,
    layout::{Monospace, TextRowLayout},
    render::{self, ColorId, FrameBuffer, Projection, Viewport},
    session::{Player, Standing},
    types::Tick,
    words::WordList,
};

pub struct Settings {
    pub config: GameConfig,
    pub words: WordList,
    pub sounds: SoundBank,
    pub seed: Option<u64>,
}

pub fn run(settings: Settings) -> Result<(), GameError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, settings);
    shutdown_terminal(&mut terminal)?;
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: Settings,
) -> Result<(), GameError> {
    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame_interval = settings.config.frame_interval();
    let mut app = App::new(settings.config, settings.words, settings.sounds, rng);
    let mut framebuf = FrameBuffer::new(0, 0);
    let clock = Instant::now();

    loop {
        let frame_start = Instant::now();
        let now = Tick::from_millis(u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX));

        let mut keys = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let CrosstermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    keys.push(key);
                }
            }
        }
        if keys.iter().any(is_interrupt) {
            info!("interrupted");
            return Ok(());
        }
        for key in keys {
            if let Flow::Quit = app.on_key(key, now) {
                info!("quit from menu");
                return Ok(());
            }
        }

        app.update(now);
        terminal.draw(|frame| app.draw(frame, &mut framebuf, now))?;

        let spent = frame_start.elapsed();
        if spent < frame_interval {
            std::thread::sleep(frame_interval - spent);
        }
    }
}

fn shutdown_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), GameError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Single,
    TwoPlayer,
}

impl Mode {
    fn players(self) -> usize {
        match self {
            Mode::Single => 1,
            Mode::TwoPlayer => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    NameEntry,
    Leaderboard,
    Quit,
}

struct MenuItem {
    label: &'static str,
    target: Target,
    mode: Option<Mode>,
}

const MENU: [MenuItem; 4] = [
    MenuItem {
        label: "1 Player",
        target: Target::NameEntry,
        mode: Some(Mode::Single),
    },
    MenuItem {
        label: "2 Players",
        target: Target::NameEntry,
        mode: Some(Mode::TwoPlayer),
    },
    MenuItem {
        label: "Leaderboard",
        target: Target::Leaderboard,
        mode: None,
    },
    MenuItem {
        label: "Quit",
        target: Target::Quit,
        mode: None,
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Menu,
    NameEntry,
    Playing,
    GameOver,
    Leaderboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// A finished match, kept for the session's leaderboard.
#[derive(Clone, Debug)]
struct MatchResult {
    players: Vec<Player>,
}

struct App {
    config: GameConfig,
    words: WordList,
    sounds: SoundBank,
    rng: StdRng,
    screen: Screen,
    menu_index: usize,
    mode: Mode,
    names: Vec<String>,
    name_input: String,
    world: Option<GameWorld>,
    results: Vec<MatchResult>,
    layout: TextRowLayout<Monospace>,
}

impl App {
    fn new(config: GameConfig, words: WordList, sounds: SoundBank, rng: StdRng) -> Self {
        let layout = TextRowLayout::new(
            config.world_width / 2.0,
            config::WORD_ROW_Y,
            Monospace {
                cell_width: config.world_width / 80.0,
            },
        );
        Self {
            config,
            words,
            sounds,
            rng,
            screen: Screen::Menu,
            menu_index: 0,
            mode: Mode::Single,
            names: Vec::new(),
            name_input: String::new(),
            world: None,
            results: Vec::new(),
            layout,
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Tick) -> Flow {
        match self.screen {
            Screen::Menu => return self.on_menu_key(key),
            Screen::NameEntry => self.on_name_key(key, now),
            Screen::Playing => self.on_playing_key(key, now),
            Screen::GameOver => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.finish_match();
                }
            }
            Screen::Leaderboard => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.screen = Screen::Menu;
                }
            }
        }
        Flow::Continue
    }

    fn on_menu_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Up => {
                self.menu_index = (self.menu_index + MENU.len() - 1) % MENU.len();
            }
            KeyCode::Down => {
                self.menu_index = (self.menu_index + 1) % MENU.len();
            }
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Enter => {
                let item = &MENU[self.menu_index];
                match item.target {
                    Target::NameEntry => {
                        self.mode = item.mode.unwrap_or(Mode::Single);
                        self.names.clear();
                        self.name_input.clear();
                        self.screen = Screen::NameEntry;
                    }
                    Target::Leaderboard => self.screen = Screen::Leaderboard,
                    Target::Quit => return Flow::Quit,
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn on_name_key(&mut self, key: KeyEvent, now: Tick) {
        match key.code {
            KeyCode::Esc => self.screen = Screen::Menu,
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Enter => {
                let name = self.name_input.trim();
                let name = if name.is_empty() {
                    format!("Player {}", self.names.len() + 1)
                } else {
                    name.to_string()
                };
                self.names.push(name);
                self.name_input.clear();
                if self.names.len() >= self.mode.players() {
                    self.start_match(now);
                }
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() && self.name_input.chars().count() < config::NAME_MAX_LEN {
                    self.name_input.push(ch);
                }
            }
            _ => {}
        }
    }

    fn on_playing_key(&mut self, key: KeyEvent, now: Tick) {
        let Some(world) = self.world.as_mut() else {
            self.screen = Screen::Menu;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                info!("match abandoned");
                self.world = None;
                self.screen = Screen::Menu;
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                world.handle_key(ch, now);
            }
            _ => {}
        }
    }

    fn start_match(&mut self, now: Tick) {
        let players = self.names.iter().map(Player::new).collect();
        let rng = StdRng::seed_from_u64(self.rng.next_u64());
        info!(players = ?self.names, "match started");
        self.world = Some(GameWorld::new(
            self.config.clone(),
            self.words.clone(),
            players,
            rng,
            now,
        ));
        self.screen = Screen::Playing;
    }

    fn finish_match(&mut self) {
        if let Some(world) = self.world.take() {
            self.results.push(MatchResult {
                players: world.turns().players().to_vec(),
            });
        }
        self.screen = Screen::Menu;
    }

    fn update(&mut self, now: Tick) {
        if self.screen != Screen::Playing {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };
        world.tick(now, &self.layout);
        for cue in world.drain_cues() {
            debug!(?cue, "cue");
            self.sounds.play(cue);
        }
        if world.is_finished() {
            self.screen = Screen::GameOver;
        }
    }

    fn draw(&mut self, frame: &mut Frame, framebuf: &mut FrameBuffer, now: Tick) {
        match self.screen {
            Screen::Menu => self.draw_menu(frame),
            Screen::NameEntry => self.draw_name_entry(frame),
            Screen::Playing => self.draw_playing(frame, framebuf, now),
            Screen::GameOver => self.draw_game_over(frame),
            Screen::Leaderboard => self.draw_leaderboard(frame),
        }
    }

    fn draw_menu(&self, frame: &mut Frame) {
        let mut lines = vec![Line::from(""), Line::from("Catch the letters, spell the word."), Line::from("")];
        for (idx, item) in MENU.iter().enumerate() {
            let style = if idx == self.menu_index {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format!("  {}  ", item.label), style)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("↑↓: move | Enter: select | Esc: quit"));
        let menu = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Alphabet Swarm"));
        frame.render_widget(menu, frame.size());
    }

    fn draw_name_entry(&self, frame: &mut Frame) {
        let player = self.names.len() + 1;
        let lines = vec![
            Line::from(""),
            Line::from(format!("Player {player}, enter your name:")),
            Line::from(""),
            Line::from(Span::styled(
                format!("{}_", self.name_input),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Enter: accept | Backspace: delete | Esc: back"),
        ];
        let entry = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Name"));
        frame.render_widget(entry, frame.size());
    }

    fn draw_playing(&mut self, frame: &mut Frame, framebuf: &mut FrameBuffer, now: Tick) {
        let Some(world) = self.world.as_ref() else {
            return;
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(frame.size());

        let header = Paragraph::new(Line::from(score_spans(world))).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Alphabet Swarm"),
        );
        frame.render_widget(header, chunks[0]);

        let block = Block::default().borders(Borders::ALL).title("Swarm");
        let inner = block.inner(chunks[1]);
        let viewport = Viewport {
            width: inner.width,
            height: inner.height,
        };
        let projection = Projection::new(world.config(), viewport);
        self.layout.metrics.cell_width = projection.cell_width();
        render::draw(world, &self.layout, now, viewport, framebuf);
        frame.render_widget(Paragraph::new(framebuffer_lines(framebuf)).block(block), chunks[1]);

        if let Some(banner) = world.banner(now) {
            let area = centered(chunks[1], banner.text.chars().count() as u16 + 4, 3);
            let color = match banner.kind {
                BannerKind::Success => Color::Green,
                BannerKind::Failure => Color::Red,
                BannerKind::Info => Color::Yellow,
            };
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(banner.text.as_str())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                    .block(Block::default().borders(Borders::ALL)),
                area,
            );
        }

        let session = world.session();
        let clue = session.clue().map_or_else(
            || "Spell the word!".to_string(),
            |clue| format!("Clue: {clue}"),
        );
        let preview = world
            .selection()
            .glyph()
            .map_or_else(String::new, |glyph| format!(" | previewing {glyph}"));
        let footer = Paragraph::new(format!(
            "{clue} | hints left: {}{preview} | letter: press to preview, again to confirm | Esc: menu",
            session.hints_left(world.config()),
        ))
        .block(Block::default().borders(Borders::ALL).title("Controls"));
        frame.render_widget(footer, chunks[2]);
    }

    fn draw_game_over(&self, frame: &mut Frame) {
        let Some(world) = self.world.as_ref() else {
            return;
        };
        let players = world.turns().players();
        let mut lines = vec![Line::from(""), Line::from("Game Over"), Line::from("")];
        for player in players {
            lines.push(Line::from(format!("{}: {}", player.name, player.score)));
        }
        lines.push(Line::from(""));
        let verdict = match world.turns().standing() {
            Standing::Winner(idx) if players.len() > 1 => format!("{} wins!", players[idx].name),
            Standing::Winner(_) => "Well played!".to_string(),
            Standing::Tie => "It's a tie!".to_string(),
        };
        lines.push(Line::from(Span::styled(
            verdict,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from("Enter: back to menu"));
        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Results"));
        frame.render_widget(body, frame.size());
    }

    fn draw_leaderboard(&self, frame: &mut Frame) {
        let mut lines = vec![Line::from(""), Line::from("This session's matches"), Line::from("")];
        if self.results.is_empty() {
            lines.push(Line::from("No matches yet."));
        }
        for (idx, result) in self.results.iter().enumerate() {
            let scores: Vec<String> = result
                .players
                .iter()
                .map(|p| format!("{} {}", p.name, p.score))
                .collect();
            lines.push(Line::from(format!("#{}  {}", idx + 1, scores.join("  vs  "))));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Enter: back"));
        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Leaderboard"));
        frame.render_widget(body, frame.size());
    }
}

fn score_spans(world: &GameWorld) -> Vec<Span<'static>> {
    let turns = world.turns();
    let mut spans = Vec::new();
    for (idx, player) in turns.players().iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" | "));
        }
        let text = format!("{}: {}", player.name, player.score);
        if idx == turns.active_index() {
            spans.push(Span::styled(
                format!("▶ {text}"),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(text));
        }
    }
    let active = turns.active();
    let round = (active.words_played + 1).min(turns.rounds());
    spans.push(Span::raw(format!("   round {round}/{}", turns.rounds())));
    spans
}

fn framebuffer_lines(framebuf: &FrameBuffer) -> Vec<Line<'static>> {
    (0..framebuf.height())
        .map(|y| {
            let spans: Vec<Span> = (0..framebuf.width())
                .map(|x| {
                    let cell = framebuf.get(x, y);
                    let mut style = Style::default().fg(color_for(cell.color));
                    if cell.bold {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    Span::styled(cell.ch.to_string(), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn color_for(color: ColorId) -> Color {
    match color {
        ColorId::Base(rgb) => Color::Rgb(rgb.r, rgb.g, rgb.b),
        ColorId::Success => Color::Green,
        ColorId::Failure => Color::Red,
        ColorId::Text => Color::White,
        ColorId::Dim => Color::Gray,
        ColorId::Frame => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::{WordEntry, WordList};

    fn app() -> App {
        let words = WordList::from_sources(vec![WordEntry::parse("cat").unwrap()], &[]).unwrap();
        App::new(
            GameConfig::default(),
            words,
            SoundBank::silent(),
            StdRng::seed_from_u64(1),
        )
    }

    fn press(app: &mut App, code: KeyCode) -> Flow {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE), Tick::ZERO)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    mod menu {
        use super::*;

        #[test]
        fn arrows_wrap_around() {
            let mut app = app();
            press(&mut app, KeyCode::Up);
            assert_eq!(app.menu_index, MENU.len() - 1);
            press(&mut app, KeyCode::Down);
            assert_eq!(app.menu_index, 0);
        }

        #[test]
        fn quit_entry_and_escape_quit() {
            let mut app = app();
            assert_eq!(press(&mut app, KeyCode::Esc), Flow::Quit);
            app.menu_index = 3;
            assert_eq!(press(&mut app, KeyCode::Enter), Flow::Quit);
        }

        #[test]
        fn leaderboard_round_trip() {
            let mut app = app();
            app.menu_index = 2;
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.screen, Screen::Leaderboard);
            press(&mut app, KeyCode::Esc);
            assert_eq!(app.screen, Screen::Menu);
        }
    }

    mod name_entry {
        use super::*;

        #[test]
        fn single_player_starts_after_one_name() {
            let mut app = app();
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.screen, Screen::NameEntry);
            type_text(&mut app, "Adaa");
            press(&mut app, KeyCode::Backspace);
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.screen, Screen::Playing);
            let world = app.world.as_ref().unwrap();
            assert_eq!(world.turns().active().name, "Ada");
        }

        #[test]
        fn two_players_get_default_names() {
            let mut app = app();
            app.menu_index = 1;
            press(&mut app, KeyCode::Enter);
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.screen, Screen::NameEntry);
            press(&mut app, KeyCode::Enter);
            let names: Vec<&str> = app
                .world
                .as_ref()
                .unwrap()
                .turns()
                .players()
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            assert_eq!(names, vec!["Player 1", "Player 2"]);
        }

        #[test]
        fn names_are_capped() {
            let mut app = app();
            press(&mut app, KeyCode::Enter);
            type_text(&mut app, "abcdefghijklmnopqrstuvwxyz");
            assert_eq!(app.name_input.chars().count(), config::NAME_MAX_LEN);
        }
    }

    mod playing {
        use super::*;

        fn playing_app() -> App {
            let mut app = app();
            press(&mut app, KeyCode::Enter);
            press(&mut app, KeyCode::Enter);
            app
        }

        #[test]
        fn letters_reach_the_game() {
            let mut app = playing_app();
            press(&mut app, KeyCode::Char('c'));
            press(&mut app, KeyCode::Char('c'));
            assert_eq!(app.world.as_ref().unwrap().session().cursor(), 1);
        }

        #[test]
        fn escape_abandons_match() {
            let mut app = playing_app();
            press(&mut app, KeyCode::Esc);
            assert_eq!(app.screen, Screen::Menu);
            assert!(app.world.is_none());
            assert!(app.results.is_empty());
        }

        #[test]
        fn finished_match_lands_on_leaderboard() {
            let mut app = playing_app();
            let rounds = app.config.rounds_per_player as u64;
            for round in 0..rounds {
                let t = round * 3_000;
                for (i, ch) in "cat".chars().enumerate() {
                    let at = Tick::from_millis(t + i as u64 * 10);
                    app.on_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE), at);
                    app.on_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE), at);
                }
                app.update(Tick::from_millis(t + 2_500));
            }
            assert_eq!(app.screen, Screen::GameOver);
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.screen, Screen::Menu);
            assert_eq!(app.results.len(), 1);
            assert_eq!(app.results[0].players[0].score, 60 * rounds as u32);
        }
    }

    mod centered_fn {
        use super::*;

        #[test]
        fn clamps_to_area() {
            let area = Rect::new(2, 3, 10, 4);
            let rect = centered(area, 20, 3);
            assert_eq!(rect, Rect::new(2, 3, 10, 3));
        }
    }
}
