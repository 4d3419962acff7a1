mod constants;
mod entities;
mod error;
mod game;
mod hiscore;
mod pool;
mod rendering;
mod terminal_io;
mod types;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    style::Color,
    terminal::{disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{DEFAULT_DEBUG_FRAMES, DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, DEFAULT_HISCORE_NAME};
use crate::error::GameError;
use crate::game::{Flow, Game, GameState};
use crate::hiscore::HiscoreTable;
use crate::rendering::{GameGrid, OutputTarget, ScreenBuffer};
use crate::terminal_io::{EventSource, SimulatedInput, TerminalInput};
use crate::types::Bounds;

const DEBUG_COLUMNS: u16 = 80;
const DEBUG_ROWS: u16 = 24;

const TITLE_ART: [&str; 4] = [
    r" ___ ___ _    ___ _____ ___  ___   ___ _  __",
    r"/ __| _ \ |  |_ _|_   _| _ \/ _ \ / __| |/ /",
    r"\__ \  _/ |__ | |  | | |   / (_) | (__| ' < ",
    r"|___/_| |____|___| |_| |_|_\\___/ \___|_|\_\",
];

const CONTROLS_TEXT: [&str; 5] = [
    "Up Arrow    : Thrust",
    "Left Arrow  : Rotate Left",
    "Right Arrow : Rotate Right",
    "Spacebar    : Fire",
    "q / Esc     : Quit",
];

#[derive(Parser, Debug)]
#[command(name = "splitrock")]
#[command(about = "Shoot the rocks, dodge the pieces")]
struct Cli {
    /// Display width in virtual pixels
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Display height in virtual pixels
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Play on the terminal's alternate screen
    #[arg(long)]
    fullscreen: bool,

    /// Run a scripted game headless, logging every frame
    #[arg(long)]
    debug: bool,

    /// Frames to simulate with --debug
    #[arg(long, default_value_t = DEFAULT_DEBUG_FRAMES)]
    max_frames: u64,

    /// Seed for the asteroid field and splits
    #[arg(long)]
    seed: Option<u64>,

    /// Name recorded with a high score
    #[arg(long, default_value = DEFAULT_HISCORE_NAME)]
    name: String,

    #[arg(long, default_value = "highscore.rec")]
    hiscore: PathBuf,

    #[arg(long, default_value = "splitrock.log")]
    log_file: PathBuf,
}

impl Cli {
    fn display_bounds(&self) -> Bounds {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Bounds::new(width as f64, height as f64),
            _ => Bounds::new(DEFAULT_DISPLAY_WIDTH, DEFAULT_DISPLAY_HEIGHT),
        }
    }
}

struct Screen<'a> {
    target: &'a mut OutputTarget,
    grid: GameGrid,
    // Name shown in the game-over standings
    player: &'a str,
}

impl Screen<'_> {
    fn clear(&mut self) -> io::Result<()> {
        self.grid.clear_screen_manual(self.target).map_err(|e| { error!("Failed to clear screen: {}", e); e })?;
        self.target.flush()
    }

    fn show_title(&mut self) -> io::Result<()> {
        self.grid.clear();
        let top = (self.grid.height / 2).saturating_sub(TITLE_ART.len() as u16);
        for (i, line) in TITLE_ART.iter().enumerate() {
            self.grid.write_centered(top + i as u16, line, Color::Cyan);
        }
        self.grid.write_centered(self.grid.height.saturating_sub(5), "Press any key to start...", Color::White);
        self.present()?;
        info!("Title screen displayed. Waiting for key press.");
        Ok(())
    }

    fn redraw<R: Rng>(&mut self, game: &Game<R>, hiscores: &HiscoreTable) -> io::Result<()> {
        self.grid.clear();
        game.draw(&mut self.grid);
        self.draw_hud(game, hiscores);
        self.present()
    }

    fn draw_hud<R: Rng>(&mut self, game: &Game<R>, hiscores: &HiscoreTable) {
        let grid = &mut self.grid;
        grid.write_text(0, 1, &format!("Lives: {}", game.ship().lives.max(0)), Color::White);

        let controls_top = grid.height.saturating_sub(CONTROLS_TEXT.len() as u16);
        for (i, line) in CONTROLS_TEXT.iter().enumerate() {
            grid.write_text(0, controls_top + i as u16, line, Color::DarkGrey);
        }

        if game.state() == GameState::GameOver {
            // Standings as they will be once this score is recorded.
            let mut standings = hiscores.clone();
            let rank = standings.submit(game.score(), self.player);
            let lines = standings.lines();
            let top = (grid.height / 2).saturating_sub(lines.len() as u16 / 2 + 3);
            grid.write_centered(top, "GAME OVER!", Color::Red);
            grid.write_centered(top + 1, &format!("Final {}", game.score_text()), Color::White);
            for (i, line) in lines.iter().enumerate() {
                let color = if rank == Some(i) { Color::Green } else { Color::Yellow };
                grid.write_centered(top + 3 + i as u16, line, color);
            }
            grid.write_centered(top + 4 + lines.len() as u16, "Press q to exit", Color::White);
        }
    }

    fn present(&mut self) -> io::Result<()> {
        self.grid.render(self.target).map_err(|e| { error!("Failed to render game grid: {}", e); e })?;
        self.target.flush().map_err(|e| { error!("Failed to flush stdout after rendering: {}", e); e })?;
        if let OutputTarget::ScreenBuffer(sb) = &mut *self.target {
            sb.print_to_log();
        }
        Ok(())
    }
}

/// Feeds event batches into the game, redrawing at most once per batch.
fn play<R: Rng>(
    game: &mut Game<R>,
    input: &mut dyn EventSource,
    screen: &mut Screen<'_>,
    hiscores: &HiscoreTable,
) -> Result<(), GameError> {
    screen.redraw(game, hiscores)?;
    game.take_dirty();
    loop {
        let batch = input.next_batch()?;
        for event in batch {
            if game.handle_event(event) == Flow::Quit {
                info!("Quit requested on frame {}", game.frame());
                return Ok(());
            }
        }
        if game.take_dirty() {
            screen.redraw(game, hiscores)?;
        }
    }
}

fn run_debug<R: Rng>(cli: &Cli, bounds: Bounds, rng: R, hiscores: &HiscoreTable) -> Result<u32, GameError> {
    info!("Debug mode enabled, simulating {} frames at {}x{}", cli.max_frames, DEBUG_COLUMNS, DEBUG_ROWS);
    let mut target = OutputTarget::ScreenBuffer(ScreenBuffer::new(DEBUG_COLUMNS, DEBUG_ROWS));
    let mut screen = Screen {
        target: &mut target,
        grid: GameGrid::new(DEBUG_COLUMNS, DEBUG_ROWS, bounds),
        player: &cli.name,
    };
    let mut game = Game::new(bounds, rng);
    let mut input = SimulatedInput::demo(cli.max_frames);
    play(&mut game, &mut input, &mut screen, hiscores)?;
    info!(
        "Debug run ended after {} scripted frames with {} asteroids and {} blasts live",
        input.current_frame(),
        game.asteroids().len(),
        game.blasts().len()
    );
    Ok(game.score())
}

fn run_terminal<R: Rng>(cli: &Cli, bounds: Bounds, rng: R, hiscores: &HiscoreTable) -> Result<u32, GameError> {
    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
    let reports_release = supports_keyboard_enhancement().unwrap_or(false);
    info!("Raw mode enabled, key release reports: {}", reports_release);

    let mut target = OutputTarget::Stdout(io::stdout());
    let result = play_in_terminal(cli, bounds, rng, hiscores, &mut target, reports_release);
    restore_terminal(&mut target, cli.fullscreen, reports_release);
    result
}

fn play_in_terminal<R: Rng>(
    cli: &Cli,
    bounds: Bounds,
    rng: R,
    hiscores: &HiscoreTable,
    target: &mut OutputTarget,
    reports_release: bool,
) -> Result<u32, GameError> {
    let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}, display {}x{}", width, height, bounds.width, bounds.height);

    if cli.fullscreen {
        target.execute_other_command(EnterAlternateScreen)?;
    }
    if reports_release {
        target.execute_other_command(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
    }
    target.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;

    let mut screen = Screen { target, grid: GameGrid::new(width, height, bounds), player: &cli.name };
    screen.clear()?;
    screen.show_title()?;
    wait_for_key()?;
    info!("Key pressed. Starting game loop.");
    screen.clear()?;

    let mut game = Game::new(bounds, rng);
    let mut input = TerminalInput::new(reports_release);
    play(&mut game, &mut input, &mut screen, hiscores)?;

    screen.clear()?;
    Ok(game.score())
}

fn wait_for_key() -> io::Result<()> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

// Best effort: a failure here must not hide the error that ended the game.
fn restore_terminal(target: &mut OutputTarget, fullscreen: bool, reports_release: bool) {
    if reports_release {
        if let Err(e) = target.execute_other_command(PopKeyboardEnhancementFlags) {
            error!("Failed to pop keyboard flags on exit: {}", e);
        }
    }
    if fullscreen {
        if let Err(e) = target.execute_other_command(LeaveAlternateScreen) {
            error!("Failed to leave alternate screen on exit: {}", e);
        }
    }
    if let Err(e) = target.reset_color().and_then(|_| target.execute_move_to(MoveTo(0, 0))) {
        error!("Failed to reset cursor on exit: {}", e);
    }
    if let Err(e) = target.execute_other_command(Show) {
        error!("Failed to show cursor on exit: {}", e);
    }
    if let Err(e) = disable_raw_mode() {
        error!("Failed to disable raw mode on exit: {}", e);
    }
}

fn run(cli: Cli) -> Result<(), GameError> {
    simple_logging::log_to_file(&cli.log_file, log::LevelFilter::Info)
        .map_err(|e| GameError::Logging(format!("{}: {}", cli.log_file.display(), e)))?;
    info!("Starting splitrock.");
    play_session(&cli)
}

fn play_session(cli: &Cli) -> Result<(), GameError> {
    let bounds = cli.display_bounds();
    let rng = match cli.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut hiscores = HiscoreTable::load_or_default(&cli.hiscore);
    let score = if cli.debug {
        run_debug(cli, bounds, rng, &hiscores)?
    } else {
        run_terminal(cli, bounds, rng, &hiscores)?
    };

    info!("Final score: {}", score);
    if cli.debug {
        info!("Scripted run, high scores left untouched");
        return Ok(());
    }
    record_score(&mut hiscores, score, cli);
    Ok(())
}

fn record_score(hiscores: &mut HiscoreTable, score: u32, cli: &Cli) {
    if let Some(rank) = hiscores.submit(score, &cli.name) {
        info!("New high score for {} at rank {}", cli.name, rank + 1);
    }
    if let Err(e) = hiscores.save(&cli.hiscore) {
        error!("Failed to save high scores: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("Exiting: {}", e);
        eprintln!("splitrock: {}", e);
        std::process::exit(1);
    }
}
