use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    execute, queue,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::info;

use crate::types::{Bounds, Vector2D};

/// One line of an entity outline, in display (virtual pixel) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Vector2D,
    pub to: Vector2D,
    pub color: Color,
    pub thickness: f64,
}

/// Where the game submits what it wants on screen.
pub trait DrawSink {
    fn draw_segment(&mut self, segment: &Segment);

    /// Replaces the single on-screen counter message.
    fn replace_message(&mut self, message: &str);
}

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for y in 0..self.height {
            info!("{}", self.row(y));
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn set_color(&mut self, color: Color) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, SetForegroundColor(color)),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }

    pub fn reset_color(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, ResetColor),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Ignore in debug mode
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => sb.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

fn plot_bresenham_line<F: FnMut(i32, i32)>(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: F) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;
    loop {
        plot(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Character that best follows a line with the given cell-space slope.
fn line_char(dx: f64, dy: f64) -> char {
    if dy.abs() * 2.0 < dx.abs() {
        '-'
    } else if dx.abs() * 2.0 < dy.abs() {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', color: Color::Reset };
}

// --- GameGrid for geometric rendering ---
/// Character canvas covering the whole display; virtual pixels are scaled
/// onto terminal cells.
pub struct GameGrid {
    pub grid: Vec<Vec<Cell>>,
    pub width: u16,
    pub height: u16,
    display: Bounds,
    message: String,
}

impl GameGrid {
    pub fn new(width: u16, height: u16, display: Bounds) -> Self {
        GameGrid {
            grid: vec![vec![Cell::BLANK; width as usize]; height as usize],
            width,
            height,
            display,
            message: String::new(),
        }
    }

    pub fn to_cell(&self, point: Vector2D) -> (f64, f64) {
        (
            point.x * self.width as f64 / self.display.width,
            point.y * self.height as f64 / self.display.height,
        )
    }

    pub fn set_char(&mut self, x: i32, y: i32, ch: char, color: Color) {
        if x >= 0 && y >= 0 && (y as u16) < self.height && (x as u16) < self.width {
            self.grid[y as usize][x as usize] = Cell { ch, color };
        }
    }

    pub fn write_text(&mut self, x: u16, y: u16, text: &str, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.set_char(x as i32 + i as i32, y as i32, ch, color);
        }
    }

    /// Writes `text` horizontally centered on row `y`.
    pub fn write_centered(&mut self, y: u16, text: &str, color: Color) {
        let x = (self.width / 2).saturating_sub(text.chars().count() as u16 / 2);
        self.write_text(x, y, text, color);
    }

    pub fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(Cell::BLANK);
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for (y, row) in self.grid.iter().enumerate() {
            stdout.execute_move_to(MoveTo(0, y as u16))?;
            let mut current = Color::Reset;
            stdout.set_color(current)?;
            let mut run = String::with_capacity(row.len());
            for cell in row {
                if cell.color != current && cell.ch != ' ' {
                    write!(stdout, "{}", run)?;
                    run.clear();
                    current = cell.color;
                    stdout.set_color(current)?;
                }
                run.push(cell.ch);
            }
            write!(stdout, "{}", run)?;
        }
        stdout.reset_color()?;
        stdout.execute_move_to(MoveTo(0, 0))?;
        write!(stdout, "{}", self.message)?;
        Ok(())
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(self.width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

impl DrawSink for GameGrid {
    fn draw_segment(&mut self, segment: &Segment) {
        let (x0, y0) = self.to_cell(segment.from);
        let (x1, y1) = self.to_cell(segment.to);
        let ch = line_char(x1 - x0, y1 - y0);
        plot_bresenham_line(
            x0.round() as i32,
            y0.round() as i32,
            x1.round() as i32,
            y1.round() as i32,
            |x, y| self.set_char(x, y, ch, segment.color),
        );
    }

    fn replace_message(&mut self, message: &str) {
        self.message.clear();
        self.message.push_str(message);
    }
}
