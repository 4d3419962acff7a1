use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error};

use crate::constants::{KEY_HOLD_TICKS, TICKS_PER_SECOND};
use crate::error::GameError;
use crate::game::{GameEvent, Key};

/// Blocking source of game events.
pub trait EventSource {
    /// Waits for the next event and returns it along with everything else
    /// that is already available.
    fn next_batch(&mut self) -> Result<Vec<GameEvent>, GameError>;
}

pub fn map_key_code(code: KeyCode, modifiers: KeyModifiers) -> Key {
    match code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Char(' ') => Key::Fire,
        KeyCode::Esc | KeyCode::Char('q') => Key::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Key::Quit,
        _ => Key::Other,
    }
}

// --- TerminalInput: crossterm events plus a fixed-rate tick ---
pub struct TerminalInput {
    tick_interval: Duration,
    next_tick: Instant,
    tick_count: u64,
    reports_release: bool,
    // Key -> last tick a press or repeat was seen, for synthetic releases
    held_since: HashMap<Key, u64>,
}

impl TerminalInput {
    pub fn new(reports_release: bool) -> Self {
        let tick_interval = Duration::from_micros(1_000_000 / TICKS_PER_SECOND);
        TerminalInput {
            tick_interval,
            next_tick: Instant::now() + tick_interval,
            tick_count: 0,
            reports_release,
            held_since: HashMap::new(),
        }
    }

    fn translate(&mut self, event: Event, batch: &mut Vec<GameEvent>) {
        let Event::Key(KeyEvent { code, modifiers, kind, .. }) = event else {
            return;
        };
        let key = map_key_code(code, modifiers);
        match kind {
            KeyEventKind::Press => {
                if !self.reports_release && key.is_directional() {
                    // Auto-repeat arrives as presses; only the first one is a key-down.
                    let already_held = self.held_since.insert(key, self.tick_count).is_some();
                    if already_held {
                        return;
                    }
                }
                batch.push(GameEvent::KeyDown(key));
            }
            KeyEventKind::Repeat => {
                if !self.reports_release {
                    self.held_since.insert(key, self.tick_count);
                }
            }
            KeyEventKind::Release => batch.push(GameEvent::KeyUp(key)),
        }
    }

    fn expire_held_keys(&mut self, batch: &mut Vec<GameEvent>) {
        if self.reports_release {
            return;
        }
        let now = self.tick_count;
        let mut expired: Vec<Key> = self
            .held_since
            .iter()
            .filter(|(_, since)| now.saturating_sub(**since) >= KEY_HOLD_TICKS)
            .map(|(key, _)| *key)
            .collect();
        expired.sort_by_key(|key| *key as u8);
        for key in expired {
            self.held_since.remove(&key);
            batch.push(GameEvent::KeyUp(key));
        }
    }

    fn push_tick(&mut self, batch: &mut Vec<GameEvent>) {
        self.tick_count += 1;
        self.next_tick += self.tick_interval;
        // Do not try to catch up on ticks lost while the process was stalled.
        let now = Instant::now();
        if self.next_tick + self.tick_interval < now {
            debug!("Tick source fell behind, skipping ahead");
            self.next_tick = now + self.tick_interval;
        }
        self.expire_held_keys(batch);
        batch.push(GameEvent::Tick);
    }
}

impl EventSource for TerminalInput {
    fn next_batch(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let mut batch = Vec::new();
        while batch.is_empty() {
            let timeout = self.next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                let ev = event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?;
                self.translate(ev, &mut batch);
            } else {
                self.push_tick(&mut batch);
            }
        }

        // Drain whatever else is already waiting.
        while event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            self.translate(ev, &mut batch);
        }
        if Instant::now() >= self.next_tick && !batch.contains(&GameEvent::Tick) {
            self.push_tick(&mut batch);
        }
        Ok(batch)
    }
}

// --- SimulatedInput for debugging ---
/// Scripted events keyed by frame. Each batch carries the frame's events and
/// one tick; a quit is issued once `max_frames` batches have been produced.
pub struct SimulatedInput {
    events: HashMap<u64, Vec<GameEvent>>,
    current_frame: u64,
    max_frames: u64,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<GameEvent>>, max_frames: u64) -> Self {
        SimulatedInput { events, current_frame: 0, max_frames }
    }

    /// A short demo: thrust, turn, fire a volley, let go.
    pub fn demo(max_frames: u64) -> Self {
        let mut events = HashMap::new();
        events.insert(1, vec![GameEvent::KeyDown(Key::Up)]);
        events.insert(2, vec![GameEvent::KeyDown(Key::Right)]);
        events.insert(3, vec![GameEvent::KeyDown(Key::Fire), GameEvent::KeyUp(Key::Fire)]);
        events.insert(6, vec![GameEvent::KeyDown(Key::Fire)]);
        events.insert(9, vec![GameEvent::KeyDown(Key::Fire)]);
        events.insert(10, vec![GameEvent::KeyUp(Key::Right), GameEvent::KeyDown(Key::Left)]);
        events.insert(20, vec![GameEvent::KeyUp(Key::Left), GameEvent::KeyUp(Key::Up)]);
        SimulatedInput::new(events, max_frames)
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }
}

impl EventSource for SimulatedInput {
    fn next_batch(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.current_frame >= self.max_frames {
            return Ok(vec![GameEvent::KeyDown(Key::Quit)]);
        }
        let mut batch = self.events.remove(&self.current_frame).unwrap_or_default();
        batch.push(GameEvent::Tick);
        self.current_frame += 1;
        Ok(batch)
    }
}
