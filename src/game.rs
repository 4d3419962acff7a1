use log::{debug, info};
use rand::Rng;

use crate::constants::*;
use crate::entities::{Asteroid, Asteroids, Blasts, Ship, SplitOutcome, Steering};
use crate::rendering::DrawSink;
use crate::types::Bounds;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Quit,
    Other,
}

impl Key {
    pub fn is_directional(self) -> bool {
        matches!(self, Key::Up | Key::Down | Key::Left | Key::Right)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    KeyDown(Key),
    KeyUp(Key),
    Tick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The set of directional keys currently held down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Up => self.up = held,
            Key::Down => self.down = held,
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            _ => {}
        }
    }

    pub fn steering(&self) -> Steering {
        Steering {
            thrust: self.up,
            turn_left: self.left,
            turn_right: self.right,
        }
    }
}

/// Per-frame simulation: owns every entity and resolves collisions. All
/// randomness goes through `rng`.
pub struct Game<R: Rng> {
    bounds: Bounds,
    rng: R,
    ship: Ship,
    blasts: Blasts,
    asteroids: Asteroids,
    held: HeldKeys,
    state: GameState,
    score: u32,
    score_text: String,
    frame: u64,
    dirty: bool,
}

impl<R: Rng> Game<R> {
    pub fn new(bounds: Bounds, mut rng: R) -> Self {
        let mut asteroids = Asteroids::new_asteroids();
        let created = asteroids.populate(INITIAL_ASTEROIDS, bounds, &mut rng);
        info!("Populated {} asteroids on a {}x{} display", created, bounds.width, bounds.height);
        Game::build(bounds, rng, asteroids)
    }

    /// Starts from an explicit asteroid field instead of a random one.
    #[cfg(test)]
    pub fn with_field(bounds: Bounds, rng: R, field: impl IntoIterator<Item = Asteroid>) -> Self {
        let mut asteroids = Asteroids::new_asteroids();
        for asteroid in field {
            asteroids.insert(asteroid);
        }
        Game::build(bounds, rng, asteroids)
    }

    fn build(bounds: Bounds, rng: R, asteroids: Asteroids) -> Self {
        Game {
            bounds,
            rng,
            ship: Ship::spawn_default(bounds),
            blasts: Blasts::new_blasts(),
            asteroids,
            held: HeldKeys::default(),
            state: GameState::Playing,
            score: 0,
            score_text: format_score(0),
            frame: 0,
            dirty: true,
        }
    }

    pub fn handle_event(&mut self, event: GameEvent) -> Flow {
        match event {
            GameEvent::KeyDown(Key::Quit) => return Flow::Quit,
            GameEvent::KeyDown(Key::Fire) => self.fire(),
            GameEvent::KeyDown(key) => self.held.set(key, true),
            GameEvent::KeyUp(key) => self.held.set(key, false),
            GameEvent::Tick => self.tick(),
        }
        Flow::Continue
    }

    fn fire(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        if self.blasts.is_full() {
            debug!("Blast pool full ({}), shot dropped", self.blasts.capacity());
            return;
        }
        self.blasts.fire(self.ship.position, self.ship.heading);
    }

    /// One simulation step. Does nothing once the game is over.
    pub fn tick(&mut self) {
        if self.state != GameState::Playing {
            return;
        }

        self.ship.move_ship(self.held.steering(), self.bounds);
        self.blasts.move_all(self.bounds);
        self.asteroids.move_all(self.bounds);

        self.check_blasts_on_asteroids();
        self.check_ship_on_asteroids();
        self.ship.advance_invulnerability();

        self.frame += 1;
        self.dirty = true;
    }

    fn check_blasts_on_asteroids(&mut self) {
        let mut i = 0;
        while i < self.blasts.len() {
            let hit = {
                let blast = &self.blasts.as_slice()[i];
                self.asteroids.iter().position(|asteroid| asteroid.collides_with_blast(blast))
            };
            let Some(j) = hit else {
                i += 1;
                continue;
            };

            if let Some(SplitOutcome::Split { spawned }) = self.asteroids.hit(j, &mut self.rng) {
                if spawned < 2 {
                    debug!("Asteroid pool full, {} fragment(s) dropped", 2 - spawned);
                }
            }
            // The last blast now sits at `i`; examine it before moving on.
            self.blasts.swap_remove(i);
            self.add_score(SCORE_PER_ASTEROID);
        }
    }

    fn check_ship_on_asteroids(&mut self) {
        for j in 0..self.asteroids.len() {
            if !self.ship.can_be_hit {
                break;
            }
            if !self.asteroids.as_slice()[j].collides_with_ship(&self.ship) {
                continue;
            }
            let lives = self.ship.on_hit(self.bounds);
            info!("Ship hit on frame {}, {} lives left", self.frame, lives);
            if lives <= 0 {
                self.game_over();
            }
        }
    }

    fn add_score(&mut self, points: u32) {
        self.score += points;
        self.score_text = format_score(self.score);
    }

    fn game_over(&mut self) {
        info!("Game over on frame {} with score {}", self.frame, self.score);
        self.state = GameState::GameOver;
    }

    /// Submits every visible entity and the score message to `sink`.
    pub fn draw(&self, sink: &mut dyn DrawSink) {
        self.ship.draw(sink);
        self.blasts.draw_all(sink);
        self.asteroids.draw_all(sink);
        sink.replace_message(&self.score_text);
    }

    /// True once per batch of ticks: clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn score_text(&self) -> &str {
        &self.score_text
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn blasts(&self) -> &Blasts {
        &self.blasts
    }

    pub fn asteroids(&self) -> &Asteroids {
        &self.asteroids
    }
}

pub fn format_score(score: u32) -> String {
    format!("Score: {}", score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::Segment;
    use crate::types::Vector2D;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5EED)
    }

    /// Four small asteroids parked in the corners, well away from the
    /// ship and from the column straight above it.
    fn corner_field() -> Vec<Asteroid> {
        vec![
            Asteroid::spawn_default(60.0, 40.0, 0.0, 1.0),
            Asteroid::spawn_default(740.0, 40.0, 0.0, 1.0),
            Asteroid::spawn_default(60.0, 560.0, 0.0, 1.0),
            Asteroid::spawn_default(740.0, 560.0, 0.0, 1.0),
        ]
    }

    #[derive(Default)]
    struct RecordingSink {
        segments: Vec<Segment>,
        message: String,
    }

    impl DrawSink for RecordingSink {
        fn draw_segment(&mut self, segment: &Segment) {
            self.segments.push(*segment);
        }

        fn replace_message(&mut self, message: &str) {
            self.message = message.to_string();
        }
    }

    #[test]
    fn new_game_starts_playing_with_five_asteroids() {
        let game = Game::new(bounds(), rng());
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.asteroids().len(), INITIAL_ASTEROIDS);
        assert_eq!(game.score(), 0);
        assert_eq!(game.score_text(), "Score: 0");
        assert_eq!(game.ship().lives, SHIP_LIVES);
    }

    #[test]
    fn aligned_blast_splits_asteroid_and_scores() {
        let mut field = corner_field();
        field.push(Asteroid::spawn_default(400.0, 180.0, 0.0, 2.0));
        let mut game = Game::with_field(bounds(), rng(), field);

        assert_eq!(game.handle_event(GameEvent::KeyDown(Key::Fire)), Flow::Continue);
        assert_eq!(game.blasts().len(), 1);

        let mut ticks = 0;
        while game.score() == 0 && ticks < 20 {
            game.handle_event(GameEvent::Tick);
            ticks += 1;
        }

        // Tip reaches the box bottom (y = 220) on the sixth tick.
        assert_eq!(ticks, 6);
        assert_eq!(game.score(), 100);
        assert_eq!(game.score_text(), "Score: 100");
        assert!(game.blasts().is_empty());
        assert_eq!(game.asteroids().len(), 6);
        assert!(game.asteroids().iter().all(|a| (a.scale - 2.0).abs() > 1e-9));

        let parent_x = 400.0 + 6.0 * 3.0;
        let fragments: Vec<&Asteroid> = game.asteroids().iter().filter(|a| a.position.y < 300.0 && a.position.y > 100.0).collect();
        assert_eq!(fragments.len(), 2);
        for fragment in fragments {
            assert_eq!(fragment.scale, 1.0);
            assert!((fragment.position.x - parent_x).abs() <= 50.0);
            assert!((fragment.position.y - 180.0).abs() <= 50.0);
        }
        assert_eq!(game.ship().lives, SHIP_LIVES);
    }

    #[test]
    fn one_blast_resolves_one_asteroid_per_tick() {
        // Two overlapping rocks right above the ship: the lower pool index
        // takes the blast, whichever order the scales come in.
        for (first, second) in [(0.5, 0.8), (0.8, 0.5)] {
            let field = vec![
                Asteroid::spawn_default(400.0, 250.0, 0.0, first),
                Asteroid::spawn_default(400.0, 250.0, 0.0, second),
            ];
            let mut game = Game::with_field(bounds(), rng(), field);
            game.ship.position = Vector2D::new(400.0, 270.0);
            game.ship.can_be_hit = false;
            game.ship.can_be_hit_count = 0;
            game.handle_event(GameEvent::KeyDown(Key::Fire));
            game.handle_event(GameEvent::Tick);

            assert_eq!(game.score(), 100);
            assert!(game.blasts().is_empty());
            assert_eq!(game.asteroids().len(), 1);
            assert_eq!(game.asteroids().as_slice()[0].scale, second);
        }
    }

    #[test]
    fn score_grows_by_exactly_one_hundred_per_hit() {
        let mut game = Game::new(bounds(), StdRng::seed_from_u64(2024));
        let mut last = game.score();
        for frame in 0..3_000 {
            if frame % 5 == 0 {
                game.handle_event(GameEvent::KeyDown(Key::Fire));
            }
            if frame % 40 == 0 {
                game.handle_event(GameEvent::KeyDown(Key::Left));
            }
            if frame % 40 == 20 {
                game.handle_event(GameEvent::KeyUp(Key::Left));
            }
            game.handle_event(GameEvent::Tick);
            let score = game.score();
            assert!(score >= last);
            assert_eq!((score - last) % SCORE_PER_ASTEROID, 0);
            assert!(game.blasts().len() <= BLAST_MAX);
            assert!(game.asteroids().len() <= ASTEROID_MAX);
            last = score;
        }
    }

    #[test]
    fn ship_hit_costs_one_life_then_grants_invulnerability() {
        let field = vec![Asteroid::spawn_default(400.0, 300.0, 0.0, 3.0)];
        let mut game = Game::with_field(bounds(), rng(), field);
        game.handle_event(GameEvent::Tick);

        assert_eq!(game.ship().lives, SHIP_LIVES - 1);
        assert!(!game.ship().can_be_hit);
        assert_eq!(game.state(), GameState::Playing);

        // The asteroid still covers the center but the ship is protected.
        game.handle_event(GameEvent::Tick);
        assert_eq!(game.ship().lives, SHIP_LIVES - 1);
    }

    #[test]
    fn invulnerability_clears_after_sixty_ticks() {
        let mut game = Game::with_field(bounds(), rng(), Vec::new());
        game.ship.on_hit(bounds());
        for _ in 0..59 {
            game.handle_event(GameEvent::Tick);
            assert!(!game.ship().can_be_hit);
        }
        game.handle_event(GameEvent::Tick);
        assert!(game.ship().can_be_hit);
    }

    #[test]
    fn losing_the_last_life_ends_the_game() {
        // Scale 5 rocks have no speed: this one stays on the respawn point.
        let field = vec![Asteroid::spawn_default(400.0, 300.0, 0.0, 5.0)];
        let mut game = Game::with_field(bounds(), rng(), field);
        let mut lives_seen = vec![game.ship().lives];
        for _ in 0..1_000 {
            game.handle_event(GameEvent::Tick);
            if lives_seen.last() != Some(&game.ship().lives) {
                lives_seen.push(game.ship().lives);
            }
            if game.state() == GameState::GameOver {
                break;
            }
        }
        assert_eq!(lives_seen, vec![3, 2, 1, 0]);
        assert_eq!(game.state(), GameState::GameOver);

        // Terminal: ticks no longer move anything, firing is refused.
        let frame = game.frame();
        game.handle_event(GameEvent::KeyDown(Key::Fire));
        game.handle_event(GameEvent::Tick);
        assert_eq!(game.frame(), frame);
        assert!(game.blasts().is_empty());
        assert_eq!(game.ship().lives, 0);
    }

    #[test]
    fn held_keys_drive_the_ship_until_released() {
        let mut game = Game::with_field(bounds(), rng(), Vec::new());
        game.handle_event(GameEvent::KeyDown(Key::Up));
        game.handle_event(GameEvent::Tick);
        game.handle_event(GameEvent::Tick);
        assert!((game.ship().position.y - 294.0).abs() < 1e-9);

        game.handle_event(GameEvent::KeyUp(Key::Up));
        game.handle_event(GameEvent::Tick);
        assert!((game.ship().position.y - 294.0).abs() < 1e-9);
        assert_eq!(game.held, HeldKeys::default());
    }

    #[test]
    fn fire_is_edge_triggered() {
        let mut game = Game::with_field(bounds(), rng(), Vec::new());
        game.handle_event(GameEvent::KeyDown(Key::Fire));
        for _ in 0..3 {
            game.handle_event(GameEvent::Tick);
        }
        assert_eq!(game.blasts().len(), 1);
    }

    #[test]
    fn full_blast_pool_ignores_fire() {
        let mut game = Game::with_field(bounds(), rng(), Vec::new());
        for _ in 0..BLAST_MAX + 5 {
            game.handle_event(GameEvent::KeyDown(Key::Fire));
        }
        assert_eq!(game.blasts().len(), BLAST_MAX);
    }

    #[test]
    fn quit_ends_immediately() {
        let mut game = Game::with_field(bounds(), rng(), Vec::new());
        assert_eq!(game.handle_event(GameEvent::KeyDown(Key::Quit)), Flow::Quit);
        assert_eq!(game.handle_event(GameEvent::KeyUp(Key::Other)), Flow::Continue);
    }

    #[test]
    fn dirty_flag_coalesces_redraws() {
        let mut game = Game::with_field(bounds(), rng(), Vec::new());
        assert!(game.take_dirty());
        assert!(!game.take_dirty());

        game.handle_event(GameEvent::KeyDown(Key::Left));
        assert!(!game.take_dirty());

        game.handle_event(GameEvent::Tick);
        game.handle_event(GameEvent::Tick);
        assert!(game.take_dirty());
        assert!(!game.take_dirty());
    }

    #[test]
    fn draw_submits_every_entity_and_the_score() {
        let field = vec![Asteroid::spawn_default(100.0, 100.0, 0.0, 1.0)];
        let mut game = Game::with_field(bounds(), rng(), field);
        game.handle_event(GameEvent::KeyDown(Key::Fire));

        let mut sink = RecordingSink::default();
        game.draw(&mut sink);
        // Ship outline, one blast, one asteroid outline.
        assert_eq!(sink.segments.len(), 4 + 1 + ASTEROID_VERTICES.len());
        assert_eq!(sink.message, "Score: 0");
    }

    #[test]
    fn flickering_ship_is_skipped_on_hidden_frames() {
        let mut game = Game::with_field(bounds(), rng(), Vec::new());
        game.ship.on_hit(bounds());
        for _ in 0..7 {
            game.handle_event(GameEvent::Tick);
        }
        let mut sink = RecordingSink::default();
        game.draw(&mut sink);
        assert!(sink.segments.is_empty());
    }
}
