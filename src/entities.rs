use crossterm::style::Color;
use log::debug;
use rand::Rng;

use crate::constants::*;
use crate::pool::Pool;
use crate::rendering::{DrawSink, Segment};
use crate::types::{point_in_box, BoundingBox, Bounds, Vector2D};

pub const SHIP_COLOR: Color = Color::Rgb { r: 0, g: 255, b: 0 };
pub const SHIP_INVULNERABLE_COLOR: Color = Color::Rgb { r: 255, g: 255, b: 0 };
pub const BLAST_COLOR: Color = Color::Rgb { r: 255, g: 0, b: 0 };
pub const ASTEROID_COLOR: Color = Color::Rgb { r: 0, g: 0, b: 255 };

/// Maps a local-space outline point onto the screen: scale, rotate so that
/// local "up" follows `heading`, then translate.
fn to_screen(local: (f64, f64), position: Vector2D, heading: f64, scale: f64) -> Vector2D {
    Vector2D::new(local.0, local.1)
        .scale(scale)
        .rotate(std::f64::consts::FRAC_PI_2 - heading)
        .add(position)
}

// --- Ship ---

/// Which steering inputs are held this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    pub thrust: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

#[derive(Clone, Debug)]
pub struct Ship {
    pub position: Vector2D,
    pub heading: f64, // Radians, PI/2 faces up
    pub scale: f64,
    pub speed: f64,
    pub alive: bool,
    pub lives: i32,
    pub can_be_hit: bool,
    pub can_be_hit_count: u32,
    pub color: Color,
    pub thickness: f64,
}

impl Ship {
    pub fn spawn_default(bounds: Bounds) -> Self {
        Ship {
            position: bounds.center(),
            heading: std::f64::consts::FRAC_PI_2,
            scale: SHIP_DEFAULT_SCALE,
            speed: SHIP_DEFAULT_SPEED,
            alive: true,
            lives: SHIP_LIVES,
            can_be_hit: true,
            can_be_hit_count: 0,
            color: SHIP_COLOR,
            thickness: SHIP_THICKNESS,
        }
    }

    pub fn move_ship(&mut self, steering: Steering, bounds: Bounds) {
        self.position = bounds.wrap(self.position);

        if steering.thrust {
            self.position = self.position.add(Vector2D::from_heading(self.heading, self.speed));
        }

        if steering.turn_left {
            self.heading += DIRECTION_STEP;
            if self.heading >= MAX_ANGLE {
                self.heading -= MAX_ANGLE;
            }
        }

        if steering.turn_right {
            self.heading -= DIRECTION_STEP;
            if self.heading < 0.0 {
                self.heading += MAX_ANGLE;
            }
        }
    }

    /// Seven points used for collision: the ship position, the two wing
    /// tips, then four notch points between them.
    pub fn base_points(&self) -> [Vector2D; 7] {
        let wing = WING_ANGLE_DEG.to_radians();
        let notch = NOTCH_ANGLE_DEG.to_radians();
        let radius = self.scale * SHIP_DIMENSION;
        let inner = radius * NOTCH_RADIUS_FACTOR;
        let at = |angle: f64, length: f64| self.position.add(Vector2D::from_heading(self.heading + angle, length));

        [
            self.position,
            at(wing, radius),
            at(-wing, radius),
            at(wing, inner),
            at(notch, inner),
            at(-notch, inner),
            at(-wing, inner),
        ]
    }

    /// Takes a life and respawns at the center, invulnerable. Returns the
    /// lives left.
    pub fn on_hit(&mut self, bounds: Bounds) -> i32 {
        self.lives -= 1;
        self.alive = true;
        self.can_be_hit = false;
        self.can_be_hit_count = 0;
        self.position = bounds.center();
        self.heading = std::f64::consts::FRAC_PI_2;
        self.lives
    }

    pub fn advance_invulnerability(&mut self) {
        if self.can_be_hit {
            return;
        }
        self.can_be_hit_count += 1;
        if self.can_be_hit_count >= INVULNERABILITY_FRAMES {
            self.can_be_hit = true;
            self.can_be_hit_count = 0;
        }
    }

    pub fn is_flicker_visible(&self) -> bool {
        self.can_be_hit || (self.can_be_hit_count / FLICKER_PERIOD_FRAMES) % 2 == 0
    }

    pub fn segments(&self) -> Vec<Segment> {
        let color = if self.can_be_hit { self.color } else { SHIP_INVULNERABLE_COLOR };
        SHIP_OUTLINE
            .iter()
            .map(|&(from, to)| Segment {
                from: to_screen(from, self.position, self.heading, self.scale),
                to: to_screen(to, self.position, self.heading, self.scale),
                color,
                thickness: self.thickness,
            })
            .collect()
    }

    pub fn draw(&self, sink: &mut dyn DrawSink) {
        if !self.alive || !self.is_flicker_visible() {
            return;
        }
        for segment in self.segments() {
            sink.draw_segment(&segment);
        }
    }
}

// --- Blast ---

#[derive(Clone, Debug)]
pub struct Blast {
    pub position: Vector2D,
    pub heading: f64,
    pub size: f64,
    pub speed: f64,
    pub alive: bool,
    pub color: Color,
    pub thickness: f64,
}

impl Blast {
    pub fn spawn_default(x: f64, y: f64, heading: f64) -> Self {
        Blast {
            position: Vector2D::new(x, y),
            heading,
            size: BLAST_SIZE,
            speed: BLAST_SPEED,
            alive: true,
            color: BLAST_COLOR,
            thickness: BLAST_THICKNESS,
        }
    }

    pub fn endpoint(&self) -> Vector2D {
        self.position.add(Vector2D::from_heading(self.heading, self.size))
    }

    /// Blasts do not wrap: leaving the display kills them.
    pub fn move_blast(&mut self, bounds: Bounds) {
        if !self.alive {
            return;
        }
        self.position = self.position.add(Vector2D::from_heading(self.heading, self.speed));
        if !bounds.contains(self.position) {
            self.alive = false;
        }
    }

    pub fn segments(&self) -> Vec<Segment> {
        vec![Segment {
            from: self.position,
            to: self.endpoint(),
            color: self.color,
            thickness: self.thickness,
        }]
    }

    pub fn draw(&self, sink: &mut dyn DrawSink) {
        if !self.alive {
            return;
        }
        for segment in self.segments() {
            sink.draw_segment(&segment);
        }
    }
}

pub type Blasts = Pool<Blast>;

impl Pool<Blast> {
    pub fn new_blasts() -> Self {
        Pool::with_capacity(BLAST_MAX)
    }

    /// Returns `false` without spawning when the pool is full.
    pub fn fire(&mut self, origin: Vector2D, heading: f64) -> bool {
        self.insert(Blast::spawn_default(origin.x, origin.y, heading)).is_some()
    }

    /// Moves every blast and drops the ones that left the display.
    pub fn move_all(&mut self, bounds: Bounds) -> usize {
        self.update_retain(|blast| {
            blast.move_blast(bounds);
            blast.alive
        })
    }

    pub fn draw_all(&self, sink: &mut dyn DrawSink) {
        for blast in self {
            blast.draw(sink);
        }
    }
}

// --- Asteroid ---

#[derive(Clone, Debug)]
pub struct Asteroid {
    pub position: Vector2D,
    pub heading: f64,
    pub scale: f64,
    pub speed: f64,
    pub alive: bool,
    pub color: Color,
    pub thickness: f64,
}

impl Asteroid {
    pub fn spawn_default(x: f64, y: f64, heading: f64, scale: f64) -> Self {
        Asteroid {
            position: Vector2D::new(x, y),
            heading,
            scale,
            speed: Asteroid::speed_for(scale),
            alive: true,
            color: ASTEROID_COLOR,
            thickness: ASTEROID_THICKNESS,
        }
    }

    pub fn speed_for(scale: f64) -> f64 {
        ASTEROID_BASE_SPEED - scale
    }

    pub fn move_asteroid(&mut self, bounds: Bounds) {
        if !self.alive {
            return;
        }
        self.position = bounds.wrap(self.position);
        self.position = self.position.add(Vector2D::from_heading(self.heading, self.speed));
    }

    pub fn corners(&self) -> BoundingBox {
        BoundingBox::centered(self.position, self.scale * ASTEROID_DIMENSION)
    }

    /// Only the two ends of the blast are tested, not the whole segment.
    pub fn collides_with_blast(&self, blast: &Blast) -> bool {
        let corners = self.corners();
        point_in_box(blast.endpoint(), &corners) || point_in_box(blast.position, &corners)
    }

    pub fn collides_with_ship(&self, ship: &Ship) -> bool {
        let corners = self.corners();
        ship.base_points().iter().any(|point| point_in_box(*point, &corners))
    }

    /// The two half-scale fragments this asteroid breaks into, or `None`
    /// when it is too small to split.
    pub fn split_children(&self, rng: &mut impl Rng) -> Option<[Asteroid; 2]> {
        if self.scale <= ASTEROID_MIN_SCALE {
            return None;
        }
        let scale = self.scale / 2.0;
        let first = self.fragment(scale, rng);
        let second = self.fragment(scale, rng);
        Some([first, second])
    }

    fn fragment(&self, scale: f64, rng: &mut impl Rng) -> Asteroid {
        let heading = self.heading + rng.gen_range(-SPLIT_HEADING_JITTER..=SPLIT_HEADING_JITTER);
        let x = self.position.x + rng.gen_range(-SPLIT_POSITION_JITTER..=SPLIT_POSITION_JITTER);
        let y = self.position.y + rng.gen_range(-SPLIT_POSITION_JITTER..=SPLIT_POSITION_JITTER);
        Asteroid::spawn_default(x, y, heading, scale)
    }

    pub fn segments(&self) -> Vec<Segment> {
        let count = ASTEROID_VERTICES.len();
        (0..count)
            .map(|i| Segment {
                from: to_screen(ASTEROID_VERTICES[i], self.position, self.heading, self.scale),
                to: to_screen(ASTEROID_VERTICES[(i + 1) % count], self.position, self.heading, self.scale),
                color: self.color,
                thickness: self.thickness,
            })
            .collect()
    }

    pub fn draw(&self, sink: &mut dyn DrawSink) {
        if !self.alive {
            return;
        }
        for segment in self.segments() {
            sink.draw_segment(&segment);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitOutcome {
    /// Too small to split; removed without children.
    Destroyed,
    /// Removed and replaced by `spawned` fragments (fewer than two only when
    /// the pool ran out of room).
    Split { spawned: usize },
}

pub type Asteroids = Pool<Asteroid>;

impl Pool<Asteroid> {
    pub fn new_asteroids() -> Self {
        Pool::with_capacity(ASTEROID_MAX)
    }

    /// Scatters up to `n` asteroids over the display. Returns how many fit.
    pub fn populate(&mut self, n: usize, bounds: Bounds, rng: &mut impl Rng) -> usize {
        let mut created = 0;
        for _ in 0..n {
            let x = rng.gen_range(0.0..bounds.width).floor();
            let y = rng.gen_range(0.0..bounds.height).floor();
            let heading = MAX_ANGLE * rng.gen_range(0..HEADING_STEPS) as f64 / HEADING_STEPS as f64;
            let scale = ASTEROID_MIN_SCALE + rng.gen_range(0..=ASTEROID_SCALE_STEPS) as f64 * ASTEROID_SCALE_STEP;
            if self.insert(Asteroid::spawn_default(x, y, heading, scale)).is_none() {
                break;
            }
            created += 1;
        }
        created
    }

    pub fn move_all(&mut self, bounds: Bounds) -> usize {
        self.update_retain(|asteroid| {
            asteroid.move_asteroid(bounds);
            asteroid.alive
        })
    }

    /// Resolves a hit on the asteroid at `index`. The parent leaves the pool
    /// before its fragments are inserted.
    pub fn hit(&mut self, index: usize, rng: &mut impl Rng) -> Option<SplitOutcome> {
        let mut parent = self.swap_remove(index)?;
        parent.alive = false;

        let Some(children) = parent.split_children(rng) else {
            debug!("Asteroid at ({:.1}, {:.1}) destroyed", parent.position.x, parent.position.y);
            return Some(SplitOutcome::Destroyed);
        };

        let spawned = children
            .into_iter()
            .filter_map(|child| self.insert(child))
            .count();
        debug!(
            "Asteroid at ({:.1}, {:.1}) split into {} fragments of scale {:.2}",
            parent.position.x,
            parent.position.y,
            spawned,
            parent.scale / 2.0
        );
        Some(SplitOutcome::Split { spawned })
    }

    pub fn draw_all(&self, sink: &mut dyn DrawSink) {
        for asteroid in self {
            asteroid.draw(sink);
        }
    }
}
