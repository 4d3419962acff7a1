#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    /// Offset of `length` along `heading`. Screen y grows downward, so a
    /// heading of PI/2 points up.
    pub fn from_heading(heading: f64, length: f64) -> Self {
        Vector2D::new(length * heading.cos(), -length * heading.sin())
    }

    /// Rotates a local-space point by `angle` (screen convention, y down).
    pub fn rotate(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vector2D::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// Display bounds in virtual pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Bounds { width, height }
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, point: Vector2D) -> bool {
        point_in_box_xy(point.x, point.y, 0.0, 0.0, self.width, self.height)
    }

    /// Edge-teleports both coordinates of `point`.
    pub fn wrap(&self, point: Vector2D) -> Vector2D {
        Vector2D::new(
            wrap_coordinate(point.x, self.width),
            wrap_coordinate(point.y, self.height),
        )
    }
}

/// Axis-aligned box, `min` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vector2D,
    pub max: Vector2D,
}

impl BoundingBox {
    pub fn centered(center: Vector2D, half_width: f64) -> Self {
        BoundingBox {
            min: Vector2D::new(center.x - half_width, center.y - half_width),
            max: Vector2D::new(center.x + half_width, center.y + half_width),
        }
    }

    #[cfg(test)]
    pub fn center(&self) -> Vector2D {
        Vector2D::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    #[cfg(test)]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[cfg(test)]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

pub fn point_in_box_xy(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    px >= x1 && py >= y1 && px <= x2 && py <= y2
}

pub fn point_in_box(point: Vector2D, bbox: &BoundingBox) -> bool {
    point_in_box_xy(point.x, point.y, bbox.min.x, bbox.min.y, bbox.max.x, bbox.max.y)
}

/// Hard reset to the opposite edge once `value` leaves `[0, max]`.
pub fn wrap_coordinate(value: f64, max: f64) -> f64 {
    if value > max {
        0.0
    } else if value < 0.0 {
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_in_box_is_inclusive_on_every_edge() {
        assert!(point_in_box_xy(0.0, 0.0, 0.0, 0.0, 10.0, 10.0));
        assert!(point_in_box_xy(10.0, 10.0, 0.0, 0.0, 10.0, 10.0));
        assert!(point_in_box_xy(10.0, 0.0, 0.0, 0.0, 10.0, 10.0));
        assert!(!point_in_box_xy(10.01, 5.0, 0.0, 0.0, 10.0, 10.0));
        assert!(!point_in_box_xy(5.0, -0.01, 0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn wrap_teleports_instead_of_taking_the_modulo() {
        assert_eq!(wrap_coordinate(801.0, 800.0), 0.0);
        assert_eq!(wrap_coordinate(1_500.0, 800.0), 0.0);
        assert_eq!(wrap_coordinate(-3.0, 800.0), 800.0);
        assert_eq!(wrap_coordinate(800.0, 800.0), 800.0);
        assert_eq!(wrap_coordinate(0.0, 800.0), 0.0);
    }

    #[test]
    fn heading_vector_points_up_at_half_pi() {
        let v = Vector2D::from_heading(std::f64::consts::FRAC_PI_2, 10.0);
        assert!(v.x.abs() < 1e-9);
        assert!((v.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn centered_box_is_square_around_its_center() {
        let bbox = BoundingBox::centered(Vector2D::new(100.0, 50.0), 40.0);
        assert_eq!(bbox.center(), Vector2D::new(100.0, 50.0));
        assert_eq!(bbox.width(), 80.0);
        assert_eq!(bbox.height(), 80.0);
        assert!(point_in_box(Vector2D::new(60.0, 10.0), &bbox));
        assert!(!point_in_box(Vector2D::new(59.9, 10.0), &bbox));
    }
}
