use crate::engine::{Point, Size};

/// Moving box: top left position, per tick velocity and size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub position: Point,
    pub dx: f32,
    pub dy: f32,
    pub size: Size,
}

impl Body {
    pub fn new(position: Point, size: Size) -> Self {
        Body {
            position,
            dx: 0.0,
            dy: 0.0,
            size,
        }
    }

    pub fn advance(&mut self) {
        self.position.x += self.dx;
        self.position.y += self.dy;
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Smallest distance between the two centres over the coming tick.
    /// The tick is sampled in steps of 1 / (largest velocity component), so
    /// fast bodies cannot tunnel through each other.
    pub fn min_dist(&self, other: &Body) -> f32 {
        let fastest = [self.dx, self.dy, other.dx, other.dy]
            .iter()
            .fold(0.0_f32, |max, v| max.max(v.abs()));
        let a = self.center();
        let b = other.center();

        // percent = i / fastest for every i with percent < 1
        let samples = if fastest > 0.0 { fastest.ceil() as u32 } else { 1 };
        (0..samples)
            .map(|i| {
                let percent = if fastest > 0.0 { i as f32 / fastest } else { 0.0 };
                let x = (a.x + self.dx * percent) - (b.x + other.dx * percent);
                let y = (a.y + self.dy * percent) - (b.y + other.dy * percent);
                x * x + y * y
            })
            .fold(f32::INFINITY, f32::min)
            .sqrt()
    }

    /// Angle in degrees from `other` to `self`, measured between the top left
    /// corners. Straight above is -90.
    pub fn bearing_degrees(&self, other: &Body) -> f32 {
        (self.position.y - other.position.y)
            .atan2(self.position.x - other.position.x)
            .to_degrees()
    }
}
