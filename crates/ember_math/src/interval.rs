/// A closed range of ray parameters, used to bound intersection searches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Same lower bound, new upper bound. Used to shrink the search while
    /// walking a list of shapes.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }

    /// Hits closer than this are treated as self-intersections.
    pub const HIT_EPSILON: f32 = 0.001;

    /// Everything in front of a ray origin, skipping self-intersections.
    pub const FORWARD: Interval = Interval {
        min: Self::HIT_EPSILON,
        max: f32::INFINITY,
    };

}
