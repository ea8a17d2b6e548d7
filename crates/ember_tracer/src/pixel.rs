//! Per-pixel accumulator records.
//!
//! The sampler stores one [`Pixel`] per image pixel in a flat arena. The
//! record is `#[repr(C)]` so image writers can read the arena as a plain
//! `&[f64]` using the offsets below without depending on the struct.

use bytemuck::{Pod, Zeroable};
use ember_math::{DVec3, Energy};

/// Offset of the red sum within a record.
pub const RED: usize = 0;
/// Offset of the green sum within a record.
pub const GREEN: usize = 1;
/// Offset of the blue sum within a record.
pub const BLUE: usize = 2;
/// Offset of the sample count within a record.
pub const COUNT: usize = 3;
/// Offset of the noise estimate within a record.
pub const NOISE: usize = 4;
/// Number of `f64` fields per record.
pub const ELEMENTS: usize = 5;

/// Running sums and noise estimate for one pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Pixel {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    /// Number of samples accumulated (stored as a float for the flat layout)
    pub count: f64,
    /// Relative change of the mean over the last sampling batch
    pub noise: f64,
}

impl Pixel {
    /// Mean color so far; zero before the first sample.
    pub fn value(&self) -> DVec3 {
        if self.count == 0.0 {
            return DVec3::ZERO;
        }
        DVec3::new(self.red, self.green, self.blue) / self.count
    }

    /// Add one radiance sample.
    pub fn add_sample(&mut self, energy: Energy) {
        debug_assert!(energy.is_valid(), "invalid sample reached the accumulator: {energy:?}");
        self.red += energy.red() as f64;
        self.green += energy.green() as f64;
        self.blue += energy.blue() as f64;
        self.count += 1.0;
    }

    /// Number of samples accumulated.
    pub fn samples(&self) -> u64 {
        self.count as u64
    }
}
