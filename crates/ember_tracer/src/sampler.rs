//! Adaptive progressive sampler.
//!
//! Owns the pixel accumulator arena and decides, frame by frame, how many
//! paths each pixel gets. Pixels whose mean moved more than average during
//! their last batch get more samples; settled pixels get one.
//!
//! Rows are sampled in parallel with rayon. Each row task owns its pixels
//! and its own random stream, and the global mean noise is reduced from
//! the row results after all of them finish.

use crate::integrator::trace_path;
use crate::pixel::Pixel;
use crate::sampling::stream_seed;
use crate::{Camera, Scene};
use ember_math::DVec3;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Added to the mean noise and to the noise ratio so neither reaches zero.
pub const BIAS: f64 = 1e-4;

/// Keeps the relative-change denominator of black pixels away from zero.
const NOISE_EPSILON: f64 = 1e-6;

/// Errors that can occur when creating a sampler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    #[error("Frame has no pixels ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("Bounce budget must be at least 1")]
    NoBounces,
}

pub type SamplerResult<T> = Result<T, SamplerError>;

/// Sampler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Maximum surface hits per path
    pub bounces: u32,
    /// Adaptivity: 0 = uniform, 3 = medium, 4 = high
    pub adapt: u32,
    /// Base seed for every per-row random stream
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            bounces: 8,
            adapt: 3,
            seed: 0,
        }
    }
}

impl SamplerConfig {
    pub fn with_bounces(mut self, bounces: u32) -> Self {
        self.bounces = bounces;
        self
    }

    pub fn with_adapt(mut self, adapt: u32) -> Self {
        self.adapt = adapt;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// What one call to [`Sampler::sample_frame_until`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Paths traced this frame
    pub samples: usize,
    /// Pixels visited this frame
    pub pixels: usize,
    /// Global mean noise after the frame
    pub mean_noise: f64,
    /// True if the frame stopped before visiting every pixel
    pub cancelled: bool,
}

#[derive(Default)]
struct RowTally {
    samples: usize,
    pixels: usize,
    noise: f64,
}

impl RowTally {
    fn merge(self, other: RowTally) -> RowTally {
        RowTally {
            samples: self.samples + other.samples,
            pixels: self.pixels + other.pixels,
            noise: self.noise + other.noise,
        }
    }
}

/// Samples pixels for a scene by tracing rays from a camera.
pub struct Sampler<'a> {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
    camera: &'a dyn Camera,
    scene: &'a dyn Scene,
    config: SamplerConfig,
    noise: f64,
    frames: u64,
    total: u64,
}

impl<'a> Sampler<'a> {
    /// Create a sampler with a zeroed accumulator for every camera pixel.
    pub fn new(
        camera: &'a dyn Camera,
        scene: &'a dyn Scene,
        config: SamplerConfig,
    ) -> SamplerResult<Self> {
        let (width, height) = (camera.width(), camera.height());
        if width == 0 || height == 0 {
            return Err(SamplerError::EmptyFrame { width, height });
        }
        if config.bounces == 0 {
            return Err(SamplerError::NoBounces);
        }

        log::info!(
            "Sampler ready: {}x{} pixels, {} bounces, adapt level {}",
            width,
            height,
            config.bounces,
            config.adapt
        );

        Ok(Self {
            width,
            height,
            pixels: vec![Pixel::default(); width as usize * height as usize],
            camera,
            scene,
            config,
            noise: 0.0,
            frames: 0,
            total: 0,
        })
    }

    /// Sample every pixel at least once, noisy pixels up to
    /// [`Sampler::max_samples`] times. Returns the number of paths traced.
    pub fn sample_frame(&mut self) -> usize {
        self.sample_frame_until(&AtomicBool::new(false)).samples
    }

    /// Like [`Sampler::sample_frame`], but stops early once `cancel` is set.
    ///
    /// The flag is checked between pixels. A cancelled frame keeps every
    /// sample it took but leaves the global mean noise unchanged.
    pub fn sample_frame_until(&mut self, cancel: &AtomicBool) -> FrameStats {
        let mean = self.noise + BIAS;
        let max = self.max_samples();
        let frame = self.frames;
        let width = self.width as usize;
        let (camera, scene, config) = (self.camera, self.scene, self.config);

        let tally = self
            .pixels
            .par_chunks_mut(width)
            .enumerate()
            .map(|(row, pixels)| {
                let mut rng = StdRng::seed_from_u64(stream_seed(config.seed, frame, row as u64));
                let mut tally = RowTally::default();
                for (x, pixel) in pixels.iter_mut().enumerate() {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    let samples = adaptive_samples(pixel.noise, mean, max, config.adapt);
                    tally.noise += sample_pixel(
                        pixel,
                        x as u32,
                        row as u32,
                        samples,
                        camera,
                        scene,
                        config.bounces,
                        &mut rng,
                    );
                    tally.samples += samples;
                    tally.pixels += 1;
                }
                tally
            })
            .reduce(RowTally::default, RowTally::merge);

        self.frames += 1;
        self.total += tally.samples as u64;

        let cancelled = tally.pixels < self.pixels.len();
        if cancelled {
            log::warn!(
                "Frame {} cancelled after {}/{} pixels",
                frame,
                tally.pixels,
                self.pixels.len()
            );
        } else {
            self.noise = tally.noise / self.pixels.len() as f64;
        }

        log::debug!(
            "Frame {}: {} samples, mean noise {:.6}",
            frame,
            tally.samples,
            self.noise
        );

        FrameStats {
            samples: tally.samples,
            pixels: tally.pixels,
            mean_noise: self.noise,
            cancelled,
        }
    }

    /// Number of samples to take given a pixel's noise and the mean noise.
    pub fn adaptive(&self, noise: f64, mean: f64, max: usize) -> usize {
        adaptive_samples(noise, mean, max, self.config.adapt)
    }

    /// Upper bound on samples per pixel per frame (`adapt * 3`, at least 1).
    pub fn max_samples(&self) -> usize {
        (self.config.adapt as usize * 3).max(1)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> SamplerConfig {
        self.config
    }

    /// Global mean noise after the last completed frame.
    pub fn mean_noise(&self) -> f64 {
        self.noise
    }

    /// Frames sampled so far, including cancelled ones.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Paths traced so far.
    pub fn total_samples(&self) -> u64 {
        self.total
    }

    /// The accumulator arena in row-major order.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// The arena as flat floats; see the offsets in [`crate::pixel`].
    pub fn as_floats(&self) -> &[f64] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Current mean color of pixel (x, y).
    pub fn value_at(&self, x: u32, y: u32) -> DVec3 {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} frame",
            self.width,
            self.height
        );
        self.pixels[(y * self.width + x) as usize].value()
    }
}

/// `min(ceil((noise / mean + BIAS) ^ adapt), max)`, never below one sample.
///
/// Non-decreasing in `noise` for fixed `mean` and `max`.
pub fn adaptive_samples(noise: f64, mean: f64, max: usize, adapt: u32) -> usize {
    let max = max.max(1);
    let ratio = noise / mean + BIAS;
    let wanted = ratio.powi(adapt as i32).ceil();
    if wanted.is_nan() {
        return 1;
    }
    // `as` saturates, so an infinite ratio lands on usize::MAX
    (wanted as usize).clamp(1, max)
}

/// Trace `samples` paths through pixel (x, y) and update its noise.
///
/// Returns the new noise estimate: the change in the mean relative to its
/// average magnitude before and after the batch.
#[allow(clippy::too_many_arguments)]
fn sample_pixel(
    pixel: &mut Pixel,
    x: u32,
    y: u32,
    samples: usize,
    camera: &dyn Camera,
    scene: &dyn Scene,
    bounces: u32,
    rng: &mut dyn RngCore,
) -> f64 {
    let before = pixel.value();
    for _ in 0..samples {
        let ray = camera.ray_through(x, y, rng);
        pixel.add_sample(trace_path(ray, scene, bounces, rng).energy);
    }
    let after = pixel.value();
    pixel.noise = relative_change(before, after);
    pixel.noise
}

fn relative_change(before: DVec3, after: DVec3) -> f64 {
    let scale = (before.length() + after.length()) / 2.0 + NOISE_EPSILON;
    (before - after).length() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{COUNT, ELEMENTS, NOISE, RED};
    use crate::{Environment, Lambert, Light, PinholeCamera, Plane, World};
    use ember_math::{Direction, Energy, Vec3};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn camera(width: u32, height: u32) -> PinholeCamera {
        PinholeCamera::new()
            .with_resolution(width, height)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(60.0)
            .initialized()
    }

    /// A diffuse floor seen from above under a sky gradient.
    fn floor_world() -> World {
        World::new(Environment::sky()).with(Plane::new(
            Vec3::ZERO,
            Direction::UP,
            Lambert::new(Energy::splat(0.5)),
        ))
    }

    fn floor_camera() -> PinholeCamera {
        PinholeCamera::new()
            .with_resolution(1, 1)
            .with_position(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, Vec3::NEG_Z)
            .with_fov(30.0)
            .initialized()
    }

    #[test]
    fn test_rejects_empty_frame() {
        let cam = camera(0, 10);
        let world = World::default();
        let err = Sampler::new(&cam, &world, SamplerConfig::default()).err();
        assert_eq!(
            err,
            Some(SamplerError::EmptyFrame {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn test_rejects_zero_bounces() {
        let cam = camera(4, 4);
        let world = World::default();
        let config = SamplerConfig::default().with_bounces(0);
        let err = Sampler::new(&cam, &world, config).err();
        assert_eq!(err, Some(SamplerError::NoBounces));
    }

    #[test]
    fn test_starts_zeroed() {
        let cam = camera(3, 2);
        let world = World::default();
        let sampler = Sampler::new(&cam, &world, SamplerConfig::default()).unwrap();

        assert_eq!(sampler.pixels().len(), 6);
        assert!(sampler.as_floats().iter().all(|&f| f == 0.0));
        assert_eq!(sampler.value_at(2, 1), DVec3::ZERO);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_value_at_rejects_column_past_width() {
        let cam = camera(3, 2);
        let world = World::default();
        let sampler = Sampler::new(&cam, &world, SamplerConfig::default()).unwrap();
        // Would alias pixel (0, 1) without the bounds check
        sampler.value_at(3, 0);
    }

    #[test]
    fn test_adaptive_monotone_and_bounded() {
        for adapt in 0..6 {
            for max in [1, 3, 9, 15] {
                let mut prev = 0;
                for i in 0..200 {
                    let noise = i as f64 * 0.05;
                    let n = adaptive_samples(noise, 0.5, max, adapt);
                    assert!(n >= prev, "not monotone at noise={noise}");
                    assert!(n <= max && n >= 1);
                    prev = n;
                }
            }
        }
    }

    #[test]
    fn test_adaptive_levels() {
        // Uniform sampling when adaptivity is off
        assert_eq!(adaptive_samples(100.0, 0.1, 1, 0), 1);
        // Average noise gets one sample, twice the average gets 2^3
        assert_eq!(adaptive_samples(0.5, 0.5, 9, 3), 2);
        assert_eq!(adaptive_samples(0.499, 0.5, 9, 3), 1);
        assert_eq!(adaptive_samples(1.0, 0.5, 9, 3), 9);
        assert_eq!(adaptive_samples(1.0, 0.5, 100, 3), 9);
        // Degenerate inputs stay in range
        assert_eq!(adaptive_samples(f64::INFINITY, 1.0, 9, 3), 9);
        assert_eq!(adaptive_samples(0.0, 1.0, 0, 3), 1);
    }

    #[test]
    fn test_sampler_adaptive_uses_config_level() {
        let cam = camera(1, 1);
        let world = World::default();
        let config = SamplerConfig::default().with_adapt(4);
        let sampler = Sampler::new(&cam, &world, config).unwrap();

        assert_eq!(sampler.max_samples(), 12);
        assert_eq!(sampler.adaptive(0.0, 1.0, 12), 1);
        assert_eq!(sampler.adaptive(10.0, 1.0, 12), 12);
    }

    #[test]
    fn test_empty_scene_pixels_equal_environment() {
        init_logging();
        let env = Energy::new(0.25, 0.5, 1.0);
        let cam = camera(4, 3);
        let world = World::new(Environment::Uniform(env));
        let mut sampler = Sampler::new(&cam, &world, SamplerConfig::default()).unwrap();

        for _ in 0..3 {
            let samples = sampler.sample_frame();
            assert!(samples >= 12);
        }

        let expected = DVec3::new(0.25, 0.5, 1.0);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(sampler.value_at(x, y), expected);
            }
        }
    }

    #[test]
    fn test_emissive_plane_pixels_equal_emission() {
        init_logging();
        let emit = Energy::new(2.0, 0.5, 0.125);
        let cam = camera(5, 4);
        let world = World::new(Environment::Uniform(Energy::ONE)).with(Plane::new(
            Vec3::new(0.0, 0.0, -2.0),
            Direction::Z,
            Light::new(emit),
        ));
        let mut sampler = Sampler::new(&cam, &world, SamplerConfig::default()).unwrap();

        sampler.sample_frame();
        let expected = DVec3::new(2.0, 0.5, 0.125);
        for pixel in sampler.pixels() {
            assert!(pixel.samples() >= 1);
            assert_eq!(pixel.value(), expected);
        }

        // Further frames never move an exact value
        sampler.sample_frame();
        assert_eq!(sampler.value_at(0, 0), expected);
        assert!(sampler.pixels().iter().all(|p| p.noise < 1e-9));
    }

    #[test]
    fn test_first_frame_noise() {
        // From a black start, the first batch moves every lit pixel by ~2
        let cam = camera(2, 2);
        let world = World::new(Environment::Uniform(Energy::ONE));
        let mut sampler = Sampler::new(&cam, &world, SamplerConfig::default()).unwrap();

        let stats = sampler.sample_frame_until(&AtomicBool::new(false));
        assert!(!stats.cancelled);
        assert_eq!(stats.pixels, 4);
        assert!((stats.mean_noise - 2.0).abs() < 1e-4);
        assert_eq!(sampler.mean_noise(), stats.mean_noise);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let cam = floor_camera();
        let world = floor_world();
        let config = SamplerConfig::default().with_seed(99);

        let mut a = Sampler::new(&cam, &world, config).unwrap();
        let mut b = Sampler::new(&cam, &world, config).unwrap();
        for _ in 0..5 {
            a.sample_frame();
            b.sample_frame();
        }
        assert_eq!(a.as_floats(), b.as_floats());

        let mut c = Sampler::new(&cam, &world, config.with_seed(100)).unwrap();
        for _ in 0..5 {
            c.sample_frame();
        }
        assert_ne!(a.as_floats(), c.as_floats());
    }

    #[test]
    fn test_different_seeds_converge() {
        init_logging();
        let cam = floor_camera();
        let world = floor_world();
        let config = SamplerConfig::default().with_adapt(0);

        let mut means = Vec::new();
        for seed in [1, 2] {
            let mut sampler = Sampler::new(&cam, &world, config.with_seed(seed)).unwrap();
            while sampler.total_samples() < 10_000 {
                sampler.sample_frame();
            }
            assert_eq!(sampler.total_samples(), 10_000);
            means.push(sampler.value_at(0, 0));
        }

        let relative = (means[0] - means[1]).length() / means[0].length();
        assert!(relative < 0.05, "means diverged: {:?}", means);

        // Half albedo times the cosine-weighted average of the sky gradient
        let expected = DVec3::new(0.5 * (1.0 / 6.0 + 0.5 * 5.0 / 6.0), 0.375, 0.5);
        for mean in &means {
            assert!((*mean - expected).abs().max_element() < 0.01, "mean={mean:?}");
        }
    }

    #[test]
    fn test_cancelled_frame_keeps_noise() {
        let cam = camera(4, 4);
        let world = World::new(Environment::Uniform(Energy::ONE));
        let mut sampler = Sampler::new(&cam, &world, SamplerConfig::default()).unwrap();
        sampler.sample_frame();
        let noise = sampler.mean_noise();

        let stats = sampler.sample_frame_until(&AtomicBool::new(true));
        assert!(stats.cancelled);
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.pixels, 0);
        assert_eq!(sampler.mean_noise(), noise);
        assert_eq!(sampler.frames(), 2);
    }

    #[test]
    fn test_flat_export_layout() {
        let cam = camera(3, 1);
        let world = World::new(Environment::Uniform(Energy::splat(0.5)));
        let mut sampler = Sampler::new(&cam, &world, SamplerConfig::default()).unwrap();
        sampler.sample_frame();

        let floats = sampler.as_floats();
        assert_eq!(floats.len(), 3 * ELEMENTS);
        for (i, pixel) in sampler.pixels().iter().enumerate() {
            let p = i * ELEMENTS;
            assert_eq!(floats[p + RED], pixel.red);
            assert_eq!(floats[p + COUNT], pixel.count);
            assert_eq!(floats[p + NOISE], pixel.noise);
            assert_eq!(floats[p + RED] / floats[p + COUNT], 0.5);
        }
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SamplerConfig = serde_json::from_str(r#"{ "adapt": 4 }"#).unwrap();
        assert_eq!(config.adapt, 4);
        assert_eq!(config.bounces, SamplerConfig::default().bounces);
        assert_eq!(config.seed, 0);
    }
}
