//! Progressive adaptive render of a small scene.
//!
//! Usage: `cargo run --example render_demo -- [config.json] [frames]`
//!
//! The optional JSON file holds a `SamplerConfig`, e.g.
//! `{ "bounces": 6, "adapt": 4, "seed": 7 }`. Missing fields use defaults.

use anyhow::{Context, Result};
use ember_tracer::pixel::{BLUE, COUNT, ELEMENTS, GREEN, RED};
use ember_tracer::{
    Dielectric, Direction, Energy, Environment, Lambert, Light, Microfacet, PinholeCamera, Plane,
    Sampler, SamplerConfig, Sphere, Vec3, World,
};
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?
        }
        None => SamplerConfig::default(),
    };
    let frames: u32 = match args.next() {
        Some(n) => n.parse().context("frame count must be a number")?,
        None => 32,
    };

    let world = build_scene();
    let camera = PinholeCamera::new()
        .with_resolution(320, 180)
        .with_position(Vec3::new(0.0, 1.5, 5.0), Vec3::new(0.0, 0.6, 0.0), Vec3::Y)
        .with_fov(40.0)
        .initialized();

    let mut sampler = Sampler::new(&camera, &world, config)?;

    let start = std::time::Instant::now();
    for frame in 0..frames {
        let samples = sampler.sample_frame();
        log::info!(
            "frame {}/{}: {} samples, mean noise {:.5}",
            frame + 1,
            frames,
            samples,
            sampler.mean_noise()
        );
    }
    log::info!(
        "Rendered {} samples in {:?}",
        sampler.total_samples(),
        start.elapsed()
    );

    let filename = "output.ppm";
    save_ppm(sampler.as_floats(), sampler.width(), sampler.height(), filename)
        .with_context(|| format!("writing {filename}"))?;
    log::info!("Saved to {}", filename);

    Ok(())
}

fn build_scene() -> World {
    World::new(Environment::sky())
        // Ground
        .with(Plane::new(
            Vec3::ZERO,
            Direction::UP,
            Lambert::new(Energy::new(0.5, 0.5, 0.5)),
        ))
        // Glossy plastic, brushed gold, tinted glass
        .with(Sphere::new(
            Vec3::new(-1.6, 0.6, 0.0),
            0.6,
            Microfacet::plastic(Energy::new(0.7, 0.1, 0.1), 0.3, 1.5),
        ))
        .with(Sphere::new(
            Vec3::new(0.0, 0.6, 0.0),
            0.6,
            Microfacet::metal(Energy::new(1.0, 0.78, 0.34), 0.2),
        ))
        .with(Sphere::new(
            Vec3::new(1.6, 0.6, 0.0),
            0.6,
            Dielectric::new(1.5).with_absorption(Energy::new(0.8, 0.2, 0.1)),
        ))
        // Small warm light
        .with(Sphere::new(
            Vec3::new(0.0, 2.5, 1.0),
            0.3,
            Light::new(Energy::new(12.0, 10.0, 8.0)),
        ))
}

/// Apply gamma correction (gamma = 2.0) and quantize to 8 bits.
fn to_byte(linear: f64) -> u8 {
    let gamma = if linear > 0.0 { linear.sqrt() } else { 0.0 };
    (255.0 * gamma.clamp(0.0, 1.0)) as u8
}

/// Resolve each record's mean from the flat accumulator and write a PPM.
fn save_ppm(floats: &[f64], width: u32, height: u32, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", width, height)?;
    writeln!(writer, "255")?;

    for record in floats.chunks_exact(ELEMENTS) {
        let count = record[COUNT].max(1.0);
        writeln!(
            writer,
            "{} {} {}",
            to_byte(record[RED] / count),
            to_byte(record[GREEN] / count),
            to_byte(record[BLUE] / count)
        )?;
    }

    Ok(())
}
