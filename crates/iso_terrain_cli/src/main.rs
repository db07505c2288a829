//! Headless chunk streaming driver.
//!
//! Moves a viewer along a scripted path and runs one streaming update per
//! tick, printing what each tick did.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use iso_terrain::{ChunkStreamer, UpdateContext};
use std::path::PathBuf;

use config::Config;

/// Stream terrain chunks around a moving viewer.
#[derive(Parser, Debug)]
#[command(name = "stream_chunks")]
#[command(about = "Runs chunk streaming ticks from a TOML config")]
struct Args {
	/// Path to configuration TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Number of ticks to run (follow mode).
	#[arg(short, long, default_value_t = 10)]
	ticks: u32,
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	println!("Loading config from: {}", args.config.display());
	let config = Config::load(&args.config)?;
	let settings = config.generator.clone();

	let mut streamer =
		ChunkStreamer::from_settings(settings.clone()).context("Failed to build density sampler")?;

	let ticks = if settings.fixed_map_size { 1 } else { args.ticks };
	println!(
		"Streaming {} tick(s), {} points per axis, chunk size {}",
		ticks, settings.points_per_axis, settings.bounds_size
	);

	for tick in 0..ticks {
		let viewer = config.viewer.position(tick);
		streamer.set_viewer(Some(viewer));
		streamer.set_frustum(config.camera.as_ref().map(|camera| camera.frustum(viewer)));

		let report = streamer.update(UpdateContext::Simulation);
		println!(
			"tick {:>3}: viewer ({:>7.1}, {:>7.1}, {:>7.1}) active {:>4} extracted {:>4} reused {:>4} allocated {:>4} retired {:>4} culled {:>4} [{} us]",
			tick,
			viewer.x,
			viewer.y,
			viewer.z,
			streamer.store().active_len(),
			report.extracted,
			report.reused,
			report.allocated,
			report.retired,
			report.culled,
			streamer.metrics().last_tick_us,
		);
		if report.failed > 0 {
			tracing::warn!(failed = report.failed, tick, "some chunks failed to extract");
		}
	}

	let metrics = streamer.metrics();
	let triangles: usize = streamer.meshes().map(|(_, mesh)| mesh.triangle_count()).sum();
	println!("\nActive chunks: {}", metrics.active_chunks);
	println!("Slots allocated: {}", metrics.allocated_slots);
	println!("Triangles: {}", triangles);
	println!(
		"Avg sample: {:.1} us, avg extract: {:.1} us",
		metrics.avg_sample_timing_us(),
		metrics.avg_mesh_timing_us()
	);
	if metrics.duplicate_edges > 0 {
		tracing::warn!(count = metrics.duplicate_edges, "duplicate edge ids were dropped");
	}

	streamer.teardown();
	Ok(())
}
