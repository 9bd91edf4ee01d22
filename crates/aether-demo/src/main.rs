//! Renders a synthetic scene, composites the sky atmosphere over it, and
//! writes the result as a PNG.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p aether-demo -- --sun-elevation 2 --dispatch tiled`.

use std::path::PathBuf;
use std::process;

use aether_compositor::{
    CameraTarget, CameraView, ColorBuffer, FrameContext, MainLight, PassQueue, ProgramLibrary,
    SkyAtmosphereFeature, TargetPool,
};
use aether_config::{CliArgs, Config};
use clap::Parser;
use glam::Vec3;
use tracing::{error, info, warn};

/// Ground color below the horizon, in linear HDR units.
const GROUND_ALBEDO: Vec3 = Vec3::new(0.02, 0.018, 0.015);

/// Opaque scene the atmosphere is composited over: empty sky above the
/// horizon and dark ground below it.
fn render_scene(frame: &FrameContext) -> ColorBuffer {
    let mut color = ColorBuffer::new(frame.width, frame.height);
    for y in 0..frame.height {
        for x in 0..frame.width {
            let ray = frame.camera.view_ray(x, y, frame.rt_size);
            let rgb = if ray.y < 0.0 { GROUND_ALBEDO } else { Vec3::ZERO };
            color.set(x, y, rgb.extend(1.0).to_array());
        }
    }
    color
}

fn camera_from_config(config: &Config) -> CameraView {
    CameraView::from_yaw_pitch(
        config.camera.yaw_deg.to_radians(),
        config.camera.pitch_deg.to_radians(),
        config.camera.fov_y_deg.clamp(1.0, 179.0).to_radians(),
    )
}

fn sun_from_config(config: &Config) -> MainLight {
    MainLight::from_elevation_azimuth(
        config.sun.elevation_deg.to_radians(),
        config.sun.azimuth_deg.to_radians(),
    )
}

fn resolve_config_dir(args: &CliArgs) -> Option<PathBuf> {
    match &args.config {
        Some(dir) => Some(dir.clone()),
        None => Config::default_dir().ok(),
    }
}

fn main() {
    let args = CliArgs::parse();

    let Some(config_dir) = resolve_config_dir(&args) else {
        eprintln!("Failed to resolve config directory; pass --config");
        process::exit(1);
    };

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_dir.display());
            process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    aether_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let (width, height) = (config.render.width, config.render.height);
    if width == 0 || height == 0 {
        warn!(width, height, "empty render target, nothing to do");
    }

    let camera = camera_from_config(&config);
    let sun = sun_from_config(&config);
    let frame = FrameContext::new(width, height, camera, &sun);
    let mut color = render_scene(&frame);

    let library = ProgramLibrary::with_builtin();
    let pool = TargetPool::new();
    let mut feature = SkyAtmosphereFeature::create(config.pass.clone(), &library);

    let mut queue = PassQueue::new();
    let enqueued = feature.add_passes(&mut queue, Some(&config.atmosphere));
    if !enqueued {
        info!("sky atmosphere inactive for this camera, scene left unmodified");
    }

    let mut target = CameraTarget {
        color: &mut color,
        camera,
        main_light: sun,
    };
    for report in queue.execute(&mut target, &pool) {
        match report.result {
            Ok(outcome) => info!(pass = %report.name, ?outcome, "pass finished"),
            Err(e) => warn!(pass = %report.name, "pass produced no contribution: {e}"),
        }
    }

    if let Err(e) = color.save_png(&config.render.output, config.render.exposure) {
        error!(path = %config.render.output.display(), "failed to write image: {e}");
        process::exit(1);
    }

    info!(
        path = %config.render.output.display(),
        width,
        height,
        dispatch = ?config.pass.dispatch,
        "sky render complete"
    );
}
