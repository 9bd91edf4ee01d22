//! Command-line argument parsing for the sky renderer.

use std::path::PathBuf;

use aether_compositor::DispatchStrategy;
use clap::Parser;

use crate::Config;

/// Command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "aether", about = "Single-scattering sky renderer")]
pub struct CliArgs {
    /// Target width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Target height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Output PNG path.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Sun elevation above the horizon in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub sun_elevation: Option<f32>,

    /// Sun azimuth in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub sun_azimuth: Option<f32>,

    /// Camera pitch in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub pitch: Option<f32>,

    /// Dispatch strategy (full-screen, tiled).
    #[arg(long)]
    pub dispatch: Option<DispatchStrategy>,

    /// View-ray integration steps (0-16).
    #[arg(long)]
    pub samples: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.render.width = w;
        }
        if let Some(h) = args.height {
            self.render.height = h;
        }
        if let Some(ref output) = args.output {
            self.render.output = output.clone();
        }
        if let Some(elevation) = args.sun_elevation {
            self.sun.elevation_deg = elevation;
        }
        if let Some(azimuth) = args.sun_azimuth {
            self.sun.azimuth_deg = azimuth;
        }
        if let Some(pitch) = args.pitch {
            self.camera.pitch_deg = pitch;
        }
        if let Some(dispatch) = args.dispatch {
            self.pass.dispatch = dispatch;
        }
        if let Some(samples) = args.samples {
            self.atmosphere.sample_count = samples;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            sun_elevation: Some(-4.0),
            dispatch: Some(DispatchStrategy::Tiled),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.render.width, 1920);
        assert_eq!(config.sun.elevation_deg, -4.0);
        assert_eq!(config.pass.dispatch, DispatchStrategy::Tiled);
        // Non-overridden fields retain defaults
        assert_eq!(config.render.height, 360);
        assert_eq!(config.atmosphere.sample_count, 16);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_args() {
        let args = CliArgs::try_parse_from([
            "aether",
            "--width",
            "320",
            "--dispatch",
            "tiled",
            "--sun-elevation",
            "-2.5",
            "-o",
            "out.png",
        ])
        .unwrap();
        assert_eq!(args.width, Some(320));
        assert_eq!(args.dispatch, Some(DispatchStrategy::Tiled));
        assert_eq!(args.sun_elevation, Some(-2.5));
        assert_eq!(args.output, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn test_unknown_dispatch_rejected() {
        assert!(CliArgs::try_parse_from(["aether", "--dispatch", "mesh"]).is_err());
    }
}
