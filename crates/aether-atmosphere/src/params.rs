//! User-facing atmosphere settings and the effective scattering coefficients derived from them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Sea-level Rayleigh scattering coefficients per meter (RGB).
pub const RAYLEIGH_BASE: Vec3 = Vec3::new(5.8e-6, 13.5e-6, 33.1e-6);

/// Sea-level Mie scattering coefficient per meter, identical for every channel.
pub const MIE_BASE: Vec3 = Vec3::splat(2.0e-5);

/// Largest value any coefficient multiplier may take.
pub const MAX_COEFFICIENT_SCALE: f32 = 10.0;

/// Largest Henyey-Greenstein asymmetry accepted. `g = 1` is a delta lobe.
pub const MAX_MIE_G: f32 = 0.999;

/// Maximum number of view-ray integration steps.
pub const MAX_SAMPLE_COUNT: u32 = 16;

/// Atmosphere settings resolved for one camera.
///
/// Values are refreshed from the host every frame and are never cached by the
/// compositor. Out-of-range values are tolerated on input and clamped by
/// [`AtmosphereParameters::sanitized`] before use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtmosphereParameters {
    /// Gate for the whole effect. When false the scene passes through untouched.
    pub enabled: bool,
    /// Linear RGB light color. HDR values above 1 are allowed.
    pub light_color: [f32; 3],
    /// Multiplier on [`RAYLEIGH_BASE`] for in-scattering, `[0, 10]`.
    pub rayleigh_scatter_coef: f32,
    /// Multiplier on [`RAYLEIGH_BASE`] for extinction, `[0, 10]`.
    pub rayleigh_extinction_coef: f32,
    /// Multiplier on [`MIE_BASE`] for in-scattering, `[0, 10]`.
    pub mie_scatter_coef: f32,
    /// Multiplier on [`MIE_BASE`] for extinction, `[0, 10]`.
    pub mie_extinction_coef: f32,
    /// Mie phase asymmetry, `[0, 0.999]`.
    pub mie_g: f32,
    /// Scales the integrated path length. Must be non-negative.
    pub distance_scale: f32,
    /// Integration steps along the view ray, `[0, 16]`. Zero disables the contribution.
    pub sample_count: u32,
}

impl Default for AtmosphereParameters {
    fn default() -> Self {
        Self {
            enabled: true,
            light_color: [1.0, 1.0, 1.0],
            rayleigh_scatter_coef: 1.0,
            rayleigh_extinction_coef: 1.0,
            mie_scatter_coef: 1.0,
            mie_extinction_coef: 1.0,
            mie_g: 0.76,
            distance_scale: 1.0,
            sample_count: MAX_SAMPLE_COUNT,
        }
    }
}

impl AtmosphereParameters {
    /// Whether the effect should run at all for this camera.
    pub fn is_active(&self) -> bool {
        self.enabled
    }

    /// Return a copy with every field clamped into its valid range.
    ///
    /// NaN scalars collapse to the lower bound of their range.
    pub fn sanitized(&self) -> Self {
        Self {
            enabled: self.enabled,
            light_color: self.light_color.map(non_negative),
            rayleigh_scatter_coef: clamp_finite(self.rayleigh_scatter_coef, 0.0, MAX_COEFFICIENT_SCALE),
            rayleigh_extinction_coef: clamp_finite(
                self.rayleigh_extinction_coef,
                0.0,
                MAX_COEFFICIENT_SCALE,
            ),
            mie_scatter_coef: clamp_finite(self.mie_scatter_coef, 0.0, MAX_COEFFICIENT_SCALE),
            mie_extinction_coef: clamp_finite(self.mie_extinction_coef, 0.0, MAX_COEFFICIENT_SCALE),
            mie_g: clamp_finite(self.mie_g, 0.0, MAX_MIE_G),
            distance_scale: non_negative(self.distance_scale),
            sample_count: self.sample_count.min(MAX_SAMPLE_COUNT),
        }
    }

    /// Light color as a vector.
    pub fn light_color(&self) -> Vec3 {
        Vec3::from(self.light_color)
    }

    /// Effective scattering and extinction coefficients for these settings.
    pub fn coefficients(&self) -> ScatteringCoefficients {
        ScatteringCoefficients {
            scattering_r: RAYLEIGH_BASE * self.rayleigh_scatter_coef,
            scattering_m: MIE_BASE * self.mie_scatter_coef,
            extinction_r: RAYLEIGH_BASE * self.rayleigh_extinction_coef,
            extinction_m: MIE_BASE * self.mie_extinction_coef,
        }
    }
}

/// Per-meter coefficients after the user multipliers are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringCoefficients {
    pub scattering_r: Vec3,
    pub scattering_m: Vec3,
    pub extinction_r: Vec3,
    pub extinction_m: Vec3,
}

fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_volume_defaults() {
        let p = AtmosphereParameters::default();
        assert!(p.enabled);
        assert_eq!(p.light_color, [1.0; 3]);
        assert_eq!(p.mie_g, 0.76);
        assert_eq!(p.distance_scale, 1.0);
        assert_eq!(p.sample_count, 16);
        assert_eq!(p.rayleigh_scatter_coef, 1.0);
        assert_eq!(p.mie_extinction_coef, 1.0);
    }

    #[test]
    fn test_sanitize_clamps_ranges() {
        let p = AtmosphereParameters {
            enabled: true,
            light_color: [-1.0, f32::NAN, 25.0],
            rayleigh_scatter_coef: 42.0,
            rayleigh_extinction_coef: -3.0,
            mie_scatter_coef: f32::NAN,
            mie_extinction_coef: 10.0,
            mie_g: 1.5,
            distance_scale: -2.0,
            sample_count: 64,
        }
        .sanitized();

        assert_eq!(p.light_color, [0.0, 0.0, 25.0]);
        assert_eq!(p.rayleigh_scatter_coef, 10.0);
        assert_eq!(p.rayleigh_extinction_coef, 0.0);
        assert_eq!(p.mie_scatter_coef, 0.0);
        assert_eq!(p.mie_extinction_coef, 10.0);
        assert_eq!(p.mie_g, MAX_MIE_G);
        assert_eq!(p.distance_scale, 0.0);
        assert_eq!(p.sample_count, MAX_SAMPLE_COUNT);
    }

    #[test]
    fn test_sanitize_keeps_valid_values() {
        let p = AtmosphereParameters::default();
        assert_eq!(p.sanitized(), p);
    }

    #[test]
    fn test_coefficients_scale_base_vectors() {
        let p = AtmosphereParameters {
            rayleigh_scatter_coef: 2.0,
            mie_extinction_coef: 0.5,
            ..Default::default()
        };
        let c = p.coefficients();
        assert_eq!(c.scattering_r, RAYLEIGH_BASE * 2.0);
        assert_eq!(c.extinction_r, RAYLEIGH_BASE);
        assert_eq!(c.scattering_m, MIE_BASE);
        assert_eq!(c.extinction_m, MIE_BASE * 0.5);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let p: AtmosphereParameters = ron::from_str("(mie_g: 0.5)").unwrap();
        assert_eq!(p.mie_g, 0.5);
        assert_eq!(p.sample_count, 16);
        assert!(p.enabled);
    }

    #[test]
    fn test_disabled_is_inactive() {
        let p = AtmosphereParameters {
            enabled: false,
            ..Default::default()
        };
        assert!(!p.is_active());
    }
}
