//! Single-scattering integrator shared by every dispatch strategy.

use glam::Vec3;

use crate::geometry::PlanetGeometry;
use crate::params::{AtmosphereParameters, ScatteringCoefficients};
use crate::phase::{mie_phase, rayleigh_phase};

/// Integration steps along the sun ray at each view sample.
pub const LIGHT_SAMPLES: u32 = 8;

/// Paths shorter than this (meters) contribute nothing.
const MIN_PATH_LENGTH: f32 = 1e-3;

/// Atmosphere contribution for one view ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    /// Radiance scattered toward the eye, scaled by the light color.
    pub inscatter: Vec3,
    /// Fraction of the background color that survives the view path.
    pub transmittance: Vec3,
}

impl ScatterResult {
    /// No atmosphere: zero radiance, full transmittance.
    pub const NONE: Self = Self {
        inscatter: Vec3::ZERO,
        transmittance: Vec3::ONE,
    };

    /// Blend a background color under this result.
    pub fn composite(&self, scene: Vec3) -> Vec3 {
        scene * self.transmittance + self.inscatter
    }
}

/// Everything the integrator reads besides the two directions.
///
/// Built either from the user-facing settings or from a bound
/// [`AtmosphereUniform`](crate::AtmosphereUniform), so a shading program fed
/// the uniform and the CPU path agree on every input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringMedium {
    pub coefficients: ScatteringCoefficients,
    pub light_color: Vec3,
    pub mie_g: f32,
    /// Multiplier on the optical length of each view step.
    pub distance_scale: f32,
    pub sample_count: u32,
    pub geometry: PlanetGeometry,
}

impl ScatteringMedium {
    /// `params` should already be sanitized.
    pub fn from_parameters(params: &AtmosphereParameters, geometry: &PlanetGeometry) -> Self {
        Self {
            coefficients: params.coefficients(),
            light_color: params.light_color(),
            mie_g: params.mie_g,
            distance_scale: params.distance_scale,
            sample_count: params.sample_count,
            geometry: *geometry,
        }
    }

    /// Compute the single-scattered sky contribution for a view ray.
    ///
    /// `view_dir` points from the eye into the scene and `light_dir` points
    /// from the scene toward the light; +Y is the local zenith at the eye.
    ///
    /// The view path runs from the eye to the atmosphere top (or the ground)
    /// and is marched with `sample_count` midpoint steps. `distance_scale`
    /// multiplies the optical length of every step but never moves the
    /// samples, so they stay inside the shell. Each step is lit through the
    /// sun-path optical depth; steps whose sun ray is blocked by the planet
    /// receive no light.
    pub fn scatter(&self, view_dir: Vec3, light_dir: Vec3) -> ScatterResult {
        if self.sample_count == 0 || !view_dir.is_finite() || !light_dir.is_finite() {
            return ScatterResult::NONE;
        }
        let (Some(view_dir), Some(light_dir)) =
            (view_dir.try_normalize(), light_dir.try_normalize())
        else {
            return ScatterResult::NONE;
        };

        let geometry = &self.geometry;
        let coeffs = &self.coefficients;
        let mu = view_dir.y;
        let path_length = geometry.view_path_length(mu);
        let optical_length = path_length * self.distance_scale;
        if optical_length.is_nan() || optical_length <= MIN_PATH_LENGTH {
            return ScatterResult::NONE;
        }

        let cos_theta = view_dir.dot(light_dir).clamp(-1.0, 1.0);
        let phase_r = rayleigh_phase(cos_theta);
        let phase_m = mie_phase(cos_theta, self.mie_g);

        let r0 = geometry.eye_radius();
        let r0_sq_minus_ground =
            geometry.eye_altitude * (2.0 * geometry.planet_radius + geometry.eye_altitude);

        let samples = self.sample_count;
        let step = path_length / samples as f32;
        let optical_step = step * self.distance_scale;

        let mut transmittance = Vec3::ONE;
        let mut inscatter = Vec3::ZERO;

        for i in 0..samples {
            let t = (i as f32 + 0.5) * step;
            let altitude = geometry.altitude_along(r0, r0_sq_minus_ground, mu, t);

            let density_r = (-altitude / geometry.rayleigh_scale_height).exp();
            let density_m = (-altitude / geometry.mie_scale_height).exp();

            let sigma = coeffs.extinction_r * density_r + coeffs.extinction_m * density_m;
            let step_transmittance = exp3(-sigma * optical_step);

            let sample_pos = Vec3::new(0.0, r0, 0.0) + view_dir * t;
            if let Some((light_r, light_m)) = sun_optical_depth(sample_pos, light_dir, geometry) {
                let source = (coeffs.scattering_r * (density_r * phase_r)
                    + coeffs.scattering_m * (density_m * phase_m))
                    * extinction(coeffs, light_r, light_m);
                // Integrate the source analytically across the step so that
                // long steps through dense air do not overshoot.
                let integral = Vec3::select(
                    sigma.cmpgt(Vec3::splat(1e-12)),
                    source * (Vec3::ONE - step_transmittance) / sigma.max(Vec3::splat(1e-12)),
                    source * optical_step,
                );
                inscatter += transmittance * integral;
            }

            transmittance *= step_transmittance;
        }

        let inscatter = inscatter * self.light_color;

        tracing::trace!(
            ?view_dir,
            path_length,
            optical_length,
            ?inscatter,
            ?transmittance,
            "single scatter"
        );

        ScatterResult {
            inscatter: inscatter.max(Vec3::ZERO),
            transmittance: transmittance.clamp(Vec3::ZERO, Vec3::ONE),
        }
    }
}

/// Compute the single-scattered sky contribution for a view ray.
///
/// `params` should already be sanitized. See [`ScatteringMedium::scatter`].
pub fn compute_single_scatter(
    view_dir: Vec3,
    light_dir: Vec3,
    params: &AtmosphereParameters,
    geometry: &PlanetGeometry,
) -> ScatterResult {
    ScatteringMedium::from_parameters(params, geometry).scatter(view_dir, light_dir)
}

/// Beer-Lambert attenuation for the given Rayleigh and Mie optical depths.
fn extinction(coeffs: &ScatteringCoefficients, depth_r: f32, depth_m: f32) -> Vec3 {
    exp3(-(coeffs.extinction_r * depth_r + coeffs.extinction_m * depth_m))
}

fn exp3(v: Vec3) -> Vec3 {
    Vec3::new(v.x.exp(), v.y.exp(), v.z.exp())
}

/// Rayleigh and Mie optical depth from `position` (planet-centered) to the
/// top of the atmosphere along `light_dir`, or `None` if the planet blocks it.
fn sun_optical_depth(
    position: Vec3,
    light_dir: Vec3,
    geometry: &PlanetGeometry,
) -> Option<(f32, f32)> {
    let radius = position.length();
    let up = position / radius;
    let altitude = (radius - geometry.planet_radius).max(0.0);
    let mu = up.dot(light_dir);

    let length = geometry.distance_to_top(altitude, mu)?;
    let step = length / LIGHT_SAMPLES as f32;
    let r0 = geometry.planet_radius + altitude;
    let r0_sq_minus_ground = altitude * (2.0 * geometry.planet_radius + altitude);

    let mut depth_r = 0.0;
    let mut depth_m = 0.0;
    for j in 0..LIGHT_SAMPLES {
        let t = (j as f32 + 0.5) * step;
        let h = geometry.altitude_along(r0, r0_sq_minus_ground, mu, t);
        depth_r += (-h / geometry.rayleigh_scale_height).exp() * step;
        depth_m += (-h / geometry.mie_scale_height).exp() * step;
    }
    Some((depth_r, depth_m))
}
