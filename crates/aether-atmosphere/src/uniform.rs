//! GPU-side parameter block for the sky atmosphere shading programs.
//!
//! Each field corresponds to one shader property. The compositor fills a
//! fresh [`AtmosphereUniform`] every frame from the resolved settings, so the
//! CPU reference path and any shader path read the exact same numbers.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use static_assertions::const_assert_eq;

use crate::geometry::PlanetGeometry;
use crate::params::{AtmosphereParameters, ScatteringCoefficients};
use crate::scatter::ScatteringMedium;

/// Shader property names in the order the fields appear in [`AtmosphereUniform`].
pub const BINDING_NAMES: [&str; 14] = [
    "_MainLightDir",
    "_RTSize",
    "_Scattering_R",
    "_Scattering_M",
    "_Extinction_R",
    "_Extinction_M",
    "_LightColor",
    "_SkyAtmosphereHeight",
    "_PlanetRadius",
    "_SeaLevelHeight_R",
    "_SeaLevelHeight_M",
    "_MieG",
    "_DistanceScale",
    "_SampleCounts",
];

/// Uniform block layout. Every vector is padded to a `vec4` so the struct
/// matches std140 without hidden padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct AtmosphereUniform {
    /// World-space forward vector of the main light; w unused. (offset 0)
    pub main_light_dir: [f32; 4],
    /// `(width, height, 1/width, 1/height)`. (offset 16)
    pub rt_size: [f32; 4],
    /// Effective Rayleigh scattering; w unused. (offset 32)
    pub scattering_r: [f32; 4],
    /// Effective Mie scattering; w unused. (offset 48)
    pub scattering_m: [f32; 4],
    /// Effective Rayleigh extinction; w unused. (offset 64)
    pub extinction_r: [f32; 4],
    /// Effective Mie extinction; w unused. (offset 80)
    pub extinction_m: [f32; 4],
    /// Light color; w unused. (offset 96)
    pub light_color: [f32; 4],
    /// (offset 112)
    pub sky_atmosphere_height: f32,
    /// (offset 116)
    pub planet_radius: f32,
    /// Rayleigh scale height. (offset 120)
    pub sea_level_height_r: f32,
    /// Mie scale height. (offset 124)
    pub sea_level_height_m: f32,
    /// (offset 128)
    pub mie_g: f32,
    /// (offset 132)
    pub distance_scale: f32,
    /// Stored as float, as the shader reads it. (offset 136)
    pub sample_counts: f32,
    /// (offset 140)
    pub _padding: f32,
}

const_assert_eq!(std::mem::size_of::<AtmosphereUniform>(), 144);
const_assert_eq!(std::mem::size_of::<AtmosphereUniform>() % 16, 0);

impl AtmosphereUniform {
    /// Build the block for one frame. `params` is sanitized here, so callers
    /// may pass raw resolved settings.
    pub fn new(
        params: &AtmosphereParameters,
        geometry: &PlanetGeometry,
        main_light_dir: Vec3,
        rt_size: Vec4,
    ) -> Self {
        let params = params.sanitized();
        let coeffs = params.coefficients();
        Self {
            main_light_dir: main_light_dir.extend(0.0).to_array(),
            rt_size: rt_size.to_array(),
            scattering_r: coeffs.scattering_r.extend(0.0).to_array(),
            scattering_m: coeffs.scattering_m.extend(0.0).to_array(),
            extinction_r: coeffs.extinction_r.extend(0.0).to_array(),
            extinction_m: coeffs.extinction_m.extend(0.0).to_array(),
            light_color: params.light_color().extend(1.0).to_array(),
            sky_atmosphere_height: geometry.atmosphere_height,
            planet_radius: geometry.planet_radius,
            sea_level_height_r: geometry.rayleigh_scale_height,
            sea_level_height_m: geometry.mie_scale_height,
            mie_g: params.mie_g,
            distance_scale: params.distance_scale,
            sample_counts: params.sample_count as f32,
            _padding: 0.0,
        }
    }

    /// Unit vector from the scene toward the main light.
    pub fn light_dir(&self) -> Vec3 {
        -Vec4::from_array(self.main_light_dir).truncate()
    }

    /// The integrator inputs exactly as bound. The eye altitude has no slot in
    /// the block, so the caller supplies it.
    pub fn scattering_medium(&self, eye_altitude: f32) -> ScatteringMedium {
        let xyz = |v: [f32; 4]| Vec4::from_array(v).truncate();
        ScatteringMedium {
            coefficients: ScatteringCoefficients {
                scattering_r: xyz(self.scattering_r),
                scattering_m: xyz(self.scattering_m),
                extinction_r: xyz(self.extinction_r),
                extinction_m: xyz(self.extinction_m),
            },
            light_color: xyz(self.light_color),
            mie_g: self.mie_g,
            distance_scale: self.distance_scale,
            sample_count: self.sample_counts as u32,
            geometry: PlanetGeometry {
                planet_radius: self.planet_radius,
                atmosphere_height: self.sky_atmosphere_height,
                rayleigh_scale_height: self.sea_level_height_r,
                mie_scale_height: self.sea_level_height_m,
                eye_altitude,
            },
        }
    }

    /// Shader property names in field order.
    pub fn binding_names() -> &'static [&'static str] {
        &BINDING_NAMES
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
