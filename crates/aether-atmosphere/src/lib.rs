//! Atmosphere scattering: Rayleigh + Mie single-scattering sky model.
//!
//! Provides [`AtmosphereParameters`] for the user-facing settings,
//! [`PlanetGeometry`] for the fixed planet dimensions,
//! [`ScatteringMedium`] and [`compute_single_scatter`] for the per-ray
//! evaluation, and
//! [`AtmosphereUniform`] for binding the same values to a shading program.

mod geometry;
mod params;
mod phase;
mod scatter;
mod uniform;

pub use geometry::PlanetGeometry;
pub use params::{
    AtmosphereParameters, MAX_COEFFICIENT_SCALE, MAX_MIE_G, MAX_SAMPLE_COUNT, MIE_BASE,
    RAYLEIGH_BASE, ScatteringCoefficients,
};
pub use phase::{mie_phase, rayleigh_phase};
pub use scatter::{LIGHT_SAMPLES, ScatterResult, ScatteringMedium, compute_single_scatter};
pub use uniform::{AtmosphereUniform, BINDING_NAMES};
