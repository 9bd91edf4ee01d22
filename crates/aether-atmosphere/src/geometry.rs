//! Planet and atmosphere shell dimensions, plus ray/shell distance helpers.

/// Fixed dimensions of the planet the sky is rendered for.
///
/// These are process-wide constants and are not exposed to the settings system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetGeometry {
    /// Planet surface radius in meters.
    pub planet_radius: f32,
    /// Thickness of the atmosphere shell in meters.
    pub atmosphere_height: f32,
    /// Altitude over which Rayleigh density falls by `1/e`.
    pub rayleigh_scale_height: f32,
    /// Altitude over which Mie density falls by `1/e`.
    pub mie_scale_height: f32,
    /// Height of the eye above the surface in meters.
    pub eye_altitude: f32,
}

impl PlanetGeometry {
    /// Earth-sized planet with an 80 km atmosphere.
    pub const EARTH: Self = Self {
        planet_radius: 6_371_000.0,
        atmosphere_height: 80_000.0,
        rayleigh_scale_height: 8_500.0,
        mie_scale_height: 1_200.0,
        eye_altitude: 1.0,
    };

    /// Radius of the top of the atmosphere.
    pub fn atmosphere_radius(&self) -> f32 {
        self.planet_radius + self.atmosphere_height
    }

    /// Distance from the planet center to the eye.
    pub fn eye_radius(&self) -> f32 {
        self.planet_radius + self.eye_altitude
    }

    /// Altitude above the surface of a point at distance `t` along a ray that
    /// starts at radius `r0` with vertical cosine `mu`.
    ///
    /// `r0_sq_minus_ground` is `r0² - R²`, computed once by the caller so the
    /// large radii cancel exactly.
    pub fn altitude_along(&self, r0: f32, r0_sq_minus_ground: f32, mu: f32, t: f32) -> f32 {
        let r_sq_minus_ground = r0_sq_minus_ground + t * t + 2.0 * r0 * t * mu;
        let r = (self.planet_radius * self.planet_radius + r_sq_minus_ground).sqrt();
        (r_sq_minus_ground / (r + self.planet_radius)).max(0.0)
    }

    /// Distance from the eye to the end of the view path: the atmosphere top,
    /// or the ground if the ray hits it first.
    pub fn view_path_length(&self, mu: f32) -> f32 {
        self.path_length_from(self.eye_altitude, mu).unwrap_or(0.0)
    }

    /// Distance along a ray starting at `altitude` with vertical cosine `mu` to
    /// the atmosphere top. Returns `None` when the ray hits the ground first.
    pub fn distance_to_top(&self, altitude: f32, mu: f32) -> Option<f32> {
        match self.path_length_from(altitude, mu) {
            Some(t) if !self.hits_ground(altitude, mu) => Some(t),
            _ => None,
        }
    }

    fn hits_ground(&self, altitude: f32, mu: f32) -> bool {
        if mu >= 0.0 {
            return false;
        }
        let r0 = self.planet_radius + altitude;
        let r0_sq_minus_ground = altitude * (2.0 * self.planet_radius + altitude);
        r0 * r0 * mu * mu - r0_sq_minus_ground >= 0.0
    }

    /// Path length to the ground (if hit) or the atmosphere top.
    fn path_length_from(&self, altitude: f32, mu: f32) -> Option<f32> {
        let mu = mu.clamp(-1.0, 1.0);
        let r0 = self.planet_radius + altitude;
        let top = self.atmosphere_radius();
        if r0 >= top {
            return None;
        }

        // Both roots are written in the rationalised form so that the ~4e13
        // squares of the radii never get subtracted from each other.
        if mu < 0.0 {
            let r0_sq_minus_ground = altitude * (2.0 * self.planet_radius + altitude);
            let disc = r0 * r0 * mu * mu - r0_sq_minus_ground;
            if disc >= 0.0 {
                let denom = -r0 * mu + disc.sqrt();
                return Some(if denom > 0.0 { r0_sq_minus_ground / denom } else { 0.0 });
            }
        }

        let top_sq_minus_r0 = (top - r0) * (top + r0);
        let disc = top_sq_minus_r0 + r0 * r0 * mu * mu;
        let root = disc.max(0.0).sqrt();
        let t = if mu >= 0.0 {
            let denom = r0 * mu + root;
            if denom > 0.0 { top_sq_minus_r0 / denom } else { 0.0 }
        } else {
            -r0 * mu + root
        };
        Some(t.max(0.0))
    }
}

impl Default for PlanetGeometry {
    fn default() -> Self {
        Self::EARTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zenith_path_is_shell_thickness() {
        let g = PlanetGeometry::EARTH;
        let t = g.view_path_length(1.0);
        let expected = g.atmosphere_height - g.eye_altitude;
        assert!((t - expected).abs() < 2.0, "zenith path {t} should be ~{expected}");
    }

    #[test]
    fn test_horizon_path_is_tangent_length() {
        let g = PlanetGeometry::EARTH;
        let t = g.view_path_length(0.0);
        let r0 = g.eye_radius() as f64;
        let ra = g.atmosphere_radius() as f64;
        let expected = (ra * ra - r0 * r0).sqrt() as f32;
        assert!(
            (t - expected).abs() / expected < 1e-3,
            "horizon path {t} should be ~{expected}"
        );
        assert!(t > 900_000.0);
    }

    #[test]
    fn test_downward_ray_hits_ground_quickly() {
        let g = PlanetGeometry::EARTH;
        let t = g.view_path_length(-1.0);
        assert!((t - g.eye_altitude).abs() < 0.1, "straight down path {t}");
    }

    #[test]
    fn test_altitude_along_is_precise_near_surface() {
        let g = PlanetGeometry::EARTH;
        let r0 = g.eye_radius();
        let r0_sq = g.eye_altitude * (2.0 * g.planet_radius + g.eye_altitude);
        let h = g.altitude_along(r0, r0_sq, 1.0, 100.0);
        assert!((h - 101.0).abs() < 0.01, "altitude {h}");
        let h0 = g.altitude_along(r0, r0_sq, 0.0, 0.0);
        assert!((h0 - g.eye_altitude).abs() < 1e-3);
    }

    #[test]
    fn test_distance_to_top_none_in_shadow() {
        let g = PlanetGeometry::EARTH;
        assert!(g.distance_to_top(10.0, -1.0).is_none());
        assert!(g.distance_to_top(10.0, 1.0).is_some());
    }

    #[test]
    fn test_outside_atmosphere_has_no_path() {
        let g = PlanetGeometry::EARTH;
        assert!(g.distance_to_top(g.atmosphere_height + 1.0, 1.0).is_none());
    }
}
