//! Scattering phase functions.

use std::f32::consts::PI;

/// Rayleigh phase function `3/(16π) (1 + cos²θ)`.
pub fn rayleigh_phase(cos_theta: f32) -> f32 {
    let c = clamp_cos(cos_theta);
    3.0 / (16.0 * PI) * (1.0 + c * c)
}

/// Henyey-Greenstein phase function for Mie scattering with asymmetry `g`.
///
/// `g` is clamped to `[0, 0.999]` so the denominator stays strictly positive
/// even when the sun sits exactly on the view ray.
pub fn mie_phase(cos_theta: f32, g: f32) -> f32 {
    let c = clamp_cos(cos_theta);
    let g = if g.is_nan() { 0.0 } else { g.clamp(0.0, 0.999) };
    let g2 = g * g;
    let denom = (1.0 + g2 - 2.0 * g * c).max(1e-6);
    (1.0 - g2) / (4.0 * PI * denom * denom.sqrt())
}

fn clamp_cos(cos_theta: f32) -> f32 {
    if cos_theta.is_nan() {
        0.0
    } else {
        cos_theta.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Integrate a phase function over the sphere with the midpoint rule.
    fn integrate(f: impl Fn(f32) -> f32) -> f32 {
        let n = 20_000;
        let mut sum = 0.0_f64;
        for i in 0..n {
            let mu = -1.0 + (i as f64 + 0.5) * 2.0 / n as f64;
            sum += f(mu as f32) as f64 * 2.0 / n as f64;
        }
        (sum * 2.0 * std::f64::consts::PI) as f32
    }

    #[test]
    fn test_rayleigh_normalized() {
        let total = integrate(rayleigh_phase);
        assert!((total - 1.0).abs() < 1e-3, "integral {total}");
    }

    #[test]
    fn test_mie_normalized() {
        for g in [0.0, 0.3, 0.76] {
            let total = integrate(|c| mie_phase(c, g));
            assert!((total - 1.0).abs() < 1e-2, "g={g} integral {total}");
        }
    }

    #[test]
    fn test_mie_forward_peaked() {
        assert!(mie_phase(1.0, 0.76) > mie_phase(0.0, 0.76));
        assert!(mie_phase(0.0, 0.76) > mie_phase(-1.0, 0.76));
    }

    #[test]
    fn test_extreme_angles_are_finite() {
        for c in [-1.0, 1.0, -1.5, 1.5, f32::NAN] {
            assert!(rayleigh_phase(c).is_finite());
            for g in [0.0, 0.76, 0.999, 1.0] {
                let p = mie_phase(c, g);
                assert!(p.is_finite() && p >= 0.0, "cos={c} g={g} -> {p}");
            }
        }
    }

    #[test]
    fn test_out_of_range_cos_is_clamped() {
        assert_eq!(rayleigh_phase(2.0), rayleigh_phase(1.0));
        assert_eq!(mie_phase(-3.0, 0.5), mie_phase(-1.0, 0.5));
    }
}
