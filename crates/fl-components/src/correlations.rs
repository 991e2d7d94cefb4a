//! Loss-coefficient and friction-factor correlations.
//!
//! Plain formula library in SI `f64`. Friction and bend relations follow
//! Rennels & Hudson, *Pipe Flow* (2012); gradual contraction and enlargement
//! follow Crane TP-410. All `K` values are referenced to the velocity in the
//! diameter passed alongside them.

use std::f64::consts::PI;

use fl_core::numeric::circle_area;

use crate::common::RE_LAMINAR;
use crate::error::{ComponentError, ComponentResult, RangeWarning};

/// Darcy friction factor from the Colebrook-White equation, iterated
/// `iterations` times from `f = 0.05`. Laminar `64/Re` below Re 2100.
pub fn colebrook_white(diameter: f64, roughness: f64, re: f64, iterations: usize) -> f64 {
    if re < RE_LAMINAR {
        return 64.0 / re;
    }
    let rel = roughness / (3.7 * diameter);
    let mut f: f64 = 0.05;
    for _ in 0..iterations {
        f = (2.0 * (rel + 2.51 / (re * f.sqrt())).log10()).powi(-2);
    }
    f
}

/// Darcy friction factor, explicit Churchill form.
pub fn churchill(diameter: f64, roughness: f64, re: f64) -> f64 {
    if re < RE_LAMINAR {
        return 64.0 / re;
    }
    (2.0 * (roughness / (3.7 * diameter) + (7.0 / re).powf(0.9)).log10()).powi(-2)
}

/// Straight-run friction loss, `f l / d`.
pub fn k_friction(f: f64, length: f64, diameter: f64) -> f64 {
    f * length / diameter
}

/// Circular bend of radius `radius` through `angle` radians.
pub fn k_bend(f: f64, diameter: f64, radius: f64, angle: f64) -> f64 {
    let rd = radius / diameter;
    let s = (angle / 2.0).sin();
    f * angle * rd + (0.1 + 2.4 * f) * s + 6.6 * f * (s.sqrt() + s) / rd.powf(4.0 * angle / PI)
}

pub fn cd_from_k(k: f64) -> f64 {
    (1.0 / k).sqrt()
}

pub fn k_from_cd(cd: f64) -> f64 {
    1.0 / (cd * cd)
}

/// Pressure drop across a loss `k` at flow `mdot` through diameter `d`.
pub fn dp_from_k(k: f64, mdot: f64, d: f64, rho: f64) -> f64 {
    let a = circle_area(d);
    k * mdot * mdot / (2.0 * a * a * rho)
}

pub fn dp_from_cd(cd: f64, mdot: f64, d: f64, rho: f64) -> f64 {
    let a = cd * circle_area(d);
    mdot * mdot / (2.0 * a * a * rho)
}

pub fn mdot_from_k(k: f64, dp: f64, d: f64, rho: f64) -> f64 {
    circle_area(d) * (2.0 * dp * rho / k).sqrt()
}

pub fn mdot_from_cd(cd: f64, dp: f64, d: f64, rho: f64) -> f64 {
    cd * circle_area(d) * (2.0 * dp * rho).sqrt()
}

/// Loss coefficients of an orifice plate.
#[derive(Debug, Clone, PartialEq)]
pub struct OrificeK {
    /// Single-hole coefficient, referenced to the hole area.
    pub ko: f64,
    /// Whole-plate coefficient `ko / n²`, referenced to one hole area.
    pub knet: f64,
    pub warning: Option<RangeWarning>,
}

impl OrificeK {
    fn new(ko: f64, count: u32, warning: Option<RangeWarning>) -> Self {
        let n = f64::from(count.max(1));
        Self {
            ko,
            knet: ko / (n * n),
            warning,
        }
    }
}

fn diameter_ratios(diameter: f64, d_up: f64, d_down: f64) -> ComponentResult<(f64, f64)> {
    if !(diameter > 0.0 && d_up > 0.0 && d_down > 0.0) {
        return Err(ComponentError::NonPhysical {
            what: "orifice diameters",
        });
    }
    if diameter > d_up || diameter > d_down {
        return Err(ComponentError::InvalidArg {
            what: "orifice larger than adjoining pipe",
        });
    }
    Ok((diameter / d_up, (diameter / d_down).powi(2)))
}

/// Sharp-edged orifice in a transition section.
///
/// Thin plate below `l/d = 0.2`, thick plate up to 1.4. Beyond 1.4 the
/// thick-edge coefficient is clamped to zero and a warning is returned;
/// the bore's own friction is not included.
pub fn k_orifice_sharp(
    count: u32,
    length: f64,
    diameter: f64,
    d_up: f64,
    d_down: f64,
) -> ComponentResult<OrificeK> {
    let (beta, r2) = diameter_ratios(diameter, d_up, d_down)?;
    let ld = length / diameter;
    let lambda = 1.0 + 0.622 * (1.0 - 0.215 * beta.powi(2) - 0.785 * beta.powi(5));
    let base = 0.0696 * (1.0 - beta.powi(5)) * lambda * lambda;

    if ld < 0.2 {
        let ko = base + (lambda - r2).powi(2);
        return Ok(OrificeK::new(ko, count, None));
    }

    let warning = (ld >= 1.4).then_some(RangeWarning {
        parameter: "orifice l/d",
        value: ld,
        limit: 1.4,
        note: "thick-plate correlation clamped; bore friction not included",
    });
    let x = (ld / 1.4).min(1.0);
    let cth = (1.0 - 0.5 * x.powf(2.5) - 0.5 * x.powi(3)).max(0.0).powf(4.5);
    let ko = base
        + cth * (lambda - r2).powi(2)
        + (1.0 - cth) * ((1.0 - lambda).powi(2) + (1.0 - r2).powi(2));
    Ok(OrificeK::new(ko, count, warning))
}

/// Thin orifice with a rounded (filleted) inlet edge of radius `radius`.
pub fn k_orifice_rounded(
    count: u32,
    diameter: f64,
    d_up: f64,
    d_down: f64,
    radius: f64,
) -> ComponentResult<OrificeK> {
    let (beta, r2) = diameter_ratios(diameter, d_up, d_down)?;
    if radius < 0.0 {
        return Err(ComponentError::NonPhysical {
            what: "fillet radius",
        });
    }
    let rd = radius / diameter;
    let lambda = if rd <= 1.0 {
        1.0 + 0.622
            * (1.0 - 0.3 * rd.sqrt() - 0.7 * rd).max(0.0).powi(4)
            * (1.0 - 0.215 * beta.powi(2) - 0.785 * beta.powi(5))
    } else {
        1.0
    };
    let ko = 0.0696
        * (1.0 - 0.569 * rd.min(1.0))
        * (1.0 - rd.min(1.0).sqrt() * beta)
        * (1.0 - beta.powi(5))
        * lambda
        * lambda
        + (lambda - r2).powi(2);
    Ok(OrificeK::new(ko, count, None))
}

/// Orifice with a beveled inlet edge; `bevel` is the bevel angle to the flow
/// direction in radians, `length` the bevel length.
pub fn k_orifice_beveled(
    count: u32,
    length: f64,
    diameter: f64,
    d_up: f64,
    d_down: f64,
    bevel: f64,
) -> ComponentResult<OrificeK> {
    let (beta, r2) = diameter_ratios(diameter, d_up, d_down)?;
    let theta = bevel.to_degrees();
    if !(0.0..=90.0).contains(&theta) {
        return Err(ComponentError::InvalidArg {
            what: "bevel angle must be within 0..90 degrees",
        });
    }
    let ld = length / diameter;
    let cb = (1.0 - theta / 90.0) * (theta / 90.0).powf(1.0 / (2.0 + ld));
    let lambda = 1.0 + 0.622 * (1.0 - cb * ld.powf((1.0 - ld.powf(0.25)) / 2.0));
    let ko = 0.0696
        * (1.0 - cb * ld)
        * (1.0 - 0.42 * ld.sqrt() * beta * beta)
        * (1.0 - beta.powi(5))
        * lambda
        * lambda
        + (lambda - r2).powi(2);
    Ok(OrificeK::new(ko, count, None))
}

/// Gradual contraction with included angle `angle` (radians).
/// `beta` is small over large diameter; result referenced to the small end.
pub fn k_contraction(beta: f64, angle: f64) -> f64 {
    let half = (angle / 2.0).sin();
    if angle <= PI / 4.0 {
        0.8 * half * (1.0 - beta * beta)
    } else {
        0.5 * half.sqrt() * (1.0 - beta * beta)
    }
}

/// Gradual enlargement with included angle `angle` (radians).
/// `beta` is small over large diameter; result referenced to the small end.
pub fn k_enlargement(beta: f64, angle: f64) -> f64 {
    let b2 = 1.0 - beta * beta;
    if angle <= PI / 4.0 {
        2.6 * (angle / 2.0).sin() * b2 * b2
    } else {
        b2 * b2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laminar_friction_is_64_over_re() {
        assert!((colebrook_white(0.01, 1e-5, 1000.0, 4) - 0.064).abs() < 1e-15);
        assert!((churchill(0.01, 1e-5, 1000.0) - 0.064).abs() < 1e-15);
    }

    #[test]
    fn turbulent_friction_in_moody_range() {
        // smooth-ish pipe at Re 1e5 sits near f = 0.018-0.02
        let f_cw = colebrook_white(0.02, 1.5e-6, 1e5, 10);
        let f_ch = churchill(0.02, 1.5e-6, 1e5);
        assert!(f_cw > 0.015 && f_cw < 0.022, "f_cw = {f_cw}");
        assert!((f_cw - f_ch).abs() / f_cw < 0.03);
    }

    #[test]
    fn colebrook_converges_with_iterations() {
        let f4 = colebrook_white(0.05, 4.5e-5, 5e5, 4);
        let f20 = colebrook_white(0.05, 4.5e-5, 5e5, 20);
        assert!((f4 - f20).abs() / f20 < 1e-3);
    }

    #[test]
    fn bend_loss_grows_with_angle() {
        let f = 0.02;
        let k45 = k_bend(f, 0.02, 0.04, 45_f64.to_radians());
        let k90 = k_bend(f, 0.02, 0.04, 90_f64.to_radians());
        assert!(k45 > 0.0);
        assert!(k90 > k45);
        assert_eq!(k_bend(f, 0.02, 0.04, 0.0), 0.0);
    }

    #[test]
    fn dp_and_mdot_invert() {
        let (k, d, rho) = (2.5, 0.01, 800.0);
        let dp = dp_from_k(k, 0.3, d, rho);
        assert!((mdot_from_k(k, dp, d, rho) - 0.3).abs() < 1e-12);
        let cd = cd_from_k(k);
        assert!((dp_from_cd(cd, 0.3, d, rho) - dp).abs() / dp < 1e-12);
        assert!((mdot_from_cd(cd, dp, d, rho) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn sharp_thin_plate_values() {
        // small hole in a large line: lambda -> 1.622, K ~ 0.0696*1.622² + 1.622²
        let k = k_orifice_sharp(1, 0.0, 0.001, 1.0, 1.0).unwrap();
        let lambda: f64 = 1.622;
        let expected = 0.0696 * lambda * lambda + lambda * lambda;
        assert!((k.ko - expected).abs() < 1e-5);
        assert!(k.warning.is_none());
    }

    #[test]
    fn sharp_plate_knet_divides_by_holes_squared() {
        let k = k_orifice_sharp(4, 0.0005, 0.002, 0.02, 0.02).unwrap();
        assert!((k.knet * 16.0 - k.ko).abs() < 1e-12);
    }

    #[test]
    fn thick_plate_loss_below_thin_at_transition() {
        let d = 0.002;
        let below = k_orifice_sharp(1, 0.2 * d - 1e-12, d, 0.02, 0.02).unwrap().ko;
        let above = k_orifice_sharp(1, 0.2 * d, d, 0.02, 0.02).unwrap().ko;
        assert!(above > 0.0 && above <= below);
        assert!((below - above) / below < 0.05);
    }

    #[test]
    fn long_bore_warns() {
        let k = k_orifice_sharp(1, 0.01, 0.002, 0.02, 0.02).unwrap();
        let w = k.warning.unwrap();
        assert_eq!(w.parameter, "orifice l/d");
        assert!((w.value - 5.0).abs() < 1e-12);
        let at_limit = k_orifice_sharp(1, 0.0028, 0.002, 0.02, 0.02).unwrap();
        assert!((k.ko - at_limit.ko).abs() < 1e-12);
    }

    #[test]
    fn rounding_reduces_loss() {
        let sharp = k_orifice_rounded(1, 0.002, 0.02, 0.02, 0.0).unwrap().ko;
        let rounded = k_orifice_rounded(1, 0.002, 0.02, 0.02, 0.0005).unwrap().ko;
        assert!(rounded < sharp);
    }

    #[test]
    fn bevel_reduces_loss() {
        let bev = k_orifice_beveled(1, 0.0002, 0.002, 0.02, 0.02, 45_f64.to_radians())
            .unwrap()
            .ko;
        let sharp = k_orifice_sharp(1, 0.0, 0.002, 0.02, 0.02).unwrap().ko;
        assert!(bev > 0.0 && bev < sharp);
        assert!(k_orifice_beveled(1, 0.0002, 0.002, 0.02, 0.02, 2.0).is_err());
    }

    #[test]
    fn orifice_larger_than_pipe_is_rejected() {
        assert!(k_orifice_sharp(1, 0.0, 0.03, 0.02, 0.02).is_err());
    }

    #[test]
    fn crane_reducer_coefficients() {
        let beta: f64 = 0.5;
        let th = 30_f64.to_radians();
        let kc = k_contraction(beta, th);
        assert!((kc - 0.8 * (15_f64.to_radians()).sin() * 0.75).abs() < 1e-12);
        let ke = k_enlargement(beta, std::f64::consts::PI);
        assert!((ke - 0.5625).abs() < 1e-12);
    }
}
