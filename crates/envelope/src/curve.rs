use std::f64::consts::PI;

/// A named curve shape with its shape amount in [0, 1].
///
/// All variants map t in [0, 1] to v in [0, 1] and anchor both endpoints:
/// `evaluate(0) == 0` and `evaluate(1) == 1` for every shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    /// Exponential ease-in: `t^(1 + shape*3)`.
    EaseIn(f64),
    /// Logarithmic ease-out: `1 - (1-t)^(1 + shape*3)`.
    EaseOut(f64),
    /// Cosine S-curve, normalized so it reaches exactly 1 at t=1.
    SCurve(f64),
}

impl Curve {
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = clamp_unit(t);
        match *self {
            Curve::Linear => t,
            Curve::EaseIn(shape) => {
                let power = 1.0 + clamp_unit(shape) * 3.0;
                t.powf(power)
            }
            Curve::EaseOut(shape) => {
                let power = 1.0 + clamp_unit(shape) * 3.0;
                1.0 - (1.0 - t).powf(power)
            }
            Curve::SCurve(shape) => {
                let freq = 1.0 + clamp_unit(shape) * 2.0;
                let raw = 0.5 - 0.5 * (PI * freq * t).cos();
                let raw_end = 0.5 - 0.5 * (PI * freq).cos();
                // Even frequencies land the cosine back at its start, which
                // would normalize against zero. Degenerate shape falls back
                // to linear.
                if raw_end.abs() < 1e-9 {
                    t
                } else {
                    raw / raw_end
                }
            }
        }
    }
}

/// Shape t in [0, 1] by a signed curve scalar in [-99, 99].
///
/// 0 is linear, negative is exponential (`t^power`), positive is logarithmic
/// (`1 - (1-t)^power`) with `power = 1 + |curve|/99 * 3`. Non-finite curve
/// values are treated as linear.
pub fn shape_curve(t: f64, curve: f64) -> f64 {
    let t = clamp_unit(t);
    if !curve.is_finite() || curve == 0.0 {
        return t;
    }
    let curve = curve.clamp(-99.0, 99.0);
    let power = 1.0 + curve.abs() / 99.0 * 3.0;
    if curve < 0.0 {
        t.powf(power)
    } else {
        1.0 - (1.0 - t).powf(power)
    }
}

/// Interpolate between two values with a signed segment curve.
pub fn interpolate(v1: f64, v2: f64, t: f64, curve: f64) -> f64 {
    v1 + (v2 - v1) * shape_curve(t, curve)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}
