//! Scalar helpers shared by the car-following models.

/// Exponent magnitude beyond which [smooth_extremum] falls back to a hard max/min.
const EXP_GUARD: f64 = 700.0;

/// The speed below which vehicle noise is gated off, in m/s.
const NOISE_GATE_SPEED: f64 = 0.1; // m/s

/// The steepness of the logistic noise gate.
const NOISE_GATE_STEEPNESS: f64 = 1000.0;

/// Hyperbolic tangent written as `(1 - e^(-2y)) / (1 + e^(-2y))`.
///
/// The models were calibrated against this form, so it is used in place of [f64::tanh].
#[inline]
pub fn stable_tanh(y: f64) -> f64 {
    let e = (-2.0 * y).exp();
    (1.0 - e) / (1.0 + e)
}

/// The optimal velocity curve: the speed a driver wants to travel at given a net gap.
///
/// # Parameters
/// * `gap` - The net distance to the vehicle ahead in m.
#[inline]
pub fn desired_speed(gap: f64) -> f64 {
    13.7 * stable_tanh(gap / 20.0 - 0.5) + 6.3
}

/// Zero for negative inputs, the identity otherwise.
#[inline]
pub fn ramp_positive(y: f64) -> f64 {
    0.5 * (y + y.abs())
}

/// A smoothed maximum (`eps > 0`) or minimum (`eps < 0`) of `a` and `b`.
///
/// Computed as `eps * ln(e^(a/eps) + e^(b/eps))`. When either scaled argument
/// reaches a magnitude of 700 the result is exactly `max(a, b)` or `min(a, b)`.
pub fn smooth_extremum(a: f64, b: f64, eps: f64) -> f64 {
    let a_eps = a / eps;
    let b_eps = b / eps;
    if a_eps.abs() < EXP_GUARD && b_eps.abs() < EXP_GUARD {
        eps * (a_eps.exp() + b_eps.exp()).ln()
    } else if eps > 0.0 {
        f64::max(a, b)
    } else {
        f64::min(a, b)
    }
}

/// The noise intensity of a vehicle travelling at `speed`.
///
/// A steep logistic gate which switches the noise off as the vehicle approaches standstill.
#[inline]
pub fn noise_gate(speed: f64, noise_scale: f64) -> f64 {
    let arg = f64::min(-NOISE_GATE_STEEPNESS * (speed - NOISE_GATE_SPEED), EXP_GUARD);
    noise_scale / (1.0 + arg.exp())
}
