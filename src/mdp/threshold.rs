//! Convergence thresholds derived from a precision constant.

use crate::error::{Error, Result};
use crate::mdp::grid::RewardTable;

/// Converts a precision constant `c` into a convergence threshold.
///
/// With `epsilon = c * R_max`, the threshold is `epsilon * (1 - gamma) / gamma`
/// rounded to one significant figure, with halves going to the even digit.
///
/// # Examples
///
/// ```
/// use gridmdp::{derive_threshold, RewardTable};
///
/// let threshold = derive_threshold(1.0, &RewardTable::default(), 0.99).unwrap();
/// assert_eq!(threshold, 0.01);
/// ```
///
/// # Errors
/// [`Error::Derivation`] if the reward table is empty or the result is not a
/// positive finite number (`gamma == 0`, `R_max == 0`, a negative `c`, ...).
pub fn derive_threshold(c: f64, rewards: &RewardTable, gamma: f64) -> Result<f64> {
    let r_max = rewards
        .max()
        .ok_or_else(|| Error::Derivation("reward table is empty".to_string()))?;
    let epsilon = c * r_max;
    let raw = epsilon * (1.0 - gamma) / gamma;
    if !raw.is_finite() || raw <= 0.0 {
        return Err(Error::Derivation(format!(
            "threshold {} from c={}, max reward={}, gamma={} is not a positive number",
            raw, c, r_max, gamma
        )));
    }

    let rounded = round_to_one_significant_figure(raw);
    if !rounded.is_finite() || rounded <= 0.0 {
        return Err(Error::Derivation(format!(
            "rounding threshold {} produced {}",
            raw, rounded
        )));
    }
    Ok(rounded)
}

fn round_to_one_significant_figure(x: f64) -> f64 {
    let exponent = x.abs().log10().floor() as i32;
    if exponent < 0 {
        let scale = 10f64.powi(-exponent);
        (x * scale).round_ties_even() / scale
    } else {
        let scale = 10f64.powi(exponent);
        (x / scale).round_ties_even() * scale
    }
}
