use crate::consts::{TIME_UNITS, TIME_UNIT_DIVISORS};
use crate::error::{QcError, Result};

/// A display unit for frame intervals and the factor that converts the
/// recorded unit into it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    pub divisor: f64,
    pub unit: &'static str,
}

/// Index of a recorded unit in [`TIME_UNITS`].
///
/// Accepts plain names (`second`) as well as enum-style labels
/// (`UnitsTime.MILLISECOND`), using the text after the last `.`.
pub fn parse_time_unit(raw: &str) -> Result<usize> {
    let name = raw.rsplit('.').next().unwrap_or(raw).trim().to_ascii_lowercase();
    TIME_UNITS
        .iter()
        .position(|u| *u == name)
        .ok_or_else(|| QcError::TimeUnit(format!("unknown time unit '{raw}'")))
}

/// Climb from `base` toward larger units while the reference interval,
/// expressed in the next unit, is still greater than one.
///
/// `reference` must be finite. The climb stops at the largest unit.
pub fn infer_time_scale(reference: f64, base: usize) -> Result<TimeScale> {
    if !reference.is_finite() {
        return Err(QcError::TimeUnit(format!(
            "reference interval is not finite ({reference})"
        )));
    }
    if base >= TIME_UNITS.len() {
        return Err(QcError::TimeUnit(format!("no time unit at index {base}")));
    }

    let mut value = reference;
    let mut divisor = 1.0;
    let mut unit = base;
    while let Some(&step) = TIME_UNIT_DIVISORS.get(unit) {
        if value / step <= 1.0 {
            break;
        }
        value /= step;
        divisor *= step;
        unit += 1;
    }
    Ok(TimeScale {
        divisor,
        unit: TIME_UNITS[unit],
    })
}
