//! # Tide & Clearance Calculator
//!
//! Pure, stateless arithmetic over validated inputs:
//!
//! - **Squat**: `Cb × V² / 100` (meters, with speed in knots)
//! - **Height of tide**: cosine interpolation between a high and a low water
//! - **Under-keel clearance**: `depth + tide − (draft + squat)`
//!
//! ## Height of Tide
//!
//! Between consecutive extremes the water level follows half a cosine wave:
//!
//! ```text
//! mean      = (h_high + h_low) / 2
//! amplitude = (h_high − h_low) / 2
//! h(t)      = mean + amplitude × cos(π × (t − t_high) / (t_low − t_high))
//! ```
//!
//! At `t_high` the phase is 0 and the result is `h_high`; at `t_low` the phase
//! is π and the result is `h_low`; halfway between them it is the mean level.
//!
//! Text entry parsing also lives here so that every path into the formulas
//! goes through the same finiteness checks.

use crate::{CalculationResult, ClearanceRequest, TideWindow, UkcError};
use chrono::{NaiveDate, NaiveDateTime};
use std::f64::consts::PI;

/// Reject NaN and infinities, naming the offending field.
pub fn ensure_finite(field: &str, value: f64) -> Result<f64, UkcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(UkcError::invalid(format!("{field} must be a finite number")))
    }
}

/// Parse a text entry as a finite real number.
///
/// # Example
/// ```
/// use ukc_lib::calculator::parse_number;
///
/// assert_eq!(parse_number("speed", " 10.5 ").unwrap(), 10.5);
/// assert!(parse_number("speed", "ten").is_err());
/// assert!(parse_number("speed", "NaN").is_err());
/// ```
pub fn parse_number(field: &str, text: &str) -> Result<f64, UkcError> {
    let value = text
        .trim()
        .parse::<f64>()
        .map_err(|_| UkcError::invalid(format!("{field} '{}' is not a number", text.trim())))?;
    ensure_finite(field, value)
}

/// Parse a `YYYYMMDD` date entry.
pub fn parse_date(text: &str) -> Result<NaiveDate, UkcError> {
    let text = text.trim();
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UkcError::invalid(format!("date '{text}' is not YYYYMMDD")));
    }
    NaiveDate::parse_from_str(text, "%Y%m%d")
        .map_err(|_| UkcError::invalid(format!("date '{text}' is not a calendar date")))
}

/// Squat in meters for a block coefficient and a speed in knots.
///
/// # Example
/// ```
/// use ukc_lib::calculator::compute_squat;
///
/// let squat = compute_squat(0.7, 10.0).unwrap();
/// assert!((squat - 0.70).abs() < 1e-12);
/// ```
pub fn compute_squat(block_coefficient: f64, speed_knots: f64) -> Result<f64, UkcError> {
    ensure_finite("block coefficient", block_coefficient)?;
    ensure_finite("speed", speed_knots)?;
    if block_coefficient <= 0.0 {
        return Err(UkcError::invalid("block coefficient must be positive"));
    }
    if speed_knots < 0.0 {
        return Err(UkcError::invalid("speed must not be negative"));
    }
    Ok(block_coefficient * speed_knots.powi(2) / 100.0)
}

/// Height of tide at `time_of_passage`, interpolated between a high and a low
/// water. Times are hours on any common scale; heights share one unit.
pub fn compute_height_of_tide(
    time_high: f64,
    time_low: f64,
    height_high: f64,
    height_low: f64,
    time_of_passage: f64,
) -> Result<f64, UkcError> {
    ensure_finite("time of high water", time_high)?;
    ensure_finite("time of low water", time_low)?;
    ensure_finite("height of high water", height_high)?;
    ensure_finite("height of low water", height_low)?;
    ensure_finite("time of passage", time_of_passage)?;

    let duration = time_low - time_high;
    if duration == 0.0 {
        return Err(UkcError::invalid(
            "high and low water cannot occur at the same time",
        ));
    }

    let mean = (height_high + height_low) / 2.0;
    let amplitude = (height_high - height_low) / 2.0;
    let phase = PI * (time_of_passage - time_high) / duration;

    Ok(mean + amplitude * phase.cos())
}

/// Clearance between keel and seabed, in meters.
///
/// # Example
/// ```
/// use ukc_lib::calculator::compute_under_keel_clearance;
///
/// let ukc = compute_under_keel_clearance(12.0, 1.5, 8.0, 0.70).unwrap();
/// assert!((ukc - 4.80).abs() < 1e-9);
/// ```
pub fn compute_under_keel_clearance(
    shallowest_depth: f64,
    lowest_tide: f64,
    deep_draft: f64,
    squat: f64,
) -> Result<f64, UkcError> {
    ensure_finite("shallowest depth", shallowest_depth)?;
    ensure_finite("lowest tide", lowest_tide)?;
    ensure_finite("deep draft", deep_draft)?;
    ensure_finite("squat", squat)?;
    Ok(shallowest_depth + lowest_tide - (deep_draft + squat))
}

/// Height of tide at a passage instant using the clock times of a window.
///
/// Times are measured in hours from the high water.
pub fn height_at(window: &TideWindow, passage: NaiveDateTime) -> Result<f64, UkcError> {
    let hours_from_high = |t: NaiveDateTime| (t - window.time_high).num_seconds() as f64 / 3600.0;
    compute_height_of_tide(
        0.0,
        hours_from_high(window.time_low),
        window.height_high,
        window.height_low,
        hours_from_high(passage),
    )
}

/// Place clock hours (0-24) of a high water, a low water and a passage on
/// one forward time line.
///
/// Consecutive extremes are less than half a day apart, so when the two
/// events read more than 12 h apart the earlier clock time belongs to the
/// next day. A passage outside the resulting cycle is moved by a day when
/// that lands it inside.
///
/// # Example
/// ```
/// use ukc_lib::calculator::unwrap_clock_hours;
///
/// // high at 22:00, low at 04:00 the next morning, passage at 01:00
/// assert_eq!(unwrap_clock_hours(22.0, 4.0, 1.0), (22.0, 28.0, 25.0));
/// ```
pub fn unwrap_clock_hours(time_high: f64, time_low: f64, time_of_passage: f64) -> (f64, f64, f64) {
    let (mut high, mut low) = (time_high, time_low);
    if (low - high).abs() > 12.0 {
        if low < high {
            low += 24.0;
        } else {
            high += 24.0;
        }
    }

    let (start, end) = (high.min(low), high.max(low));
    let passage = [time_of_passage, time_of_passage + 24.0, time_of_passage - 24.0]
        .into_iter()
        .find(|t| (start..=end).contains(t))
        .unwrap_or(time_of_passage);

    (high, low, passage)
}

/// Run every calculation a request allows.
pub fn calculate(request: &ClearanceRequest) -> Result<CalculationResult, UkcError> {
    let vessel = &request.vessel;
    let route = &request.route;

    let squat = compute_squat(vessel.block_coefficient, vessel.speed_knots)?;
    let under_keel_clearance = compute_under_keel_clearance(
        route.shallowest_depth,
        route.lowest_tide,
        vessel.deep_draft,
        squat,
    )?;

    let height_of_tide = request
        .tide_window
        .as_ref()
        .map(|window| height_at(window, request.passage))
        .transpose()?;

    let clearance_at_passage = height_of_tide
        .map(|tide| {
            compute_under_keel_clearance(route.shallowest_depth, tide, vessel.deep_draft, squat)
        })
        .transpose()?;

    Ok(CalculationResult {
        squat,
        height_of_tide,
        under_keel_clearance,
        clearance_at_passage,
    })
}
