//! # Text Rendering
//!
//! Fixed-width terminal output for stations, datums, tide predictions and
//! clearance reports. Every function returns a `String` so the caller decides
//! where it goes; the binary prints them to stdout.

use crate::{CalculationResult, StationDetails, TideEvent, TideReading, TideStation, UkcError};
use std::fmt::Write;

/// Column width of the height columns
const COLUMN: usize = 15;

/// Time column fits `YYYY-MM-DD HH:MM` plus padding
const TIME_COLUMN: usize = 18;

/// Render predictions as a Time / Height (ft) / Height (m) table.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use ukc_lib::{renderer::format_predictions, TideReading};
///
/// let time = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap().and_hms_opt(2, 48, 0).unwrap();
/// let table = format_predictions(&[TideReading::from_meters(time, 1.0, None)]);
/// assert!(table.contains("2024-06-16 02:48"));
/// assert!(table.contains("3.28"));
/// ```
pub fn format_predictions(readings: &[TideReading]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<TIME_COLUMN$}{:<COLUMN$}{:<COLUMN$}",
        "Time", "Height (ft)", "Height (m)"
    );
    let _ = writeln!(out, "{}", "-".repeat(TIME_COLUMN + 2 * COLUMN));

    for reading in readings {
        let time = reading.time.format("%Y-%m-%d %H:%M").to_string();
        let marker = match reading.event {
            Some(TideEvent::High) => "H",
            Some(TideEvent::Low) => "L",
            None => "",
        };
        let ft = format!("{:.2}", reading.height_ft);
        let m = format!("{:.2}", reading.height_m);
        let line = format!("{time:<TIME_COLUMN$}{ft:<COLUMN$}{m:<COLUMN$}{marker}");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// One `Name (id)` label per line.
pub fn format_stations(stations: &[TideStation]) -> String {
    stations.iter().fold(String::new(), |mut out, station| {
        let _ = writeln!(out, "{station}");
        out
    })
}

/// Station header followed by its datums, the default one starred.
pub fn format_station_details(details: &StationDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Station: {}", details.station);
    let _ = writeln!(out, "Datums:");
    for (i, datum) in details.datums.iter().enumerate() {
        let mark = if i == 0 { "*" } else { " " };
        let _ = writeln!(out, " {mark} {datum}");
    }
    out
}

/// Squat, height of tide and clearance, meters to two decimals.
pub fn format_report(result: &CalculationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<28}{:>8.2} m", "Estimated squat:", result.squat);
    if let Some(tide) = result.height_of_tide {
        let _ = writeln!(out, "{:<28}{:>8.2} m", "Height of tide at passage:", tide);
    }
    let _ = writeln!(
        out,
        "{:<28}{:>8.2} m",
        "Under-keel clearance:", result.under_keel_clearance
    );
    if let Some(clearance) = result.clearance_at_passage {
        let _ = writeln!(out, "{:<28}{:>8.2} m", "Clearance at passage:", clearance);
    }

    let worst = result
        .clearance_at_passage
        .map_or(result.under_keel_clearance, |c| {
            c.min(result.under_keel_clearance)
        });
    if worst < 0.0 {
        let _ = writeln!(out, "WARNING: negative under-keel clearance, vessel will ground");
    }
    out
}

/// Notification for a failed action, with a hint on how to recover.
pub fn format_error(err: &UkcError) -> String {
    let hint = match err {
        UkcError::NetworkFailure(_) => "Check the connection and try again.",
        UkcError::EmptyResponse(_) => "NOAA returned nothing; try another date or datum.",
        UkcError::StationNotFound(_) => "Station not found, please enter the ID manually.",
        UkcError::InvalidInput(_) => "Please enter valid values.",
    };
    format!("Error: {err}\n{hint}")
}
