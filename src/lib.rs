//! # UKC Calculator Core Library
//!
//! This library provides the data structures, calculations and NOAA client
//! behind the `ukc-calculator` tool, which estimates under-keel clearance for
//! a vessel transiting a route with variable tidal height.
//!
//! ## Data Flow
//! 1. **Lookup**: search the NOAA station directory, confirm a station and
//!    pick one of its datums ([`noaa`])
//! 2. **Predictions**: fetch high/low water predictions for a date ([`noaa`])
//! 3. **Calculate**: squat, height of tide at the passage time and the
//!    resulting clearance ([`calculator`])
//! 4. **Display**: fixed-width text tables ([`renderer`])
//!
//! Every record here is an immutable value built for a single request.
//! Nothing is cached or persisted between actions.
//!
//! ## Core Types
//! - [`TideStation`] and [`StationDetails`]: directory entries
//! - [`TideReading`]: one predicted water level
//! - [`VesselParameters`], [`RouteParameters`], [`PassageTime`],
//!   [`TideWindow`]: validated calculator inputs, bundled in
//!   [`ClearanceRequest`]
//! - [`CalculationResult`]: the calculator's answer

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod calculator;
pub mod config;
pub mod error;
pub mod noaa;
pub mod renderer;

pub use error::UkcError;

/// Feet in one meter, as used throughout the NOAA tooling.
pub const FEET_PER_METER: f64 = 3.28084;

/// A tide station from the NOAA directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TideStation {
    /// NOAA station identifier (e.g. "8443970")
    pub id: String,
    /// Human-readable station name
    pub name: String,
}

impl TideStation {
    /// Parse a `Name (id)` label back into a station.
    ///
    /// The split happens on the last `(` so names that contain parentheses
    /// themselves survive.
    ///
    /// # Example
    /// ```
    /// use ukc_lib::TideStation;
    ///
    /// let station = TideStation::from_label("Boston (Harbor) (8443970)").unwrap();
    /// assert_eq!(station.name, "Boston (Harbor)");
    /// assert_eq!(station.id, "8443970");
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        let (name, rest) = label.trim().rsplit_once('(')?;
        let id = rest.strip_suffix(')')?.trim();
        let name = name.trim();
        if id.is_empty() || name.is_empty() {
            return None;
        }
        Some(TideStation {
            id: id.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for TideStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A confirmed station together with the datums it publishes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationDetails {
    pub station: TideStation,
    /// Datum names in the order NOAA lists them
    pub datums: Vec<String>,
}

impl StationDetails {
    /// The datum selected when the user makes no choice: the first listed.
    pub fn default_datum(&self) -> Option<&str> {
        self.datums.first().map(String::as_str)
    }
}

/// High or low water marker on a `hilo` prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideEvent {
    High,
    Low,
}

impl TideEvent {
    /// Map NOAA's `type` field (`H`, `HH`, `L`, `LL`) to an event.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "H" | "HH" => Some(TideEvent::High),
            "L" | "LL" => Some(TideEvent::Low),
            _ => None,
        }
    }
}

/// A single predicted water level.
///
/// Heights are held in both units so display never has to convert twice.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideReading {
    /// Local station time of the prediction
    pub time: NaiveDateTime,
    /// Height in feet above the selected datum
    pub height_ft: f64,
    /// Height in meters above the selected datum
    pub height_m: f64,
    /// Present when the prediction interval is `hilo`
    pub event: Option<TideEvent>,
}

impl TideReading {
    /// Build a reading from a height in feet.
    pub fn from_feet(time: NaiveDateTime, height_ft: f64, event: Option<TideEvent>) -> Self {
        TideReading {
            time,
            height_ft,
            height_m: height_ft / FEET_PER_METER,
            event,
        }
    }

    /// Build a reading from a height in meters.
    pub fn from_meters(time: NaiveDateTime, height_m: f64, event: Option<TideEvent>) -> Self {
        TideReading {
            time,
            height_ft: height_m * FEET_PER_METER,
            height_m,
            event,
        }
    }
}

/// Vessel inputs for squat and clearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VesselParameters {
    /// Dimensionless, strictly positive
    pub block_coefficient: f64,
    /// Knots, non-negative
    pub speed_knots: f64,
    /// Meters, strictly positive
    pub deep_draft: f64,
}

impl VesselParameters {
    /// Validate and build vessel parameters.
    pub fn new(block_coefficient: f64, speed_knots: f64, deep_draft: f64) -> Result<Self, UkcError> {
        calculator::ensure_finite("block coefficient", block_coefficient)?;
        calculator::ensure_finite("speed", speed_knots)?;
        calculator::ensure_finite("deep draft", deep_draft)?;
        if block_coefficient <= 0.0 {
            return Err(UkcError::invalid("block coefficient must be positive"));
        }
        if speed_knots < 0.0 {
            return Err(UkcError::invalid("speed must not be negative"));
        }
        if deep_draft <= 0.0 {
            return Err(UkcError::invalid("deep draft must be positive"));
        }
        Ok(VesselParameters {
            block_coefficient,
            speed_knots,
            deep_draft,
        })
    }
}

/// Route inputs for clearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteParameters {
    /// Shallowest charted depth along the route, meters
    pub shallowest_depth: f64,
    /// Lowest predicted tide for the transit window, meters
    pub lowest_tide: f64,
}

impl RouteParameters {
    pub fn new(shallowest_depth: f64, lowest_tide: f64) -> Result<Self, UkcError> {
        calculator::ensure_finite("shallowest depth", shallowest_depth)?;
        calculator::ensure_finite("lowest tide", lowest_tide)?;
        Ok(RouteParameters {
            shallowest_depth,
            lowest_tide,
        })
    }
}

/// Clock time of the intended transit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassageTime {
    pub hour: u32,
    pub minute: u32,
}

impl PassageTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, UkcError> {
        if hour > 23 {
            return Err(UkcError::invalid(format!("hour {hour} is outside 0-23")));
        }
        if minute > 59 {
            return Err(UkcError::invalid(format!("minute {minute} is outside 0-59")));
        }
        Ok(PassageTime { hour, minute })
    }

    /// Parse an `HH:MM` entry.
    ///
    /// # Example
    /// ```
    /// use ukc_lib::PassageTime;
    ///
    /// let passage = PassageTime::parse("14:30").unwrap();
    /// assert_eq!((passage.hour, passage.minute), (14, 30));
    /// assert!(PassageTime::parse("24:00").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, UkcError> {
        let (h, m) = text
            .trim()
            .split_once(':')
            .ok_or_else(|| UkcError::invalid(format!("passage time '{text}' is not HH:MM")))?;
        let hour = h
            .trim()
            .parse::<u32>()
            .map_err(|_| UkcError::invalid(format!("passage hour '{h}' is not a number")))?;
        let minute = m
            .trim()
            .parse::<u32>()
            .map_err(|_| UkcError::invalid(format!("passage minute '{m}' is not a number")))?;
        Self::new(hour, minute)
    }

    /// Combine with a calendar date.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        // hour/minute are range-checked on construction
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN);
        date.and_time(time)
    }
}

impl fmt::Display for PassageTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// The high and low water surrounding a passage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TideWindow {
    pub time_high: NaiveDateTime,
    pub time_low: NaiveDateTime,
    /// Meters
    pub height_high: f64,
    /// Meters
    pub height_low: f64,
}

/// Everything the calculator needs for one clearance estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct ClearanceRequest {
    pub vessel: VesselParameters,
    pub route: RouteParameters,
    /// Date and time of the transit
    pub passage: NaiveDateTime,
    /// When present, the height of tide at `passage` is interpolated
    pub tide_window: Option<TideWindow>,
}

/// The calculator's answer, all values in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalculationResult {
    pub squat: f64,
    /// Interpolated height of tide at the passage time
    pub height_of_tide: Option<f64>,
    /// Clearance using the route's lowest predicted tide
    pub under_keel_clearance: f64,
    /// Clearance using the interpolated height of tide
    pub clearance_at_passage: Option<f64>,
}
