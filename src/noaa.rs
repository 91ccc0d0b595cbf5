//! # NOAA Station and Tide Prediction Lookups
//!
//! This module handles all network operations against NOAA's CO-OPS services:
//! the station directory, per-station metadata with its datum list, and tide
//! predictions for a date.
//!
//! ## Data Sources
//!
//! ### Metadata API
//! - **Directory**: `{metadata_url}/stations.json?type=tidepredictions`
//! - **Station**: `{metadata_url}/stations/{id}.json`, whose `datums.self`
//!   link points at the station's datum list
//!
//! ### Data API
//! - **Predictions**: `{datagetter_url}?product=predictions&...`, JSON rows of
//!   `{ "t": "2024-06-16 03:12", "v": "2.913", "type": "H" }`
//!
//! ## Processing
//! 1. **Fetch**: one HTTP GET per lookup, never retried
//! 2. **Check**: non-success status or transport error becomes
//!    `NetworkFailure`; an empty body becomes `EmptyResponse`
//! 3. **Decode**: serde structs mirror the JSON payloads
//! 4. **Convert**: records become [`TideStation`]/[`TideReading`] values
//!
//! Station matching and prediction decoding are plain functions so they can be
//! exercised without a network.

use crate::{
    config::Config, StationDetails, TideEvent, TideReading, TideStation, TideWindow, UkcError,
};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};

/// Timestamp format of prediction rows
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Date format of the `begin_date` query parameter
const DATE_FORMAT: &str = "%Y%m%d";

// -- Wire formats --

#[derive(Debug, Deserialize)]
struct StationList {
    #[serde(default)]
    stations: Option<Vec<StationRecord>>,
}

#[derive(Debug, Deserialize)]
struct StationRecord {
    id: String,
    name: String,
    #[serde(default)]
    datums: Option<ResourceLink>,
}

#[derive(Debug, Deserialize)]
struct ResourceLink {
    #[serde(rename = "self", default)]
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatumList {
    #[serde(default)]
    datums: Option<Vec<DatumRecord>>,
}

#[derive(Debug, Deserialize)]
struct DatumRecord {
    #[serde(alias = "datum")]
    name: String,
}

/// Body of a `datagetter` predictions response.
#[derive(Debug, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    predictions: Option<Vec<PredictionRecord>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct PredictionRecord {
    t: String,
    v: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Parameters of one prediction lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionQuery {
    pub station_id: String,
    pub begin_date: NaiveDate,
    /// Overrides the configured datum when set
    pub datum: Option<String>,
    /// Overrides the configured range when set
    pub range_hours: Option<u32>,
}

/// Client for the NOAA services, one request at a time.
#[derive(Debug, Clone)]
pub struct NoaaClient {
    http: Client,
    config: Config,
}

impl NoaaClient {
    /// Build a client with the configured timeout.
    pub fn new(config: Config) -> Result<Self, UkcError> {
        let http = Client::builder()
            .timeout(config.api.timeout())
            .user_agent(format!("ukc-calculator/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(NoaaClient { http, config })
    }

    /// Search the station directory for names containing `query`.
    ///
    /// Returns `StationNotFound` when nothing matches.
    pub async fn search_stations(&self, query: &str) -> Result<Vec<TideStation>, UkcError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(UkcError::invalid("station name must not be empty"));
        }

        let url = format!("{}/stations.json", self.config.api.metadata_url);
        let list: StationList = self.get_json(&url, &[("type", "tidepredictions")]).await?;
        let directory: Vec<TideStation> = list
            .stations
            .unwrap_or_default()
            .into_iter()
            .map(|record| TideStation {
                id: record.id,
                name: record.name,
            })
            .collect();
        debug!("Directory holds {} stations", directory.len());

        let matches = match_stations(&directory, query);
        if matches.is_empty() {
            return Err(UkcError::StationNotFound(query.to_string()));
        }
        info!("{} stations match '{}'", matches.len(), query);
        Ok(matches)
    }

    /// Confirm a station id and list its datums.
    pub async fn station_details(&self, station_id: &str) -> Result<StationDetails, UkcError> {
        let station_id = station_id.trim();
        if station_id.is_empty() {
            return Err(UkcError::invalid("station id must not be empty"));
        }

        let url = format!("{}/stations/{}.json", self.config.api.metadata_url, station_id);
        let list: StationList = self.get_json(&url, &[]).await?;
        let record = list
            .stations
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| UkcError::StationNotFound(station_id.to_string()))?;

        let datums_url = record
            .datums
            .and_then(|link| link.href)
            .unwrap_or_else(|| {
                format!(
                    "{}/stations/{}/datums.json",
                    self.config.api.metadata_url, station_id
                )
            });
        let datum_list: DatumList = self.get_json(&datums_url, &[]).await?;
        let datums: Vec<String> = datum_list
            .datums
            .unwrap_or_default()
            .into_iter()
            .map(|d| d.name)
            .collect();
        if datums.is_empty() {
            return Err(UkcError::EmptyResponse(format!(
                "station {station_id} lists no datums"
            )));
        }

        info!("Station {} ({}) has {} datums", record.name, record.id, datums.len());
        Ok(StationDetails {
            station: TideStation {
                id: record.id,
                name: record.name,
            },
            datums,
        })
    }

    /// Fetch tide predictions for one station and date.
    pub async fn predictions(&self, query: &PredictionQuery) -> Result<Vec<TideReading>, UkcError> {
        let defaults = &self.config.predictions;
        let begin_date = query.begin_date.format(DATE_FORMAT).to_string();
        let range = query.range_hours.unwrap_or(defaults.range_hours).to_string();
        let datum = query.datum.as_deref().unwrap_or(&defaults.datum);

        let params = [
            ("begin_date", begin_date.as_str()),
            ("range", range.as_str()),
            ("station", query.station_id.as_str()),
            ("product", "predictions"),
            ("interval", defaults.interval.as_str()),
            ("datum", datum),
            ("time_zone", defaults.time_zone.as_str()),
            ("units", defaults.units.as_str()),
            ("application", defaults.application.as_str()),
            ("format", "json"),
        ];

        let response: PredictionResponse =
            self.get_json(&self.config.api.datagetter_url, &params).await?;
        let readings = decode_predictions(response, defaults.is_metric())?;
        info!(
            "Fetched {} predictions for station {} on {}",
            readings.len(),
            query.station_id,
            begin_date
        );
        Ok(readings)
    }

    /// GET a JSON document, mapping failures onto the error kinds.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, UkcError> {
        debug!("GET {} {:?}", url, params);
        let response = self.http.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UkcError::NetworkFailure(format!(
                "{} returned HTTP {}",
                url,
                status.as_u16()
            )));
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(UkcError::EmptyResponse(url.to_string()));
        }

        serde_json::from_slice(&body)
            .map_err(|e| UkcError::NetworkFailure(format!("unexpected payload from {url}: {e}")))
    }
}

/// Case-insensitive substring match of station names.
///
/// # Example
/// ```
/// use ukc_lib::{noaa::match_stations, TideStation};
///
/// let directory = vec![
///     TideStation { id: "8443970".into(), name: "Boston Harbor".into() },
///     TideStation { id: "8418150".into(), name: "Portland".into() },
/// ];
/// let found = match_stations(&directory, "boston");
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].id, "8443970");
/// ```
pub fn match_stations(directory: &[TideStation], query: &str) -> Vec<TideStation> {
    let needle = query.trim().to_lowercase();
    directory
        .iter()
        .filter(|station| station.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Turn a predictions payload into readings.
///
/// `metric` says which unit the `v` values carry.
pub fn decode_predictions(
    response: PredictionResponse,
    metric: bool,
) -> Result<Vec<TideReading>, UkcError> {
    if let Some(err) = response.error {
        return Err(UkcError::NetworkFailure(err.message));
    }

    let records = response.predictions.unwrap_or_default();
    if records.is_empty() {
        return Err(UkcError::EmptyResponse("no predictions returned".to_string()));
    }

    records
        .into_iter()
        .map(|record| -> Result<TideReading, UkcError> {
            let time = NaiveDateTime::parse_from_str(record.t.trim(), TIME_FORMAT).map_err(|_| {
                UkcError::NetworkFailure(format!("bad prediction time '{}'", record.t))
            })?;
            let value: f64 = record.v.trim().parse().map_err(|_| {
                UkcError::NetworkFailure(format!("bad prediction height '{}'", record.v))
            })?;
            let event = record.kind.as_deref().and_then(TideEvent::from_code);
            Ok(if metric {
                TideReading::from_meters(time, value, event)
            } else {
                TideReading::from_feet(time, value, event)
            })
        })
        .collect()
}

/// Pick the consecutive high and low waters that bracket `passage`.
pub fn tide_window(readings: &[TideReading], passage: NaiveDateTime) -> Result<TideWindow, UkcError> {
    let events: Vec<(&TideReading, TideEvent)> = readings
        .iter()
        .filter_map(|r| r.event.map(|e| (r, e)))
        .collect();

    events
        .windows(2)
        .find(|w| w[0].1 != w[1].1 && w[0].0.time <= passage && passage <= w[1].0.time)
        .map(|w| {
            let (high, low) = if w[0].1 == TideEvent::High {
                (w[0].0, w[1].0)
            } else {
                (w[1].0, w[0].0)
            };
            TideWindow {
                time_high: high.time,
                time_low: low.time,
                height_high: high.height_m,
                height_low: low.height_m,
            }
        })
        .ok_or_else(|| {
            UkcError::invalid(format!(
                "passage at {} is not between a predicted high and low water",
                passage.format(TIME_FORMAT)
            ))
        })
}

/// Readings that fall on one calendar day.
pub fn readings_on(readings: &[TideReading], day: NaiveDate) -> Vec<TideReading> {
    readings
        .iter()
        .filter(|r| r.time.date() == day)
        .copied()
        .collect()
}

/// The lowest predicted level in a set of readings.
pub fn lowest_reading(readings: &[TideReading]) -> Option<&TideReading> {
    readings
        .iter()
        .min_by(|a, b| a.height_m.total_cmp(&b.height_m))
}
