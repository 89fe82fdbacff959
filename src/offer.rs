// Shared booking offers as served by the booking API

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

// Vehicle attached to an offer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub preferred_area: String,
    pub capacity: f64,
    #[serde(default)]
    pub capacity_unit: String,
    #[serde(default)]
    pub photo_url: String,
}

// A shared-capacity transport slot customers can join.
// Replaced wholesale on every fetch, never patched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOffer {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(deserialize_with = "de_calendar_day")]
    pub booking_date: NaiveDate,
    #[serde(deserialize_with = "de_time_of_day")]
    pub pickup_time: NaiveTime,
    #[serde(deserialize_with = "de_time_of_day")]
    pub end_time: NaiveTime,
    pub vehicle: Vehicle,
    pub free_capacity: f64,
    pub nearby_cities: Vec<String>,
}

impl BookingOffer {
    /// Whether the offer respects `free_capacity <= vehicle.capacity`.
    pub fn has_consistent_capacity(&self) -> bool {
        self.free_capacity >= 0.0 && self.free_capacity <= self.vehicle.capacity
    }
}

/// Reduce a wire date to its calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and offset-less timestamps. For
/// timestamps the day is taken as written: the offset is dropped, not applied.
pub fn parse_calendar_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Reduce a wire time to a wall-clock time of day.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    for format in ["%H:%M:%S%.f", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(raw, format) {
            return Some(time);
        }
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.time());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.time())
}

fn de_calendar_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_day(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid booking date: {raw}")))
}

fn de_time_of_day<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time_of_day(&raw).ok_or_else(|| de::Error::custom(format!("invalid time: {raw}")))
}
