use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::f64::consts::PI;

/// Which payload layout the ML service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSet {
    /// Date/time/holiday features plus distance and duration
    Full,
    /// Distance and duration only
    Basic,
    /// Raw clock/calendar values; the model service derives cycles and holidays itself
    Raw,
}

impl FeatureSet {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "full" => Some(FeatureSet::Full),
            "basic" => Some(FeatureSet::Basic),
            "raw" => Some(FeatureSet::Raw),
            _ => None,
        }
    }

    /// Only the full layout carries the `is_holiday` flag.
    pub fn needs_holiday(self) -> bool {
        self == FeatureSet::Full
    }
}

/// Calendar and clock features of a departure time, before the route is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeFeatures {
    pub hour_min: f64,
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub weekday_val: u32,
    pub weekday_sin: f64,
    pub weekday_cos: f64,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl TimeFeatures {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        let hour_min = dt.hour() as f64 + dt.minute() as f64 / 60.0;
        // Segunda = 1 ... Domingo = 7
        let weekday_val = dt.weekday().number_from_monday();
        let (hour_sin, hour_cos) = cyclical(hour_min, 24.0);
        let (weekday_sin, weekday_cos) = cyclical(weekday_val as f64, 7.0);

        Self {
            hour_min,
            hour_sin,
            hour_cos,
            weekday_val,
            weekday_sin,
            weekday_cos,
            day: dt.day(),
            month: dt.month(),
            year: dt.year(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// sin/cos encoding of a value on a cycle of length `period`.
pub fn cyclical(value: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * PI * value / period;
    (angle.sin(), angle.cos())
}

/// Payload posted to the ML service's `/predict`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TripFeatures {
    Full {
        hour_min: f64,
        hour_sin: f64,
        hour_cos: f64,
        weekday_val: u32,
        weekday_sin: f64,
        weekday_cos: f64,
        is_holiday: u8,
        distancia_m: f64,
        tempo_estim_segundos: f64,
        day: u32,
        month: u32,
        year: i32,
    },
    Basic {
        distance_m: f64,
        duration_s: f64,
    },
    Raw {
        hour_val: f64,
        weekday_val: u32,
        distance_m: f64,
        duration_s: f64,
        day: u32,
        month: u32,
        year: i32,
    },
}

impl TripFeatures {
    pub fn build(
        set: FeatureSet,
        time: &TimeFeatures,
        is_holiday: bool,
        distance_m: f64,
        duration_s: f64,
    ) -> Self {
        match set {
            FeatureSet::Full => TripFeatures::Full {
                hour_min: time.hour_min,
                hour_sin: time.hour_sin,
                hour_cos: time.hour_cos,
                weekday_val: time.weekday_val,
                weekday_sin: time.weekday_sin,
                weekday_cos: time.weekday_cos,
                is_holiday: u8::from(is_holiday),
                distancia_m: distance_m,
                tempo_estim_segundos: duration_s,
                day: time.day,
                month: time.month,
                year: time.year,
            },
            FeatureSet::Basic => TripFeatures::Basic {
                distance_m,
                duration_s,
            },
            FeatureSet::Raw => TripFeatures::Raw {
                hour_val: time.hour_min,
                weekday_val: time.weekday_val,
                distance_m,
                duration_s,
                day: time.day,
                month: time.month,
                year: time.year,
            },
        }
    }

    /// Every float the model receives must be a real number.
    pub fn is_valid(&self) -> bool {
        match self {
            TripFeatures::Full {
                hour_min,
                hour_sin,
                hour_cos,
                weekday_sin,
                weekday_cos,
                distancia_m,
                tempo_estim_segundos,
                ..
            } => [
                hour_min,
                hour_sin,
                hour_cos,
                weekday_sin,
                weekday_cos,
                distancia_m,
                tempo_estim_segundos,
            ]
            .iter()
            .all(|v| v.is_finite()),
            TripFeatures::Basic {
                distance_m,
                duration_s,
            } => distance_m.is_finite() && duration_s.is_finite(),
            TripFeatures::Raw {
                hour_val,
                distance_m,
                duration_s,
                ..
            } => hour_val.is_finite() && distance_m.is_finite() && duration_s.is_finite(),
        }
    }
}

/// Parses the departure time sent by the web client.
///
/// RFC 3339 values keep the wall-clock time of their own offset; naive values
/// (`<input type="datetime-local">` sends `2025-05-10T14:30`) are taken as-is.
pub fn parse_departure(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
