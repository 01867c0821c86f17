use chrono::{DateTime, FixedOffset, Offset, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::advisory::RainfallTolerance;
use crate::constants::DEFAULT_VISIBILITY_M;

// ============================================================================
// OpenWeatherMap 5 day / 3 hour Forecast Models
// ============================================================================

/// Top-level forecast payload.
///
/// `list` stays as raw JSON so that one malformed element is dropped on its
/// own instead of failing the whole payload.
#[derive(Debug, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub city: Option<ForecastCity>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastCity {
    pub name: Option<String>,
    /// Shift in seconds from UTC
    pub timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: ForecastMain,
    pub wind: Option<ForecastWind>,
    pub clouds: Option<ForecastClouds>,
    pub visibility: Option<f64>,
    pub pop: Option<f64>,
    pub rain: Option<ForecastRain>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct ForecastWind {
    pub speed: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastClouds {
    pub all: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastRain {
    #[serde(rename = "3h")]
    pub three_hour: Option<f64>,
}

impl ForecastResponse {
    /// Timezone of the forecast city, UTC when the payload omits it
    pub fn utc_offset(&self) -> FixedOffset {
        self.city
            .as_ref()
            .and_then(|c| c.timezone)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn city_name(&self) -> Option<&str> {
        self.city.as_ref().and_then(|c| c.name.as_deref())
    }

    /// Decodes every element of `list` into a [`RawSample`].
    ///
    /// Returns the samples in payload order and the number of elements
    /// skipped for missing required fields. A missing `list` yields no
    /// samples and no skips.
    pub fn samples(&self) -> (Vec<RawSample>, usize) {
        let Some(list) = &self.list else {
            return (Vec::new(), 0);
        };

        let mut samples = Vec::with_capacity(list.len());
        let mut skipped = 0;
        for (index, value) in list.iter().enumerate() {
            let decoded = serde_json::from_value::<ForecastItem>(value.clone())
                .map_err(|e| e.to_string())
                .and_then(|item| {
                    RawSample::try_from(item).map_err(|dt| format!("timestamp {} out of range", dt))
                });
            match decoded {
                Ok(sample) => samples.push(sample),
                Err(reason) => {
                    tracing::warn!("Skipping forecast sample {}: {}", index, reason);
                    skipped += 1;
                }
            }
        }
        (samples, skipped)
    }
}

// ============================================================================
// Core Sample Model
// ============================================================================

/// One forecast slice with every optional field already defaulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub precipitation_mm: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    /// Probability of precipitation in percent (0-100)
    pub pop_percent: f64,
    pub cloud_cover: f64,
    pub visibility_m: f64,
}

impl TryFrom<ForecastItem> for RawSample {
    /// The unrepresentable Unix timestamp
    type Error = i64;

    fn try_from(item: ForecastItem) -> Result<Self, Self::Error> {
        let timestamp = DateTime::from_timestamp(item.dt, 0).ok_or(item.dt)?;
        let wind = item.wind.as_ref();

        Ok(Self {
            timestamp,
            temperature: item.main.temp,
            temp_min: item.main.temp_min,
            temp_max: item.main.temp_max,
            humidity: item.main.humidity,
            precipitation_mm: item.rain.and_then(|r| r.three_hour).unwrap_or(0.0),
            wind_speed: wind.and_then(|w| w.speed).unwrap_or(0.0),
            wind_gust: wind.and_then(|w| w.gust).unwrap_or(0.0),
            pop_percent: item.pop.unwrap_or(0.0) * 100.0,
            cloud_cover: item.clouds.and_then(|c| c.all).unwrap_or(0.0),
            visibility_m: item.visibility.unwrap_or(DEFAULT_VISIBILITY_M),
        })
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetAgroReportRequest {
    /// City name passed to OpenWeatherMap (defaults to the configured city)
    pub city: Option<String>,
    /// Month for the climate-normal comparison, e.g. "May" (defaults to the current month)
    pub month: Option<String>,
    /// Crop whose GDD base temperature is used, see list_crops
    pub crop: Option<String>,
    /// Explicit GDD base temperature in °C, overrides the crop's base
    pub base_temperature: Option<f64>,
    /// Minimum temperature in °C below which a day counts as frost risk
    pub frost_threshold: Option<f64>,
    /// Tolerance band for the rainy-day comparison: "dashboard" (±2 days) or "farmer" (±1 day)
    pub tolerance: Option<RainfallTolerance>,
    /// "text" (default) or "json"
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetClimateNormalsRequest {
    /// Month name, omit to list all twelve months
    pub month: Option<String>,
}
