//! Rule-based agronomic advisories over the daily summary

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregator::{DailySummary, ForecastStats};
use crate::reference::ClimateNormal;

/// Tolerance applied around the weekly-scaled rainy-day normal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RainfallTolerance {
    /// ±2 days
    #[default]
    Dashboard,
    /// ±1 day
    Farmer,
}

impl RainfallTolerance {
    pub fn days(&self) -> f64 {
        match self {
            RainfallTolerance::Dashboard => 2.0,
            RainfallTolerance::Farmer => 1.0,
        }
    }
}

/// Every tunable threshold used by the rules
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdvisoryThresholds {
    /// °C, a day whose minimum is below this is a frost risk
    pub frost_alarm: f64,
    /// °C, a day whose maximum is above this is heat stress
    pub heat_stress: f64,
    /// °C either side of the monthly normal still considered typical
    pub normal_temp_band: f64,
    /// m/s, lower edge of the ideal spraying wind band
    pub spray_wind_min: f64,
    /// m/s, upper edge of the ideal spraying wind band
    pub spray_wind_max: f64,
    /// m/s, gusts at or above this rule out spraying
    pub spray_gust_max: f64,
    /// %, a day above this probability of precipitation is flagged
    pub pop_outlook: f64,
    /// %, an average humidity above this raises fungal disease risk
    pub humidity_risk: f64,
    pub rainfall_tolerance: RainfallTolerance,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            frost_alarm: 2.0,
            heat_stress: 30.0,
            normal_temp_band: 2.0,
            spray_wind_min: 1.5,
            spray_wind_max: 4.5,
            spray_gust_max: 6.0,
            pop_outlook: 60.0,
            humidity_risk: 75.0,
            rainfall_tolerance: RainfallTolerance::Dashboard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvisoryCategory {
    Frost,
    HeatStress,
    Spraying,
    PrecipitationOutlook,
    TemperatureNormal,
    RainfallNormal,
    HumidityNormal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Favorable,
    Caution,
    Warning,
}

/// Outcome of a comparison against the monthly climate normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalComparison {
    Warmer,
    Cooler,
    Wetter,
    Drier,
    Typical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SprayCondition {
    Favorable,
    LowWind,
    HighWind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryFinding {
    pub category: AdvisoryCategory,
    pub severity: Severity,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<NormalComparison>,
    /// Days that triggered the finding
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<Metric>,
}

impl AdvisoryFinding {
    fn new(category: AdvisoryCategory, severity: Severity, detail: String) -> Self {
        Self {
            category,
            severity,
            detail,
            comparison: None,
            dates: Vec::new(),
            metrics: Vec::new(),
        }
    }

    fn with_dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.dates = dates;
        self
    }

    fn with_metric(mut self, name: &'static str, value: f64) -> Self {
        self.metrics.push(Metric { name, value });
        self
    }

    fn with_comparison(mut self, comparison: NormalComparison) -> Self {
        self.comparison = Some(comparison);
        self
    }
}

/// Everything a rule may look at
pub struct AdvisoryContext<'a> {
    pub summaries: &'a [DailySummary],
    pub stats: &'a ForecastStats,
    /// `None` when the selected month did not resolve; normals rules then stay silent
    pub normal: Option<&'a ClimateNormal>,
    pub thresholds: &'a AdvisoryThresholds,
}

/// One independent advisory rule
pub trait Rule: Send + Sync {
    fn id(&self) -> &'static str;

    /// Findings for this rule, empty when it has nothing to say or lacks data
    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding>;
}

static RULES: [&dyn Rule; 7] = [
    &FrostRisk,
    &HeatStress,
    &SprayingWindow,
    &PrecipitationOutlook,
    &TemperatureVsNormal,
    &RainfallVsNormal,
    &HumidityRisk,
];

/// Runs every rule in its fixed order and concatenates the findings
pub fn evaluate(ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding> {
    RULES
        .iter()
        .flat_map(|rule| {
            let findings = rule.evaluate(ctx);
            tracing::debug!("Rule {} produced {} finding(s)", rule.id(), findings.len());
            findings
        })
        .collect()
}

/// Spraying suitability of a single day, low wind checked before high wind
pub fn classify_spraying(avg_wind: f64, max_gust: f64, t: &AdvisoryThresholds) -> SprayCondition {
    if avg_wind >= t.spray_wind_min && avg_wind <= t.spray_wind_max && max_gust < t.spray_gust_max {
        SprayCondition::Favorable
    } else if avg_wind < t.spray_wind_min {
        SprayCondition::LowWind
    } else {
        SprayCondition::HighWind
    }
}

pub fn compare_temperature(overall_avg: f64, normal_avg: f64, band: f64) -> NormalComparison {
    if overall_avg > normal_avg + band {
        NormalComparison::Warmer
    } else if overall_avg < normal_avg - band {
        NormalComparison::Cooler
    } else {
        NormalComparison::Typical
    }
}

/// Compares a 7-day rainy-day count with a monthly normal quartered to a week.
///
/// "Drier" needs a positive lower bound; otherwise a count of zero would be
/// compared against a negative threshold.
pub fn compare_rainfall(rainy_days: usize, monthly_rain_days: u32, tolerance: f64) -> NormalComparison {
    let weekly = monthly_rain_days as f64 / 4.0;
    let count = rainy_days as f64;
    let lower = weekly - tolerance;
    if count > weekly + tolerance {
        NormalComparison::Wetter
    } else if count < lower && lower > 0.0 {
        NormalComparison::Drier
    } else {
        NormalComparison::Typical
    }
}

fn dates_where(summaries: &[DailySummary], pred: impl Fn(&DailySummary) -> bool) -> Vec<NaiveDate> {
    summaries.iter().filter(|&d| pred(d)).map(|d| d.date).collect()
}

struct FrostRisk;

impl Rule for FrostRisk {
    fn id(&self) -> &'static str {
        "frost_risk"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding> {
        if ctx.summaries.is_empty() {
            return Vec::new();
        }
        let alarm = ctx.thresholds.frost_alarm;
        let dates = dates_where(ctx.summaries, |d| d.min_temp < alarm);

        let finding = if dates.is_empty() {
            AdvisoryFinding::new(
                AdvisoryCategory::Frost,
                Severity::Favorable,
                format!("No day forecast below the {:.1}°C frost alarm", alarm),
            )
        } else {
            let lowest = ctx
                .summaries
                .iter()
                .map(|d| d.min_temp)
                .fold(f64::INFINITY, f64::min);
            let mut detail = format!(
                "Frost risk on {} day(s), minimum down to {:.1}°C (alarm below {:.1}°C)",
                dates.len(),
                lowest,
                alarm
            );
            if let Some(normal) = ctx.normal {
                detail.push_str(&format!(
                    "; {} typically has {} frost day(s)",
                    normal.month, normal.frost_days
                ));
            }
            AdvisoryFinding::new(AdvisoryCategory::Frost, Severity::Warning, detail)
                .with_dates(dates)
                .with_metric("lowest_min_temp", lowest)
        };
        vec![finding]
    }
}

struct HeatStress;

impl Rule for HeatStress {
    fn id(&self) -> &'static str {
        "heat_stress"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding> {
        let limit = ctx.thresholds.heat_stress;
        let dates = dates_where(ctx.summaries, |d| d.max_temp > limit);
        if dates.is_empty() {
            return Vec::new();
        }
        let count = dates.len();
        vec![AdvisoryFinding::new(
            AdvisoryCategory::HeatStress,
            Severity::Warning,
            format!("Heat stress: {} day(s) with maximum above {:.1}°C", count, limit),
        )
        .with_dates(dates)
        .with_metric("hot_days", count as f64)]
    }
}

struct SprayingWindow;

impl Rule for SprayingWindow {
    fn id(&self) -> &'static str {
        "spraying_window"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding> {
        let t = ctx.thresholds;
        let mut favorable = Vec::new();
        let mut low_wind = Vec::new();
        let mut high_wind = Vec::new();
        for day in ctx.summaries {
            match classify_spraying(day.avg_wind_speed, day.max_wind_gust, t) {
                SprayCondition::Favorable => favorable.push(day.date),
                SprayCondition::LowWind => low_wind.push(day.date),
                SprayCondition::HighWind => high_wind.push(day.date),
            }
        }

        let mut findings = Vec::new();
        if !favorable.is_empty() {
            findings.push(
                AdvisoryFinding::new(
                    AdvisoryCategory::Spraying,
                    Severity::Favorable,
                    format!(
                        "Good spraying conditions on {} day(s): wind {:.1}-{:.1} m/s, gusts below {:.1} m/s",
                        favorable.len(),
                        t.spray_wind_min,
                        t.spray_wind_max,
                        t.spray_gust_max
                    ),
                )
                .with_dates(favorable),
            );
        }
        if !low_wind.is_empty() || !high_wind.is_empty() {
            let (low, high) = (low_wind.len(), high_wind.len());
            let mut dates: Vec<NaiveDate> = low_wind.into_iter().chain(high_wind).collect();
            dates.sort();
            findings.push(
                AdvisoryFinding::new(
                    AdvisoryCategory::Spraying,
                    Severity::Caution,
                    format!(
                        "Avoid spraying on {} day(s): {} with inversion risk from low wind, {} with drift risk from high wind or gusts",
                        dates.len(),
                        low,
                        high
                    ),
                )
                .with_dates(dates)
                .with_metric("low_wind_days", low as f64)
                .with_metric("high_wind_days", high as f64),
            );
        }
        findings
    }
}

struct PrecipitationOutlook;

impl Rule for PrecipitationOutlook {
    fn id(&self) -> &'static str {
        "precipitation_outlook"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding> {
        let limit = ctx.thresholds.pop_outlook;
        let dates = dates_where(ctx.summaries, |d| d.max_pop > limit);
        if dates.is_empty() {
            return Vec::new();
        }
        let weekdays: Vec<String> = dates.iter().map(|d| d.format("%A").to_string()).collect();
        vec![AdvisoryFinding::new(
            AdvisoryCategory::PrecipitationOutlook,
            Severity::Caution,
            format!(
                "Rain likely (probability above {:.0}%) on {}",
                limit,
                weekdays.join(", ")
            ),
        )
        .with_dates(dates)]
    }
}

struct TemperatureVsNormal;

impl Rule for TemperatureVsNormal {
    fn id(&self) -> &'static str {
        "temperature_vs_normal"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding> {
        let Some(normal) = ctx.normal else {
            return Vec::new();
        };
        if ctx.summaries.is_empty() {
            return Vec::new();
        }
        let avg = ctx.stats.overall_avg_temp;
        let comparison = compare_temperature(avg, normal.avg_temp, ctx.thresholds.normal_temp_band);
        let (severity, detail) = match comparison {
            NormalComparison::Warmer => (
                Severity::Warning,
                format!(
                    "Temperatures ({:.1}°C) are unusually high compared to the {} average of {:.1}°C",
                    avg, normal.month, normal.avg_temp
                ),
            ),
            NormalComparison::Cooler => (
                Severity::Warning,
                format!(
                    "Temperatures ({:.1}°C) are unusually low compared to the {} average of {:.1}°C",
                    avg, normal.month, normal.avg_temp
                ),
            ),
            _ => (
                Severity::Favorable,
                format!(
                    "Temperatures ({:.1}°C) are within the normal range for {} (around {:.1}°C)",
                    avg, normal.month, normal.avg_temp
                ),
            ),
        };
        vec![AdvisoryFinding::new(AdvisoryCategory::TemperatureNormal, severity, detail)
            .with_comparison(comparison)
            .with_metric("forecast_avg_temp", avg)
            .with_metric("normal_avg_temp", normal.avg_temp)]
    }
}

struct RainfallVsNormal;

impl Rule for RainfallVsNormal {
    fn id(&self) -> &'static str {
        "rainfall_vs_normal"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding> {
        let Some(normal) = ctx.normal else {
            return Vec::new();
        };
        if ctx.summaries.is_empty() {
            return Vec::new();
        }
        let rainy = ctx.stats.rainy_days_count;
        let tolerance = ctx.thresholds.rainfall_tolerance.days();
        let comparison = compare_rainfall(rainy, normal.rain_days, tolerance);
        let (severity, verdict) = match comparison {
            NormalComparison::Wetter => (Severity::Caution, "more rainy days than typical"),
            NormalComparison::Drier => (Severity::Caution, "fewer rainy days than typical"),
            _ => (Severity::Favorable, "a typical number of rainy days"),
        };
        let detail = format!(
            "{} rainy day(s) in the next {} days is {} for {} (norm: {} days/month, compared as {:.2} per week)",
            rainy,
            ctx.summaries.len(),
            verdict,
            normal.month,
            normal.rain_days,
            normal.rain_days as f64 / 4.0
        );
        vec![AdvisoryFinding::new(AdvisoryCategory::RainfallNormal, severity, detail)
            .with_comparison(comparison)
            .with_metric("rainy_days", rainy as f64)
            .with_metric("weekly_normal_rain_days", normal.rain_days as f64 / 4.0)]
    }
}

struct HumidityRisk;

impl Rule for HumidityRisk {
    fn id(&self) -> &'static str {
        "humidity_risk"
    }

    fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> Vec<AdvisoryFinding> {
        if ctx.summaries.is_empty() {
            return Vec::new();
        }
        let humidity = ctx.stats.overall_avg_humidity;
        if humidity <= ctx.thresholds.humidity_risk {
            return Vec::new();
        }
        vec![AdvisoryFinding::new(
            AdvisoryCategory::HumidityNormal,
            Severity::Warning,
            format!(
                "Average humidity of {:.0}% raises the risk of fungal disease",
                humidity
            ),
        )
        .with_metric("overall_avg_humidity", humidity)]
    }
}
