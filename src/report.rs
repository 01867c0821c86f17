//! Forecast payload to agronomic report: aggregate, accumulate GDD, evaluate advisories

use serde::Serialize;

use crate::advisory::{self, AdvisoryContext, AdvisoryFinding, AdvisoryThresholds};
use crate::aggregator::{self, DailySummary, ForecastStats};
use crate::gdd;
use crate::models::ForecastResponse;
use crate::reference::{ClimateNormal, ClimateNormalTable, Month};

/// Caller-supplied inputs of one report
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub city: String,
    /// Month name for the normals comparison, resolved against the table
    pub month: String,
    pub crop: Option<String>,
    pub base_temperature: f64,
    pub thresholds: AdvisoryThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgroReport {
    pub city: String,
    /// City name as resolved by the forecast source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal: Option<ClimateNormal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    pub base_temperature: f64,
    pub summaries: Vec<DailySummary>,
    pub stats: ForecastStats,
    /// Cumulative GDD over the covered days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_gdd: Option<f64>,
    pub advisories: Vec<AdvisoryFinding>,
    pub skipped_samples: usize,
    /// Configuration problems that suppressed part of the report
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl AgroReport {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

/// Builds the report for one forecast payload. Pure: no I/O, no clock.
pub fn build_report(
    payload: &ForecastResponse,
    options: &ReportOptions,
    normals: &ClimateNormalTable,
) -> AgroReport {
    let (samples, skipped_samples) = payload.samples();
    let aggregate = aggregator::aggregate(&samples, payload.utc_offset());
    let summaries = gdd::apply_gdd(aggregate.summaries, options.base_temperature);
    let stats = aggregate.stats;

    let mut issues = Vec::new();
    let normal = match normals.lookup(&options.month) {
        Ok(normal) => Some(*normal),
        Err(e) => {
            tracing::warn!("Normals comparison suppressed: {}", e);
            issues.push(e.to_string());
            None
        }
    };

    let advisories = advisory::evaluate(&AdvisoryContext {
        summaries: &summaries,
        stats: &stats,
        normal: normal.as_ref(),
        thresholds: &options.thresholds,
    });

    tracing::debug!(
        "Report for {}: {} day(s), {} finding(s), {} skipped sample(s)",
        options.city,
        summaries.len(),
        advisories.len(),
        skipped_samples
    );

    AgroReport {
        city: options.city.clone(),
        source_city: payload.city_name().map(str::to_string),
        month: normal.map(|n| n.month),
        normal,
        crop: options.crop.clone(),
        base_temperature: options.base_temperature,
        season_gdd: gdd::season_total(&summaries),
        summaries,
        stats,
        advisories,
        skipped_samples,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::{AdvisoryCategory, Severity};
    use crate::reference::PLOVDIV_NORMALS;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn options(month: &str) -> ReportOptions {
        ReportOptions {
            city: "Plovdiv".to_string(),
            month: month.to_string(),
            crop: Some("maize".to_string()),
            base_temperature: 10.0,
            thresholds: AdvisoryThresholds::default(),
        }
    }

    fn item(dt: i64, temp: f64, temp_min: f64, temp_max: f64, rain: Option<f64>) -> serde_json::Value {
        let mut value = json!({
            "dt": dt,
            "main": { "temp": temp, "temp_min": temp_min, "temp_max": temp_max, "humidity": 70 },
            "wind": { "speed": 3.0, "gust": 5.0 },
            "pop": 0.2,
            "clouds": { "all": 50 }
        });
        if let Some(mm) = rain {
            value["rain"] = json!({ "3h": mm });
        }
        value
    }

    // 2025-05-01T00:00:00Z
    const MAY_FIRST: i64 = 1_746_057_600;
    const SLICE: i64 = 3 * 3600;

    #[test]
    fn test_missing_list_gives_empty_report() {
        let payload: ForecastResponse = serde_json::from_value(json!({ "cod": "404" })).unwrap();
        let report = build_report(&payload, &options("May"), &PLOVDIV_NORMALS);

        assert!(report.is_empty());
        assert_eq!(report.stats.rainy_days_count, 0);
        assert_eq!(report.stats.overall_avg_temp, 0.0);
        assert!(report.advisories.is_empty());
        assert_eq!(report.season_gdd, None);
    }

    #[test]
    fn test_single_day_pipeline() {
        let payload: ForecastResponse = serde_json::from_value(json!({
            "list": [
                item(MAY_FIRST, 10.0, 8.0, 12.0, None),
                item(MAY_FIRST + SLICE, 12.0, 10.0, 16.0, Some(2.0)),
                item(MAY_FIRST + 2 * SLICE, 14.0, 12.0, 20.0, None),
            ],
            "city": { "name": "Plovdiv", "timezone": 0 }
        }))
        .unwrap();

        let report = build_report(&payload, &options("May"), &PLOVDIV_NORMALS);

        assert_eq!(report.summaries.len(), 1);
        let day = &report.summaries[0];
        assert_relative_eq!(day.avg_temp, 12.0);
        assert_relative_eq!(day.total_precipitation, 2.0);
        // min 8 floored to 10, max 20 -> 5
        assert_eq!(day.gdd, Some(5.0));
        assert_eq!(report.season_gdd, Some(5.0));
        assert_eq!(report.stats.rainy_days_count, 1);
        assert_eq!(report.month, Some(Month::May));
        assert_eq!(report.source_city.as_deref(), Some("Plovdiv"));
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_unknown_month_is_reported_not_fatal() {
        let payload: ForecastResponse = serde_json::from_value(json!({
            "list": [ item(MAY_FIRST, 1.0, 0.0, 3.0, None) ]
        }))
        .unwrap();

        let report = build_report(&payload, &options("Maytember"), &PLOVDIV_NORMALS);

        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].contains("Maytember"));
        assert_eq!(report.month, None);
        assert!(report
            .advisories
            .iter()
            .all(|f| f.category != AdvisoryCategory::TemperatureNormal
                && f.category != AdvisoryCategory::RainfallNormal));

        let frost = report
            .advisories
            .iter()
            .find(|f| f.category == AdvisoryCategory::Frost)
            .unwrap();
        assert_eq!(frost.severity, Severity::Warning);
        assert_eq!(frost.dates.len(), 1);
    }

    #[test]
    fn test_malformed_samples_are_counted() {
        let payload: ForecastResponse = serde_json::from_value(json!({
            "list": [
                item(MAY_FIRST, 15.0, 12.0, 18.0, None),
                { "dt": MAY_FIRST + SLICE, "main": { "temp": 16.0 } }
            ]
        }))
        .unwrap();

        let report = build_report(&payload, &options("May"), &PLOVDIV_NORMALS);
        assert_eq!(report.skipped_samples, 1);
        assert_eq!(report.summaries.len(), 1);
    }

    #[test]
    fn test_report_serializes_plain_data() {
        let payload: ForecastResponse = serde_json::from_value(json!({
            "list": [ item(MAY_FIRST, 15.0, 12.0, 18.0, None) ]
        }))
        .unwrap();
        let report = build_report(&payload, &options("May"), &PLOVDIV_NORMALS);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["summaries"][0]["date"], "2025-05-01");
        assert_eq!(value["month"], "May");
        assert_eq!(value["advisories"][0]["category"], "frost");
        assert_eq!(value["advisories"][0]["severity"], "favorable");
    }
}
