//! Groups 3-hour forecast samples into per-day summaries

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use crate::constants::MAX_SUMMARY_DAYS;
use crate::models::RawSample;

/// One calendar day of aggregated forecast data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub avg_humidity: f64,
    pub total_precipitation: f64,
    pub avg_wind_speed: f64,
    pub max_wind_speed: f64,
    pub max_wind_gust: f64,
    /// Highest probability of precipitation of the day, in percent
    pub max_pop: f64,
    pub avg_cloud_cover: f64,
    pub avg_visibility: f64,
    /// Set by [`crate::gdd::apply_gdd`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_gdd: Option<f64>,
}

/// Scalar statistics over the truncated summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastStats {
    /// Days with total precipitation strictly above zero
    pub rainy_days_count: usize,
    /// Unweighted mean of the per-day average temperatures
    pub overall_avg_temp: f64,
    /// Unweighted mean of the per-day average humidities
    pub overall_avg_humidity: f64,
    pub total_precipitation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub summaries: Vec<DailySummary>,
    pub stats: ForecastStats,
}

trait Reducer {
    fn push(&mut self, value: f64);
    fn finish(&self) -> f64;
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Reducer for Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn finish(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[derive(Default)]
struct Sum(f64);

impl Reducer for Sum {
    fn push(&mut self, value: f64) {
        self.0 += value;
    }

    fn finish(&self) -> f64 {
        self.0
    }
}

struct Min(f64);

impl Default for Min {
    fn default() -> Self {
        Min(f64::INFINITY)
    }
}

impl Reducer for Min {
    fn push(&mut self, value: f64) {
        self.0 = self.0.min(value);
    }

    fn finish(&self) -> f64 {
        self.0
    }
}

struct Max(f64);

impl Default for Max {
    fn default() -> Self {
        Max(f64::NEG_INFINITY)
    }
}

impl Reducer for Max {
    fn push(&mut self, value: f64) {
        self.0 = self.0.max(value);
    }

    fn finish(&self) -> f64 {
        self.0
    }
}

#[derive(Default)]
struct DayAccumulator {
    temp: Mean,
    temp_min: Min,
    temp_max: Max,
    humidity: Mean,
    precipitation: Sum,
    wind_speed: Mean,
    wind_speed_max: Max,
    wind_gust: Max,
    pop: Max,
    cloud_cover: Mean,
    visibility: Mean,
}

impl DayAccumulator {
    fn push(&mut self, sample: &RawSample) {
        self.temp.push(sample.temperature);
        self.temp_min.push(sample.temp_min);
        self.temp_max.push(sample.temp_max);
        self.humidity.push(sample.humidity);
        self.precipitation.push(sample.precipitation_mm);
        self.wind_speed.push(sample.wind_speed);
        self.wind_speed_max.push(sample.wind_speed);
        self.wind_gust.push(sample.wind_gust);
        self.pop.push(sample.pop_percent);
        self.cloud_cover.push(sample.cloud_cover);
        self.visibility.push(sample.visibility_m);
    }

    fn finish(&self, date: NaiveDate) -> DailySummary {
        DailySummary {
            date,
            avg_temp: self.temp.finish(),
            min_temp: self.temp_min.finish(),
            max_temp: self.temp_max.finish(),
            avg_humidity: self.humidity.finish(),
            total_precipitation: self.precipitation.finish(),
            avg_wind_speed: self.wind_speed.finish(),
            max_wind_speed: self.wind_speed_max.finish(),
            max_wind_gust: self.wind_gust.finish(),
            max_pop: self.pop.finish(),
            avg_cloud_cover: self.cloud_cover.finish(),
            avg_visibility: self.visibility.finish(),
            gdd: None,
            cumulative_gdd: None,
        }
    }
}

/// Aggregates samples into at most [`MAX_SUMMARY_DAYS`] daily summaries.
///
/// Dates are taken in the local time given by `offset`. Days missing from
/// the input are not filled in. An empty input yields an empty aggregate
/// with zeroed statistics.
pub fn aggregate(samples: &[RawSample], offset: FixedOffset) -> DailyAggregate {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for sample in samples {
        let date = sample.timestamp.with_timezone(&offset).date_naive();
        days.entry(date).or_default().push(sample);
    }

    let summaries: Vec<DailySummary> = days
        .iter()
        .take(MAX_SUMMARY_DAYS)
        .map(|(date, acc)| acc.finish(*date))
        .collect();

    tracing::debug!(
        "Aggregated {} samples into {} of {} days",
        samples.len(),
        summaries.len(),
        days.len()
    );

    let stats = summarize(&summaries);
    DailyAggregate { summaries, stats }
}

fn summarize(summaries: &[DailySummary]) -> ForecastStats {
    if summaries.is_empty() {
        return ForecastStats::default();
    }

    let mut temp = Mean::default();
    let mut humidity = Mean::default();
    let mut precipitation = Sum::default();
    for day in summaries {
        temp.push(day.avg_temp);
        humidity.push(day.avg_humidity);
        precipitation.push(day.total_precipitation);
    }

    ForecastStats {
        rainy_days_count: summaries
            .iter()
            .filter(|d| d.total_precipitation > 0.0)
            .count(),
        overall_avg_temp: temp.finish(),
        overall_avg_humidity: humidity.finish(),
        total_precipitation: precipitation.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{DateTime, Duration, Offset, TimeZone, Utc};
    use proptest::prelude::*;

    fn sample(at: DateTime<Utc>, temp: f64, precipitation: f64) -> RawSample {
        RawSample {
            timestamp: at,
            temperature: temp,
            temp_min: temp - 1.0,
            temp_max: temp + 1.0,
            humidity: 60.0,
            precipitation_mm: precipitation,
            wind_speed: 2.0,
            wind_gust: 3.0,
            pop_percent: 10.0,
            cloud_cover: 20.0,
            visibility_m: 10_000.0,
        }
    }

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    #[test]
    fn test_three_slices_on_one_day() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 6, 0, 0).unwrap();
        let samples = vec![
            sample(start, 10.0, 0.0),
            sample(start + Duration::hours(3), 12.0, 2.0),
            sample(start + Duration::hours(6), 14.0, 0.0),
        ];

        let result = aggregate(&samples, utc());

        assert_eq!(result.summaries.len(), 1);
        let day = &result.summaries[0];
        assert_relative_eq!(day.avg_temp, 12.0);
        assert_relative_eq!(day.total_precipitation, 2.0);
        assert_relative_eq!(day.min_temp, 9.0);
        assert_relative_eq!(day.max_temp, 15.0);
        assert_eq!(result.stats.rainy_days_count, 1);
        assert_relative_eq!(result.stats.overall_avg_temp, 12.0);
        assert_relative_eq!(result.stats.total_precipitation, 2.0);
    }

    #[test]
    fn test_empty_input() {
        let result = aggregate(&[], utc());
        assert!(result.summaries.is_empty());
        assert_eq!(result.stats.rainy_days_count, 0);
        assert_eq!(result.stats.overall_avg_temp, 0.0);
        assert_eq!(result.stats.overall_avg_humidity, 0.0);
    }

    #[test]
    fn test_wind_and_pop_reducers() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let mut a = sample(start, 10.0, 0.0);
        a.wind_speed = 1.0;
        a.wind_gust = 4.0;
        a.pop_percent = 20.0;
        a.visibility_m = 6000.0;
        let mut b = sample(start + Duration::hours(3), 10.0, 0.0);
        b.wind_speed = 3.0;
        b.wind_gust = 7.5;
        b.pop_percent = 65.0;

        let day = &aggregate(&[a, b], utc()).summaries[0];
        assert_relative_eq!(day.avg_wind_speed, 2.0);
        assert_relative_eq!(day.max_wind_speed, 3.0);
        assert_relative_eq!(day.max_wind_gust, 7.5);
        assert_relative_eq!(day.max_pop, 65.0);
        assert_relative_eq!(day.avg_visibility, 8000.0);
    }

    #[test]
    fn test_local_offset_moves_samples_across_midnight() {
        // 22:00 UTC is already the next day at UTC+3
        let late = Utc.with_ymd_and_hms(2025, 5, 1, 22, 0, 0).unwrap();
        let samples = vec![sample(late, 10.0, 0.0)];

        let in_utc = aggregate(&samples, utc());
        assert_eq!(in_utc.summaries[0].date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());

        let in_plovdiv = aggregate(&samples, FixedOffset::east_opt(3 * 3600).unwrap());
        assert_eq!(in_plovdiv.summaries[0].date, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
    }

    #[test]
    fn test_truncates_to_first_seven_days_in_order() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        // Reverse order to check sorting
        let samples: Vec<RawSample> = (0..9)
            .rev()
            .map(|d| sample(start + Duration::days(d), d as f64, 0.0))
            .collect();

        let result = aggregate(&samples, utc());
        assert_eq!(result.summaries.len(), 7);
        assert_eq!(result.summaries[0].date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(result.summaries[6].date, NaiveDate::from_ymd_opt(2025, 5, 7).unwrap());
        // Mean of 0..=6
        assert_relative_eq!(result.stats.overall_avg_temp, 3.0);
    }

    #[test]
    fn test_overall_average_is_not_sample_weighted() {
        let day1 = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let day2 = day1 + Duration::days(1);
        let samples = vec![
            sample(day1, 10.0, 0.0),
            sample(day1 + Duration::hours(3), 10.0, 0.0),
            sample(day1 + Duration::hours(6), 10.0, 0.0),
            sample(day2, 20.0, 0.0),
        ];

        let result = aggregate(&samples, utc());
        assert_relative_eq!(result.stats.overall_avg_temp, 15.0);
    }

    #[test]
    fn test_no_gap_filling() {
        let day1 = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let samples = vec![sample(day1, 10.0, 0.0), sample(day1 + Duration::days(3), 10.0, 0.0)];
        assert_eq!(aggregate(&samples, utc()).summaries.len(), 2);
    }

    fn arb_samples() -> impl Strategy<Value = Vec<RawSample>> {
        prop::collection::vec((0i64..(12 * 8), -20.0f64..40.0, prop_oneof![Just(0.0), 0.0f64..15.0]), 1..60)
            .prop_map(|slots| {
                let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
                slots
                    .into_iter()
                    .map(|(slot, temp, rain)| sample(start + Duration::hours(slot * 3), temp, rain))
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn prop_summary_bounded_by_days(samples in arb_samples()) {
            let distinct: std::collections::BTreeSet<NaiveDate> =
                samples.iter().map(|s| s.timestamp.date_naive()).collect();
            let result = aggregate(&samples, utc());
            prop_assert!(result.summaries.len() <= MAX_SUMMARY_DAYS);
            prop_assert!(result.summaries.len() <= distinct.len());
            prop_assert!(result.summaries.windows(2).all(|w| w[0].date < w[1].date));
        }

        #[test]
        fn prop_rainy_days_match_rows(samples in arb_samples()) {
            let result = aggregate(&samples, utc());
            let wet = result.summaries.iter().filter(|d| d.total_precipitation > 0.0).count();
            prop_assert_eq!(result.stats.rainy_days_count, wet);
        }

        #[test]
        fn prop_aggregate_is_idempotent(samples in arb_samples()) {
            prop_assert_eq!(aggregate(&samples, utc()), aggregate(&samples, utc()));
        }

        #[test]
        fn prop_dry_week_has_no_rainy_days(temps in prop::collection::vec(-10.0f64..35.0, 1..40)) {
            let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
            let samples: Vec<RawSample> = temps
                .iter()
                .enumerate()
                .map(|(i, t)| sample(start + Duration::hours(3 * i as i64), *t, 0.0))
                .collect();
            prop_assert_eq!(aggregate(&samples, utc()).stats.rainy_days_count, 0);
        }
    }
}
