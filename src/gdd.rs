//! Growing degree days

use crate::aggregator::DailySummary;

/// GDD for one day.
///
/// The minimum is floored at `base` before averaging, and a day whose
/// maximum stays below `base` contributes nothing. Never negative.
pub fn daily_gdd(t_min: f64, t_max: f64, base: f64) -> f64 {
    if t_max < base {
        return 0.0;
    }
    let eff_t_min = t_min.max(base);
    let avg = (t_max + eff_t_min) / 2.0;
    (avg - base).max(0.0)
}

/// Fills `gdd` and `cumulative_gdd` on every summary, in date order.
///
/// Summaries are returned unchanged when any of them lacks a usable
/// min/max temperature or when `base` itself is not a finite number.
pub fn apply_gdd(mut summaries: Vec<DailySummary>, base: f64) -> Vec<DailySummary> {
    let usable = base.is_finite()
        && summaries
            .iter()
            .all(|d| d.min_temp.is_finite() && d.max_temp.is_finite());
    if !usable {
        tracing::debug!("Skipping GDD, temperatures or base {} not finite", base);
        return summaries;
    }

    summaries.sort_by_key(|d| d.date);

    let mut cumulative = 0.0;
    for day in summaries.iter_mut() {
        let gdd = daily_gdd(day.min_temp, day.max_temp, base);
        cumulative += gdd;
        day.gdd = Some(gdd);
        day.cumulative_gdd = Some(cumulative);
    }
    summaries
}

/// Cumulative GDD at the last day, if GDD has been applied
pub fn season_total(summaries: &[DailySummary]) -> Option<f64> {
    summaries.last().and_then(|d| d.cumulative_gdd)
}
