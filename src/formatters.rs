use crate::advisory::Severity;
use crate::reference::{ClimateNormal, CropProfile};
use crate::report::AgroReport;

/// Formats an agronomic report into a human-readable string
pub fn format_report(report: &AgroReport) -> String {
    let location = match &report.source_city {
        Some(name) if !name.eq_ignore_ascii_case(&report.city) => {
            format!("{} (resolved as {})", report.city, name)
        }
        _ => report.city.clone(),
    };

    if report.is_empty() {
        return format!(
            "No forecast data could be processed for {}. The source may have returned an unexpected format.\n",
            location
        );
    }

    let stats = &report.stats;
    let mut output = format!("Agro Weather Report: {}\n\n", location);
    output.push_str(&format!(
        "Summary ({} days):\n  Avg. Temperature: {:.1}\u{00b0}C\n  Avg. Humidity: {:.0}%\n  Rainy Days: {}\n  Total Precipitation: {:.1} mm\n",
        report.summaries.len(),
        stats.overall_avg_temp,
        stats.overall_avg_humidity,
        stats.rainy_days_count,
        stats.total_precipitation
    ));
    if let Some(total) = report.season_gdd {
        let crop = report.crop.as_deref().unwrap_or("custom base");
        output.push_str(&format!(
            "  GDD ({}, base {:.1}\u{00b0}C): {:.1}\n",
            crop, report.base_temperature, total
        ));
    }
    output.push('\n');

    for day in &report.summaries {
        output.push_str(&format!(
            "{} ({}):\n  Temperature: {:.1}\u{00b0}C - {:.1}\u{00b0}C (avg {:.1}\u{00b0}C)\n  Humidity: {:.0}%\n  Precipitation: {:.1} mm (max chance {:.0}%)\n  Wind: avg {:.1} m/s, max {:.1} m/s, gusts {:.1} m/s\n  Clouds: {:.0}%, Visibility: {:.0} m\n",
            day.date,
            day.date.format("%A"),
            day.min_temp,
            day.max_temp,
            day.avg_temp,
            day.avg_humidity,
            day.total_precipitation,
            day.max_pop,
            day.avg_wind_speed,
            day.max_wind_speed,
            day.max_wind_gust,
            day.avg_cloud_cover,
            day.avg_visibility
        ));
        if let (Some(gdd), Some(cumulative)) = (day.gdd, day.cumulative_gdd) {
            output.push_str(&format!("  GDD: {:.1} (cumulative {:.1})\n", gdd, cumulative));
        }
        output.push('\n');
    }

    output.push_str("Advisories:\n");
    for finding in &report.advisories {
        output.push_str(&format!("  [{}] {}\n", severity_label(finding.severity), finding.detail));
        if !finding.dates.is_empty() {
            let dates: Vec<String> = finding.dates.iter().map(|d| d.to_string()).collect();
            output.push_str(&format!("    Dates: {}\n", dates.join(", ")));
        }
    }

    if !report.issues.is_empty() {
        output.push_str("\nIssues:\n");
        for issue in &report.issues {
            output.push_str(&format!("  {}\n", issue));
        }
    }
    if report.skipped_samples > 0 {
        output.push_str(&format!(
            "\nNote: {} malformed forecast sample(s) were skipped.\n",
            report.skipped_samples
        ));
    }
    output
}

/// Formats climate normals into a human-readable string
pub fn format_normals<'a>(normals: impl IntoIterator<Item = &'a ClimateNormal>) -> String {
    let mut output = String::from("Climate Normals (Plovdiv):\n\n");
    for normal in normals {
        output.push_str(&format!(
            "{}:\n  Average Temperature: {:.1}\u{00b0}C\n  Rainy Days: {}\n  Frost Days: {}\n\n",
            normal.month, normal.avg_temp, normal.rain_days, normal.frost_days
        ));
    }
    output
}

/// Formats the crop table into a human-readable string
pub fn format_crops(crops: &[CropProfile]) -> String {
    let mut output = String::from("Crops:\n\n");
    for crop in crops {
        output.push_str(&format!("{}: GDD base {:.1}\u{00b0}C\n", crop.name, crop.base_temp));
        if let Some(notes) = crop.notes {
            output.push_str(&format!("  {}\n", notes));
        }
    }
    output
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Favorable => "OK",
        Severity::Caution => "CAUTION",
        Severity::Warning => "WARNING",
    }
}
