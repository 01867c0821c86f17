//! Static reference tables: monthly climate normals and crop GDD bases

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AgroError;

/// Calendar month, the key of the climate-normal table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Month for a 1-based month number as returned by `chrono::Datelike::month`
    pub fn from_number(number: u32) -> Option<Month> {
        Month::ALL.get(number.checked_sub(1)? as usize).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Month::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AgroError::UnknownMonth(s.to_string()))
    }
}

/// Long-run reference values for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClimateNormal {
    pub month: Month,
    /// Baseline average temperature in °C
    pub avg_temp: f64,
    /// Typical number of rainy days in the month
    pub rain_days: u32,
    /// Typical number of frost days in the month
    pub frost_days: u32,
}

const fn normal(month: Month, avg_temp: f64, rain_days: u32, frost_days: u32) -> ClimateNormal {
    ClimateNormal {
        month,
        avg_temp,
        rain_days,
        frost_days,
    }
}

/// Normals for Plovdiv, Bulgaria
pub static PLOVDIV_NORMALS: ClimateNormalTable = ClimateNormalTable {
    rows: [
        normal(Month::January, 1.5, 5, 20),
        normal(Month::February, 3.5, 4, 16),
        normal(Month::March, 7.5, 5, 10),
        normal(Month::April, 12.5, 6, 2),
        normal(Month::May, 17.5, 8, 0),
        normal(Month::June, 21.5, 7, 0),
        normal(Month::July, 24.0, 5, 0),
        normal(Month::August, 23.5, 4, 0),
        normal(Month::September, 19.0, 4, 0),
        normal(Month::October, 13.0, 5, 3),
        normal(Month::November, 7.5, 6, 9),
        normal(Month::December, 2.5, 6, 17),
    ],
};

/// One [`ClimateNormal`] per month, in calendar order
#[derive(Debug)]
pub struct ClimateNormalTable {
    rows: [ClimateNormal; 12],
}

impl ClimateNormalTable {
    pub fn get(&self, month: Month) -> &ClimateNormal {
        &self.rows[month as usize]
    }

    /// Looks a month up by name; an unrecognized name is an error, never a default
    pub fn lookup(&self, month_name: &str) -> Result<&ClimateNormal, AgroError> {
        month_name.parse::<Month>().map(|m| self.get(m))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClimateNormal> {
        self.rows.iter()
    }
}

/// A crop with the base temperature used for its GDD accumulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropProfile {
    pub name: &'static str,
    /// GDD base temperature in °C
    pub base_temp: f64,
    pub notes: Option<&'static str>,
}

pub static CROPS: &[CropProfile] = &[
    CropProfile {
        name: "maize",
        base_temp: 10.0,
        notes: Some("Silking typically after 700-800 GDD"),
    },
    CropProfile {
        name: "wheat",
        base_temp: 0.0,
        notes: Some("Winter wheat, base 0 °C"),
    },
    CropProfile {
        name: "barley",
        base_temp: 0.0,
        notes: None,
    },
    CropProfile {
        name: "sunflower",
        base_temp: 6.0,
        notes: None,
    },
    CropProfile {
        name: "tomato",
        base_temp: 10.0,
        notes: Some("Field-grown, transplanted"),
    },
    CropProfile {
        name: "grapevine",
        base_temp: 10.0,
        notes: Some("Winkler index base"),
    },
    CropProfile {
        name: "potato",
        base_temp: 7.0,
        notes: None,
    },
    CropProfile {
        name: "cotton",
        base_temp: 15.5,
        notes: Some("Sensitive to cool nights"),
    },
];

/// Finds a crop by case-insensitive name
pub fn find_crop(name: &str) -> Result<&'static CropProfile, AgroError> {
    let wanted = name.trim();
    CROPS
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| AgroError::UnknownCrop(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_parse_is_case_insensitive() {
        assert_eq!("march".parse::<Month>().unwrap(), Month::March);
        assert_eq!(" December ".parse::<Month>().unwrap(), Month::December);
    }

    #[test]
    fn test_unknown_month_is_explicit() {
        let err = PLOVDIV_NORMALS.lookup("Smarch").unwrap_err();
        assert!(matches!(err, AgroError::UnknownMonth(ref m) if m == "Smarch"));
    }

    #[test]
    fn test_table_rows_are_keyed_by_month() {
        for month in Month::ALL {
            assert_eq!(PLOVDIV_NORMALS.get(month).month, month);
        }
        assert_eq!(PLOVDIV_NORMALS.iter().count(), 12);
    }

    #[test]
    fn test_plovdiv_may_normal() {
        let may = PLOVDIV_NORMALS.lookup("May").unwrap();
        assert_eq!(may.avg_temp, 17.5);
        assert_eq!(may.rain_days, 8);
    }

    #[test]
    fn test_month_from_number() {
        assert_eq!(Month::from_number(1), Some(Month::January));
        assert_eq!(Month::from_number(12), Some(Month::December));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn test_find_crop() {
        assert_eq!(find_crop("Maize").unwrap().base_temp, 10.0);
        assert!(matches!(find_crop("kale"), Err(AgroError::UnknownCrop(_))));
    }
}
