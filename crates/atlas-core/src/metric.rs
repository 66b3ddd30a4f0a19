//! Plottable numeric columns of the resort table.

use crate::ResortRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A numeric column the metric selector can plot.
///
/// Variants are declared in table column order: raw columns first, then the
/// four derived rank columns. Serialized form is the column name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Price")]
    Price,
    #[serde(rename = "Highest point")]
    HighestPoint,
    #[serde(rename = "Lowest point")]
    LowestPoint,
    #[serde(rename = "Beginner slopes")]
    BeginnerSlopes,
    #[serde(rename = "Intermediate slopes")]
    IntermediateSlopes,
    #[serde(rename = "Difficult slopes")]
    DifficultSlopes,
    #[serde(rename = "Total slopes")]
    TotalSlopes,
    #[serde(rename = "Longest run")]
    LongestRun,
    #[serde(rename = "Snow cannons")]
    SnowCannons,
    #[serde(rename = "Surface lifts")]
    SurfaceLifts,
    #[serde(rename = "Chair lifts")]
    ChairLifts,
    #[serde(rename = "Gondola lifts")]
    GondolaLifts,
    #[serde(rename = "Total lifts")]
    TotalLifts,
    #[serde(rename = "Lift capacity")]
    LiftCapacity,
    #[serde(rename = "country_elevation_rank")]
    CountryElevationRank,
    #[serde(rename = "country_price_rank")]
    CountryPriceRank,
    #[serde(rename = "country_slope_rank")]
    CountrySlopeRank,
    #[serde(rename = "country_cannon_rank")]
    CountryCannonRank,
}

impl Metric {
    /// Every metric, in column order.
    pub const ALL: [Metric; 18] = [
        Metric::Price,
        Metric::HighestPoint,
        Metric::LowestPoint,
        Metric::BeginnerSlopes,
        Metric::IntermediateSlopes,
        Metric::DifficultSlopes,
        Metric::TotalSlopes,
        Metric::LongestRun,
        Metric::SnowCannons,
        Metric::SurfaceLifts,
        Metric::ChairLifts,
        Metric::GondolaLifts,
        Metric::TotalLifts,
        Metric::LiftCapacity,
        Metric::CountryElevationRank,
        Metric::CountryPriceRank,
        Metric::CountrySlopeRank,
        Metric::CountryCannonRank,
    ];

    /// Column name as it appears in the source table (or, for ranks, as derived).
    pub fn column(self) -> &'static str {
        match self {
            Metric::Price => "Price",
            Metric::HighestPoint => "Highest point",
            Metric::LowestPoint => "Lowest point",
            Metric::BeginnerSlopes => "Beginner slopes",
            Metric::IntermediateSlopes => "Intermediate slopes",
            Metric::DifficultSlopes => "Difficult slopes",
            Metric::TotalSlopes => "Total slopes",
            Metric::LongestRun => "Longest run",
            Metric::SnowCannons => "Snow cannons",
            Metric::SurfaceLifts => "Surface lifts",
            Metric::ChairLifts => "Chair lifts",
            Metric::GondolaLifts => "Gondola lifts",
            Metric::TotalLifts => "Total lifts",
            Metric::LiftCapacity => "Lift capacity",
            Metric::CountryElevationRank => "country_elevation_rank",
            Metric::CountryPriceRank => "country_price_rank",
            Metric::CountrySlopeRank => "country_slope_rank",
            Metric::CountryCannonRank => "country_cannon_rank",
        }
    }

    /// Display form: title-cased column name with underscores as spaces.
    pub fn title(self) -> String {
        title_case(self.column()).replace('_', " ")
    }

    /// Whether every loaded record is guaranteed a value for this metric.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Metric::Price
                | Metric::HighestPoint
                | Metric::TotalSlopes
                | Metric::SnowCannons
                | Metric::CountryElevationRank
                | Metric::CountryPriceRank
                | Metric::CountrySlopeRank
                | Metric::CountryCannonRank
        )
    }

    /// Value of this metric for a record, if the record has one.
    pub fn value(self, r: &ResortRecord) -> Option<f64> {
        let v = match self {
            Metric::Price => Some(r.price),
            Metric::HighestPoint => Some(r.highest_point),
            Metric::LowestPoint => r.lowest_point,
            Metric::BeginnerSlopes => r.beginner_slopes,
            Metric::IntermediateSlopes => r.intermediate_slopes,
            Metric::DifficultSlopes => r.difficult_slopes,
            Metric::TotalSlopes => Some(r.total_slopes),
            Metric::LongestRun => r.longest_run,
            Metric::SnowCannons => Some(r.snow_cannons),
            Metric::SurfaceLifts => r.surface_lifts,
            Metric::ChairLifts => r.chair_lifts,
            Metric::GondolaLifts => r.gondola_lifts,
            Metric::TotalLifts => r.total_lifts,
            Metric::LiftCapacity => r.lift_capacity,
            Metric::CountryElevationRank => Some(r.ranks.elevation),
            Metric::CountryPriceRank => Some(r.ranks.price),
            Metric::CountrySlopeRank => Some(r.ranks.slope),
            Metric::CountryCannonRank => Some(r.ranks.cannon),
        };
        v.filter(|x| !x.is_nan())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Unknown metric name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    /// Accepts the column name exactly, or the column name or display title
    /// in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(m) = Metric::ALL.iter().find(|m| m.column() == s) {
            return Ok(*m);
        }
        Metric::ALL
            .iter()
            .find(|m| m.column().eq_ignore_ascii_case(s) || m.title().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Title-case a string: the first letter of every alphabetic run is
/// uppercased, the rest lowercased. Non-letters are copied unchanged.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_follow_column_names() {
        assert_eq!(Metric::Price.title(), "Price");
        assert_eq!(Metric::HighestPoint.title(), "Highest Point");
        assert_eq!(Metric::CountryPriceRank.title(), "Country Price Rank");
    }

    #[test]
    fn title_case_handles_mixed_input() {
        assert_eq!(title_case("sNOW cannons"), "Snow Cannons");
        assert_eq!(title_case("top-10 list"), "Top-10 List");
        assert_eq!(title_case("2nd run"), "2Nd Run");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn parse_accepts_column_and_title() {
        assert_eq!("Price".parse::<Metric>(), Ok(Metric::Price));
        assert_eq!("highest point".parse::<Metric>(), Ok(Metric::HighestPoint));
        assert_eq!(
            "Country Cannon Rank".parse::<Metric>(),
            Ok(Metric::CountryCannonRank)
        );
        assert_eq!(
            "Altitude".parse::<Metric>(),
            Err(UnknownMetric("Altitude".to_string()))
        );
    }

    #[test]
    fn serde_uses_column_names() {
        let s = serde_json::to_string(&Metric::SnowCannons).unwrap();
        assert_eq!(s, "\"Snow cannons\"");
        let back: Metric = serde_json::from_str("\"country_slope_rank\"").unwrap();
        assert_eq!(back, Metric::CountrySlopeRank);
    }

    #[test]
    fn all_is_in_column_order_and_complete() {
        assert_eq!(Metric::ALL[0], Metric::Price);
        assert_eq!(Metric::ALL[Metric::ALL.len() - 1], Metric::CountryCannonRank);
        for m in Metric::ALL {
            assert_eq!(m.column().parse::<Metric>(), Ok(m));
        }
    }
}
