#![deny(warnings)]

//! Core data model for Ski Atlas.
//!
//! Defines the resort record, the immutable resort table with its
//! within-country ranks, the plottable metrics, and the dashboard
//! configuration shared by the host and the CLI.

mod config;
mod metric;
mod rank;

pub use config::{
    ConfigError, ControlDefaults, DashboardConfig, FeaturePolicy, CONFIG_ENV, DEFAULT_BIND,
    DEFAULT_CONFIG_PATH, DEFAULT_DATA_PATH,
};
pub use metric::{title_case, Metric, UnknownMetric};
pub use rank::grouped_descending_rank;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A yes/no attribute of a resort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    Yes,
    #[default]
    No,
}

impl Flag {
    /// Only the exact text `Yes` (surrounding whitespace ignored) is `Yes`.
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim() == "Yes" {
            Flag::Yes
        } else {
            Flag::No
        }
    }

    pub fn is_yes(self) -> bool {
        self == Flag::Yes
    }
}

/// Within-country ranks of a resort; 1 is the highest value in its country.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RankCard {
    /// Rank by `Highest point`.
    pub elevation: f64,
    /// Rank by `Price`.
    pub price: f64,
    /// Rank by `Total slopes`.
    pub slope: f64,
    /// Rank by `Snow cannons`.
    pub cannon: f64,
}

/// One ski resort.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResortRecord {
    pub resort: String,
    pub country: String,
    pub continent: String,
    /// Day pass price.
    pub price: f64,
    pub season: Option<String>,
    /// Top elevation in metres.
    pub highest_point: f64,
    pub lowest_point: Option<f64>,
    pub beginner_slopes: Option<f64>,
    pub intermediate_slopes: Option<f64>,
    pub difficult_slopes: Option<f64>,
    /// Kilometres of slopes.
    pub total_slopes: f64,
    pub longest_run: Option<f64>,
    pub snow_cannons: f64,
    pub surface_lifts: Option<f64>,
    pub chair_lifts: Option<f64>,
    pub gondola_lifts: Option<f64>,
    pub total_lifts: Option<f64>,
    pub lift_capacity: Option<f64>,
    pub child_friendly: Flag,
    pub latitude: f64,
    pub longitude: f64,
    pub summer_skiing: Flag,
    pub night_skiing: Flag,
    pub snowparks: Flag,
    /// Filled in by [`ResortTable::new`].
    #[serde(default)]
    pub ranks: RankCard,
}

impl ResortRecord {
    /// A record with the required attributes set and everything else empty.
    pub fn new(
        resort: impl Into<String>,
        country: impl Into<String>,
        continent: impl Into<String>,
    ) -> Self {
        Self {
            resort: resort.into(),
            country: country.into(),
            continent: continent.into(),
            price: 0.0,
            season: None,
            highest_point: 0.0,
            lowest_point: None,
            beginner_slopes: None,
            intermediate_slopes: None,
            difficult_slopes: None,
            total_slopes: 0.0,
            longest_run: None,
            snow_cannons: 0.0,
            surface_lifts: None,
            chair_lifts: None,
            gondola_lifts: None,
            total_lifts: None,
            lift_capacity: None,
            child_friendly: Flag::No,
            latitude: 0.0,
            longitude: 0.0,
            summer_skiing: Flag::No,
            night_skiing: Flag::No,
            snowparks: Flag::No,
            ranks: RankCard::default(),
        }
    }
}

/// Validation errors for loaded records.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Resort, country or continent is blank.
    #[error("row {row}: {field} is empty")]
    EmptyField { row: usize, field: &'static str },
    /// A required numeric value is NaN or infinite.
    #[error("{resort}: {column} is not a finite number")]
    NonFinite { resort: String, column: &'static str },
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    #[error("{resort}: coordinates ({lat}, {lon}) out of range")]
    CoordinateOutOfRange { resort: String, lat: f64, lon: f64 },
}

/// Validate a single record. `row` is its zero-based position in the table.
pub fn validate_record(row: usize, r: &ResortRecord) -> Result<(), ValidationError> {
    for (field, value) in [
        ("Resort", &r.resort),
        ("Country", &r.country),
        ("Continent", &r.continent),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField { row, field });
        }
    }
    for (column, value) in [
        ("Price", r.price),
        ("Highest point", r.highest_point),
        ("Total slopes", r.total_slopes),
        ("Snow cannons", r.snow_cannons),
        ("Latitude", r.latitude),
        ("Longitude", r.longitude),
    ] {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                resort: r.resort.clone(),
                column,
            });
        }
    }
    if !(-90.0..=90.0).contains(&r.latitude) || !(-180.0..=180.0).contains(&r.longitude) {
        return Err(ValidationError::CoordinateOutOfRange {
            resort: r.resort.clone(),
            lat: r.latitude,
            lon: r.longitude,
        });
    }
    Ok(())
}

/// The loaded resort table. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResortTable {
    records: Vec<ResortRecord>,
    metrics: Vec<Metric>,
}

impl ResortTable {
    /// Validate `records`, compute their within-country ranks and freeze them.
    ///
    /// Optional metrics are offered only when at least one record has a value.
    pub fn new(mut records: Vec<ResortRecord>) -> Result<Self, ValidationError> {
        for (row, r) in records.iter().enumerate() {
            validate_record(row, r)?;
        }
        assign_country_ranks(&mut records);
        let metrics = Metric::ALL
            .into_iter()
            .filter(|m| m.is_required() || records.iter().any(|r| m.value(r).is_some()))
            .collect();
        Ok(Self { records, metrics })
    }

    pub fn records(&self) -> &[ResortRecord] {
        &self.records
    }

    /// Metrics with data in this table, in column order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fill every record's [`RankCard`] from the other records of its country.
pub fn assign_country_ranks(records: &mut [ResortRecord]) {
    let countries: Vec<&str> = records.iter().map(|r| r.country.as_str()).collect();
    let column = |f: fn(&ResortRecord) -> f64| -> Vec<f64> { records.iter().map(f).collect() };
    let elevation = grouped_descending_rank(&countries, &column(|r| r.highest_point));
    let price = grouped_descending_rank(&countries, &column(|r| r.price));
    let slope = grouped_descending_rank(&countries, &column(|r| r.total_slopes));
    let cannon = grouped_descending_rank(&countries, &column(|r| r.snow_cannons));
    for (i, r) in records.iter_mut().enumerate() {
        r.ranks = RankCard {
            elevation: elevation[i],
            price: price[i],
            slope: slope[i],
            cannon: cannon[i],
        };
    }
}
