#![deny(warnings)]

//! Loads the resort table from its CSV source and enriches it with
//! within-country ranks.
//!
//! The source file is ISO-8859-1 encoded. It is decoded up front so that
//! resort and country names with accents survive intact.

use atlas_core::{Flag, ResortRecord, ResortTable, ValidationError};
use csv::StringRecord;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Header of the summer-skiing column in the source file.
pub const RAW_SUMMER_COLUMN: &str = "Summer skiing";
/// Header the column is renamed to on load.
pub const SUMMER_COLUMN: &str = "Summerskiing";

/// Columns every source file must carry (after the rename).
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Resort",
    "Country",
    "Continent",
    "Price",
    "Highest point",
    "Total slopes",
    "Snow cannons",
    "Latitude",
    "Longitude",
    SUMMER_COLUMN,
    "Nightskiing",
    "Snowparks",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("malformed resort table: {0}")]
    Parse(#[from] csv::Error),
    #[error("invalid resort table: {0}")]
    Invalid(#[from] ValidationError),
}

/// One source row as written in the file.
#[derive(Debug, Deserialize)]
struct RawResort {
    #[serde(rename = "Resort")]
    resort: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Continent")]
    continent: String,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Season", default)]
    season: Option<String>,
    #[serde(rename = "Highest point")]
    highest_point: f64,
    #[serde(rename = "Lowest point", default, deserialize_with = "csv::invalid_option")]
    lowest_point: Option<f64>,
    #[serde(rename = "Beginner slopes", default, deserialize_with = "csv::invalid_option")]
    beginner_slopes: Option<f64>,
    #[serde(rename = "Intermediate slopes", default, deserialize_with = "csv::invalid_option")]
    intermediate_slopes: Option<f64>,
    #[serde(rename = "Difficult slopes", default, deserialize_with = "csv::invalid_option")]
    difficult_slopes: Option<f64>,
    #[serde(rename = "Total slopes")]
    total_slopes: f64,
    #[serde(rename = "Longest run", default, deserialize_with = "csv::invalid_option")]
    longest_run: Option<f64>,
    #[serde(rename = "Snow cannons")]
    snow_cannons: f64,
    #[serde(rename = "Surface lifts", default, deserialize_with = "csv::invalid_option")]
    surface_lifts: Option<f64>,
    #[serde(rename = "Chair lifts", default, deserialize_with = "csv::invalid_option")]
    chair_lifts: Option<f64>,
    #[serde(rename = "Gondola lifts", default, deserialize_with = "csv::invalid_option")]
    gondola_lifts: Option<f64>,
    #[serde(rename = "Total lifts", default, deserialize_with = "csv::invalid_option")]
    total_lifts: Option<f64>,
    #[serde(rename = "Lift capacity", default, deserialize_with = "csv::invalid_option")]
    lift_capacity: Option<f64>,
    #[serde(rename = "Child friendly", default)]
    child_friendly: Option<String>,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Summerskiing")]
    summer_skiing: String,
    #[serde(rename = "Nightskiing")]
    night_skiing: String,
    #[serde(rename = "Snowparks")]
    snowparks: String,
}

impl From<RawResort> for ResortRecord {
    fn from(raw: RawResort) -> Self {
        let mut r = ResortRecord::new(raw.resort, raw.country, raw.continent);
        r.price = raw.price;
        r.season = raw.season.filter(|s| !s.is_empty());
        r.highest_point = raw.highest_point;
        r.lowest_point = raw.lowest_point;
        r.beginner_slopes = raw.beginner_slopes;
        r.intermediate_slopes = raw.intermediate_slopes;
        r.difficult_slopes = raw.difficult_slopes;
        r.total_slopes = raw.total_slopes;
        r.longest_run = raw.longest_run;
        r.snow_cannons = raw.snow_cannons;
        r.surface_lifts = raw.surface_lifts;
        r.chair_lifts = raw.chair_lifts;
        r.gondola_lifts = raw.gondola_lifts;
        r.total_lifts = raw.total_lifts;
        r.lift_capacity = raw.lift_capacity;
        r.child_friendly = raw.child_friendly.as_deref().map(Flag::from_raw).unwrap_or_default();
        r.latitude = raw.latitude;
        r.longitude = raw.longitude;
        r.summer_skiing = Flag::from_raw(&raw.summer_skiing);
        r.night_skiing = Flag::from_raw(&raw.night_skiing);
        r.snowparks = Flag::from_raw(&raw.snowparks);
        r
    }
}

/// Decode ISO-8859-1 bytes. Every byte is the code point of the same value,
/// so decoding cannot fail.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Load, enrich and validate the resort table at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<ResortTable, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_from_bytes(&bytes)?;
    info!(
        path = %path.display(),
        resorts = table.len(),
        metrics = table.metrics().len(),
        "loaded resort table"
    );
    Ok(table)
}

/// Load from raw ISO-8859-1 encoded bytes.
pub fn load_from_bytes(bytes: &[u8]) -> Result<ResortTable, LoadError> {
    let text = decode_latin1(bytes);
    load_from_reader(text.as_bytes())
}

/// Load from already-decoded UTF-8 CSV text.
pub fn load_from_reader<R: io::Read>(reader: R) -> Result<ResortTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rename_headers(rdr.headers()?);
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }
    debug!(columns = headers.len(), "resort table header accepted");
    rdr.set_headers(headers);

    let mut records = Vec::new();
    for row in rdr.deserialize::<RawResort>() {
        records.push(ResortRecord::from(row?));
    }
    if records.is_empty() {
        warn!("resort table has a header but no rows");
    }
    Ok(ResortTable::new(records)?)
}

fn rename_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(|h| if h == RAW_SUMMER_COLUMN { SUMMER_COLUMN } else { h })
        .collect()
}
