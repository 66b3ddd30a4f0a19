#![deny(warnings)]

//! Query handlers behind the two dashboard views.
//!
//! - Map filter: price limit plus feature checkboxes, and the country list
//!   for the selected continent
//! - Country resolver: top resorts of a country by a metric, plus the rank
//!   card of the hovered resort
//!
//! All functions are pure over an immutable [`ResortTable`].

use atlas_core::{FeaturePolicy, Flag, Metric, RankCard, ResortRecord, ResortTable};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Bars shown in the country view.
pub const TOP_N: usize = 10;

type FeatureFlag = fn(&ResortRecord) -> Flag;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    /// The metric exists but the loaded table has no values for it.
    #[error("metric not available in this dataset: {0}")]
    UnavailableMetric(String),
}

/// Control values of the map view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapFilter {
    pub max_price: f64,
    pub summer_only: bool,
    pub night_only: bool,
    pub snowpark_only: bool,
}

/// Resorts shown on the map.
#[derive(Clone, Debug, PartialEq)]
pub struct MapSelection<'a> {
    pub title: String,
    pub resorts: Vec<&'a ResortRecord>,
}

/// Title of the map view for a price limit.
pub fn map_title(max_price: f64) -> String {
    format!("Resorts with prices less than ${}", format_number(max_price))
}

/// Print integral values without a fractional part, like a slider shows them.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Filter with the default last-wins policy.
///
/// Starts from every resort priced at most `max_price`. Each enabled feature,
/// in the order summer, night, snowparks, replaces the whole selection with
/// the resorts having that feature, regardless of price. Only the last one
/// enabled has any effect.
pub fn filter_for_map(
    table: &ResortTable,
    max_price: f64,
    summer_only: bool,
    night_only: bool,
    snowpark_only: bool,
) -> MapSelection<'_> {
    let filter = MapFilter {
        max_price,
        summer_only,
        night_only,
        snowpark_only,
    };
    filter_for_map_with(table, &filter, FeaturePolicy::LastWins)
}

/// Filter under an explicit [`FeaturePolicy`].
pub fn filter_for_map_with<'a>(
    table: &'a ResortTable,
    filter: &MapFilter,
    policy: FeaturePolicy,
) -> MapSelection<'a> {
    let features: [(bool, FeatureFlag); 3] = [
        (filter.summer_only, |r| r.summer_skiing),
        (filter.night_only, |r| r.night_skiing),
        (filter.snowpark_only, |r| r.snowparks),
    ];
    let within_price = |r: &ResortRecord| r.price <= filter.max_price;

    let resorts: Vec<&ResortRecord> = match policy {
        FeaturePolicy::LastWins => {
            match features.iter().rev().find(|(enabled, _)| *enabled) {
                Some((_, flag)) => table.records().iter().filter(|r| flag(r).is_yes()).collect(),
                None => table.records().iter().filter(|r| within_price(r)).collect(),
            }
        }
        FeaturePolicy::Intersect => table
            .records()
            .iter()
            .filter(|r| within_price(r))
            .filter(|r| {
                features
                    .iter()
                    .all(|(enabled, flag)| !*enabled || flag(r).is_yes())
            })
            .collect(),
    };
    debug!(?filter, ?policy, matched = resorts.len(), "map filter");
    MapSelection {
        title: map_title(filter.max_price),
        resorts,
    }
}

/// Distinct values of `key` over `records`, in first-appearance order.
fn distinct<'a>(
    records: impl Iterator<Item = &'a ResortRecord>,
    key: fn(&ResortRecord) -> &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .map(key)
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Countries of `continent`, in first-appearance order.
///
/// Depends only on the continent; map filters never change it.
pub fn country_options(table: &ResortTable, continent: &str) -> Vec<String> {
    distinct(
        table.records().iter().filter(|r| r.continent == continent),
        |r| r.country.as_str(),
    )
}

/// Continents in first-appearance order.
pub fn continent_options(table: &ResortTable) -> Vec<String> {
    distinct(table.records().iter(), |r| r.continent.as_str())
}

/// Metrics the metric selector offers.
pub fn metric_options(table: &ResortTable) -> Vec<Metric> {
    table.metrics().to_vec()
}

/// Resolved state of the country view.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryView<'a> {
    pub title: String,
    pub metric: Metric,
    /// At most [`TOP_N`] resorts, descending by `metric`.
    pub top: Vec<&'a ResortRecord>,
    /// The hovered resort, as given.
    pub resort_name: String,
    /// Ranks of the hovered resort, when it is in the selected country.
    pub ranks: Option<RankCard>,
}

/// Title of the country view.
pub fn country_title(country: &str, metric: Metric) -> String {
    format!("Top Resorts in {country} by {}", metric.title())
}

/// Descending by value; resorts without a value go last. Stable for ties.
fn by_metric_desc(metric: Metric) -> impl Fn(&&ResortRecord, &&ResortRecord) -> Ordering {
    move |a, b| match (metric.value(a), metric.value(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Resolve the country view.
///
/// A country outside `continent`, or a hovered resort outside the country,
/// yields empty results rather than an error.
pub fn resolve_country_view<'a>(
    table: &'a ResortTable,
    continent: &str,
    country: &str,
    metric: Metric,
    hovered_resort: &str,
) -> CountryView<'a> {
    let subset: Vec<&ResortRecord> = table
        .records()
        .iter()
        .filter(|r| r.continent == continent && r.country == country)
        .collect();
    let ranks = subset
        .iter()
        .find(|r| r.resort == hovered_resort)
        .map(|r| r.ranks);

    let mut top = subset;
    top.sort_by(by_metric_desc(metric));
    top.truncate(TOP_N);
    debug!(
        continent,
        country,
        %metric,
        shown = top.len(),
        hovered = hovered_resort,
        hit = ranks.is_some(),
        "country view"
    );
    CountryView {
        title: country_title(country, metric),
        metric,
        top,
        resort_name: hovered_resort.to_string(),
        ranks,
    }
}

/// Parse a metric name coming from a UI control.
pub fn parse_metric(table: &ResortTable, name: &str) -> Result<Metric, QueryError> {
    let metric: Metric = name
        .parse()
        .map_err(|_| QueryError::UnknownMetric(name.to_string()))?;
    if !table.metrics().contains(&metric) {
        return Err(QueryError::UnavailableMetric(metric.column().to_string()));
    }
    Ok(metric)
}

/// [`resolve_country_view`] with the metric given by name.
pub fn resolve_country_view_by_name<'a>(
    table: &'a ResortTable,
    continent: &str,
    country: &str,
    metric: &str,
    hovered_resort: &str,
) -> Result<CountryView<'a>, QueryError> {
    let metric = parse_metric(table, metric)?;
    Ok(resolve_country_view(
        table,
        continent,
        country,
        metric,
        hovered_resort,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn resort(name: &str, country: &str, continent: &str, price: f64) -> ResortRecord {
        let mut r = ResortRecord::new(name, country, continent);
        r.price = price;
        r
    }

    fn names(resorts: &[&ResortRecord]) -> Vec<String> {
        resorts.iter().map(|r| r.resort.clone()).collect()
    }

    fn fixture() -> ResortTable {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/data/resorts.csv");
        data_pipeline::load(path).unwrap()
    }

    /// A: cheap with summer skiing, B: pricey with snowparks, C: cheap with night skiing.
    fn feature_table() -> ResortTable {
        let mut a = resort("A", "Norway", "Europe", 30.0);
        a.summer_skiing = Flag::Yes;
        let mut b = resort("B", "Norway", "Europe", 120.0);
        b.snowparks = Flag::Yes;
        b.summer_skiing = Flag::Yes;
        let mut c = resort("C", "Sweden", "Europe", 40.0);
        c.night_skiing = Flag::Yes;
        let d = resort("D", "Japan", "Asia", 45.0);
        ResortTable::new(vec![a, b, c, d]).unwrap()
    }

    #[test]
    fn price_filter_alone() {
        let table = feature_table();
        let sel = filter_for_map(&table, 40.0, false, false, false);
        assert_eq!(names(&sel.resorts), vec!["A", "C"]);
        assert_eq!(sel.title, "Resorts with prices less than $40");
    }

    #[test]
    fn summer_replaces_price_filter() {
        let table = feature_table();
        let sel = filter_for_map(&table, 50.0, true, false, false);
        assert_eq!(names(&sel.resorts), vec!["A", "B"]);
        assert_eq!(sel.title, "Resorts with prices less than $50");
    }

    #[test]
    fn last_enabled_feature_wins() {
        let table = feature_table();
        let night = filter_for_map(&table, 50.0, true, true, false);
        assert_eq!(names(&night.resorts), vec!["C"]);
        let parks = filter_for_map(&table, 50.0, true, true, true);
        assert_eq!(names(&parks.resorts), vec!["B"]);
    }

    #[test]
    fn intersect_policy_keeps_price_limit() {
        let table = feature_table();
        let filter = MapFilter {
            max_price: 50.0,
            summer_only: true,
            night_only: false,
            snowpark_only: false,
        };
        let sel = filter_for_map_with(&table, &filter, FeaturePolicy::Intersect);
        assert_eq!(names(&sel.resorts), vec!["A"]);
        let both = MapFilter {
            summer_only: true,
            snowpark_only: true,
            max_price: 200.0,
            ..filter
        };
        let sel = filter_for_map_with(&table, &both, FeaturePolicy::Intersect);
        assert_eq!(names(&sel.resorts), vec!["B"]);
    }

    #[test]
    fn title_prints_fractional_limits() {
        assert_eq!(map_title(62.5), "Resorts with prices less than $62.5");
        assert_eq!(map_title(0.0), "Resorts with prices less than $0");
    }

    #[test]
    fn country_options_in_first_appearance_order() {
        let table = feature_table();
        assert_eq!(country_options(&table, "Europe"), vec!["Norway", "Sweden"]);
        assert_eq!(country_options(&table, "Asia"), vec!["Japan"]);
        assert!(country_options(&table, "Antarctica").is_empty());
        assert_eq!(continent_options(&table), vec!["Europe", "Asia"]);
    }

    #[test]
    fn round_trip_two_resorts() {
        let table = ResortTable::new(vec![
            resort("A", "Norway", "Europe", 50.0),
            resort("B", "Norway", "Europe", 100.0),
        ])
        .unwrap();
        let view = resolve_country_view(&table, "Europe", "Norway", Metric::Price, "B");
        assert_eq!(names(&view.top), vec!["B", "A"]);
        assert_eq!(view.ranks.unwrap().price, 1.0);
        let view = resolve_country_view(&table, "Europe", "Norway", Metric::Price, "A");
        assert_eq!(view.ranks.unwrap().price, 2.0);
        assert_eq!(view.title, "Top Resorts in Norway by Price");
        assert_eq!(view.resort_name, "A");
    }

    #[test]
    fn top_ten_truncation() {
        let mut records: Vec<ResortRecord> = (0..15)
            .map(|i| resort(&format!("N{i}"), "Norway", "Europe", i as f64))
            .collect();
        records.extend((0..3).map(|i| resort(&format!("S{i}"), "Sweden", "Europe", i as f64)));
        let table = ResortTable::new(records).unwrap();

        let view = resolve_country_view(&table, "Europe", "Norway", Metric::Price, "N0");
        assert_eq!(view.top.len(), 10);
        let prices: Vec<f64> = view.top.iter().map(|r| r.price).collect();
        assert_eq!(prices, (5..15).rev().map(f64::from).collect::<Vec<_>>());
        // outside the top ten, but still in the country
        assert_eq!(view.ranks.unwrap().price, 15.0);

        let view = resolve_country_view(&table, "Europe", "Sweden", Metric::Price, "S0");
        assert_eq!(view.top.len(), 3);
    }

    #[test]
    fn hovered_resort_outside_country_has_no_ranks() {
        let table = feature_table();
        let view = resolve_country_view(&table, "Europe", "Norway", Metric::Price, "C");
        assert_eq!(view.ranks, None);
        assert_eq!(view.resort_name, "C");
        assert_eq!(view.top.len(), 2);
    }

    #[test]
    fn country_outside_continent_is_empty() {
        let table = feature_table();
        let view = resolve_country_view(&table, "Asia", "Norway", Metric::TotalSlopes, "A");
        assert!(view.top.is_empty());
        assert_eq!(view.ranks, None);
        assert_eq!(view.title, "Top Resorts in Norway by Total Slopes");
    }

    #[test]
    fn missing_values_sort_last() {
        let mut a = resort("A", "Norway", "Europe", 1.0);
        a.total_lifts = None;
        let mut b = resort("B", "Norway", "Europe", 1.0);
        b.total_lifts = Some(3.0);
        let mut c = resort("C", "Norway", "Europe", 1.0);
        c.total_lifts = Some(9.0);
        let table = ResortTable::new(vec![a, b, c]).unwrap();
        let view = resolve_country_view(&table, "Europe", "Norway", Metric::TotalLifts, "A");
        assert_eq!(names(&view.top), vec!["C", "B", "A"]);
    }

    #[test]
    fn ties_keep_table_order() {
        let table = ResortTable::new(vec![
            resort("First", "Norway", "Europe", 10.0),
            resort("Second", "Norway", "Europe", 10.0),
            resort("Top", "Norway", "Europe", 20.0),
        ])
        .unwrap();
        let view = resolve_country_view(&table, "Europe", "Norway", Metric::Price, "");
        assert_eq!(names(&view.top), vec!["Top", "First", "Second"]);
    }

    #[test]
    fn metric_names_are_checked() {
        let table = feature_table();
        assert_eq!(
            resolve_country_view_by_name(&table, "Europe", "Norway", "Altitude", "A").unwrap_err(),
            QueryError::UnknownMetric("Altitude".to_string())
        );
        assert_eq!(
            parse_metric(&table, "Lift capacity").unwrap_err(),
            QueryError::UnavailableMetric("Lift capacity".to_string())
        );
        let view =
            resolve_country_view_by_name(&table, "Europe", "Norway", "country_price_rank", "A")
                .unwrap();
        assert_eq!(view.title, "Top Resorts in Norway by Country Price Rank");
        // rank 2 (A) sorts above rank 1 (B): descending by the rank value
        assert_eq!(names(&view.top), vec!["A", "B"]);
    }

    #[test]
    fn fixture_norway_view() {
        let table = fixture();
        let view = resolve_country_view(&table, "Europe", "Norway", Metric::Price, "Hemsedal");
        assert_eq!(view.top.len(), 7);
        assert_eq!(names(&view.top[..2]), vec!["Hemsedal", "Trysil"]);
        let ranks = view.ranks.unwrap();
        assert_eq!(ranks.price, 1.5);
        assert_eq!(ranks.elevation, 2.0);
        let summer = filter_for_map(&table, 50.0, true, false, false);
        assert!(summer.resorts.iter().all(|r| r.summer_skiing.is_yes()));
        assert!(summer.resorts.iter().any(|r| r.price > 50.0));
        assert_eq!(summer.resorts.len(), 8);
    }

    proptest! {
        #[test]
        fn country_list_ignores_map_filters(max_price in 0.0f64..200.0,
                                            summer in any::<bool>(),
                                            night in any::<bool>(),
                                            parks in any::<bool>()) {
            let table = feature_table();
            let before = country_options(&table, "Europe");
            let _ = filter_for_map(&table, max_price, summer, night, parks);
            prop_assert_eq!(country_options(&table, "Europe"), before);
        }

        #[test]
        fn summer_selection_ignores_price(max_price in 0.0f64..200.0) {
            let table = feature_table();
            let sel = filter_for_map(&table, max_price, true, false, false);
            prop_assert_eq!(names(&sel.resorts), vec!["A".to_string(), "B".to_string()]);
        }

        #[test]
        fn price_only_selection_respects_limit(max_price in 0.0f64..200.0) {
            let table = feature_table();
            let sel = filter_for_map(&table, max_price, false, false, false);
            prop_assert!(sel.resorts.iter().all(|r| r.price <= max_price));
            let expected = table.records().iter().filter(|r| r.price <= max_price).count();
            prop_assert_eq!(sel.resorts.len(), expected);
        }

        #[test]
        fn top_is_sorted_and_bounded(prices in proptest::collection::vec(0u16..500, 0..25)) {
            let records: Vec<ResortRecord> = prices
                .iter()
                .enumerate()
                .map(|(i, &p)| resort(&format!("R{i}"), "Norway", "Europe", p as f64))
                .collect();
            let table = ResortTable::new(records).unwrap();
            let view = resolve_country_view(&table, "Europe", "Norway", Metric::Price, "R0");
            prop_assert_eq!(view.top.len(), prices.len().min(TOP_N));
            for w in view.top.windows(2) {
                prop_assert!(w[0].price >= w[1].price);
            }
        }
    }
}
