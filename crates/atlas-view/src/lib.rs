#![deny(warnings)]

//! Display-ready descriptors for the dashboard.
//!
//! Maps query results to chart specifications (which fields drive position,
//! size, colour and labels) and report-card strings. Rendering is left to
//! the host; everything here is plain serializable data.

use atlas_core::{FeaturePolicy, Metric, ResortTable};
use atlas_query::{CountryView, MapFilter, MapSelection};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Figure template the host renders with.
pub const TEMPLATE: &str = "cyborg";
/// Dashboard background colour.
pub const BACKGROUND: &str = "#1f2937";
pub const FONT_COLOR: &str = "white";
/// Initial zoom of the map.
pub const MAP_ZOOM: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub t: u32,
    pub b: u32,
    pub l: u32,
    pub r: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub template: String,
    pub paper_bgcolor: Option<String>,
    pub plot_bgcolor: Option<String>,
    pub font_color: Option<String>,
    pub margin: Option<Margin>,
}

impl Layout {
    /// Template only.
    pub fn plain() -> Self {
        Self {
            template: TEMPLATE.to_string(),
            paper_bgcolor: None,
            plot_bgcolor: None,
            font_color: None,
            margin: None,
        }
    }

    /// Template plus dashboard background, white text and 40px margins.
    pub fn dark() -> Self {
        Self {
            paper_bgcolor: Some(BACKGROUND.to_string()),
            plot_bgcolor: Some(BACKGROUND.to_string()),
            font_color: Some(FONT_COLOR.to_string()),
            margin: Some(Margin {
                t: 40,
                b: 40,
                l: 40,
                r: 40,
            }),
            ..Self::plain()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub show_grid: bool,
    pub zero_line: bool,
    pub show_tick_labels: bool,
}

impl Axis {
    /// No grid, no zero line.
    pub fn bare() -> Self {
        Self {
            show_grid: false,
            zero_line: false,
            show_tick_labels: true,
        }
    }
}

/// One resort on the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub size: f64,
    pub color: f64,
    pub hover_name: String,
}

/// Scatter map of resorts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapFigure {
    pub zoom: u8,
    /// Column driving marker size.
    pub size_field: String,
    /// Column driving marker colour.
    pub color_field: String,
    /// Column shown as the hover label.
    pub hover_field: String,
    pub points: Vec<MapPoint>,
    pub layout: Layout,
    pub x_axis: Axis,
    pub y_axis: Axis,
}

/// One resort in the bar chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub x: String,
    /// `None` when the resort has no value for the metric.
    pub y: Option<f64>,
    pub hover_name: String,
    /// Sent back by the host in hover events; holds the resort name.
    pub custom_data: Vec<String>,
}

/// Bar chart of the top resorts in a country.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarFigure {
    pub x_field: String,
    pub y_field: String,
    pub bars: Vec<Bar>,
    pub layout: Layout,
    pub x_axis: Axis,
    pub y_axis: Axis,
}

/// Report card strings for the hovered resort.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCardView {
    pub name: String,
    pub elevation_rank: String,
    pub slope_rank: String,
    pub price_rank: String,
    pub cannon_rank: String,
}

/// Outputs of the map handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub title: String,
    pub figure: MapFigure,
    pub country_options: Vec<String>,
}

/// Outputs of the country handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryPanel {
    pub title: String,
    pub figure: BarFigure,
    #[serde(flatten)]
    pub report: ReportCardView,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliderMark {
    pub value: f64,
    pub label: String,
}

/// Price limit slider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSlider {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
    pub marks: Vec<SliderMark>,
}

/// Slider from $0 to $150 in steps of 25, labelled every $50.
pub fn price_slider(value: f64) -> PriceSlider {
    let marks = (0..=150)
        .step_by(50)
        .map(|v| SliderMark {
            value: f64::from(v),
            label: format!("${v}"),
        })
        .collect();
    PriceSlider {
        min: 0.0,
        max: 150.0,
        step: 25.0,
        value,
        marks,
    }
}

/// One point per selected resort, sized and coloured by total slopes.
pub fn map_figure(selection: &MapSelection<'_>) -> MapFigure {
    let points = selection
        .resorts
        .iter()
        .map(|r| MapPoint {
            lat: r.latitude,
            lon: r.longitude,
            size: r.total_slopes,
            color: r.total_slopes,
            hover_name: r.country.clone(),
        })
        .collect();
    MapFigure {
        zoom: MAP_ZOOM,
        size_field: Metric::TotalSlopes.column().to_string(),
        color_field: Metric::TotalSlopes.column().to_string(),
        hover_field: "Country".to_string(),
        points,
        layout: Layout::dark(),
        x_axis: Axis::bare(),
        y_axis: Axis::bare(),
    }
}

/// One bar per top resort; tick labels on the x axis are hidden.
pub fn bar_figure(view: &CountryView<'_>) -> BarFigure {
    let bars = view
        .top
        .iter()
        .map(|r| Bar {
            x: r.resort.clone(),
            y: view.metric.value(r),
            hover_name: r.resort.clone(),
            custom_data: vec![r.resort.clone()],
        })
        .collect();
    BarFigure {
        x_field: "Resort".to_string(),
        y_field: view.metric.column().to_string(),
        bars,
        layout: Layout::plain(),
        x_axis: Axis {
            show_tick_labels: false,
            ..Axis::bare()
        },
        y_axis: Axis::bare(),
    }
}

/// Rank as shown on the report card: one decimal, blank when unknown.
pub fn format_rank(rank: Option<f64>) -> String {
    match rank {
        Some(v) if v.is_finite() => format!("{v:.1}"),
        _ => String::new(),
    }
}

pub fn report_card(view: &CountryView<'_>) -> ReportCardView {
    let ranks = view.ranks;
    ReportCardView {
        name: view.resort_name.clone(),
        elevation_rank: format_rank(ranks.map(|r| r.elevation)),
        slope_rank: format_rank(ranks.map(|r| r.slope)),
        price_rank: format_rank(ranks.map(|r| r.price)),
        cannon_rank: format_rank(ranks.map(|r| r.cannon)),
    }
}

/// Map handler: filter, figure and the country list for `continent`.
pub fn map_view(
    table: &ResortTable,
    filter: &MapFilter,
    policy: FeaturePolicy,
    continent: &str,
) -> MapView {
    let selection = atlas_query::filter_for_map_with(table, filter, policy);
    let figure = map_figure(&selection);
    trace!(points = figure.points.len(), "map figure");
    MapView {
        title: selection.title,
        figure,
        country_options: atlas_query::country_options(table, continent),
    }
}

/// Country handler: bar chart and report card.
pub fn country_panel(
    table: &ResortTable,
    continent: &str,
    country: &str,
    metric: Metric,
    hovered_resort: &str,
) -> CountryPanel {
    let view = atlas_query::resolve_country_view(table, continent, country, metric, hovered_resort);
    CountryPanel {
        figure: bar_figure(&view),
        report: report_card(&view),
        title: view.title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{Flag, ResortRecord};
    use std::path::PathBuf;

    fn table() -> ResortTable {
        let mut a = ResortRecord::new("A", "Norway", "Europe");
        a.price = 50.0;
        a.total_slopes = 20.0;
        a.latitude = 60.0;
        a.longitude = 9.0;
        let mut b = ResortRecord::new("B", "Norway", "Europe");
        b.price = 100.0;
        b.total_slopes = 35.0;
        b.summer_skiing = Flag::Yes;
        let c = ResortRecord::new("C", "Japan", "Asia");
        ResortTable::new(vec![a, b, c]).unwrap()
    }

    #[test]
    fn map_points_follow_total_slopes() {
        let t = table();
        let filter = MapFilter {
            max_price: 60.0,
            ..MapFilter::default()
        };
        let view = map_view(&t, &filter, FeaturePolicy::LastWins, "Europe");
        assert_eq!(view.title, "Resorts with prices less than $60");
        assert_eq!(view.country_options, vec!["Norway"]);
        assert_eq!(view.figure.points.len(), 2);
        let a = &view.figure.points[0];
        assert_eq!((a.lat, a.lon), (60.0, 9.0));
        assert_eq!(a.size, 20.0);
        assert_eq!(a.color, 20.0);
        assert_eq!(a.hover_name, "Norway");
        assert_eq!(view.figure.size_field, "Total slopes");
        assert_eq!(view.figure.zoom, 3);
        assert_eq!(view.figure.layout.paper_bgcolor.as_deref(), Some("#1f2937"));
        assert!(!view.figure.x_axis.show_grid);
    }

    #[test]
    fn bar_chart_and_report_card() {
        let t = table();
        let panel = country_panel(&t, "Europe", "Norway", Metric::Price, "A");
        assert_eq!(panel.title, "Top Resorts in Norway by Price");
        let xs: Vec<&str> = panel.figure.bars.iter().map(|b| b.x.as_str()).collect();
        assert_eq!(xs, vec!["B", "A"]);
        assert_eq!(panel.figure.bars[0].y, Some(100.0));
        assert_eq!(panel.figure.bars[0].custom_data, vec!["B"]);
        assert_eq!(panel.figure.y_field, "Price");
        assert!(!panel.figure.x_axis.show_tick_labels);
        assert_eq!(
            panel.report,
            ReportCardView {
                name: "A".to_string(),
                elevation_rank: "1.5".to_string(),
                slope_rank: "2.0".to_string(),
                price_rank: "2.0".to_string(),
                cannon_rank: "1.5".to_string(),
            }
        );
    }

    #[test]
    fn empty_views_degrade_gracefully() {
        let t = table();
        let panel = country_panel(&t, "Asia", "Norway", Metric::Price, "A");
        assert!(panel.figure.bars.is_empty());
        assert_eq!(panel.report.name, "A");
        assert_eq!(panel.report.price_rank, "");
        let view = map_view(&t, &MapFilter::default(), FeaturePolicy::LastWins, "Antarctica");
        assert!(view.country_options.is_empty());
        // only C is free
        assert_eq!(view.figure.points.len(), 1);
    }

    #[test]
    fn slider_marks() {
        let s = price_slider(50.0);
        let labels: Vec<&str> = s.marks.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["$0", "$50", "$100", "$150"]);
        assert_eq!(s.step, 25.0);
        assert_eq!(s.value, 50.0);
    }

    #[test]
    fn country_panel_json_is_flat() {
        let t = table();
        let panel = country_panel(&t, "Europe", "Norway", Metric::Price, "B");
        let json = serde_json::to_value(&panel).unwrap();
        assert_eq!(json["name"], "B");
        assert_eq!(json["price_rank"], "1.0");
        assert_eq!(json["figure"]["bars"][0]["x"], "B");
        let back: CountryPanel = serde_json::from_value(json).unwrap();
        assert_eq!(back, panel);
    }

    #[test]
    fn fixture_summer_map_ignores_price() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/data/resorts.csv");
        let t = data_pipeline::load(path).unwrap();
        let filter = MapFilter {
            max_price: 50.0,
            summer_only: true,
            ..MapFilter::default()
        };
        let view = map_view(&t, &filter, FeaturePolicy::LastWins, "Europe");
        assert_eq!(view.figure.points.len(), 8);
        assert_eq!(
            view.country_options,
            vec!["Norway", "Sweden", "Austria", "Switzerland", "France"]
        );
    }
}
