//! Chart vocabulary: supported chart types and data series.

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Supported chart types. Anything else is rejected before the backend runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartType {
    BarClustered,
    BarStacked,
    #[serde(rename = "BAR_STACKED_100")]
    #[strum(serialize = "BAR_STACKED_100")]
    BarStacked100,
    ColumnClustered,
    ColumnStacked,
    #[serde(rename = "COLUMN_STACKED_100")]
    #[strum(serialize = "COLUMN_STACKED_100")]
    ColumnStacked100,
    Line,
    LineMarkers,
    LineStacked,
    Pie,
    Doughnut,
    Area,
    AreaStacked,
    #[strum(serialize = "XY_SCATTER", serialize = "SCATTER")]
    XyScatter,
    Radar,
}

impl ChartType {
    pub const ALL: [ChartType; 15] = [
        ChartType::BarClustered,
        ChartType::BarStacked,
        ChartType::BarStacked100,
        ChartType::ColumnClustered,
        ChartType::ColumnStacked,
        ChartType::ColumnStacked100,
        ChartType::Line,
        ChartType::LineMarkers,
        ChartType::LineStacked,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Area,
        ChartType::AreaStacked,
        ChartType::XyScatter,
        ChartType::Radar,
    ];

    /// Parse from string (case-insensitive, surrounding whitespace ignored).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s.trim()).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::BarClustered => "BAR_CLUSTERED",
            ChartType::BarStacked => "BAR_STACKED",
            ChartType::BarStacked100 => "BAR_STACKED_100",
            ChartType::ColumnClustered => "COLUMN_CLUSTERED",
            ChartType::ColumnStacked => "COLUMN_STACKED",
            ChartType::ColumnStacked100 => "COLUMN_STACKED_100",
            ChartType::Line => "LINE",
            ChartType::LineMarkers => "LINE_MARKERS",
            ChartType::LineStacked => "LINE_STACKED",
            ChartType::Pie => "PIE",
            ChartType::Doughnut => "DOUGHNUT",
            ChartType::Area => "AREA",
            ChartType::AreaStacked => "AREA_STACKED",
            ChartType::XyScatter => "XY_SCATTER",
            ChartType::Radar => "RADAR",
        }
    }

    /// Pie and doughnut charts plot exactly one series.
    pub fn single_series(&self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Doughnut)
    }

    /// Comma-separated list of accepted names, for error messages.
    pub fn supported_names() -> String {
        Self::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
    }
}

/// One named series of values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// A series as callers send it: `["name", [1, 2, 3]]` or `{"name", "values"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SeriesInput {
    Pair(String, Vec<f64>),
    Named { name: String, values: Vec<f64> },
}

impl SeriesInput {
    pub fn into_series(self) -> Series {
        match self {
            SeriesInput::Pair(name, values) | SeriesInput::Named { name, values } => {
                Series { name, values }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!(ChartType::from_str("COLUMN_CLUSTERED"), Some(ChartType::ColumnClustered));
        assert_eq!(ChartType::from_str("bar_stacked_100"), Some(ChartType::BarStacked100));
        assert_eq!(ChartType::from_str("scatter"), Some(ChartType::XyScatter));
        assert_eq!(ChartType::from_str(" PIE "), Some(ChartType::Pie));
        assert_eq!(ChartType::from_str("NOT_A_TYPE"), None);
    }

    #[test]
    fn every_name_parses_back() {
        for t in ChartType::ALL {
            assert_eq!(ChartType::from_str(t.as_str()), Some(t));
        }
    }

    #[test]
    fn series_forms() {
        let v: Vec<SeriesInput> = serde_json::from_str(
            r#"[["Sales", [1, 2.5, 3]], {"name": "Costs", "values": [4, 5, 6]}]"#,
        )
        .unwrap();
        let series: Vec<Series> = v.into_iter().map(SeriesInput::into_series).collect();
        assert_eq!(series[0].name, "Sales");
        assert_eq!(series[0].values, vec![1.0, 2.5, 3.0]);
        assert_eq!(series[1].name, "Costs");
    }
}
