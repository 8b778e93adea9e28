//! Chart-ready structures
//!
//! These serialize to the `{labels, datasets}` shape consumed by the chart
//! component, plus an options object for legend, title and axis titles.
//! Non-finite values serialize as `null`, which the chart draws as a gap.

use super::colors::HslColor;
use super::plan::SeriesKind;
use crate::chat::ChartConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Line,
    Bar,
}

impl From<SeriesKind> for ChartKind {
    fn from(kind: SeriesKind) -> Self {
        match kind {
            SeriesKind::Line => ChartKind::Line,
            SeriesKind::Bar => ChartKind::Bar,
        }
    }
}

/// Background color: one per dataset (line/bar) or one per label (pie)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorValue {
    Single(HslColor),
    PerLabel(Vec<HslColor>),
}

/// One named numeric sequence plus its styling
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<HslColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

/// Category labels plus datasets, shared by pie, line and bar charts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    /// A chart without datasets has nothing to draw
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub plugins: Plugins,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
    pub title: TitleText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<TitleText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
    pub position: String,
    pub labels: LegendLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendLabels {
    pub use_point_style: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleText {
    pub display: bool,
    pub text: String,
}

impl TitleText {
    fn shown(text: &str) -> Self {
        TitleText {
            display: true,
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: TitleText,
}

impl Axis {
    fn titled(label: Option<&str>) -> Self {
        Axis {
            title: TitleText {
                display: label.is_some(),
                text: label.unwrap_or_default().to_string(),
            },
        }
    }
}

pub const DEFAULT_LEGEND_POSITION: &str = "bottom";

impl ChartOptions {
    /// Options for a chart of `kind` titled `title`
    ///
    /// The legend sits at the bottom with point-style markers unless the
    /// answer's chart config says otherwise. Axis titles only apply to
    /// line/bar charts and only when the backend supplied one.
    pub fn for_chart(kind: ChartKind, title: &str, config: Option<&ChartConfig>) -> Self {
        let position = config
            .and_then(|c| c.legend_position.as_deref())
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_LEGEND_POSITION);
        let display_legend = config.and_then(|c| c.show_legend).unwrap_or(true);

        let subtitle = config
            .and_then(|c| c.subtitle.as_deref())
            .filter(|s| !s.is_empty())
            .map(TitleText::shown);

        let x_label = config.and_then(|c| c.x_axis_label.as_deref());
        let y_label = config.and_then(|c| c.y_axis_label.as_deref());
        let scales = match kind {
            ChartKind::Pie => None,
            ChartKind::Line | ChartKind::Bar if x_label.is_none() && y_label.is_none() => None,
            ChartKind::Line | ChartKind::Bar => Some(Scales {
                x: Axis::titled(x_label),
                y: Axis::titled(y_label),
            }),
        };

        ChartOptions {
            plugins: Plugins {
                legend: Legend {
                    display: display_legend,
                    position: position.to_string(),
                    labels: LegendLabels {
                        use_point_style: true,
                    },
                },
                title: TitleText::shown(title),
                subtitle,
            },
            scales,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_serializes_chart_shape() {
        let data = ChartData {
            labels: vec!["Zagreb".into(), "Split".into()],
            datasets: vec![ChartDataset {
                label: "premium".into(),
                data: vec![120.0, f64::NAN],
                background_color: Some(ColorValue::Single(HslColor::from_hue(10))),
                border_color: Some(HslColor::from_hue(20)),
                fill: Some(false),
                tension: Some(0.3),
            }],
        };

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            json!({
                "labels": ["Zagreb", "Split"],
                "datasets": [{
                    "label": "premium",
                    "data": [120.0, null],
                    "backgroundColor": "hsl(10, 70%, 60%)",
                    "borderColor": "hsl(20, 70%, 60%)",
                    "fill": false,
                    "tension": 0.3
                }]
            })
        );
    }

    #[test]
    fn test_optional_styling_is_omitted() {
        let dataset = ChartDataset {
            label: "Data".into(),
            data: vec![1.0],
            background_color: Some(ColorValue::PerLabel(vec![HslColor::from_hue(1)])),
            border_color: None,
            fill: None,
            tension: None,
        };
        let value = serde_json::to_value(&dataset).unwrap();
        assert_eq!(
            value,
            json!({"label": "Data", "data": [1.0], "backgroundColor": ["hsl(1, 70%, 60%)"]})
        );
    }

    #[test]
    fn test_default_options() {
        let options = ChartOptions::for_chart(ChartKind::Pie, "Premiums", None);
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "plugins": {
                    "legend": {"display": true, "position": "bottom", "labels": {"usePointStyle": true}},
                    "title": {"display": true, "text": "Premiums"}
                }
            })
        );
    }

    #[test]
    fn test_options_follow_chart_config() {
        let config = ChartConfig {
            subtitle: Some("2020".into()),
            legend_position: Some("right".into()),
            y_axis_label: Some("Premium".into()),
            ..Default::default()
        };
        let options = ChartOptions::for_chart(ChartKind::Bar, "T", Some(&config));
        assert_eq!(options.plugins.legend.position, "right");
        assert_eq!(options.plugins.subtitle.as_ref().unwrap().text, "2020");

        let scales = options.scales.unwrap();
        assert!(!scales.x.title.display);
        assert!(scales.y.title.display);
        assert_eq!(scales.y.title.text, "Premium");

        // Pie charts have no axes
        let pie = ChartOptions::for_chart(ChartKind::Pie, "T", Some(&config));
        assert!(pie.scales.is_none());
    }
}
