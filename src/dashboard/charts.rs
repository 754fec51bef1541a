//! Bar charts for the results area, rendered to inline SVG.
//!
//! Each chart is first described as a [`ChartSpec`] so its axis bounds and
//! colors can be checked without parsing SVG, then drawn with plotters.

use crate::{
    Error, Result,
    model::Attribution,
    scoring::{ScoringRequest, ScoringResult},
};
use plotters::prelude::*;
use std::ops::Range;

const WIDTH: u32 = 500;
const HEIGHT: u32 = 300;

/// Value axis of the probability chart, in percent.
pub const PROBABILITY_AXIS: Range<f64> = 0.0..100.0;

const SUCCESS: RGBColor = RGBColor(46, 160, 67);
const RISK: RGBColor = RGBColor(214, 39, 40);
const IMPACT: RGBColor = RGBColor(135, 206, 235);
const VIRIDIS: [RGBColor; 3] = [
    RGBColor(68, 1, 84),
    RGBColor(33, 145, 140),
    RGBColor(253, 231, 37),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarColor {
    /// Positive outcome.
    Success,
    /// Risk outcome.
    Risk,
    Impact,
    Palette(usize),
}

impl BarColor {
    fn rgb(self) -> RGBColor {
        match self {
            Self::Success => SUCCESS,
            Self::Risk => RISK,
            Self::Impact => IMPACT,
            Self::Palette(i) => VIRIDIS[i % VIRIDIS.len()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: BarColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub value_label: String,
    pub orientation: Orientation,
    pub value_axis: Range<f64>,
    pub bars: Vec<Bar>,
}

/// Fully-paid vs default split on a fixed [0, 100] axis.
pub fn probability_chart(result: &ScoringResult) -> ChartSpec {
    ChartSpec {
        title: "Prediction Probability Distribution".to_string(),
        value_label: "Probability (%)".to_string(),
        orientation: Orientation::Vertical,
        value_axis: PROBABILITY_AXIS,
        bars: vec![
            Bar {
                label: "Fully Paid".to_string(),
                value: result.probability_fully_paid,
                color: BarColor::Success,
            },
            Bar {
                label: "Default".to_string(),
                value: result.probability_default,
                color: BarColor::Risk,
            },
        ],
    }
}

/// Horizontal attribution bars on an axis symmetric around zero.
pub fn attribution_chart(attribution: &Attribution) -> ChartSpec {
    let extent = attribution
        .features
        .iter()
        .map(|f| f.value.abs())
        .fold(0.0_f64, f64::max);
    let extent = if extent > 0.0 { headroom(extent, 1.2) } else { 1.0 };

    ChartSpec {
        title: "Feature Impact Visualization".to_string(),
        value_label: "SHAP Value (Impact)".to_string(),
        orientation: Orientation::Horizontal,
        value_axis: -extent..extent,
        bars: attribution
            .features
            .iter()
            .map(|f| Bar {
                label: f.feature.clone(),
                value: f.value,
                color: BarColor::Impact,
            })
            .collect(),
    }
}

/// Raw magnitudes of the submitted inputs.
pub fn feature_values_chart(request: &ScoringRequest) -> ChartSpec {
    let max = request
        .values()
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max);

    ChartSpec {
        title: "Input Feature Values".to_string(),
        value_label: "Value".to_string(),
        orientation: Orientation::Vertical,
        value_axis: 0.0..headroom(max, 1.1).max(1.0),
        bars: request
            .values()
            .into_iter()
            .enumerate()
            .map(|(i, (field, value))| Bar {
                label: field.label.to_string(),
                value,
                color: BarColor::Palette(i),
            })
            .collect(),
    }
}

/// Scales `extent` up for padding, keeping the bound finite near `f64::MAX`.
fn headroom(extent: f64, factor: f64) -> f64 {
    let padded = extent * factor;
    if padded.is_finite() { padded } else { extent }
}

/// Draws the chart and returns the SVG document.
pub fn render_svg(spec: &ChartSpec) -> Result<String> {
    let axis = &spec.value_axis;
    if !(axis.start.is_finite() && axis.end.is_finite() && axis.start < axis.end) {
        return Err(Error::chart(format!(
            "'{}' has an unusable value axis {}..{}",
            spec.title, axis.start, axis.end
        )));
    }
    if let Some(bar) = spec.bars.iter().find(|b| !b.value.is_finite()) {
        return Err(Error::chart(format!(
            "'{}' has a non-finite value for {}",
            spec.title, bar.label
        )));
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(Error::chart)?;

        let labels: Vec<String> = spec.bars.iter().map(|b| b.label.clone()).collect();
        let colors: Vec<RGBColor> = spec.bars.iter().map(|b| b.color.rgb()).collect();
        let category = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        let style = |v: &SegmentValue<usize>, _: &f64| {
            let i = match v {
                SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i,
                SegmentValue::Last => 0,
            };
            colors.get(i).copied().unwrap_or(IMPACT).filled()
        };
        let data = spec.bars.iter().enumerate().map(|(i, b)| (i, b.value));
        let categories = (0..spec.bars.len()).into_segmented();

        match spec.orientation {
            Orientation::Vertical => {
                let mut chart = ChartBuilder::on(&root)
                    .caption(&spec.title, ("sans-serif", 16).into_font())
                    .margin(10)
                    .x_label_area_size(35)
                    .y_label_area_size(55)
                    .build_cartesian_2d(categories, spec.value_axis.clone())
                    .map_err(Error::chart)?;
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .x_label_formatter(&category)
                    .y_desc(spec.value_label.as_str())
                    .draw()
                    .map_err(Error::chart)?;
                chart
                    .draw_series(
                        Histogram::vertical(&chart)
                            .style_func(style)
                            .margin(20)
                            .data(data),
                    )
                    .map_err(Error::chart)?;
            }
            Orientation::Horizontal => {
                let mut chart = ChartBuilder::on(&root)
                    .caption(&spec.title, ("sans-serif", 16).into_font())
                    .margin(10)
                    .x_label_area_size(35)
                    .y_label_area_size(100)
                    .build_cartesian_2d(spec.value_axis.clone(), categories)
                    .map_err(Error::chart)?;
                chart
                    .configure_mesh()
                    .disable_y_mesh()
                    .y_label_formatter(&category)
                    .x_desc(spec.value_label.as_str())
                    .draw()
                    .map_err(Error::chart)?;
                chart
                    .draw_series(
                        Histogram::horizontal(&chart)
                            .style_func(style)
                            .margin(10)
                            .data(data),
                    )
                    .map_err(Error::chart)?;
            }
        }

        root.present().map_err(Error::chart)?;
    }
    Ok(svg)
}
