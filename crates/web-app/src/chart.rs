use std::borrow::BorrowMut;

use chrono::NaiveDate;
use gloo_utils::window;
use minigym_domain as domain;
use plotters::{
    chart::ChartBuilder,
    prelude::{IntoDrawingArea, SVGBackend},
    series::{Histogram, LineSeries},
    style::{Color, IntoFont, Palette, Palette99, RGBColor, TextStyle, WHITE},
};
use wasm_bindgen::JsValue;

use crate::Theme;

pub const COLOR_WORKOUTS: usize = 1;
pub const COLOR_VOLUME: usize = 6;

pub const OPACITY_LINE: f64 = 0.9;
pub const OPACITY_HISTOGRAM: f64 = 0.6;

pub const WIDTH_LINE: u32 = 2;

pub const FONT: (&str, u32) = ("Roboto", 11);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotType {
    Line(usize, f64, u32),
    Histogram(usize, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub values: Vec<(NaiveDate, f32)>,
    pub plots: Vec<PlotType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Bounds {
    min: f32,
    max: f32,
}

impl Bounds {
    fn min_with_margin(self) -> f32 {
        if self.min <= f32::EPSILON {
            return self.min;
        }
        self.min - self.margin()
    }

    fn max_with_margin(self) -> f32 {
        self.max + self.margin()
    }

    fn margin(self) -> f32 {
        if (self.max - self.min).abs() > f32::EPSILON {
            return (self.max - self.min) * 0.1;
        }
        0.1
    }
}

/// Number of workouts per day as histogram.
#[allow(clippy::missing_errors_doc)]
pub fn plot_workout_frequency(
    frequency: &[(NaiveDate, u32)],
    theme: &Theme,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    #[allow(clippy::cast_precision_loss)]
    let values = frequency
        .iter()
        .map(|(date, count)| (*date, *count as f32))
        .collect::<Vec<_>>();
    plot(
        &[PlotData {
            values,
            plots: vec![PlotType::Histogram(COLOR_WORKOUTS, OPACITY_HISTOGRAM)],
        }],
        theme,
    )
}

/// Volume of the recent sessions as line chart.
#[allow(clippy::missing_errors_doc)]
pub fn plot_volume_progression(
    progression: &[(NaiveDate, f32)],
    theme: &Theme,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    plot(
        &[PlotData {
            values: progression.to_vec(),
            plots: vec![PlotType::Line(COLOR_VOLUME, OPACITY_LINE, WIDTH_LINE)],
        }],
        theme,
    )
}

/// Plot data onto an SVG chart.
///
/// The x domain covers all dates in `data`. Series without any non-zero value
/// produce no chart.
#[allow(clippy::missing_errors_doc)]
pub fn plot(
    data: &[PlotData],
    theme: &Theme,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if all_zeros(data) {
        return Ok(None);
    }

    let (Some(interval), Some(bounds)) = (determine_interval(data), determine_y_bounds(data))
    else {
        return Ok(None);
    };

    let mut result = String::new();

    {
        let root = SVGBackend::with_string(&mut result, (chart_width(), 200)).into_drawing_area();
        let (color, background_color) = colors(theme);

        root.fill(&background_color)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10f32)
            .x_label_area_size(30f32)
            .y_label_area_size(40f32)
            .build_cartesian_2d(
                interval.first..interval.last,
                bounds.min_with_margin()..bounds.max_with_margin(),
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .set_all_tick_mark_size(3u32)
            .axis_style(color.mix(0.3))
            .bold_line_style(color.mix(0.05))
            .light_line_style(color.mix(0.0))
            .label_style(TextStyle::from(FONT.into_font()).color(&color))
            .x_labels(2)
            .y_labels(6)
            .draw()?;

        for plot_data in data {
            let mut values = plot_data.values.clone();
            values.sort_by_key(|e| e.0);

            for plot in &plot_data.plots {
                match *plot {
                    PlotType::Line(color, opacity, size) => {
                        chart.draw_series(LineSeries::new(
                            values.iter().copied(),
                            Palette99::pick(color).mix(opacity).stroke_width(size),
                        ))?;
                    }
                    PlotType::Histogram(color, opacity) => {
                        let series = Histogram::vertical(&chart)
                            .style(Palette99::pick(color).mix(opacity).filled())
                            .margin(0) // https://github.com/plotters-rs/plotters/issues/300
                            .data(values.iter().copied());
                        chart.draw_series(series)?;
                    }
                }
            }
        }

        root.present()?;
    }

    Ok(Some(result))
}

fn all_zeros(data: &[PlotData]) -> bool {
    data.iter()
        .all(|d| d.values.iter().all(|(_, v)| *v == 0.0))
}

fn colors(theme: &Theme) -> (RGBColor, RGBColor) {
    let dark = RGBColor(20, 22, 26);
    match theme {
        Theme::System | Theme::Light => (dark, WHITE),
        Theme::Dark => (WHITE, dark),
    }
}

fn determine_interval(data: &[PlotData]) -> Option<domain::Interval> {
    let dates = data.iter().flat_map(|d| d.values.iter().map(|(date, _)| *date));
    let first = dates.clone().min()?;
    let last = dates.max()?;
    Some(domain::Interval::from(
        first..=last.succ_opt().unwrap_or(last),
    ))
}

fn determine_y_bounds(data: &[PlotData]) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;

    for plot in data.iter().filter(|plot| !plot.values.is_empty()) {
        let min = plot.values.iter().map(|(_, v)| *v).fold(f32::MAX, f32::min);
        let max = plot.values.iter().map(|(_, v)| *v).fold(0., f32::max);

        let b = bounds.borrow_mut().get_or_insert(Bounds { min, max });
        b.min = f32::min(b.min, min).max(0.);
        b.max = f32::max(b.max, max);
    }

    bounds
}

fn chart_width() -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    u32::min(
        u32::max(
            (window()
                .inner_width()
                .unwrap_or(JsValue::UNDEFINED)
                .as_f64()
                .unwrap_or(420.) as u32)
                .saturating_sub(20),
            300,
        ),
        960,
    )
}
