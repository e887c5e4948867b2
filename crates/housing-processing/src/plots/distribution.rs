use super::{PRICE_DISTRIBUTION_FILE, PlotStyle, padded_range, plot_error, render_svg};
use crate::error::{ProcessingError, Result};
use crate::utils::{has_column, present_numeric_values};
use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

const PRICE_BINS: usize = 50;
const KDE_POINTS: usize = 200;

/// One histogram bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram over the value range.
///
/// The last bin is closed on the right so the maximum is counted. A constant
/// input yields a single bin.
pub fn build_histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: min + (idx as f64 + 1.0) * width,
            count,
        })
        .collect()
}

/// Gaussian kernel density estimate with Scott's bandwidth, sampled at
/// `points` evenly spaced positions over the value range.
///
/// Returns `(x, density)` pairs; empty for fewer than two distinct values.
pub fn gaussian_kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    if values.len() < 2 || points < 2 {
        return Vec::new();
    }
    // sample standard deviation, as in Scott's rule
    let sample_std = Float64Chunked::from_slice("values".into(), values).std(1);
    let Some(sample_std) = sample_std.filter(|s| *s > 0.0) else {
        return Vec::new();
    };

    let n = values.len() as f64;
    let bandwidth = sample_std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / (points - 1) as f64;

    (0..points)
        .map(|i| {
            let x = min + i as f64 * step;
            let density: f64 = values
                .iter()
                .map(|v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum();
            (x, density * norm)
        })
        .collect()
}

/// Histogram of `Price` with a density curve, 50 bins.
///
/// # Errors
///
/// [`ProcessingError::ColumnNotFound`] without a `Price` column and
/// [`ProcessingError::NoValidValues`] if every price is missing.
pub fn plot_price_distribution(
    df: &DataFrame,
    save_dir: Option<&Path>,
    style: &PlotStyle,
) -> Result<Option<PathBuf>> {
    if !has_column(df, "Price") {
        return Err(ProcessingError::ColumnNotFound("Price".to_string()));
    }
    let prices = present_numeric_values(df.column("Price")?.as_materialized_series())?;
    if prices.is_empty() {
        return Err(ProcessingError::NoValidValues("Price".to_string()));
    }

    let bins = build_histogram(&prices, PRICE_BINS);
    render_svg(
        save_dir,
        PRICE_DISTRIBUTION_FILE,
        style.figure_size(10, 6),
        |root| draw_distribution(root, &prices, &bins, style),
    )
}

fn draw_distribution<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    prices: &[f64],
    bins: &[HistogramBin],
    style: &PlotStyle,
) -> Result<()> {
    let x_min = bins.first().map(|b| b.start).unwrap_or(0.0);
    let x_max = bins.last().map(|b| b.end).unwrap_or(1.0);
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(1);

    // density scaled so its area matches the bars
    let bin_width = bins.first().map(|b| b.end - b.start).unwrap_or(0.0);
    let kde: Vec<(f64, f64)> = gaussian_kde(prices, KDE_POINTS)
        .into_iter()
        .map(|(x, d)| (x, d * prices.len() as f64 * bin_width))
        .collect();
    let kde_max = kde.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let y_max = (max_count as f64).max(kde_max) * 1.05;

    let mut chart = ChartBuilder::on(root)
        .caption("Price distribution", style.title_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(padded_range(x_min, x_max, 0.02), 0.0..y_max.max(1.0))
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Price")
        .y_desc("Count")
        .axis_desc_style(style.label_font())
        .label_style(style.tick_font())
        .x_label_formatter(&|v| format!("{:.0}", v))
        .draw()
        .map_err(plot_error)?;

    let bar_color = RGBColor(76, 114, 176);
    chart
        .draw_series(bins.iter().map(|bin| {
            let end = if bin.end > bin.start { bin.end } else { bin.start + 1.0 };
            Rectangle::new(
                [(bin.start, 0.0), (end, bin.count as f64)],
                bar_color.mix(0.6).filled(),
            )
        }))
        .map_err(plot_error)?;

    if !kde.is_empty() {
        chart
            .draw_series(LineSeries::new(kde, bar_color.stroke_width(2)))
            .map_err(plot_error)?;
    }

    Ok(())
}
