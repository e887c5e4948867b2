use super::{PREDICTION_VS_TRUE_FILE, PlotStyle, padded_range, plot_error, render_svg};
use crate::error::{ProcessingError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Scatter of predicted against true prices with the identity line.
///
/// # Errors
///
/// [`ProcessingError::InvalidInput`] if the slices differ in length and
/// [`ProcessingError::NoValidValues`] if they are empty.
pub fn plot_true_vs_pred(
    y_true: &[f64],
    y_pred: &[f64],
    save_dir: Option<&Path>,
    style: &PlotStyle,
) -> Result<Option<PathBuf>> {
    if y_true.len() != y_pred.len() {
        return Err(ProcessingError::InvalidInput(format!(
            "{} true values but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(ProcessingError::NoValidValues("y_true".to_string()));
    }

    render_svg(
        save_dir,
        PREDICTION_VS_TRUE_FILE,
        style.figure_size(8, 8),
        |root| draw_scatter(root, y_true, y_pred, style),
    )
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    y_true: &[f64],
    y_pred: &[f64],
    style: &PlotStyle,
) -> Result<()> {
    let true_min = y_true.iter().copied().fold(f64::INFINITY, f64::min);
    let true_max = y_true.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pred_min = y_pred.iter().copied().fold(f64::INFINITY, f64::min);
    let pred_max = y_pred.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption("Predicted vs true price", style.title_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(
            padded_range(true_min, true_max, 0.05),
            padded_range(pred_min.min(true_min), pred_max.max(true_max), 0.05),
        )
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("True price")
        .y_desc("Predicted price")
        .axis_desc_style(style.label_font())
        .label_style(style.tick_font())
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(
            y_true
                .iter()
                .zip(y_pred)
                .map(|(t, p)| Circle::new((*t, *p), 3, BLUE.mix(0.3).filled())),
        )
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            [(true_min, true_min), (true_max, true_max)],
            RED.stroke_width(2),
        ))
        .map_err(plot_error)?;

    Ok(())
}
