use super::{CORRELATION_HEATMAP_FILE, PlotStyle, plot_error, render_svg};
use crate::error::{ProcessingError, Result};
use crate::utils::numeric_column_names;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Pairwise Pearson correlations of the numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `values[i][j]` correlates `columns[i]` with `columns[j]`.
    /// `None` where fewer than two complete pairs exist or a side is constant.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Correlation over numeric columns using pairwise complete observations.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let columns = numeric_column_names(df);

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pairwise_pearson(df, &columns[i], &columns[j])?;
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix { columns, values })
}

/// Pearson correlation over the rows where both columns are present.
///
/// `None` with fewer than two such rows or when either side is constant.
fn pairwise_pearson(df: &DataFrame, a: &str, b: &str) -> Result<Option<f64>> {
    let out = df
        .clone()
        .lazy()
        .filter(col(a).is_not_null().and(col(b).is_not_null()))
        .select([pearson_corr(
            col(a).cast(DataType::Float64),
            col(b).cast(DataType::Float64),
        )
        .alias("r")])
        .collect()?;

    let r = out.column("r")?.f64()?.get(0);
    Ok(r.filter(|r| r.is_finite()).map(|r| r.clamp(-1.0, 1.0)))
}

/// Annotated heatmap of [`correlation_matrix`], coolwarm colours over [-1, 1].
///
/// Fails with [`ProcessingError::NoValidValues`] when the frame has no
/// numeric column.
pub fn plot_correlation_heatmap(
    df: &DataFrame,
    save_dir: Option<&Path>,
    style: &PlotStyle,
) -> Result<Option<PathBuf>> {
    let matrix = correlation_matrix(df)?;
    if matrix.columns.is_empty() {
        return Err(ProcessingError::NoValidValues(
            "no numeric columns to correlate".to_string(),
        ));
    }

    render_svg(
        save_dir,
        CORRELATION_HEATMAP_FILE,
        style.figure_size(12, 10),
        |root| draw_heatmap(root, &matrix, style),
    )
}

fn lerp(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
}

/// Diverging blue-grey-red colour for a correlation.
fn coolwarm(value: f64) -> RGBColor {
    const COOL: RGBColor = RGBColor(59, 76, 192);
    const NEUTRAL: RGBColor = RGBColor(221, 221, 221);
    const WARM: RGBColor = RGBColor(180, 4, 38);

    let t = (value.clamp(-1.0, 1.0) + 1.0) / 2.0;
    if t < 0.5 {
        lerp(COOL, NEUTRAL, t * 2.0)
    } else {
        lerp(NEUTRAL, WARM, (t - 0.5) * 2.0)
    }
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    matrix: &CorrelationMatrix,
    style: &PlotStyle,
) -> Result<()> {
    let n = matrix.columns.len();
    let size = n as f64;

    let mut chart = ChartBuilder::on(root)
        .caption("Feature correlation heatmap", style.title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(130)
        .build_cartesian_2d(0.0..size, 0.0..size)
        .map_err(plot_error)?;

    let (plot_width, plot_height) = chart.plotting_area().dim_in_pixel();
    let half_cell_x = (plot_width as f64 / size / 2.0) as i32;
    let half_cell_y = (plot_height as f64 / size / 2.0) as i32;

    // first column at the top: matrix row `r` occupies y in [n - 1 - r, n - r]
    let to_y = |row: usize| (n - 1 - row) as f64;
    let label_at = |v: f64| -> Option<usize> {
        let index = v.round();
        ((v - index).abs() < 1e-6 && index >= 0.0 && (index as usize) < n).then_some(index as usize)
    };
    let x_label = |v: &f64| {
        label_at(*v)
            .map(|i| matrix.columns[i].clone())
            .unwrap_or_default()
    };
    let y_label = |v: &f64| {
        label_at(*v)
            .map(|i| matrix.columns[n - 1 - i].clone())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n + 1)
        .y_labels(n + 1)
        .x_label_offset(half_cell_x)
        .y_label_offset(-half_cell_y)
        .label_style(style.tick_font())
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .draw()
        .map_err(plot_error)?;

    let cells = matrix.values.iter().enumerate().flat_map(|(row, values)| {
        let y = to_y(row);
        values.iter().enumerate().map(move |(col, value)| {
            let color = value.map(coolwarm).unwrap_or(RGBColor(240, 240, 240));
            Rectangle::new([(col as f64, y), (col as f64 + 1.0, y + 1.0)], color.filled())
        })
    });
    chart.draw_series(cells).map_err(plot_error)?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    let annotations = matrix.values.iter().enumerate().flat_map(|(row, values)| {
        let y = to_y(row);
        values.iter().enumerate().filter_map(move |(col, value)| {
            let value = (*value)?;
            let color: &'static RGBColor = if value.abs() > 0.6 { &WHITE } else { &BLACK };
            Some(Text::new(
                format!("{:.2}", value),
                (col as f64 + 0.5, y + 0.5),
                style.annotation_font().pos(centered).color(color),
            ))
        })
    });
    chart.draw_series(annotations).map_err(plot_error)?;

    Ok(())
}
