use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::color::DivergingScale;
use crate::data::model::{Column, Table};

use super::artifacts::{artifact_stems, plot_file_name, BOXPLOT_PREFIX, HEATMAP_FILE, HISTOGRAM_PREFIX};
use super::progress::{ProgressSink, ProgressWindow};
use super::stats::{quantile_sorted, CorrelationMatrix};

pub const HISTOGRAM_BINS: usize = 20;
pub const HISTOGRAM_WINDOW: ProgressWindow = ProgressWindow::new(40, 60);
pub const BOXPLOT_WINDOW: ProgressWindow = ProgressWindow::new(60, 80);

const PLOT_SIZE: (u32, u32) = (640, 480);
const HEATMAP_SIZE: (u32, u32) = (1000, 800);
const FONT: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// One 20-bin histogram per numeric column (`hist_<stem>.png`).
pub fn generate_histograms(
    table: &Table,
    out_dir: &Path,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<PathBuf>> {
    per_numeric_column(table, out_dir, progress, HISTOGRAM_PREFIX, HISTOGRAM_WINDOW, draw_histogram)
}

/// One horizontal boxplot per numeric column (`box_<stem>.png`).
pub fn generate_boxplots(
    table: &Table,
    out_dir: &Path,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<PathBuf>> {
    per_numeric_column(table, out_dir, progress, BOXPLOT_PREFIX, BOXPLOT_WINDOW, draw_boxplot)
}

/// Annotated correlation heatmap of the numeric columns.
pub fn generate_heatmap(table: &Table, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(HEATMAP_FILE);
    let matrix = CorrelationMatrix::compute(table);
    draw_heatmap(&path, &matrix).with_context(|| format!("rendering {}", path.display()))?;
    log::debug!("Wrote {}", path.display());
    Ok(path)
}

type ColumnPlot = fn(&Path, &str, &[f64]) -> Result<()>;

/// Render `draw` for every numeric column, reporting progress inside `window`
/// after each image.
fn per_numeric_column(
    table: &Table,
    out_dir: &Path,
    progress: &mut dyn ProgressSink,
    prefix: &str,
    window: ProgressWindow,
    draw: ColumnPlot,
) -> Result<Vec<PathBuf>> {
    let columns: Vec<&Column> = table.numeric_columns().collect();
    let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
    let stems = artifact_stems(&names);
    let total = columns.len();

    let mut written = Vec::with_capacity(total);
    for (i, (col, stem)) in columns.iter().zip(&stems).enumerate() {
        let path = out_dir.join(plot_file_name(prefix, stem));
        draw(&path, col.name(), &col.present_numbers())
            .with_context(|| format!("rendering {}", path.display()))?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
        progress.report(window.at(i + 1, total));
    }
    if total == 0 {
        progress.report(window.end);
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Draw into an in-memory RGB buffer and encode it as PNG at `path`.
fn render_png<F>(path: &Path, (width, height): (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
{
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    image::save_buffer_with_format(
        path,
        &buffer,
        width,
        height,
        image::ExtendedColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("encoding {}", path.display()))?;
    Ok(())
}

// -- Histogram --

/// One histogram bar: `[start, end)`, the last bar is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]` of the finite values.
///
/// A constant column spans `[v - 0.5, v + 0.5]`; no values spans `[0, 1]`.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<Bin> {
    let bins = bins.max(1);
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let bounds = finite.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });
    let (lo, hi) = match bounds {
        None => (0.0, 1.0),
        Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
        Some(range) => range,
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

fn draw_histogram(path: &Path, name: &str, values: &[f64]) -> Result<()> {
    let bins = histogram_bins(values, HISTOGRAM_BINS);
    let x_range = bins[0].start..bins[bins.len() - 1].end;
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.05;

    render_png(path, PLOT_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(format!("Histogram of {name}"), (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(x_range, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc(name)
            .y_desc("Frequency")
            .draw()?;

        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BAR_COLOR.filled())
        }))?;
        chart.draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
            Rectangle::new(
                [(b.start, 0.0), (b.end, b.count as f64)],
                BLACK.mix(0.6).stroke_width(1),
            )
        }))?;
        Ok(())
    })
}

// -- Boxplot --

/// Five-number summary with Tukey whiskers (furthest points within 1.5 IQR).
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// `None` when there is no finite value to summarise.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let lower_whisker = sorted.iter().copied().find(|v| *v >= low_fence).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|v| *v <= high_fence).unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(BoxStats {
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

fn draw_boxplot(path: &Path, name: &str, values: &[f64]) -> Result<()> {
    let stats = BoxStats::from_values(values);
    let (lo, hi) = match &stats {
        Some(s) => {
            let pad = match (s.max - s.min) * 0.05 {
                p if p > 0.0 => p,
                _ => 0.5,
            };
            (s.min - pad, s.max + pad)
        }
        None => (0.0, 1.0),
    };

    render_png(path, PLOT_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(format!("Boxplot of {name}"), (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(15)
            .build_cartesian_2d(lo..hi, -1f64..1f64)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .disable_y_axis()
            .x_desc(name)
            .draw()?;

        let Some(s) = stats else {
            return Ok(());
        };

        let body = [(s.q1, -0.4), (s.q3, 0.4)];
        chart.draw_series(std::iter::once(Rectangle::new(body, BAR_COLOR.mix(0.8).filled())))?;
        chart.draw_series(std::iter::once(Rectangle::new(body, BLACK.stroke_width(2))))?;

        let segments = [
            [(s.median, -0.4), (s.median, 0.4)],
            [(s.lower_whisker, 0.0), (s.q1, 0.0)],
            [(s.q3, 0.0), (s.upper_whisker, 0.0)],
            [(s.lower_whisker, -0.2), (s.lower_whisker, 0.2)],
            [(s.upper_whisker, -0.2), (s.upper_whisker, 0.2)],
        ];
        chart.draw_series(
            segments
                .into_iter()
                .map(|pts| PathElement::new(pts.to_vec(), BLACK.stroke_width(2))),
        )?;
        chart.draw_series(
            s.outliers
                .iter()
                .map(|&x| Circle::new((x, 0.0), 4, BLACK.stroke_width(1))),
        )?;
        Ok(())
    })
}

// -- Heatmap --

fn draw_heatmap(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    let scale = DivergingScale::correlation();

    render_png(path, HEATMAP_SIZE, |root| {
        let root = root.titled("Correlation Heatmap", (FONT, 28))?;
        let n = matrix.len();
        if n == 0 {
            let (w, h) = root.dim_in_pixel();
            let style = TextStyle::from((FONT, 22).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            root.draw_text(
                "No numeric columns to correlate",
                &style,
                (w as i32 / 2, h as i32 / 2),
            )?;
            return Ok(());
        }

        let (w, _) = root.dim_in_pixel();
        let (main, bar) = root.split_horizontally(w as i32 - 110);
        let n_cells = n as i32;

        // Row 0 is drawn at the top: matrix row `r` occupies y in `[n-1-r, n-r]`.
        let mut chart = ChartBuilder::on(&main)
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(140)
            .build_cartesian_2d(0i32..n_cells, 0i32..n_cells)?;

        let (pw, ph) = chart.plotting_area().dim_in_pixel();
        let cell_w = pw as i32 / n_cells;
        let cell_h = ph as i32 / n_cells;
        let names = &matrix.names;
        let name_at = |i: i32| {
            usize::try_from(i)
                .ok()
                .and_then(|i| names.get(i))
                .cloned()
                .unwrap_or_default()
        };
        let x_label = |v: &i32| name_at(*v);
        let y_label = |v: &i32| name_at(n_cells - 1 - *v);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(n + 1)
            .y_labels(n + 1)
            .x_label_offset(cell_w / 2)
            .y_label_offset(-cell_h / 2)
            .x_label_formatter(&x_label)
            .y_label_formatter(&y_label)
            .label_style((FONT, 14))
            .draw()?;

        let cells: Vec<(i32, i32, f64)> = (0..n)
            .flat_map(|row| (0..n).map(move |col| (row, col)))
            .map(|(row, col)| (row as i32, col as i32, matrix.get(row, col)))
            .collect();

        chart.draw_series(cells.iter().map(|&(row, col, v)| {
            let color = if v.is_finite() { scale.color_for(v) } else { WHITE };
            let top = n_cells - row;
            Rectangle::new([(col, top - 1), (col + 1, top)], color.filled())
        }))?;

        let font_size = (cell_w.min(cell_h) / 4).clamp(8, 20);
        chart.draw_series(cells.iter().filter(|c| c.2.is_finite()).map(|&(row, col, v)| {
            let color = if scale.needs_light_text(v) { &WHITE } else { &BLACK };
            let style = TextStyle::from((FONT, font_size).into_font())
                .color(color)
                .pos(Pos::new(HPos::Center, VPos::Center));
            // Anchored at the cell's top-left corner, shifted to its centre.
            EmptyElement::at((col, n_cells - row))
                + Text::new(format!("{v:.2}"), (cell_w / 2, cell_h / 2), style)
        }))?;

        // Colour bar
        let mut legend = ChartBuilder::on(&bar)
            .margin(10)
            .margin_left(30)
            .x_label_area_size(50)
            .y_label_area_size(40)
            .build_cartesian_2d(0f64..1f64, -1f64..1f64)?;
        legend
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .disable_x_axis()
            .y_labels(5)
            .label_style((FONT, 13))
            .draw()?;
        let steps = 100;
        legend.draw_series((0..steps).map(|i| {
            let y0 = -1.0 + 2.0 * i as f64 / steps as f64;
            let y1 = -1.0 + 2.0 * (i + 1) as f64 / steps as f64;
            Rectangle::new([(0.0, y0), (1.0, y1)], scale.color_for((y0 + y1) / 2.0).filled())
        }))?;
        Ok(())
    })
}
