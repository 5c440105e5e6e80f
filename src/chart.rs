//! Histogram rendering for the per-day view.
//!
//! Turns the densified daily count series into a PNG bar chart. A failure
//! here is a render error scoped to this view; the list and search views
//! keep working.

use chrono::NaiveDate;
use plotters::prelude::*;

use crate::error::{AppError, Result};

/// Styling options for the histogram image.
#[derive(Clone, Debug)]
pub struct ChartOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Complaints per day".to_string(),
            width: 800,
            height: 400,
        }
    }
}

/// Render the daily count series as a PNG bar chart.
///
/// The series must already be densified (one entry per calendar day); bars
/// sit on an index axis labeled with the dates.
///
/// # Arguments
/// * `series` - Densified (date, count) pairs from the query layer
/// * `options` - Chart title and pixel dimensions
///
/// # Returns
/// * A Result containing the PNG image data as bytes or a render error
///
/// # Examples
/// ```no_run
/// use chrono::NaiveDate;
/// use minwon::chart::{ChartOptions, histogram_png};
///
/// let series = vec![(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3)];
/// let png = histogram_png(&series, &ChartOptions::default()).unwrap();
/// assert!(!png.is_empty());
/// ```
pub fn histogram_png(series: &[(NaiveDate, usize)], options: &ChartOptions) -> Result<Vec<u8>> {
    if series.is_empty() {
        return Err(AppError::render("no dated records to chart"));
    }

    let render = |e: &dyn std::fmt::Display| AppError::render(format!("chart drawing failed: {e}"));

    // plotters' bitmap backend wants a file path; draw into a temp file
    // and read the bytes back.
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("histogram.png");
    {
        let root = BitMapBackend::new(&path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| render(&e))?;

        let max_y = series.iter().map(|&(_, n)| n).max().unwrap_or(0) as i32;
        let labels: Vec<String> = series
            .iter()
            .map(|(d, _)| d.format("%m-%d").to_string())
            .collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0..series.len() as i32, 0..max_y + 1)
            .map_err(|e| render(&e))?;

        chart
            .configure_mesh()
            .x_labels(series.len().min(12))
            .x_label_formatter(&|x| {
                labels
                    .get(*x as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .y_desc("Complaints")
            .draw()
            .map_err(|e| render(&e))?;

        chart
            .draw_series(series.iter().enumerate().map(|(i, &(_, count))| {
                Rectangle::new([(i as i32, 0), (i as i32 + 1, count as i32)], BLUE.filled())
            }))
            .map_err(|e| render(&e))?;

        root.present().map_err(|e| render(&e))?;
    }

    Ok(std::fs::read(&path)?)
}
