use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::ports::ChartRendererPort;
use crate::constants::{DEPARTMENT_CHART_FILE, EMPLOYEE_CHART_FILE, HISTOGRAM_CHART_FILE};
use crate::domain::ScoredEmployeeRecord;
use crate::pipeline::processing::{DepartmentKpi, KpiHistogram};

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const BEST_GREEN: RGBColor = RGBColor(0, 128, 0);
const WORST_RED: RGBColor = RGBColor(255, 0, 0);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);

/// Renders report charts as SVG files into one output directory
pub struct SvgChartAdapter {
    output_dir: PathBuf,
}

impl SvgChartAdapter {
    /// `output_dir` is created on the first render, not here
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    fn chart_path(&self, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create chart directory {}", self.output_dir.display())
        })?;
        Ok(self.output_dir.join(file_name))
    }

    fn finish(&self, path: PathBuf) -> Result<PathBuf> {
        let bytes = fs::metadata(&path)?.len();
        crate::observability::metrics::export::file_written("chart", bytes);
        Ok(path)
    }
}

/// Index of the first maximum and first minimum of `values`
fn extrema_indices(values: impl Iterator<Item = f64>) -> Option<(usize, usize)> {
    let mut result: Option<(usize, f64, usize, f64)> = None;
    for (i, v) in values.enumerate() {
        result = Some(match result {
            None => (i, v, i, v),
            Some((hi_i, hi, lo_i, lo)) => {
                let (hi_i, hi) = if v > hi { (i, v) } else { (hi_i, hi) };
                let (lo_i, lo) = if v < lo { (i, v) } else { (lo_i, lo) };
                (hi_i, hi, lo_i, lo)
            }
        });
    }
    result.map(|(hi_i, _, lo_i, _)| (hi_i, lo_i))
}

impl ChartRendererPort for SvgChartAdapter {
    fn render_employee_chart(&self, sorted: &[ScoredEmployeeRecord]) -> Result<PathBuf> {
        let path = self.chart_path(EMPLOYEE_CHART_FILE)?;
        let (best, worst) = extrema_indices(sorted.iter().map(|r| r.kpi_normalized)).unwrap_or((0, 0));
        let n = sorted.len() as i32;

        {
            let root = SVGBackend::new(&path, (1500, 600)).into_drawing_area();
            root.fill(&WHITE)?;
            let mut chart = ChartBuilder::on(&root)
                .caption("Normalized Performance KPI per Employee", ("sans-serif", 28))
                .margin(10)
                .x_label_area_size(90)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), 0f64..1.05f64)?;

            let label = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(i) => sorted
                    .get(*i as usize)
                    .map(|r| r.name.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(sorted.len())
                .x_label_formatter(&label)
                .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
                .x_desc("Employee Name")
                .y_desc("KPI Normalized")
                .draw()?;

            chart.draw_series(sorted.iter().enumerate().map(|(i, record)| {
                let color = if i == best {
                    BEST_GREEN
                } else if i == worst {
                    WORST_RED
                } else {
                    SKY_BLUE
                };
                let x = i as i32;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(x), 0.0), (SegmentValue::Exact(x + 1), record.kpi_normalized)],
                    color.filled(),
                );
                bar.set_margin(0, 0, 2, 2);
                bar
            }))?;

            root.present()?;
        }
        self.finish(path)
    }

    fn render_department_chart(&self, departments: &[DepartmentKpi]) -> Result<PathBuf> {
        let path = self.chart_path(DEPARTMENT_CHART_FILE)?;
        let n = departments.len() as i32;

        {
            let root = SVGBackend::new(&path, (800, 500)).into_drawing_area();
            root.fill(&WHITE)?;
            let mut chart = ChartBuilder::on(&root)
                .caption("Average Normalized KPI per Department", ("sans-serif", 24))
                .margin(10)
                .x_label_area_size(50)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), 0f64..1.05f64)?;

            let label = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(i) => departments
                    .get(*i as usize)
                    .map(|d| d.department.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(departments.len())
                .x_label_formatter(&label)
                .x_desc("Department")
                .y_desc("Average KPI Normalized")
                .draw()?;

            chart.draw_series(departments.iter().enumerate().map(|(i, d)| {
                let x = i as i32;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(x), 0.0), (SegmentValue::Exact(x + 1), d.mean_kpi_normalized)],
                    LIGHT_CORAL.filled(),
                );
                bar.set_margin(0, 0, 10, 10);
                bar
            }))?;

            root.present()?;
        }
        self.finish(path)
    }

    fn render_histogram(&self, histogram: &KpiHistogram) -> Result<PathBuf> {
        let path = self.chart_path(HISTOGRAM_CHART_FILE)?;
        let lower = histogram.buckets.first().map(|b| b.lower).unwrap_or(0.0);
        let upper = histogram.buckets.last().map(|b| b.upper).unwrap_or(1.0);
        let y_max = histogram.max_count() as f64 + 1.0;

        {
            let root = SVGBackend::new(&path, (800, 500)).into_drawing_area();
            root.fill(&WHITE)?;
            let mut chart = ChartBuilder::on(&root)
                .caption("Distribution of Normalized KPI", ("sans-serif", 24))
                .margin(10)
                .x_label_area_size(50)
                .y_label_area_size(60)
                .build_cartesian_2d(lower..upper, 0f64..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc("KPI Normalized")
                .y_desc("Number of Employees")
                .draw()?;

            chart.draw_series(histogram.buckets.iter().map(|b| {
                Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], SKY_BLUE.filled())
            }))?;
            chart.draw_series(histogram.buckets.iter().map(|b| {
                Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))
            }))?;

            root.present()?;
        }
        self.finish(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CleanEmployeeRecord;
    use crate::pipeline::processing::HistogramBucket;
    use tempfile::tempdir;

    #[test]
    fn test_extrema_prefer_first_occurrence() {
        assert_eq!(extrema_indices([1.0, 0.2, 1.0, 0.2].into_iter()), Some((0, 1)));
        assert_eq!(extrema_indices(std::iter::empty()), None);
    }

    #[test]
    fn test_output_directory_created_on_first_render() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("images").join("run");
        let adapter = SvgChartAdapter::new(&target);
        assert!(!target.exists());

        let sorted = vec![CleanEmployeeRecord::new(1, "HR", 10.0, 10.0, 5.0).into_scored(5.0, 0.0)];
        let path = adapter.render_employee_chart(&sorted).unwrap();
        assert!(target.is_dir());
        assert_eq!(path.parent().unwrap(), target.as_path());
    }

    #[test]
    fn test_renders_all_three_charts() {
        let dir = tempdir().unwrap();
        let adapter = SvgChartAdapter::new(dir.path());

        let sorted = vec![
            CleanEmployeeRecord::new(2, "IT", 20.0, 10.0, 5.0).into_scored(10.0, 1.0),
            CleanEmployeeRecord::new(1, "HR", 10.0, 10.0, 5.0).into_scored(5.0, 0.0),
        ];
        let employee = adapter.render_employee_chart(&sorted).unwrap();
        let svg = fs::read_to_string(&employee).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Normalized Performance KPI per Employee"));

        let departments = vec![
            DepartmentKpi {
                department: "IT".to_string(),
                employee_count: 1,
                mean_kpi_normalized: 1.0,
            },
            DepartmentKpi {
                department: "HR".to_string(),
                employee_count: 1,
                mean_kpi_normalized: 0.0,
            },
        ];
        let department = adapter.render_department_chart(&departments).unwrap();
        assert!(fs::read_to_string(department)
            .unwrap()
            .contains("Average Normalized KPI per Department"));

        let histogram = KpiHistogram {
            buckets: vec![
                HistogramBucket { lower: 0.0, upper: 0.5, count: 1 },
                HistogramBucket { lower: 0.5, upper: 1.0, count: 1 },
            ],
        };
        let path = adapter.render_histogram(&histogram).unwrap();
        assert_eq!(path.file_name().unwrap(), HISTOGRAM_CHART_FILE);
        assert!(path.exists());
    }
}
