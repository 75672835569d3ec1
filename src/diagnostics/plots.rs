//! SVG charts: ROC curve and feature importances

use super::roc::RocCurve;
use crate::error::{Result, SigboostError};
use crate::layout::ensure_parent;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
const NAVY: RGBColor = RGBColor(0, 0, 128);
const ORANGE: RGBColor = RGBColor(255, 165, 0);

fn plot_err<E: std::fmt::Debug>(err: E) -> SigboostError {
    SigboostError::PlotError(format!("{:?}", err))
}

/// ROC curve with the chance diagonal; `meta` is shown under the title
pub fn plot_roc(curve: &RocCurve, roc_auc: f64, meta: &str, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let root = SVGBackend::new(path, (800, 720)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let area = root
        .titled("Receiver Operating Characteristic", ("sans-serif", 26))
        .map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&area)
        .caption(meta, ("sans-serif", 15))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(-0.05f64..1.05f64, -0.05f64..1.05f64)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            curve
                .fpr
                .iter()
                .copied()
                .zip(curve.tpr.iter().copied())
                .filter(|(x, y)| x.is_finite() && y.is_finite()),
            DARK_ORANGE.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label(format!("ROC (area = {:.2})", roc_auc))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DARK_ORANGE.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], NAVY.stroke_width(1)))
        .map_err(plot_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// The `top_n` largest entries of `fscore`, in ascending order of importance
pub fn top_importances(fscore: &BTreeMap<String, usize>, top_n: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = fscore.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    let skip = entries.len().saturating_sub(top_n);
    entries.split_off(skip)
}

/// Horizontal bar chart of the `top_n` most used features
pub fn plot_importances(fscore: &BTreeMap<String, usize>, top_n: usize, path: &Path) -> Result<()> {
    let entries = top_importances(fscore, top_n);
    ensure_parent(path)?;

    let root = SVGBackend::new(path, (1000, 1000)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let max_count = entries.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1);
    let n = entries.len().max(1);
    let labels: Vec<String> = entries.iter().map(|(name, _)| name.clone()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption("Feature Importances", ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(220)
        .build_cartesian_2d(0f64..(max_count as f64 * 1.05), (0..n).into_segmented())
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Importance")
        .y_desc("Feature")
        .y_labels(n)
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(entries.iter().enumerate().map(|(i, (_, count))| {
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(i)), (*count as f64, SegmentValue::Exact(i + 1))],
                ORANGE.filled(),
            );
            bar.set_margin(3, 3, 0, 0);
            bar
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
