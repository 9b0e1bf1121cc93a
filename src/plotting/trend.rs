//! Progress plots: one metric across several reports
//!
//! Values are duration-normalized the same way changes are, so a line shows
//! the per-window rate rather than raw totals. A participant missing from a
//! report leaves a gap in their line.

use super::styles::{
    class_color, role_color, BACKGROUND, BORDER, CHART_BG, GRID, TEXT_PRIMARY, TEXT_SECONDARY,
};
use super::{font_px, fonts::FONT_FAMILY, px, Figure};
use crate::analysis::normalize::normalize_rate;
use crate::errors::{AppError, AppResult};
use crate::types::{AnalysisEntry, MetricKind, PlotEntry, ReportResults, ResultRow, Role};
use crate::utils::format::{format_axis_value, format_percentage};
use crate::utils::naming::progress_filename;
use crate::utils::time::{millis_to_display, millis_to_iso};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WIDTH: f64 = 12.0;
const HEIGHT: f64 = 7.0;
const PLOT_LEFT: f64 = 1.1;
const PLOT_RIGHT: f64 = 2.6;
const PLOT_TOP: f64 = 1.3;
const PLOT_BOTTOM: f64 = 0.9;
const Y_TICKS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendGrouping {
    #[default]
    Player,
    Role,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub label: String,
    pub color: RGBColor,
    /// One entry per report; None is a gap
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub title: String,
    pub subtitle: String,
    /// X axis labels, one per report
    pub labels: Vec<String>,
    pub series: Vec<TrendSeries>,
    pub percentage: bool,
    first_iso: String,
    last_iso: String,
}

impl TrendChart {
    pub fn filename(&self, extension: &str) -> String {
        progress_filename(&self.first_iso, &self.last_iso, &self.title, extension)
    }

    fn y_max(&self) -> f64 {
        if self.percentage {
            return 100.0;
        }
        let max = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().flatten())
            .fold(0.0, |acc: f64, v| acc.max(*v));
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }
}

/// Build a progress chart from reports ordered by any key
///
/// Only reports that hold the plot's analysis take part; at least two are
/// needed.
pub fn build_trend(
    plot: &PlotEntry,
    entry: &AnalysisEntry,
    reports: &[ReportResults],
    grouping: TrendGrouping,
    window_seconds: f64,
) -> AppResult<TrendChart> {
    let title = plot.title_for(entry);
    let result_key = entry.result_key();
    let column = plot.value_column_for(entry);

    let mut holding: Vec<&ReportResults> = reports
        .iter()
        .filter(|r| r.get(&result_key).is_some())
        .collect();
    holding.sort_by_key(|r| r.start_time_ms);
    if holding.len() < 2 {
        return Err(AppError::Render(format!(
            "progress plot '{}' needs at least two reports, found {}",
            title,
            holding.len()
        )));
    }

    let metric = entry.metric_for(&column).ok_or_else(|| {
        AppError::Configuration(format!("'{}' has no column '{}'", entry.name, column))
    })?;

    // Normalized, role-filtered rows per report
    let per_report: Vec<Vec<(&ResultRow, f64)>> = holding
        .iter()
        .filter_map(|report| report.get(&result_key))
        .map(|result| {
            result
                .rows
                .iter()
                .filter(|row| plot.allows_role(row.role))
                .map(|row| {
                    let value =
                        trend_value(metric, row.value(&column), result.duration_ms, window_seconds);
                    (row, value)
                })
                .collect()
        })
        .collect();

    let series = match grouping {
        TrendGrouping::Player => player_series(&per_report),
        TrendGrouping::Role => role_series(&per_report, metric),
    };
    if series.is_empty() {
        return Err(AppError::Render(format!("no rows to plot for '{}'", title)));
    }

    let first = holding[0].start_time_ms;
    let last = holding[holding.len() - 1].start_time_ms;
    Ok(TrendChart {
        subtitle: format!("{} - {}", millis_to_display(first), millis_to_display(last)),
        title,
        labels: holding
            .iter()
            .map(|r| millis_to_display(r.start_time_ms))
            .collect(),
        series,
        percentage: metric == MetricKind::Percentage,
        first_iso: millis_to_iso(first),
        last_iso: millis_to_iso(last),
    })
}

fn player_series(per_report: &[Vec<(&ResultRow, f64)>]) -> Vec<TrendSeries> {
    let mut by_name: BTreeMap<&str, (String, Vec<Option<f64>>)> = BTreeMap::new();
    for (index, rows) in per_report.iter().enumerate() {
        for (row, value) in rows {
            let (class, points) = by_name
                .entry(row.player_name.as_str())
                .or_insert_with(|| (row.class.clone(), vec![None; per_report.len()]));
            class.clone_from(&row.class);
            points[index] = Some(*value);
        }
    }
    by_name
        .into_iter()
        .map(|(name, (class, points))| TrendSeries {
            label: name.to_string(),
            color: class_color(&class),
            points,
        })
        .collect()
}

/// Y value of one player in one report
///
/// Percentages are plotted as-is; every other metric, deaths included, as a
/// rate per normalization window.
pub fn trend_value(metric: MetricKind, value: f64, duration_ms: i64, window_seconds: f64) -> f64 {
    match metric {
        MetricKind::Percentage => value.clamp(0.0, 100.0),
        _ => normalize_rate(value.max(0.0), duration_ms, window_seconds),
    }
}

fn role_series(per_report: &[Vec<(&ResultRow, f64)>], metric: MetricKind) -> Vec<TrendSeries> {
    Role::ALL
        .iter()
        .filter_map(|role| {
            let points: Vec<Option<f64>> = per_report
                .iter()
                .map(|rows| {
                    let values: Vec<f64> = rows
                        .iter()
                        .filter(|(row, _)| row.role == *role)
                        .map(|(_, v)| *v)
                        .collect();
                    if values.is_empty() {
                        return None;
                    }
                    let sum: f64 = values.iter().sum();
                    Some(if metric == MetricKind::Percentage {
                        sum / values.len() as f64
                    } else {
                        sum
                    })
                })
                .collect();
            points.iter().any(Option::is_some).then(|| TrendSeries {
                label: role.display_name().to_string(),
                color: role_color(*role),
                points,
            })
        })
        .collect()
}

/// Contiguous runs of present points as (x, y) pairs
fn segments(points: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (index, point) in points.iter().enumerate() {
        match point {
            Some(value) => current.push((index as f64, *value)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn style(points: f64, scale: f64, weight: FontStyle, color: &RGBColor, pos: Pos) -> TextStyle<'static> {
    (FONT_FAMILY, font_px(points, scale))
        .into_font()
        .style(weight)
        .color(color)
        .pos(pos)
}

impl Figure for TrendChart {
    fn size(&self, scale: f64) -> (u32, u32) {
        (px(WIDTH, scale) as u32, px(HEIGHT, scale) as u32)
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        scale: f64,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&BACKGROUND)?;
        let center = Pos::new(HPos::Center, VPos::Center);

        root.draw(&Text::new(
            self.title.clone(),
            (px(WIDTH / 2.0, scale), px(0.45, scale)),
            style(22.0, scale, FontStyle::Bold, &TEXT_PRIMARY, center),
        ))?;
        root.draw(&Text::new(
            self.subtitle.clone(),
            (px(WIDTH / 2.0, scale), px(0.9, scale)),
            style(16.0, scale, FontStyle::Normal, &TEXT_SECONDARY, center),
        ))?;

        let plot_area = root.margin(
            px(PLOT_TOP, scale),
            px(PLOT_BOTTOM, scale),
            px(PLOT_LEFT, scale),
            px(PLOT_RIGHT, scale),
        );
        plot_area.fill(&CHART_BG)?;

        let x_max = (self.labels.len().max(1) - 1) as f64;
        let y_max = self.y_max();
        let mut chart =
            ChartBuilder::on(&plot_area).build_cartesian_2d(-0.3..x_max + 0.3, 0.0..y_max)?;

        for tick in 0..=Y_TICKS {
            let y = y_max * tick as f64 / Y_TICKS as f64;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(-0.3, y), (x_max + 0.3, y)],
                GRID.stroke_width(1),
            )))?;
            let (left, pixel_y) = chart.backend_coord(&(-0.3, y));
            let label = if self.percentage {
                format_percentage(y)
            } else {
                format_axis_value(y)
            };
            root.draw(&Text::new(
                label,
                (left - px(0.1, scale), pixel_y),
                style(10.0, scale, FontStyle::Normal, &TEXT_SECONDARY, Pos::new(HPos::Right, VPos::Center)),
            ))?;
        }

        for (index, label) in self.labels.iter().enumerate() {
            let (pixel_x, bottom) = chart.backend_coord(&(index as f64, 0.0));
            root.draw(&Text::new(
                label.clone(),
                (pixel_x, bottom + px(0.1, scale)),
                style(10.0, scale, FontStyle::Normal, &TEXT_SECONDARY, Pos::new(HPos::Center, VPos::Top)),
            ))?;
        }

        let line_width = px(0.025, scale).max(1) as u32;
        let marker = px(0.05, scale).max(2);
        for series in &self.series {
            for run in segments(&series.points) {
                if run.len() > 1 {
                    chart.draw_series(LineSeries::new(
                        run.iter().copied(),
                        series.color.stroke_width(line_width),
                    ))?;
                }
                chart.draw_series(
                    run.iter()
                        .map(|point| Circle::new(*point, marker, series.color.filled())),
                )?;
            }
        }

        plot_area.draw(&Rectangle::new(
            [(0, 0), (plot_area.dim_in_pixel().0 as i32 - 1, plot_area.dim_in_pixel().1 as i32 - 1)],
            BORDER.stroke_width(1),
        ))?;

        let legend_x = px(WIDTH - PLOT_RIGHT + 0.2, scale);
        for (index, series) in self.series.iter().enumerate() {
            let y = px(PLOT_TOP + 0.15 + index as f64 * 0.3, scale);
            root.draw(&PathElement::new(
                vec![(legend_x, y), (legend_x + px(0.3, scale), y)],
                series.color.stroke_width(line_width.max(2)),
            ))?;
            root.draw(&Text::new(
                series.label.clone(),
                (legend_x + px(0.4, scale), y),
                style(10.0, scale, FontStyle::Normal, &series.color, Pos::new(HPos::Left, VPos::Center)),
            ))?;
        }

        Ok(())
    }
}
