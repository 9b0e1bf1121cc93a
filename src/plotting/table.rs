//! Table plot renderer
//!
//! Layout is expressed in units of 1/100 dpi-inch and scaled to pixels, so
//! the same spec renders identically at any resolution. Columns from left to
//! right: name, value, optional secondary value, bar, change.

use super::styles::{
    change_color, class_color, BACKGROUND, BORDER, CHART_BG, GRID, ROW_ALT, TEXT_PRIMARY,
    TEXT_SECONDARY,
};
use super::{font_px, fonts::FONT_FAMILY, px, Figure};
use crate::plotting::resolver::{RenderRow, RenderSpec};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;

const MARGIN: f64 = 0.3;
const NAME_WIDTH: f64 = 2.0;
const VALUE_WIDTH: f64 = 1.5;
const SECONDARY_WIDTH: f64 = 1.5;
const BAR_WIDTH: f64 = 6.5;
const CHANGE_WIDTH: f64 = 2.0;
const ROW_HEIGHT: f64 = 0.6;
const BAR_LENGTH: f64 = 6.3;
const BAR_HEIGHT: f64 = 0.4;
const CELL_PAD: f64 = 0.1;

const TITLE_PT: f64 = 22.0;
const SUBTITLE_PT: f64 = 18.0;
const DESCRIPTION_PT: f64 = 12.0;
const HEADER_PT: f64 = 13.0;
const CELL_PT: f64 = 12.0;

/// Column x offsets (in units, relative to the left margin)
struct Columns {
    name: f64,
    value: f64,
    secondary: Option<f64>,
    bar: f64,
    change: f64,
    end: f64,
}

impl Columns {
    fn for_spec(spec: &RenderSpec) -> Self {
        let name = MARGIN;
        let value = name + NAME_WIDTH;
        let (secondary, bar) = if spec.headers.secondary.is_some() {
            (Some(value + VALUE_WIDTH), value + VALUE_WIDTH + SECONDARY_WIDTH)
        } else {
            (None, value + VALUE_WIDTH)
        };
        let change = bar + BAR_WIDTH;
        Self {
            name,
            value,
            secondary,
            bar,
            change,
            end: change + CHANGE_WIDTH,
        }
    }
}

fn header_height(spec: &RenderSpec) -> f64 {
    if spec.description.is_some() {
        1.7
    } else {
        1.3
    }
}

/// Width and height in units
pub fn table_dimensions(spec: &RenderSpec) -> (f64, f64) {
    let columns = Columns::for_spec(spec);
    let row_count = 1 + spec.rows.len() + usize::from(spec.totals.is_some());
    let height = header_height(spec) + row_count as f64 * ROW_HEIGHT + MARGIN;
    (columns.end + MARGIN, height)
}

fn text_style(points: f64, scale: f64, style: FontStyle, color: &RGBColor, pos: Pos) -> TextStyle<'static> {
    (FONT_FAMILY, font_px(points, scale))
        .into_font()
        .style(style)
        .color(color)
        .pos(pos)
}

fn left() -> Pos {
    Pos::new(HPos::Left, VPos::Center)
}

fn right() -> Pos {
    Pos::new(HPos::Right, VPos::Center)
}

fn center() -> Pos {
    Pos::new(HPos::Center, VPos::Center)
}

impl Figure for RenderSpec {
    fn size(&self, scale: f64) -> (u32, u32) {
        let (width, height) = table_dimensions(self);
        (px(width, scale).max(1) as u32, px(height, scale).max(1) as u32)
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        scale: f64,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let columns = Columns::for_spec(self);
        let (width, _) = table_dimensions(self);
        root.fill(&BACKGROUND)?;

        root.draw(&Text::new(
            self.title.clone(),
            (px(width / 2.0, scale), px(0.45, scale)),
            text_style(TITLE_PT, scale, FontStyle::Bold, &TEXT_PRIMARY, center()),
        ))?;
        root.draw(&Text::new(
            self.subtitle.clone(),
            (px(width / 2.0, scale), px(0.95, scale)),
            text_style(SUBTITLE_PT, scale, FontStyle::Normal, &TEXT_SECONDARY, center()),
        ))?;
        if let Some(description) = &self.description {
            root.draw(&Text::new(
                description.clone(),
                (px(width / 2.0, scale), px(1.35, scale)),
                text_style(DESCRIPTION_PT, scale, FontStyle::Italic, &TEXT_SECONDARY, center()),
            ))?;
        }

        let mut top = header_height(self);
        draw_header(root, self, &columns, top, scale)?;
        top += ROW_HEIGHT;

        for (index, row) in self.rows.iter().enumerate() {
            let fill = if index % 2 == 1 { ROW_ALT } else { CHART_BG };
            draw_row(root, self, &columns, row, top, fill, FontStyle::Normal, scale)?;
            top += ROW_HEIGHT;
        }

        if let Some(totals) = &self.totals {
            root.draw(&PathElement::new(
                vec![
                    (px(MARGIN, scale), px(top, scale)),
                    (px(columns.end, scale), px(top, scale)),
                ],
                BORDER.stroke_width(px(0.02, scale).max(1) as u32),
            ))?;
            draw_row(root, self, &columns, totals, top, BACKGROUND, FontStyle::Bold, scale)?;
        }

        Ok(())
    }
}

fn draw_header<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &RenderSpec,
    columns: &Columns,
    top: f64,
    scale: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let mid = px(top + ROW_HEIGHT / 2.0, scale);
    let style = |pos| text_style(HEADER_PT, scale, FontStyle::Bold, &TEXT_PRIMARY, pos);

    root.draw(&Rectangle::new(
        [
            (px(MARGIN, scale), px(top, scale)),
            (px(columns.end, scale), px(top + ROW_HEIGHT, scale)),
        ],
        GRID.filled(),
    ))?;

    root.draw(&Text::new(
        spec.headers.name.clone(),
        (px(columns.name + CELL_PAD, scale), mid),
        style(left()),
    ))?;
    root.draw(&Text::new(
        spec.headers.value.clone(),
        (px(columns.value + VALUE_WIDTH - CELL_PAD, scale), mid),
        style(right()),
    ))?;
    if let (Some(x), Some(header)) = (columns.secondary, &spec.headers.secondary) {
        root.draw(&Text::new(
            header.clone(),
            (px(x + SECONDARY_WIDTH - CELL_PAD, scale), mid),
            style(right()),
        ))?;
    }
    root.draw(&Text::new(
        spec.headers.bar.clone(),
        (px(columns.bar + BAR_WIDTH / 2.0, scale), mid),
        style(center()),
    ))?;
    root.draw(&Text::new(
        spec.headers.change.clone(),
        (px(columns.change + CELL_PAD, scale), mid),
        style(left()),
    ))?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_row<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &RenderSpec,
    columns: &Columns,
    row: &RenderRow,
    top: f64,
    fill: RGBColor,
    weight: FontStyle,
    scale: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let mid = px(top + ROW_HEIGHT / 2.0, scale);
    let name_color = row
        .class
        .as_deref()
        .map(class_color)
        .unwrap_or(TEXT_PRIMARY);

    root.draw(&Rectangle::new(
        [
            (px(MARGIN, scale), px(top, scale)),
            (px(columns.end, scale), px(top + ROW_HEIGHT, scale)),
        ],
        fill.filled(),
    ))?;

    root.draw(&Text::new(
        row.label.clone(),
        (px(columns.name + CELL_PAD, scale), mid),
        text_style(CELL_PT, scale, weight, &name_color, left()),
    ))?;
    root.draw(&Text::new(
        row.value_text.clone(),
        (px(columns.value + VALUE_WIDTH - CELL_PAD, scale), mid),
        text_style(CELL_PT, scale, weight, &TEXT_PRIMARY, right()),
    ))?;
    if let (Some(x), Some(text)) = (columns.secondary, &row.secondary_text) {
        root.draw(&Text::new(
            text.clone(),
            (px(x + SECONDARY_WIDTH - CELL_PAD, scale), mid),
            text_style(CELL_PT, scale, weight, &TEXT_SECONDARY, right()),
        ))?;
    }

    if let Some(ratio) = row.bar_ratio {
        let bar_left = columns.bar + CELL_PAD;
        let bar_top = top + (ROW_HEIGHT - BAR_HEIGHT) / 2.0;
        let bar_bottom = bar_top + BAR_HEIGHT;
        root.draw(&Rectangle::new(
            [
                (px(bar_left, scale), px(bar_top, scale)),
                (px(bar_left + BAR_LENGTH, scale), px(bar_bottom, scale)),
            ],
            BACKGROUND.filled(),
        ))?;
        if ratio > 0.0 {
            root.draw(&Rectangle::new(
                [
                    (px(bar_left, scale), px(bar_top, scale)),
                    (px(bar_left + BAR_LENGTH * ratio, scale), px(bar_bottom, scale)),
                ],
                name_color.mix(0.85).filled(),
            ))?;
        }
        root.draw(&Rectangle::new(
            [
                (px(bar_left, scale), px(bar_top, scale)),
                (px(bar_left + BAR_LENGTH, scale), px(bar_bottom, scale)),
            ],
            BORDER.stroke_width(1),
        ))?;
    }

    root.draw(&Text::new(
        row.change_text.clone(),
        (px(columns.change + CELL_PAD, scale), mid),
        text_style(
            CELL_PT,
            scale,
            weight,
            &change_color(&row.change, spec.invert_change_colors),
            left(),
        ),
    ))?;
    Ok(())
}
