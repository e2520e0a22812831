//! Argument checks shared by the dispatcher and the composite pre-pass.
//!
//! Everything here runs before a backend call, so a rejected request never
//! mutates a document.

use deckhand_types::{
    Alignment, CellInput, ChartType, ColorInput, Rect, Rgb, Series, SeriesInput, ShapeType,
    TableCell, TextStyle,
};

use crate::error::{DeckError, Result};
use crate::requests::Label;

/// PowerPoint's largest font size.
const MAX_FONT_SIZE: f64 = 4000.0;
/// Deepest bullet indent level.
const MAX_LEVEL: i64 = 8;

pub(crate) fn rect(left: f64, top: f64, width: f64, height: f64) -> Result<Rect> {
    let r = Rect::new(left, top, width, height);
    if r.is_well_formed() {
        Ok(r)
    } else {
        Err(DeckError::invalid_argument(format!(
            "bad geometry left={left} top={top} width={width} height={height}: \
             sizes must be positive and all values finite"
        )))
    }
}

pub(crate) fn position(left: f64, top: f64) -> Result<(f64, f64)> {
    if left.is_finite() && top.is_finite() {
        Ok((left, top))
    } else {
        Err(DeckError::invalid_argument(format!(
            "bad position left={left} top={top}"
        )))
    }
}

pub(crate) fn optional_extent(name: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(DeckError::invalid_argument(format!(
            "{name} must be positive, got {v}"
        ))),
        other => Ok(other),
    }
}

pub(crate) fn font_size(points: f64) -> Result<f64> {
    if (1.0..=MAX_FONT_SIZE).contains(&points) {
        Ok(points)
    } else {
        Err(DeckError::invalid_argument(format!(
            "font_size must be between 1 and {MAX_FONT_SIZE} points, got {points}"
        )))
    }
}

pub(crate) fn color(input: &ColorInput) -> Result<Rgb> {
    Ok(input.to_rgb()?)
}

pub(crate) fn optional_color(input: Option<&ColorInput>) -> Result<Option<Rgb>> {
    input.map(color).transpose()
}

pub(crate) fn style(size: f64, font_name: &str, color_input: &ColorInput) -> Result<TextStyle> {
    let font_name = font_name.trim();
    if font_name.is_empty() {
        return Err(DeckError::invalid_argument("font_name must not be empty"));
    }
    Ok(TextStyle {
        font_size: font_size(size)?,
        font_name: font_name.to_string(),
        color: color(color_input)?,
        bold: false,
        italic: false,
        underline: false,
    })
}

pub(crate) fn alignment(name: &str) -> Result<Alignment> {
    Alignment::from_str(name.trim()).ok_or_else(|| {
        DeckError::invalid_argument(format!(
            "unknown alignment '{name}', expected LEFT, CENTER, RIGHT or JUSTIFY"
        ))
    })
}

pub(crate) fn line_spacing(spacing: f64) -> Result<f64> {
    if spacing.is_finite() && spacing > 0.0 {
        Ok(spacing)
    } else {
        Err(DeckError::invalid_argument(format!(
            "line_spacing must be positive, got {spacing}"
        )))
    }
}

pub(crate) fn layout_index(index: i64, layout_count: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < layout_count)
        .ok_or_else(|| {
            DeckError::invalid_argument(format!(
                "layout_index {index} out of range 0..{layout_count}"
            ))
        })
}

pub(crate) fn level(level: i64) -> Result<u8> {
    if (0..=MAX_LEVEL).contains(&level) {
        Ok(level as u8)
    } else {
        Err(DeckError::invalid_argument(format!(
            "level must be between 0 and {MAX_LEVEL}, got {level}"
        )))
    }
}

/// `None` and the empty string both mean the default bullet.
pub(crate) fn bullet_char(input: Option<&str>) -> Result<Option<char>> {
    let Some(s) = input.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Some(c)),
        _ => Err(DeckError::invalid_argument(format!(
            "bullet_character must be a single character, got '{s}'"
        ))),
    }
}

pub(crate) fn bullet_items(items: &[String]) -> Result<()> {
    if items.is_empty() {
        Err(DeckError::invalid_argument("items must not be empty"))
    } else {
        Ok(())
    }
}

pub(crate) fn chart_type(name: &str) -> Result<ChartType> {
    ChartType::from_str(name).ok_or_else(|| {
        DeckError::invalid_argument(format!(
            "unknown chart type '{name}', supported: {}",
            ChartType::supported_names()
        ))
    })
}

pub(crate) fn shape_type(name: &str) -> Result<ShapeType> {
    ShapeType::from_str(name).ok_or_else(|| {
        DeckError::invalid_argument(format!(
            "unknown shape type '{name}', supported: {}",
            ShapeType::supported_names()
        ))
    })
}

/// Check chart data against its type and return labels and series.
pub(crate) fn chart_data(
    chart_type: ChartType,
    categories: &[Label],
    series: &[SeriesInput],
) -> Result<(Vec<String>, Vec<Series>)> {
    if categories.is_empty() {
        return Err(DeckError::invalid_argument("categories must not be empty"));
    }
    if series.is_empty() {
        return Err(DeckError::invalid_argument("data_series must not be empty"));
    }
    if chart_type.single_series() && series.len() > 1 {
        return Err(DeckError::invalid_argument(format!(
            "{} charts take exactly one series, got {}",
            chart_type.as_str(),
            series.len()
        )));
    }
    let categories: Vec<String> = categories.iter().cloned().map(Label::into_text).collect();
    let series: Vec<Series> = series.iter().cloned().map(SeriesInput::into_series).collect();
    for s in &series {
        if s.values.len() != categories.len() {
            return Err(DeckError::invalid_argument(format!(
                "series '{}' has {} values for {} categories",
                s.name,
                s.values.len(),
                categories.len()
            )));
        }
        if let Some(v) = s.values.iter().find(|v| !v.is_finite()) {
            return Err(DeckError::invalid_argument(format!(
                "series '{}' contains non-finite value {v}",
                s.name
            )));
        }
    }
    Ok((categories, series))
}

/// Convert a cell grid, rejecting empty or ragged data.
pub(crate) fn table_rows(data: &[Vec<CellInput>]) -> Result<Vec<Vec<TableCell>>> {
    let cols = data.first().map_or(0, Vec::len);
    if data.is_empty() || cols == 0 {
        return Err(DeckError::invalid_argument("table data must have at least one row and column"));
    }
    if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(DeckError::invalid_argument(format!(
            "table data is not rectangular: row {i} has {} cells, row 0 has {cols}",
            row.len()
        )));
    }
    data.iter()
        .map(|row| {
            row.iter()
                .map(|c| c.to_cell().map_err(DeckError::from))
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

pub(crate) fn column_widths(widths: Option<&[f64]>, cols: usize) -> Result<Option<Vec<f64>>> {
    let Some(widths) = widths else {
        return Ok(None);
    };
    if widths.len() != cols {
        return Err(DeckError::invalid_argument(format!(
            "column_widths has {} entries for {cols} columns",
            widths.len()
        )));
    }
    if let Some(w) = widths.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(DeckError::invalid_argument(format!(
            "column widths must be positive, got {w}"
        )));
    }
    Ok(Some(widths.to_vec()))
}

pub(crate) fn line_width(points: f64) -> Result<f64> {
    if points.is_finite() && points >= 0.0 {
        Ok(points)
    } else {
        Err(DeckError::invalid_argument(format!(
            "line_width must be non-negative, got {points}"
        )))
    }
}
