//! Table cells and their optional formatting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ValueError;
use crate::style::{ColorInput, Rgb};

/// Per-cell formatting. `None` leaves the backend default untouched; it never
/// means "off" or zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellOptions {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Points.
    pub font_size: Option<f64>,
    pub color: Option<Rgb>,
}

impl CellOptions {
    pub fn is_empty(&self) -> bool {
        self.bold.is_none() && self.italic.is_none() && self.font_size.is_none() && self.color.is_none()
    }
}

/// A validated table cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    pub options: CellOptions,
}

impl TableCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: CellOptions::default(),
        }
    }
}

/// Cell formatting as callers send it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CellOptionsInput {
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub italic: Option<bool>,
    /// Font size in points.
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub color: Option<ColorInput>,
}

/// A cell as callers send it: plain scalar, or text with formatting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CellInput {
    Text(String),
    Number(f64),
    Flag(bool),
    Styled {
        #[serde(default)]
        text: String,
        #[serde(default)]
        options: Option<CellOptionsInput>,
    },
}

impl From<&str> for CellInput {
    fn from(s: &str) -> Self {
        CellInput::Text(s.to_string())
    }
}

impl CellInput {
    pub fn to_cell(&self) -> Result<TableCell, ValueError> {
        match self {
            CellInput::Text(s) => Ok(TableCell::plain(s.clone())),
            CellInput::Number(n) => Ok(TableCell::plain(n.to_string())),
            CellInput::Flag(b) => Ok(TableCell::plain(if *b { "True" } else { "False" })),
            CellInput::Styled { text, options } => {
                let options = match options {
                    None => CellOptions::default(),
                    Some(o) => {
                        if let Some(size) = o.font_size {
                            if !(size.is_finite() && size > 0.0) {
                                return Err(ValueError::Range(format!(
                                    "cell font_size must be positive, got {size}"
                                )));
                            }
                        }
                        CellOptions {
                            bold: o.bold,
                            italic: o.italic,
                            font_size: o.font_size,
                            color: o.color.as_ref().map(ColorInput::to_rgb).transpose()?,
                        }
                    }
                };
                Ok(TableCell {
                    text: text.clone(),
                    options,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_cells() {
        let row: Vec<CellInput> = serde_json::from_str(r#"["Name", 42, 2.5, true]"#).unwrap();
        let texts: Vec<String> = row.iter().map(|c| c.to_cell().unwrap().text).collect();
        assert_eq!(texts, vec!["Name", "42", "2.5", "True"]);
    }

    #[test]
    fn styled_cell_keeps_unset_fields_unset() {
        let cell: CellInput =
            serde_json::from_str(r#"{"text": "Total", "options": {"bold": true}}"#).unwrap();
        let cell = cell.to_cell().unwrap();
        assert_eq!(cell.text, "Total");
        assert_eq!(cell.options.bold, Some(true));
        assert_eq!(cell.options.italic, None);
        assert_eq!(cell.options.font_size, None);
        assert_eq!(cell.options.color, None);
    }

    #[test]
    fn styled_cell_color() {
        let cell: CellInput =
            serde_json::from_str(r##"{"text": "x", "options": {"color": "#FF0000"}}"##).unwrap();
        assert_eq!(cell.to_cell().unwrap().options.color, Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn styled_cell_bad_size() {
        let cell: CellInput =
            serde_json::from_str(r#"{"text": "x", "options": {"font_size": -3}}"#).unwrap();
        assert!(matches!(cell.to_cell(), Err(ValueError::Range(_))));
    }
}
