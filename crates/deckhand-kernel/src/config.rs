//! Server configuration.
//!
//! Loaded from `~/.config/deckhand/config.toml` (or an explicit path). Every
//! field has a default, so an absent file and an empty file behave the same.
//!
//! ```toml
//! output_dir = "/home/me/decks"
//!
//! [layout]
//! start_top = 1.5
//! gap = 0.2
//!
//! [title_slide]
//! background = "#0088CC"
//! ```

use std::path::{Path, PathBuf};

use deckhand_types::ColorInput;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable that overrides `output_dir`.
pub const OUTPUT_DIR_ENV: &str = "DECKHAND_OUTPUT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Relative save paths resolve against this directory.
    pub output_dir: PathBuf,
    pub layout: LayoutConfig,
    pub title_slide: TitleSlideConfig,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            layout: LayoutConfig::default(),
            title_slide: TitleSlideConfig::default(),
        }
    }
}

/// Vertical placement heuristics for the composite builder. Inches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Where the first content element starts.
    pub start_top: f64,
    /// Space left between stacked elements.
    pub gap: f64,
    /// Paragraph height is `chars / paragraph_chars_per_inch + paragraph_base_height`.
    pub paragraph_chars_per_inch: f64,
    pub paragraph_base_height: f64,
    /// Bullet list height is `items * bullet_item_height + bullet_base_height`.
    pub bullet_item_height: f64,
    pub bullet_base_height: f64,
    /// Cursor advance for an image placed without an explicit height.
    pub image_estimated_height: f64,
    pub chart_default_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_top: 1.5,
            gap: 0.2,
            paragraph_chars_per_inch: 100.0,
            paragraph_base_height: 0.5,
            bullet_item_height: 0.3,
            bullet_base_height: 0.2,
            image_estimated_height: 3.0,
            chart_default_height: 4.0,
        }
    }
}

impl LayoutConfig {
    pub fn paragraph_height(&self, text: &str) -> f64 {
        text.chars().count() as f64 / self.paragraph_chars_per_inch + self.paragraph_base_height
    }

    pub fn bullets_height(&self, items: usize) -> f64 {
        items as f64 * self.bullet_item_height + self.bullet_base_height
    }

    fn validate(&self) -> Result<(), String> {
        let fields = [
            ("start_top", self.start_top),
            ("gap", self.gap),
            ("paragraph_base_height", self.paragraph_base_height),
            ("bullet_item_height", self.bullet_item_height),
            ("bullet_base_height", self.bullet_base_height),
            ("image_estimated_height", self.image_estimated_height),
            ("chart_default_height", self.chart_default_height),
        ];
        for (name, v) in fields {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("layout.{name} must be a non-negative number, got {v}"));
            }
        }
        if !(self.paragraph_chars_per_inch.is_finite() && self.paragraph_chars_per_inch > 0.0) {
            return Err("layout.paragraph_chars_per_inch must be positive".into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleSlideConfig {
    /// `[r, g, b]` or `"#RRGGBB"`.
    pub background: ColorInput,
}

impl Default for TitleSlideConfig {
    fn default() -> Self {
        Self {
            background: ColorInput::Components([0, 136, 204]),
        }
    }
}

/// Default config path (`~/.config/deckhand/config.toml`).
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("deckhand").join("config.toml"))
}

impl DeckConfig {
    /// Load from `explicit` if given, else from the default path when it
    /// exists, else defaults. An explicit path that is missing is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match config_file_path() {
                Some(p) if p.exists() => p,
                Some(p) => {
                    debug!("no config at {}, using defaults", p.display());
                    return Ok(Self::default());
                }
                None => {
                    debug!("no config directory available, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        let config = Self::from_file(&path)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|e| match e {
            ParseFailure::Toml(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            ParseFailure::Invalid(message) => ConfigError::Invalid {
                path: path.to_path_buf(),
                message,
            },
        })
    }

    fn parse(text: &str) -> Result<Self, ParseFailure> {
        let config: Self = toml::from_str(text).map_err(ParseFailure::Toml)?;
        config.layout.validate().map_err(ParseFailure::Invalid)?;
        config
            .title_slide
            .background
            .to_rgb()
            .map_err(|e| ParseFailure::Invalid(format!("title_slide.background: {e}")))?;
        Ok(config)
    }

    /// Apply `DECKHAND_OUTPUT_DIR` when set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_output_dir_override(std::env::var(OUTPUT_DIR_ENV).ok())
    }

    pub fn with_output_dir_override(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        if let Some(dir) = dir {
            let dir = dir.into();
            if !dir.as_os_str().is_empty() {
                self.output_dir = dir;
            }
        }
        self
    }

    /// Resolve a save target: relative paths land under `output_dir`, and
    /// `.pptx` is appended when the name lacks it.
    pub fn resolve_output(&self, filename: &str) -> PathBuf {
        let mut name = filename.to_string();
        if !name.to_ascii_lowercase().ends_with(".pptx") {
            name.push_str(".pptx");
        }
        let path = PathBuf::from(name);
        if path.is_absolute() {
            path
        } else {
            self.output_dir.join(path)
        }
    }
}

#[derive(Debug)]
enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(String),
}
