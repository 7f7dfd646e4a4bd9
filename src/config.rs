use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::color::{self, DERIVE_SENTINEL};
use crate::time_utils::HourFormat;

/// Entity ids accepted as a clock data source.
pub const ENTITY_PREFIX: &str = "sensor.";

/// The flat configuration record as callers supply it. Every field is optional;
/// [`resolve`] fills in defaults and validates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_text")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_24h_format: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_text")]
    pub width_svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_text")]
    pub height_svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_text")]
    pub margin_div: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<Justify>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_items: Option<AlignItems>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_card_background: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_text")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_text")]
    pub digit_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_text")]
    pub dimmed_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub dimmed_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_text")]
    pub text_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub digit_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub digit_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub digit_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub segment_thickness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub rect_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub rect_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub rect_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_number")]
    pub rect_height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_one: Option<bool>,
}

/// Fully resolved, validated clock configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockConfiguration {
    pub entity: String,
    pub hour_format: HourFormat,
    pub width_svg: String,
    pub height_svg: String,
    pub margin_div: String,
    pub justify_content: Justify,
    pub align_items: AlignItems,
    pub show_card_background: bool,
    pub background_color: String,
    pub digit_color: String,
    pub dimmed_color: String,
    pub dimmed_opacity: f64,
    pub text_color: String,
    pub digit: DigitGeometry,
    pub rect: RectGeometry,
    /// Draw digit "1" as a full dimmed outline with b and c lit on top.
    pub outline_one: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitGeometry {
    pub width: f64,
    pub height: f64,
    pub spacing: f64,
    pub thickness: f64,
}

/// Background rectangle the digits are centred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignItems {
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Please define a sensor entity")]
    MissingEntity,
    #[error("Entity {0:?} is not a sensor entity (expected the `sensor.` prefix)")]
    InvalidEntity(String),
    #[error("`{field}` must be a non-negative number, got {value}")]
    InvalidNumber { field: &'static str, value: f64 },
    #[error("`dimmed_opacity` must be between 0 and 100, got {0}")]
    OpacityOutOfRange(f64),
}

/// Value type of a configuration key, used by the editor and TOML persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Number,
    Text,
}

pub const FIELDS: &[(&str, FieldKind)] = &[
    ("entity", FieldKind::Text),
    ("use_24h_format", FieldKind::Bool),
    ("width_svg", FieldKind::Text),
    ("height_svg", FieldKind::Text),
    ("margin_div", FieldKind::Text),
    ("justify_content", FieldKind::Text),
    ("align_items", FieldKind::Text),
    ("show_card_background", FieldKind::Bool),
    ("background_color", FieldKind::Text),
    ("digit_color", FieldKind::Text),
    ("dimmed_color", FieldKind::Text),
    ("dimmed_opacity", FieldKind::Number),
    ("text_color", FieldKind::Text),
    ("digit_width", FieldKind::Number),
    ("digit_height", FieldKind::Number),
    ("digit_spacing", FieldKind::Number),
    ("segment_thickness", FieldKind::Number),
    ("rect_x", FieldKind::Number),
    ("rect_y", FieldKind::Number),
    ("rect_width", FieldKind::Number),
    ("rect_height", FieldKind::Number),
    ("outline_one", FieldKind::Bool),
];

pub fn field_kind(key: &str) -> Option<FieldKind> {
    FIELDS.iter().find(|(name, _)| *name == key).map(|(_, kind)| *kind)
}

// Defaults

fn default_width_svg() -> String { "50%".into() }
fn default_height_svg() -> String { "120".into() }
fn default_margin_div() -> String { "0".into() }
fn default_background_color() -> String { "transparent".into() }
fn default_digit_color() -> String { "white".into() }
fn default_dimmed_color() -> String { "rgba(255,255,255,0.3)".into() }
fn default_text_color() -> String { "white".into() }

const DEFAULT_DIGIT_WIDTH: f64 = 40.0;
const DEFAULT_DIGIT_HEIGHT: f64 = 75.0;
const DEFAULT_DIGIT_SPACING: f64 = 10.0;
const DEFAULT_SEGMENT_THICKNESS: f64 = 8.0;
const DEFAULT_RECT_X: f64 = 40.0;
const DEFAULT_RECT_Y: f64 = 10.0;
const DEFAULT_RECT_WIDTH: f64 = 220.0;
const DEFAULT_RECT_HEIGHT: f64 = 100.0;

// Lenient field parsing: form inputs hand numbers over as text, and TOML users
// write `height_svg = 120` as readily as `height_svg = "120"`.

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

fn deserialize_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Option::<NumberOrText>::deserialize(d)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("expected a number, got {:?}", s)))
        }
    }
}

fn deserialize_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<TextOrNumber>::deserialize(d)? {
        None => None,
        Some(TextOrNumber::Text(s)) if s.trim().is_empty() => None,
        Some(TextOrNumber::Text(s)) => Some(s),
        Some(TextOrNumber::Int(n)) => Some(n.to_string()),
        Some(TextOrNumber::Float(n)) => Some(n.to_string()),
    })
}

fn non_negative(field: &'static str, value: Option<f64>, default: f64) -> Result<f64, ConfigError> {
    let value = value.unwrap_or(default);
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidNumber { field, value })
    }
}

/// Merge `raw` with defaults and validate it.
///
/// A `dimmed_color` of `"none"` is replaced by the digit color at
/// `dimmed_opacity` percent. The derived value is concrete, so resolving the
/// raw form of a resolved configuration gives the same result.
pub fn resolve(raw: &RawConfig) -> Result<ClockConfiguration, ConfigError> {
    let entity = match raw.entity.as_deref() {
        None => return Err(ConfigError::MissingEntity),
        Some(e) if !e.starts_with(ENTITY_PREFIX) => {
            return Err(ConfigError::InvalidEntity(e.to_string()))
        }
        Some(e) => e.to_string(),
    };

    let dimmed_opacity = raw.dimmed_opacity.unwrap_or(0.0);
    if !(0.0..=100.0).contains(&dimmed_opacity) {
        return Err(ConfigError::OpacityOutOfRange(dimmed_opacity));
    }

    let digit_color = raw.digit_color.clone().unwrap_or_else(default_digit_color);
    let dimmed_color = match raw.dimmed_color.clone() {
        Some(c) if c == DERIVE_SENTINEL => color::derive_dimmed(&digit_color, dimmed_opacity),
        Some(c) => c,
        None => default_dimmed_color(),
    };

    let digit = DigitGeometry {
        width: non_negative("digit_width", raw.digit_width, DEFAULT_DIGIT_WIDTH)?,
        height: non_negative("digit_height", raw.digit_height, DEFAULT_DIGIT_HEIGHT)?,
        spacing: non_negative("digit_spacing", raw.digit_spacing, DEFAULT_DIGIT_SPACING)?,
        thickness: non_negative("segment_thickness", raw.segment_thickness, DEFAULT_SEGMENT_THICKNESS)?,
    };
    let rect = RectGeometry {
        x: non_negative("rect_x", raw.rect_x, DEFAULT_RECT_X)?,
        y: non_negative("rect_y", raw.rect_y, DEFAULT_RECT_Y)?,
        width: non_negative("rect_width", raw.rect_width, DEFAULT_RECT_WIDTH)?,
        height: non_negative("rect_height", raw.rect_height, DEFAULT_RECT_HEIGHT)?,
    };

    Ok(ClockConfiguration {
        entity,
        hour_format: HourFormat::from_24h_flag(raw.use_24h_format.unwrap_or(true)),
        width_svg: raw.width_svg.clone().unwrap_or_else(default_width_svg),
        height_svg: raw.height_svg.clone().unwrap_or_else(default_height_svg),
        margin_div: raw.margin_div.clone().unwrap_or_else(default_margin_div),
        justify_content: raw.justify_content.unwrap_or(Justify::Center),
        align_items: raw.align_items.unwrap_or(AlignItems::Center),
        show_card_background: raw.show_card_background.unwrap_or(true),
        background_color: raw.background_color.clone().unwrap_or_else(default_background_color),
        digit_color,
        dimmed_color,
        dimmed_opacity,
        text_color: raw.text_color.clone().unwrap_or_else(default_text_color),
        digit,
        rect,
        outline_one: raw.outline_one.unwrap_or(true),
    })
}

// Implementations

impl RawConfig {
    /// Starter configuration offered to a freshly added card.
    pub fn stub() -> Self {
        Self {
            entity: Some("sensor.time".into()),
            use_24h_format: Some(true),
            background_color: Some(default_background_color()),
            digit_color: Some(default_digit_color()),
            dimmed_color: Some(DERIVE_SENTINEL.into()),
            dimmed_opacity: Some(0.0),
            width_svg: Some(default_width_svg()),
            height_svg: Some(default_height_svg()),
            justify_content: Some(Justify::Center),
            margin_div: Some(default_margin_div()),
            show_card_background: Some(true),
            ..Self::default()
        }
    }
}

impl From<&ClockConfiguration> for RawConfig {
    fn from(c: &ClockConfiguration) -> Self {
        Self {
            entity: Some(c.entity.clone()),
            use_24h_format: Some(c.hour_format == HourFormat::TwentyFour),
            width_svg: Some(c.width_svg.clone()),
            height_svg: Some(c.height_svg.clone()),
            margin_div: Some(c.margin_div.clone()),
            justify_content: Some(c.justify_content),
            align_items: Some(c.align_items),
            show_card_background: Some(c.show_card_background),
            background_color: Some(c.background_color.clone()),
            digit_color: Some(c.digit_color.clone()),
            dimmed_color: Some(c.dimmed_color.clone()),
            dimmed_opacity: Some(c.dimmed_opacity),
            text_color: Some(c.text_color.clone()),
            digit_width: Some(c.digit.width),
            digit_height: Some(c.digit.height),
            digit_spacing: Some(c.digit.spacing),
            segment_thickness: Some(c.digit.thickness),
            rect_x: Some(c.rect.x),
            rect_y: Some(c.rect.y),
            rect_width: Some(c.rect.width),
            rect_height: Some(c.rect.height),
            outline_one: Some(c.outline_one),
        }
    }
}

impl Justify {
    pub fn as_css(&self) -> &'static str {
        match self {
            Justify::FlexStart => "flex-start",
            Justify::Center => "center",
            Justify::FlexEnd => "flex-end",
            Justify::SpaceBetween => "space-between",
            Justify::SpaceAround => "space-around",
            Justify::SpaceEvenly => "space-evenly",
        }
    }
}

impl AlignItems {
    pub fn as_css(&self) -> &'static str {
        match self {
            AlignItems::FlexStart => "flex-start",
            AlignItems::Center => "center",
            AlignItems::FlexEnd => "flex-end",
            AlignItems::Stretch => "stretch",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs_path().join("config.toml")
}

fn dirs_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
            PathBuf::from(home).join(".config")
        });
    base.join("segclock")
}

/// Read and parse the config file as a toml_edit document, preserving formatting and comments.
fn read_config_doc(path: &Path) -> Result<toml_edit::DocumentMut> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    content
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Persist a single key into the config file, keeping the rest of the document intact.
pub fn save_field(path: &Path, key: &str, value: &serde_json::Value) -> Result<()> {
    let mut doc = read_config_doc(path)?;

    let item = match value {
        serde_json::Value::Bool(b) => toml_edit::value(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => toml_edit::value(i),
            None => {
                let f = n.as_f64().context("Number out of range")?;
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    toml_edit::value(f as i64)
                } else {
                    toml_edit::value(f)
                }
            }
        },
        serde_json::Value::String(s) => toml_edit::value(s.as_str()),
        other => anyhow::bail!("Cannot store {} in a flat config record", other),
    };
    doc[key] = item;

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    log::info!("Persisted {} to {}", key, path.display());
    Ok(())
}

pub fn load_config(path: &Path) -> Result<RawConfig> {
    if !path.exists() {
        log::info!("Config file not found at {}, generating default", path.display());
        let content = generate_default_config();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::write(path, &content) {
            Ok(()) => log::info!("Created default config at {}", path.display()),
            Err(e) => log::warn!("Failed to write default config: {}", e),
        }
        return Ok(RawConfig::stub());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: RawConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
}

fn generate_default_config() -> String {
    r#"# segclock: seven-segment clock card
# Configuration file, generated automatically on first run.
# Uncomment and edit values to customise. Defaults are shown.

# Time source; must be a sensor entity whose state reads HH:MM or HH:MM:SS
entity = "sensor.time"
# false = 12-hour display (no AM/PM on the digits)
use_24h_format = true

# SVG element size (CSS lengths)
width_svg  = "50%"
height_svg = "120"
# Flex container around the SVG
margin_div = "0"
# flex-start | center | flex-end | space-between | space-around | space-evenly
justify_content = "center"
# flex-start | center | flex-end | stretch
# align_items = "center"
# Card chrome (background, shadow, border)
show_card_background = true

# Colours: any CSS colour
background_color = "transparent"
digit_color      = "white"
# "none" derives the unlit-segment colour from digit_color at dimmed_opacity %
dimmed_color     = "none"
dimmed_opacity   = 0
# text_color     = "white"

# Digit geometry (SVG user units; the viewBox is 300 x 120)
# digit_width       = 40
# digit_height      = 75
# digit_spacing     = 10
# segment_thickness = 8

# Background rectangle the digits are centred in
# rect_x      = 40
# rect_y      = 10
# rect_width  = 220
# rect_height = 100

# Draw "1" over a full set of unlit segments
# outline_one = true
"#.to_string()
}
