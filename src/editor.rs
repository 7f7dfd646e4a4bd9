//! Settings editor: field-level edits to the flat configuration record, each
//! announced with a `config-changed` notification.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::color::DERIVE_SENTINEL;
use crate::config::{self, ClockConfiguration, ConfigError, FieldKind, RawConfig};

/// Notification emitted after every edit; carries the whole updated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "config-changed")]
pub struct ConfigChanged {
    pub config: RawConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigEditor {
    config: RawConfig,
}

impl ConfigEditor {
    pub fn new(config: RawConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RawConfig {
        &self.config
    }

    /// Resolve the record as the card would.
    pub fn preview(&self) -> Result<ClockConfiguration, ConfigError> {
        config::resolve(&self.config)
    }

    /// Parse `value` according to the field's kind.
    pub fn parse_value(key: &str, value: &str) -> Result<serde_json::Value> {
        let kind = config::field_kind(key).with_context(|| format!("Unknown config key: {}", key))?;
        Ok(match kind {
            FieldKind::Bool => {
                let b: bool = value
                    .trim()
                    .parse()
                    .with_context(|| format!("{} expects true or false, got {:?}", key, value))?;
                serde_json::Value::Bool(b)
            }
            FieldKind::Number => {
                let n: f64 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("{} expects a number, got {:?}", key, value))?;
                serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .with_context(|| format!("{} expects a finite number", key))?
            }
            FieldKind::Text => serde_json::Value::String(value.to_string()),
        })
    }

    /// Set one field from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<ConfigChanged> {
        let parsed = Self::parse_value(key, value)?;
        self.set_value(key, parsed)
    }

    pub fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<ConfigChanged> {
        let mut record = serde_json::to_value(&self.config)?;
        let map = record
            .as_object_mut()
            .context("Config record did not serialize to an object")?;
        map.insert(key.to_string(), value);
        self.config = serde_json::from_value(record).with_context(|| format!("Invalid value for {}", key))?;
        Ok(self.changed())
    }

    /// Derive unlit segments from the digit color at `opacity` percent.
    pub fn use_opacity_dimming(&mut self, opacity: f64) -> ConfigChanged {
        self.config.dimmed_color = Some(DERIVE_SENTINEL.into());
        self.config.dimmed_opacity = Some(opacity);
        self.changed()
    }

    pub fn use_explicit_dimming(&mut self, color: &str) -> ConfigChanged {
        self.config.dimmed_color = Some(color.to_string());
        self.changed()
    }

    /// Toggle a transparent clock background; `color` is restored when turning it off.
    pub fn set_transparent_background(&mut self, transparent: bool, color: &str) -> ConfigChanged {
        self.config.background_color = Some(if transparent { "transparent".into() } else { color.to_string() });
        self.changed()
    }

    fn changed(&self) -> ConfigChanged {
        ConfigChanged { config: self.config.clone() }
    }
}
