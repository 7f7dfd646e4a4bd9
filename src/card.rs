//! Card-level glue: configuration state, host entity lookup and placeholders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{self, ClockConfiguration, ConfigError, RawConfig};
use crate::renderer::{self, escape_attr};
use crate::time_utils::WallClock;

/// Dashboard rows the card asks the host for.
pub const CARD_SIZE: u32 = 3;

pub const NOT_CONFIGURED: &str = "<div>Card not configured. Please add configuration.</div>";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    #[serde(default)]
    pub state: String,
}

/// Host snapshot: entity id to its current state.
pub type HostStates = HashMap<String, EntityState>;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CardState {
    #[default]
    Unconfigured,
    Configured(ClockConfiguration),
}

impl CardState {
    pub fn configure(raw: &RawConfig) -> Result<Self, ConfigError> {
        config::resolve(raw).map(CardState::Configured)
    }

    pub fn config(&self) -> Option<&ClockConfiguration> {
        match self {
            CardState::Unconfigured => None,
            CardState::Configured(cfg) => Some(cfg),
        }
    }
}

pub fn entity_not_found(entity: &str) -> String {
    format!("<div>Entity {} not found.</div>", escape_attr(entity))
}

/// Markup for the card body given the host's current entity snapshot.
pub fn render_card(state: &CardState, states: &HostStates, clock: &impl WallClock) -> String {
    let CardState::Configured(cfg) = state else {
        return NOT_CONFIGURED.to_string();
    };
    match states.get(&cfg.entity) {
        Some(entity) => renderer::render(cfg, &entity.state, clock).to_markup(),
        None => {
            log::debug!("Entity {} missing from host states", cfg.entity);
            entity_not_found(&cfg.entity)
        }
    }
}

/// Inline style for the card chrome. Empty keeps the host's default look.
pub fn card_style(cfg: &ClockConfiguration) -> &'static str {
    if cfg.show_card_background {
        ""
    } else {
        "background: none; box-shadow: none; border: none;"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::FixedClock;
    use chrono::NaiveTime;

    fn clock() -> FixedClock {
        FixedClock(NaiveTime::from_hms_opt(7, 5, 0).unwrap())
    }

    fn states(entity: &str, state: &str) -> HostStates {
        HashMap::from([(entity.to_string(), EntityState { state: state.to_string() })])
    }

    #[test]
    fn unconfigured_card_shows_placeholder() {
        let out = render_card(&CardState::Unconfigured, &states("sensor.time", "10:00"), &clock());
        assert_eq!(out, NOT_CONFIGURED);
    }

    #[test]
    fn missing_entity_shows_exact_placeholder() {
        let raw = RawConfig { entity: Some("sensor.kitchen_time".into()), ..RawConfig::default() };
        let card = CardState::configure(&raw).unwrap();
        let out = render_card(&card, &states("sensor.time", "10:00"), &clock());
        assert_eq!(out, "<div>Entity sensor.kitchen_time not found.</div>");
    }

    #[test]
    fn configured_card_renders_entity_state() {
        let card = CardState::configure(&RawConfig::stub()).unwrap();
        let out = render_card(&card, &states("sensor.time", "21:47"), &clock());
        assert!(out.starts_with(r#"<div class="clock-container""#));

        let cfg = card.config().unwrap();
        let direct = renderer::render(cfg, "21:47", &clock()).to_markup();
        assert_eq!(out, direct);
    }

    #[test]
    fn empty_state_falls_back_to_wall_clock() {
        let card = CardState::configure(&RawConfig::stub()).unwrap();
        let from_empty = render_card(&card, &states("sensor.time", ""), &clock());
        let explicit = render_card(&card, &states("sensor.time", "07:05"), &clock());
        assert_eq!(from_empty, explicit);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let raw = RawConfig { entity: Some("switch.lamp".into()), ..RawConfig::default() };
        assert!(matches!(CardState::configure(&raw), Err(ConfigError::InvalidEntity(_))));
    }

    #[test]
    fn card_chrome_follows_background_flag() {
        let mut raw = RawConfig::stub();
        let on = CardState::configure(&raw).unwrap();
        assert_eq!(card_style(on.config().unwrap()), "");

        raw.show_card_background = Some(false);
        let off = CardState::configure(&raw).unwrap();
        assert_eq!(card_style(off.config().unwrap()), "background: none; box-shadow: none; border: none;");
    }

    #[test]
    fn stub_resolves_with_transparent_ghost_segments() {
        let cfg = config::resolve(&RawConfig::stub()).unwrap();
        assert_eq!(cfg.dimmed_color, "rgba(255,255,255,0)");
        assert_eq!(cfg.entity, "sensor.time");
    }
}
