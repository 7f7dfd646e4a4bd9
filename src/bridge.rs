//! Line-delimited JSON bridge for an embedding host.
//!
//! Each input line is one command; each command gets exactly one response line.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

use crate::card::{self, CardState, EntityState, HostStates};
use crate::config::RawConfig;
use crate::time_utils::WallClock;

#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "kebab-case")]
pub enum HostCommand {
    SetConfig { config: RawConfig },
    SetStates { states: HostStates },
    UpdateState { entity: String, state: String },
    Render,
    GetConfig,
    Quit,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct HostResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<RawConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_size: Option<u32>,
}

impl HostResponse {
    pub fn ok() -> Self {
        Self { ok: true, ..Self::default() }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self { ok: false, error: Some(msg.into()), ..Self::default() }
    }

    pub fn with_markup(mut self, markup: String) -> Self {
        self.markup = Some(markup);
        self
    }
}

/// What the bridge knows between commands: the card state, the last raw
/// config it accepted, and the host snapshot once one has arrived.
#[derive(Debug, Default)]
pub struct Session {
    card: CardState,
    raw: Option<RawConfig>,
    states: Option<HostStates>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one command. Returns the response and whether to keep going.
    pub fn handle(&mut self, cmd: HostCommand, clock: &impl WallClock) -> (HostResponse, bool) {
        match cmd {
            HostCommand::SetConfig { config } => match CardState::configure(&config) {
                Ok(card) => {
                    log::info!("Accepted config for {}", config.entity.as_deref().unwrap_or_default());
                    self.card = card;
                    self.raw = Some(config);
                    (self.rendered_if_known(clock), true)
                }
                Err(e) => {
                    log::warn!("Rejected config: {}", e);
                    (HostResponse::err(e.to_string()), true)
                }
            },
            HostCommand::SetStates { states } => {
                self.states = Some(states);
                (self.render(clock), true)
            }
            HostCommand::UpdateState { entity, state } => {
                self.states
                    .get_or_insert_with(HostStates::new)
                    .insert(entity, EntityState { state });
                (self.render(clock), true)
            }
            HostCommand::Render => match self.states {
                Some(_) => (self.render(clock), true),
                None => (HostResponse::err("No host states received yet"), true),
            },
            HostCommand::GetConfig => {
                let mut resp = HostResponse::ok();
                resp.config = self.raw.clone();
                resp.card_size = Some(card::CARD_SIZE);
                (resp, true)
            }
            HostCommand::Quit => (HostResponse::ok(), false),
        }
    }

    fn render(&self, clock: &impl WallClock) -> HostResponse {
        let empty = HostStates::new();
        let markup = card::render_card(&self.card, self.states.as_ref().unwrap_or(&empty), clock);
        let mut resp = HostResponse::ok().with_markup(markup);
        resp.card_style = self.card.config().map(|cfg| card::card_style(cfg).to_string());
        resp
    }

    fn rendered_if_known(&self, clock: &impl WallClock) -> HostResponse {
        match self.states {
            Some(_) => self.render(clock),
            None => HostResponse::ok(),
        }
    }
}

pub fn write_response(writer: &mut impl Write, response: &HostResponse) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Serve commands from `reader` until `quit` or end of input.
pub fn run(reader: impl BufRead, mut writer: impl Write, clock: &impl WallClock) -> Result<()> {
    let mut session = Session::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (response, keep_going) = match serde_json::from_str::<HostCommand>(line) {
            Ok(cmd) => session.handle(cmd, clock),
            Err(e) => {
                log::warn!("Bad bridge command: {}", e);
                (HostResponse::err(format!("Invalid command: {}", e)), true)
            }
        };
        write_response(&mut writer, &response)?;
        if !keep_going {
            log::info!("Bridge shutting down");
            break;
        }
    }
    Ok(())
}
