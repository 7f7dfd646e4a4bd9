use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use segclock::card::{self, CardState, EntityState, HostStates};
use segclock::config::{self, RawConfig};
use segclock::editor::ConfigEditor;
use segclock::{bridge, raster, renderer, LocalClock};

#[derive(Parser, Debug)]
#[command(name = "segclock", version, about = "Seven-segment clock card renderer")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Render the clock markup (default)
    Render(RenderArgs),
    /// Change one config value and print the config-changed notification
    Set {
        /// Config key, e.g. digit_color
        key: String,
        /// New value
        value: String,
    },
    /// Serve line-delimited JSON commands on stdin/stdout
    Bridge,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Entity state to display (HH:MM or HH:MM:SS); empty uses the local time
    #[arg(long, default_value = "")]
    state: String,

    /// Render as if the entity were absent from the host
    #[arg(long, conflicts_with = "state")]
    missing: bool,

    /// Override the configured entity
    #[arg(long)]
    entity: Option<String>,

    /// Override the hour format: 12 | 24
    #[arg(long, value_parser = ["12", "24"])]
    hour_format: Option<String>,

    /// Write markup to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also rasterize the SVG to a PNG preview
    #[arg(long)]
    png: Option<PathBuf>,

    /// PNG width in pixels
    #[arg(long, default_value_t = 600)]
    png_width: u32,

    /// PNG height in pixels
    #[arg(long, default_value_t = 240)]
    png_height: u32,

    /// Print the textual time summary (with AM/PM) to stderr
    #[arg(long)]
    summary: bool,
}

impl Default for RenderArgs {
    fn default() -> Self {
        Self {
            state: String::new(),
            missing: false,
            entity: None,
            hour_format: None,
            output: None,
            png: None,
            png_width: 600,
            png_height: 240,
            summary: false,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "segclock", &mut std::io::stdout());
        return Ok(());
    }

    let config_path = cli.config.unwrap_or_else(config::default_config_path);

    match cli.command.unwrap_or(CliCommand::Render(RenderArgs::default())) {
        CliCommand::Render(args) => run_render(&config_path, args),
        CliCommand::Set { key, value } => run_set(&config_path, &key, &value),
        CliCommand::Bridge => {
            let stdin = std::io::stdin();
            bridge::run(stdin.lock(), std::io::stdout().lock(), &LocalClock)
        }
    }
}

fn run_render(config_path: &std::path::Path, args: RenderArgs) -> Result<()> {
    let mut raw = config::load_config(config_path)?;

    // Apply CLI overrides
    if let Some(entity) = &args.entity {
        raw.entity = Some(entity.clone());
    }
    if let Some(format) = &args.hour_format {
        raw.use_24h_format = Some(format == "24");
    }

    let card = CardState::configure(&raw)
        .with_context(|| format!("Invalid config: {}", config_path.display()))?;
    let Some(cfg) = card.config() else {
        anyhow::bail!("Card has no configuration");
    };

    log::info!("Rendering {} with hour_format={:?}", cfg.entity, cfg.hour_format);

    let mut states = HostStates::new();
    if !args.missing {
        states.insert(cfg.entity.clone(), EntityState { state: args.state.clone() });
    }
    let markup = card::render_card(&card, &states, &LocalClock);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &markup)
                .with_context(|| format!("Failed to write markup: {}", path.display()))?;
            log::info!("Wrote markup to {}", path.display());
        }
        None => print!("{}", markup),
    }

    if args.summary || args.png.is_some() {
        if args.missing {
            log::warn!("Entity {} is missing; no clock to summarise or rasterize", cfg.entity);
            return Ok(());
        }
        let clock = renderer::render(cfg, &args.state, &LocalClock);
        if args.summary {
            eprintln!("{}", clock.summary);
        }
        if let Some(path) = &args.png {
            raster::save_png(&clock, args.png_width, args.png_height, path)?;
        }
    }

    Ok(())
}

fn run_set(config_path: &std::path::Path, key: &str, value: &str) -> Result<()> {
    let raw: RawConfig = config::load_config(config_path)?;
    let mut editor = ConfigEditor::new(raw);

    let parsed = ConfigEditor::parse_value(key, value)?;
    let event = editor.set_value(key, parsed.clone())?;
    editor
        .preview()
        .with_context(|| format!("Refusing to save {} = {}", key, value))?;

    config::save_field(config_path, key, &parsed)?;
    println!("{}", serde_json::to_string(&event)?);
    Ok(())
}
