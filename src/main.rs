use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Result};
use meeting_sign::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the controller configuration file
    #[arg(short, long, default_value = "sign.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum PresetName {
    Red,
    Orange,
    Yellow,
    Green,
    Aquamarine,
    Blue,
    Purple,
    Violet,
    Pink,
    Indigo,
}

impl From<PresetName> for Preset {
    fn from(name: PresetName) -> Preset {
        match name {
            PresetName::Red => Preset::Red,
            PresetName::Orange => Preset::Orange,
            PresetName::Yellow => Preset::Yellow,
            PresetName::Green => Preset::Green,
            PresetName::Aquamarine => Preset::Aquamarine,
            PresetName::Blue => Preset::Blue,
            PresetName::Purple => Preset::Purple,
            PresetName::Violet => Preset::Violet,
            PresetName::Pink => Preset::Pink,
            PresetName::Indigo => Preset::Indigo,
        }
    }
}

impl std::fmt::Display for PresetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Preset::from(*self))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Turn the sign on manually and claim it from the automatic updater
    On,
    /// Turn the sign off manually and hand it back to the automatic updater
    Off,
    /// Run one calendar-driven update
    Auto {
        /// JSON events file written by the external calendar fetcher
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Read the sign's current state and print it
    Read {
        /// Render without ANSI colors
        #[arg(long)]
        plain: bool,
    },
    /// Set every group to a named preset color
    Preset {
        /// Preset name
        #[arg(value_enum)]
        name: PresetName,
    },
}

fn main() -> Result<()> {
    // Initialize tracing with pretty colors
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("meeting_sign=info")),
        )
        .compact()
        .init();

    // Initialize color-eyre for pretty error reporting
    color_eyre::install()?;

    let cli = Cli::parse();
    debug!("Parsed command line arguments");

    let mut config = SignConfig::load(&cli.config)?;

    match cli.command {
        Commands::On => manual_switch(&mut config, &cli.config, true)?,
        Commands::Off => manual_switch(&mut config, &cli.config, false)?,
        Commands::Auto { events } => auto_update(&config, &events)?,
        Commands::Read { plain } => read_state(&config, plain)?,
        Commands::Preset { name } => {
            send(&config, &SignCommand::AllOn(name.into()))?;
            info!("Sign set to preset {name}");
        }
    }

    Ok(())
}

/// Discovers the sign and builds a session from the configured settings
fn session_for(config: &SignConfig) -> meeting_sign::Result<SignSession> {
    let port = transport::discover(&config.descriptor_match)?;
    info!("Attempting to update device {}", port.port_name);
    Ok(SignSession::new(
        &port.port_name,
        config.baud_rate,
        SignSession::DEFAULT_TIMEOUT,
    ))
}

fn send(config: &SignConfig, command: &SignCommand) -> meeting_sign::Result<()> {
    session_for(config)?.execute(command)?;
    Ok(())
}

/// Operator takes over the sign. The device is driven first and the
/// override persisted only once that succeeded, so a failed update never
/// leaves the config claiming a state the sign does not show.
fn manual_switch(config: &mut SignConfig, path: &Path, on: bool) -> Result<()> {
    let command = if on {
        SignCommand::meeting_pattern()
    } else {
        SignCommand::AllOff
    };
    send(config, &command)?;

    config.set_override(on);
    config.save(path)?;
    info!(
        "Sign manually switched {}",
        if on { "on" } else { "off" }
    );
    Ok(())
}

/// One run-to-completion automatic update, the cron entry point
fn auto_update(config: &SignConfig, events_path: &Path) -> Result<()> {
    if config.manual {
        info!("Sign is manually controlled, skipping automatic update");
        return Ok(());
    }

    let now = chrono::Local::now().naive_local();
    let quiet = config.quiet_window();

    // Fetching is gated by the active hours; outside them the decision
    // engine forces the lamp off without any events.
    let fetch_enabled = quiet.as_ref().map_or(true, |w| w.contains(now.time()));
    let events = if fetch_enabled {
        let day_start = now.date().and_time(NaiveTime::MIN);
        let day_end = day_start + chrono::Duration::days(1);
        JsonFileSource::new(events_path).list_events(day_start, day_end)?
    } else {
        info!("Quiet time, disabling the sign without fetching");
        Vec::new()
    };

    let result = decide(
        now,
        quiet.as_ref(),
        &config.manual_override(),
        &config.calendar_id,
        &events,
        config.start_offset(),
        config.include_all_day,
    );

    let command = if result.led_on {
        SignCommand::meeting_pattern()
    } else {
        SignCommand::AllOff
    };
    send(config, &command)?;
    info!("Last updated: {}, led_on={}", now, result.led_on);
    Ok(())
}

fn read_state(config: &SignConfig, plain: bool) -> Result<()> {
    match session_for(config)?.execute(&SignCommand::ReadState)? {
        Response::State(state) => {
            if !state.status_ok {
                warn!("Sign reported a failed read, state may be stale");
            }
            println!("{}", render::render(&state, !plain));
            Ok(())
        }
        Response::Ack => Err(eyre!("sign acknowledged instead of answering the read")),
    }
}
