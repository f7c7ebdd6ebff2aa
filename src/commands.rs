use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::{
    analytics::{ensure_environment, BrainFrameClient},
    arm::{prompt_position, ArmController, SwiftArm},
    audio::{RodioPlayer, SoundLibrary},
    cli::{position_arg, Cli, Commands},
    models::Position,
    reaction::{PilePositions, ReactionConfig, ReactionController},
    settings::SettingsStore,
    trace::{record, MotionTrace, ReplayConfig},
};

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Run one subcommand to completion on the current (blocking) thread.
pub fn execute(cli: Cli, cancel_token: &CancellationToken) -> Result<()> {
    match cli.command {
        Commands::React {
            server_url,
            snack_position,
            mask_position,
            sounds_dir,
            relevant_zone_name,
        } => {
            let config = ReactionConfig {
                zone_name: relevant_zone_name,
                ..ReactionConfig::default()
            };
            react(
                &cli.port,
                &cli.settings,
                &server_url,
                position_arg(snack_position.as_deref()),
                position_arg(mask_position.as_deref()),
                &sounds_dir,
                config,
                cancel_token,
            )
        }
        Commands::Record { output } => record_trace(&cli.port, &output, cancel_token),
        Commands::Play { input, max_speed } => play_trace(&cli.port, &input, max_speed),
    }
}

#[allow(clippy::too_many_arguments)]
fn react(
    port: &Path,
    settings_path: &Path,
    server_url: &str,
    snack_flag: Option<Position>,
    mask_flag: Option<Position>,
    sounds_dir: &Path,
    config: ReactionConfig,
    cancel_token: &CancellationToken,
) -> Result<()> {
    let sounds = SoundLibrary::load(sounds_dir)?;

    let client = BrainFrameClient::new(server_url);
    let catalog = ensure_environment(&client, &config.zone_name)?;

    let mut arm = SwiftArm::open(port)?;
    arm.reset()?;
    arm.set_position(config.home, config.home_speed, false, true)?;

    let mut settings = SettingsStore::new(settings_path.to_path_buf())?;
    let piles = resolve_piles(&mut arm, &mut settings, snack_flag, mask_flag)?;
    log_info!("Snack pile at {}, mask pile at {}", piles.snack, piles.mask);

    let stream = client.status_stream()?;
    let mut controller =
        ReactionController::new(arm, RodioPlayer::new(), sounds, catalog, piles, config);
    controller.run(stream, cancel_token)
}

/// Flag, then remembered value, then ask the operator. Prompted positions are remembered.
fn resolve_piles<A: ArmController>(
    arm: &mut A,
    settings: &mut SettingsStore,
    snack_flag: Option<Position>,
    mask_flag: Option<Position>,
) -> Result<PilePositions> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let mut prompted = false;
    let mut resolve = |flag: Option<Position>, remembered: Option<Position>, label: &str| {
        match flag.or(remembered) {
            Some(position) => Ok(position),
            None => {
                prompted = true;
                prompt_position(&mut *arm, label, &mut input, &mut output)
            }
        }
    };
    let snack = resolve(snack_flag, settings.snack_position(), "Snack Pile")?;
    let mask = resolve(mask_flag, settings.mask_position(), "Mask Pile")?;

    let piles = PilePositions { snack, mask };
    if prompted {
        settings.update_piles(piles)?;
    }
    Ok(piles)
}

fn record_trace(port: &Path, output: &Path, cancel_token: &CancellationToken) -> Result<()> {
    let mut arm = SwiftArm::open(port)?;
    arm.set_servo_detach(true)?;

    println!(
        "Move the robot to a position in which you would like to create a waypoint, \
         then press 'Enter'. To activate the pump, simply hold down the suction cup \
         while also pressing enter."
    );
    println!("Enter 'q' to finish recording");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let trace = record(&mut arm, || {
        if cancel_token.is_cancelled() {
            return Ok(false);
        }
        print!("Press 'Enter' to record waypoint");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        Ok(line.trim() != "q")
    })?;

    trace.save(output)?;
    log_info!("Saved {} waypoints to {}", trace.len(), output.display());
    Ok(())
}

fn play_trace(port: &Path, input: &Path, max_speed: f64) -> Result<()> {
    let trace = MotionTrace::load(input)?;
    let mut arm = SwiftArm::open(port)?;
    let config = ReplayConfig {
        max_speed,
        ..ReplayConfig::default()
    };
    trace
        .play(&mut arm, &config)
        .with_context(|| format!("replay of {} failed", input.display()))?;
    log_info!("Replayed {} waypoints", trace.len());
    Ok(())
}
