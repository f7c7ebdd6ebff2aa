use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Position;

#[derive(Parser, Debug)]
#[command(name = "maskbot")]
#[command(about = "Hands out snacks to masked people and masks to maskless ones", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Serial device the arm is attached to
    #[arg(short, long, global = true, default_value = "/dev/ttyACM0")]
    pub port: PathBuf,

    /// File remembering pile positions between runs
    #[arg(long, global = true, default_value = "maskbot_settings.json")]
    pub settings: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// React to mask alerts from the analytics server
    React {
        /// URL of the BrainFrame server
        #[arg(short = 'u', long, default_value = "http://localhost")]
        server_url: String,

        /// x, y, z of the snack pile. Prompted for if not given or remembered.
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        snack_position: Option<Vec<f64>>,

        /// x, y, z of the mask pile. Prompted for if not given or remembered.
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        mask_position: Option<Vec<f64>>,

        /// Directory with `good/` and `bad/` folders of mp3 cues
        #[arg(short, long, default_value = "sound_effects")]
        sounds_dir: PathBuf,

        /// Zone whose alerts trigger reactions
        #[arg(short = 'z', long, default_value = "Screen")]
        relevant_zone_name: String,
    },

    /// Record a motion trace by moving the arm by hand
    Record {
        /// Where to write the trace
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replay a recorded motion trace
    Play {
        /// Trace to replay
        #[arg(short, long)]
        input: PathBuf,

        /// Ceiling on replay speed
        #[arg(long, default_value_t = 150.0)]
        max_speed: f64,
    },
}

/// Turn a three-value position flag into a position.
pub fn position_arg(values: Option<&[f64]>) -> Option<Position> {
    match values? {
        &[x, y, z] => Some(Position::new(x, y, z)),
        _ => None,
    }
}
