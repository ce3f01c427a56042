use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "resictl",
    version,
    about = "Control Resi cloud encoders from the command line"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Resi account username (the email used to log in)
    #[arg(long, env = "RESI_USERNAME", global = true)]
    pub username: Option<String>,

    /// Resi account password
    #[arg(long, env = "RESI_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Alternate configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify the configured credentials by authenticating once
    Check,

    /// List the encoders on the account
    Encoders,

    /// List the encoder profiles on the account
    EncoderProfiles,

    /// List the event (stream) profiles on the account
    EventProfiles,

    /// Show the last-known status of one encoder
    Status {
        /// Encoder identifier (see `encoders`)
        encoder_id: String,

        /// Refresh the snapshot even if it is still fresh
        #[arg(long)]
        force: bool,
    },

    /// Start an encoder with an event profile and an encoder profile
    Start {
        /// Encoder identifier (see `encoders`)
        encoder_id: String,

        /// Event (stream) profile to start with (see `event-profiles`)
        #[arg(long, value_name = "UUID")]
        event_profile: String,

        /// Encoder profile to start with (see `encoder-profiles`)
        #[arg(long, value_name = "UUID")]
        encoder_profile: String,

        /// Skip the post-command status check
        #[arg(long)]
        no_verify: bool,
    },

    /// Stop an encoder
    Stop {
        /// Encoder identifier (see `encoders`)
        encoder_id: String,

        /// Skip the post-command status check
        #[arg(long)]
        no_verify: bool,
    },

    /// Poll an encoder and print a line whenever its feedback state changes
    Watch {
        /// Encoder identifier (see `encoders`)
        encoder_id: String,

        /// Poll interval in seconds
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}
