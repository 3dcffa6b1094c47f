use clap::{Args, Subcommand};

use bloomlink_session::{SessionConfig, DEFAULT_DEVICE_PATTERN};
use bloomlink_transport::{BluezRegistry, BtAddr, DEFAULT_RFCOMM_CHANNEL};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod devices;
pub mod reset;
pub mod set_time;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect and stream telemetry records to stdout.
    Watch(WatchArgs),
    /// Send the reset command to the device.
    Reset(ResetArgs),
    /// Set the device clock.
    SetTime(SetTimeArgs),
    /// List bonded devices and show which one would be selected.
    Devices(DevicesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Watch(args) => watch::run(args, format),
        Command::Reset(args) => reset::run(args),
        Command::SetTime(args) => set_time::run(args),
        Command::Devices(args) => devices::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Connection options shared by the device-facing subcommands.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Bonded-device name fragment to match (case-insensitive).
    #[arg(long, default_value = DEFAULT_DEVICE_PATTERN)]
    pub device: String,
    /// Hardware address used when no bonded device matches.
    #[arg(long, value_name = "ADDR")]
    pub fallback: Option<BtAddr>,
    /// RFCOMM channel carrying the serial service.
    #[arg(long, default_value_t = DEFAULT_RFCOMM_CHANNEL)]
    pub channel: u8,
    /// BlueZ storage root to enumerate bonded devices from.
    #[arg(long, value_name = "DIR", default_value = BluezRegistry::DEFAULT_ROOT)]
    pub store: String,
}

impl ConnectArgs {
    pub fn registry(&self) -> BluezRegistry {
        BluezRegistry::with_root(&self.store)
    }

    pub fn to_config(&self) -> SessionConfig {
        let mut config = SessionConfig {
            device_pattern: self.device.clone(),
            rfcomm_channel: self.channel,
            ..SessionConfig::default()
        };
        if let Some(addr) = self.fallback {
            config.fallback_addr = Some(addr);
        }
        config
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Exit after printing N records.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct SetTimeArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Unix timestamp to set instead of the current time.
    #[arg(long, value_name = "SECONDS")]
    pub at: Option<u64>,
}

#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// BlueZ storage root to enumerate bonded devices from.
    #[arg(long, value_name = "DIR", default_value = BluezRegistry::DEFAULT_ROOT)]
    pub store: String,
    /// Name fragment the selection rule matches against.
    #[arg(long, default_value = DEFAULT_DEVICE_PATTERN)]
    pub device: String,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
