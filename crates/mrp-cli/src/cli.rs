//! Command line definition
//!
//! Connection settings fall back to `MRP_URL`, `MRP_TOKEN` and `MRP_TIMEOUT`.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use mrp_client::{ImageType, ParameterRequest, PreseedType};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mrp")]
#[command(about = "Client to the Mr. Provisioner server for provisioning bare-metal machines")]
#[command(version)]
pub struct Cli {
    /// The URL of the MrP server
    #[arg(long, env = "MRP_URL")]
    pub mrp_url: String,

    /// The authentication token to use
    #[arg(long, env = "MRP_TOKEN", hide_env_values = true)]
    pub mrp_token: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "MRP_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// The verbosity of logging output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Do not check the token before running the command
    #[arg(long)]
    pub skip_validation: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query a field of a machine's network interface
    #[command(visible_alias = "ip")]
    Net(NetArgs),

    /// Set provisioning parameters on a machine or provision it
    #[command(visible_alias = "state")]
    Machine(MachineArgs),

    /// Check that a boot image is on MrP, or upload it
    Image(ImageArgs),

    /// Check that a preseed is on MrP, or upload it
    Preseed(PreseedArgs),
}

/// Check for presence, or make present
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Check,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Field {
    Ip,
    Mac,
    Netmask,
    Network,
    /// The whole interface record as JSON
    All,
}

#[derive(Debug, Args)]
pub struct NetArgs {
    /// Machine name
    #[arg(long)]
    pub machine: String,

    /// Interface identifier
    #[arg(long, default_value = "eth1")]
    pub interface: String,

    #[arg(long, value_enum, default_value_t = Field::Ip)]
    pub field: Field,
}

#[derive(Debug, Args)]
pub struct MachineArgs {
    /// Machine name
    #[arg(long)]
    pub machine: String,

    #[command(subcommand)]
    pub action: MachineAction,
}

#[derive(Debug, Subcommand)]
pub enum MachineAction {
    /// Move the machine to the provision state
    Provision,

    /// Update kernel, initrd, preseed and boot options in one request
    SetParameters(ParameterArgs),

    /// Print the provisioning parameters stored on the machine
    GetParameters,
}

#[derive(Debug, Default, Args)]
pub struct ParameterArgs {
    /// Preseed name
    #[arg(long)]
    pub preseed: Option<String>,

    /// Kernel image description
    #[arg(long)]
    pub kernel: Option<String>,

    /// Initrd image description
    #[arg(long)]
    pub initrd: Option<String>,

    /// Kernel command line
    #[arg(long, allow_hyphen_values = true)]
    pub kernel_opts: Option<String>,

    /// Architecture of the kernel and initrd images
    #[arg(long)]
    pub arch: Option<String>,

    #[arg(long)]
    pub subarch: Option<String>,

    /// Boot from the network (default: true)
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub netboot: Option<bool>,
}

impl ParameterArgs {
    pub fn into_request(self) -> ParameterRequest {
        ParameterRequest {
            preseed_name: self.preseed,
            initrd_description: self.initrd,
            kernel_description: self.kernel,
            kernel_opts: self.kernel_opts,
            arch: self.arch,
            subarch: self.subarch,
            netboot_enabled: self.netboot,
        }
    }
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    #[arg(value_enum)]
    pub action: Action,

    /// Kernel, Initrd or Bootloader
    #[arg(long)]
    pub image_type: ImageType,

    /// Description of the image in MrP
    #[arg(long)]
    pub description: String,

    /// Compatible architecture
    #[arg(long)]
    pub arch: String,

    /// Path to the image file to upload
    #[arg(long)]
    pub image_path: Option<PathBuf>,

    /// Mark the image public
    #[arg(
        long,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub public: bool,

    /// Mark the image known good
    #[arg(
        long,
        visible_alias = "knowngood",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub known_good: bool,
}

#[derive(Debug, Args)]
pub struct PreseedArgs {
    #[arg(value_enum)]
    pub action: Action,

    /// Preseed name
    #[arg(long)]
    pub name: String,

    /// preseed or kickstart (upload defaults to preseed)
    #[arg(long)]
    pub preseed_type: Option<PreseedType>,

    /// Path to the preseed file to upload
    #[arg(long)]
    pub path: Option<PathBuf>,

    #[arg(long)]
    pub description: Option<String>,

    /// Mark the preseed public
    #[arg(
        long,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub public: bool,

    /// Mark the preseed known good
    #[arg(
        long,
        visible_alias = "knowngood",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub known_good: bool,
}
