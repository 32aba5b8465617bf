//! Subcommand handlers
//!
//! Handlers return what to print instead of printing it, so `main` owns
//! stdout and the exit code.

use crate::cli::{Action, Cli, Command, Field, ImageArgs, MachineAction, MachineArgs, NetArgs, PreseedArgs};
use anyhow::{Context, Result};
use mrp_client::{MrpClient, MrpError, Netmask, PreseedType};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Result of a command that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print this to stdout, exit 0
    Output(String),
    /// The queried thing does not exist: print `False`, exit 2
    Absent,
}

impl Outcome {
    fn found(found: bool) -> Self {
        if found {
            Outcome::Output("True".to_string())
        } else {
            Outcome::Absent
        }
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<Outcome> {
    Ok(Outcome::Output(serde_json::to_string_pretty(value)?))
}

/// Build the client and check the token unless told not to
pub async fn connect(cli: &Cli) -> Result<MrpClient> {
    let client = MrpClient::new(
        cli.mrp_url.clone(),
        cli.mrp_token.clone(),
        Duration::from_secs(cli.timeout),
    )
    .context("Failed to create MrP client")?;

    if cli.skip_validation {
        debug!("Skipping token validation");
    } else {
        client
            .validate_token()
            .await
            .with_context(|| format!("Cannot use MrP at {}", cli.mrp_url))?;
    }

    Ok(client)
}

pub async fn dispatch(client: &MrpClient, command: Command) -> Result<Outcome> {
    match command {
        Command::Net(args) => net(client, args).await,
        Command::Machine(args) => machine(client, args).await,
        Command::Image(args) => image(client, args).await,
        Command::Preseed(args) => preseed(client, args).await,
    }
}

async fn net(client: &MrpClient, args: NetArgs) -> Result<Outcome> {
    let resolver = client.resolver();
    let machine_id = resolver.resolve_machine_id(&args.machine).await?;
    let interface = resolver
        .resolve_interface(machine_id, &args.interface)
        .await?;

    let value = match args.field {
        Field::Ip => interface.ip().map(str::to_string),
        Field::Mac => interface.mac().map(str::to_string),
        Field::Netmask => match interface.netmask() {
            Netmask::Missing => None,
            mask => Some(mask.to_string()),
        },
        Field::Network => match interface.network() {
            Ok(network) => Some(network.to_string()),
            Err(MrpError::Incomplete(reason)) => {
                debug!("No network for {}: {}", args.interface, reason);
                None
            }
            Err(e) => return Err(e.into()),
        },
        Field::All => return pretty(&interface),
    };

    Ok(value.map_or(Outcome::Absent, Outcome::Output))
}

async fn machine(client: &MrpClient, args: MachineArgs) -> Result<Outcome> {
    let machine_id = client.resolver().resolve_machine_id(&args.machine).await?;
    let state = client.state();

    match args.action {
        MachineAction::Provision => {
            let ack = state
                .provision_machine(machine_id)
                .await
                .with_context(|| format!("Provisioning '{}' was not accepted", args.machine))?;
            pretty(&ack)
        }
        MachineAction::SetParameters(parameters) => {
            let updated = state
                .set_machine_parameters(machine_id, &parameters.into_request())
                .await
                .with_context(|| format!("Failed to set parameters on '{}'", args.machine))?;
            info!("Parameters set on machine {}", args.machine);
            pretty(&updated)
        }
        MachineAction::GetParameters => {
            let machine = state.get_parameters(machine_id).await?;
            let mut report = serde_json::to_value(machine.parameters())?;
            if let Some(fields) = report.as_object_mut() {
                for (key, value) in [("arch", machine.arch()), ("state", machine.state())] {
                    if let Some(value) = value {
                        fields.insert(key.to_string(), Value::String(value.to_string()));
                    }
                }
            }
            pretty(&report)
        }
    }
}

async fn image(client: &MrpClient, args: ImageArgs) -> Result<Outcome> {
    let images = client.images();

    match args.action {
        Action::Check => {
            let found = images
                .find_image(&args.description, args.image_type, &args.arch)
                .await?;
            Ok(Outcome::found(found.is_some()))
        }
        Action::Upload => {
            let image = images
                .ensure_image(
                    args.image_type,
                    &args.description,
                    &args.arch,
                    args.image_path.as_deref(),
                    args.public,
                    args.known_good,
                )
                .await?;
            pretty(&image)
        }
    }
}

async fn preseed(client: &MrpClient, args: PreseedArgs) -> Result<Outcome> {
    let preseeds = client.preseeds();

    match args.action {
        Action::Check => {
            let found = preseeds.find_preseed(&args.name, args.preseed_type).await?;
            Ok(Outcome::found(found.is_some()))
        }
        Action::Upload => {
            let preseed = preseeds
                .ensure_preseed(
                    &args.name,
                    args.path.as_deref(),
                    args.preseed_type.unwrap_or(PreseedType::Preseed),
                    args.description.as_deref(),
                    args.public,
                    args.known_good,
                )
                .await?;
            pretty(&preseed)
        }
    }
}
