//! Command dispatch: bridges CLI args -> core browser -> output formatting.

pub mod config_cmd;
pub mod dependents;
pub mod instances;

use std::sync::Arc;

use cmsim_core::SimulatorClient;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a simulator-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: Arc<SimulatorClient>,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Instances(args) => instances::handle(client, session, args, global).await,
        Command::Devices(args) => dependents::handle_devices(client, session, args, global).await,
        Command::Stations(args) => dependents::handle_stations(client, session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
