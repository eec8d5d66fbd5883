use anyhow::{bail, Result};

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, BackendsController, RemoteController};

pub struct Router<'a> {
    ask_controller: AskController<'a>,
    backends_controller: BackendsController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            ask_controller: AskController::new(container),
            backends_controller: BackendsController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Ask {
                query,
                target,
                temperature,
                ..
            } => self.ask_controller.ask(query, target, temperature).await,
            Commands::Backends { .. } => self.backends_controller.list().await,
            Commands::Serve { .. } => bail!("serve runs the HTTP server and has no command output"),
        }
    }
}

/// Dispatches commands to a running server; no local container is built.
pub async fn route_remote(remote: &RemoteController, command: Commands) -> Result<String> {
    match command {
        Commands::Ask {
            query,
            target,
            temperature,
            ..
        } => remote.ask(query, target, temperature).await,
        Commands::Backends { .. } => remote.list().await,
        Commands::Serve { .. } => bail!("serve runs the HTTP server and has no command output"),
    }
}
