// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands: `serve`, `certs`, `domain`, `jwt`, `version`.

pub mod certs;
pub mod domain;
pub mod jwt;
pub mod serve;

use std::io::Write;

use crate::config::{CertsCommand, Command, DomainCommand};
use crate::registry::bootstrap::BootstrapManager;

/// Run a parsed subcommand against the bootstraps loaded from its flags.
pub async fn run(command: Command, manager: &BootstrapManager) -> anyhow::Result<()> {
    match command {
        Command::Serve(config) => serve::run(config, manager).await,
        Command::Certs(CertsCommand::Retrieve(args)) => {
            manager.initialize_providers().await?;
            let bundle = certs::fetch(&args, manager.registry()).await?;
            certs::emit(&args, &bundle, &mut std::io::stdout().lock())?;
            Ok(())
        }
        Command::Domain(DomainCommand::List(args)) => {
            manager.initialize_providers().await?;
            domain::list(&args, manager.registry(), &mut std::io::stdout().lock())
        }
        Command::Jwt(cmd) => jwt::run(cmd, &mut std::io::stdout().lock()),
        Command::Version => Ok(write_version(&mut std::io::stdout().lock())?),
    }
}

pub fn write_version(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "certgate v{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
