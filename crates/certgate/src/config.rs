// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::registry::bootstrap::BootstrapManager;

/// TLS certificate broker for domains held at a registrar.
#[derive(Debug, Parser)]
#[command(name = "certgate", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "CERTGATE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format (json or text).
    #[arg(long, global = true, env = "CERTGATE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP certificate service.
    Serve(ServeConfig),

    /// Certificate operations.
    #[command(subcommand)]
    Certs(CertsCommand),

    /// Managed domain operations.
    #[command(subcommand)]
    Domain(DomainCommand),

    /// Access token operations.
    #[command(subcommand)]
    Jwt(JwtCommand),

    /// Print the version number.
    Version,
}

/// Configuration for `certgate serve`.
#[derive(Debug, Clone, clap::Args)]
pub struct ServeConfig {
    /// Host to bind on.
    #[arg(long, default_value = "localhost", env = "LISTEN_ADDR")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5000, env = "LISTEN_PORT")]
    pub port: u16,

    /// Secret used to verify bearer tokens.
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret_key: Option<String>,

    /// Upper bound on session lifetime in seconds.
    #[arg(long, default_value_t = 1800, env = "CERTGATE_SESSION_TTL_SECS")]
    pub session_ttl_secs: u64,

    /// Expired-session sweep interval in seconds.
    #[arg(long, default_value_t = 300, env = "CERTGATE_SESSION_SWEEP_SECS")]
    pub session_sweep_secs: u64,
}

impl ServeConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_secs.max(1))
    }

    /// Signing key with blanks treated as unset.
    pub fn signing_key(&self) -> Option<&str> {
        self.jwt_secret_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Subcommand)]
pub enum CertsCommand {
    /// Retrieve the certificate and private key for a domain.
    Retrieve(RetrieveArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct RetrieveArgs {
    /// Domain to retrieve.
    pub domain: String,

    /// Directory to write files into. Prints to stdout when unset.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Keep the certificate and key apart instead of one bundle.
    #[arg(long)]
    pub separate_files: bool,

    /// Certificate file name (default: <domain>.crt).
    #[arg(long)]
    pub cert_file: Option<String>,

    /// Private key file name (default: <domain>.key).
    #[arg(long)]
    pub key_file: Option<String>,

    /// Bundle file name (default: <domain>-bundle.pem).
    #[arg(long, conflicts_with = "separate_files")]
    pub bundle_file: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DomainCommand {
    /// List every managed domain.
    List(ListArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    /// One domain name per line.
    Simple,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Show provider details and registration dates.
    #[arg(long)]
    pub detail: bool,
}

#[derive(Debug, Subcommand)]
pub enum JwtCommand {
    /// Create a signed access token.
    CreateToken(CreateTokenArgs),

    /// Verify a token and print its claims.
    VerifyToken(VerifyTokenArgs),

    /// Generate a random signing secret.
    CreateSecretKey,
}

#[derive(Debug, Clone, clap::Args)]
pub struct CreateTokenArgs {
    /// User the token is issued to.
    #[arg(long)]
    pub user_id: String,

    /// What the token is for.
    #[arg(long)]
    pub description: String,

    /// Comma-separated domain patterns the token may fetch (e.g. example.com,*.example.com).
    #[arg(long)]
    pub allowed_domains: String,

    /// Expiry as a duration (2y, 3months, 5d) or date (YYYY-MM-DD HH:MM:SS, YYYY-MM-DD).
    /// Defaults to one year.
    #[arg(long)]
    pub expires_at: Option<String>,

    /// Signing secret.
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret_key: Option<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct VerifyTokenArgs {
    /// Token to verify.
    pub token: String,

    /// Signing secret. Without one the claims are decoded but not verified.
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret_key: Option<String>,
}

/// Parse `args` with every bootstrap's flags attached to the root command.
///
/// Bootstraps read their values back from the same matches.
pub fn parse_with_bootstraps<I, T>(
    manager: &mut BootstrapManager,
    args: I,
) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cmd = manager.register_flags(Cli::command());
    let matches = cmd.try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    manager.load_flags(&matches);
    Ok(cli)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
