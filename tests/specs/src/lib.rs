// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Runs the real `certgate` binary as a subprocess, either as a one-shot
//! command or as a long-running server exercised over HTTP.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

/// Resolve the path to the compiled `certgate` binary.
pub fn certgate_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("certgate")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Base command with every variable the binary reads cleared.
fn base_command() -> anyhow::Result<Command> {
    let binary = certgate_binary();
    anyhow::ensure!(binary.exists(), "certgate binary not found at {}", binary.display());

    let mut cmd = Command::new(binary);
    for var in [
        "JWT_SECRET_KEY",
        "LISTEN_ADDR",
        "LISTEN_PORT",
        "PORKBUN_API_KEY",
        "PORKBUN_SECRET_KEY",
        "PORKBUN_DOMAINS",
        "PORKBUN_API_URL",
        "CERTGATE_LOG_LEVEL",
        "CERTGATE_LOG_FORMAT",
    ] {
        cmd.env_remove(var);
    }
    cmd.args(["--log-level", "warn"]);
    Ok(cmd)
}

/// Run a one-shot command to completion and capture its output.
pub fn run(args: &[&str]) -> anyhow::Result<Output> {
    Ok(base_command()?.args(args).stdin(Stdio::null()).output()?)
}

/// Stdout of a command that must succeed.
pub fn run_ok(args: &[&str]) -> anyhow::Result<String> {
    let out = run(args)?;
    anyhow::ensure!(
        out.status.success(),
        "certgate {args:?} failed ({}): {}",
        out.status,
        String::from_utf8_lossy(&out.stderr)
    );
    Ok(String::from_utf8(out.stdout)?)
}

/// A running `certgate serve` process that is killed on drop.
pub struct CertgateServer {
    child: Child,
    port: u16,
}

impl CertgateServer {
    /// Start `certgate serve` on a free port with `extra` appended.
    pub fn start(signing_key: &str, extra: &[&str]) -> anyhow::Result<Self> {
        certgate::ensure_crypto_provider();
        let port = free_port()?;

        let child = base_command()?
            .args(["serve", "--host", "127.0.0.1", "--port", &port.to_string()])
            .args(["--jwt-secret-key", signing_key])
            .args(extra)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Poll health until responsive.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("certgate did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Wait for the process to exit within `timeout`.
    pub async fn wait_exit(&mut self, timeout: Duration) -> anyhow::Result<std::process::ExitStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("certgate did not exit within {timeout:?}");
            }
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Send SIGTERM via the `kill` utility.
    pub fn terminate(&self) -> anyhow::Result<()> {
        let status = Command::new("kill").args(["-TERM", &self.child.id().to_string()]).status()?;
        anyhow::ensure!(status.success(), "kill -TERM failed: {status}");
        Ok(())
    }
}

impl Drop for CertgateServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
