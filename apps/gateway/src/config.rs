use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use smsgw_core::BridgeConfig;
use smsgw_dispatch::CallbackHost;

/// Runtime configuration of the gateway binary, read from the environment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket the HTTP server binds to.
    pub addr: SocketAddr,
    /// Scheme of the public callback address handed to providers.
    pub public_scheme: String,
    /// Host of the public callback address.
    pub public_host: String,
    /// Port of the public callback address.
    pub public_port: u16,
    /// Upper bound on one provider send.
    pub send_timeout: Duration,
    /// Optional JSON file seeding bridge configurations at startup.
    pub seed_file: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let addr: SocketAddr = env_or("SMSGW_BIND", "0.0.0.0:9191")
            .parse()
            .context("invalid SMSGW_BIND")?;
        let public_port = match std::env::var("SMSGW_PUBLIC_PORT") {
            Ok(raw) => raw.parse().context("invalid SMSGW_PUBLIC_PORT")?,
            Err(_) => addr.port(),
        };
        let send_timeout_secs: u64 = env_or("SMSGW_SEND_TIMEOUT_SECS", "10")
            .parse()
            .context("invalid SMSGW_SEND_TIMEOUT_SECS")?;

        Ok(Self {
            addr,
            public_scheme: env_or("SMSGW_PUBLIC_SCHEME", "http"),
            public_host: env_or("SMSGW_PUBLIC_HOST", "localhost"),
            public_port,
            send_timeout: Duration::from_secs(send_timeout_secs.max(1)),
            seed_file: std::env::var("SMSGW_SEED_FILE").ok().map(PathBuf::from),
        })
    }

    /// Callback address handed to providers; the report URL shape built from
    /// it is the join key for delivery reports.
    pub fn callback_host(&self) -> CallbackHost {
        CallbackHost::new(
            self.public_scheme.clone(),
            self.public_host.clone(),
            self.public_port,
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Seed data loaded at startup in lieu of real persistence.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub bridges: Vec<BridgeConfig>,
}

impl SeedData {
    pub fn load(path: &PathBuf) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read seed file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse seed file {}", path.display()))
    }
}
