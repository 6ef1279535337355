use crate::reaper::ReaperConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_REAPER_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
/// 31 days.
pub const DEFAULT_POISON_RETENTION_HOURS: u64 = 744;
pub const DEFAULT_OVERVIEW_REFRESH_SECS: u64 = 5;

// Control plane configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct ControlPlaneConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub reaper: ReaperConfig,
    pub overview_refresh: Duration,
}

#[derive(Debug, Deserialize)]
struct ControlPlaneConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    reaper_interval_secs: Option<u64>,
    probe_timeout_secs: Option<u64>,
    poison_retention_hours: Option<u64>,
    overview_refresh_secs: Option<u64>,
}

impl ControlPlaneConfig {
    pub fn from_env() -> Result<Self> {
        let metrics_bind = std::env::var("JUNO_CP_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse JUNO_CP_METRICS_BIND")?;
        let bind_addr = std::env::var("JUNO_CP_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8443".to_string())
            .parse()
            .with_context(|| "parse JUNO_CP_BIND")?;
        let reaper_interval_secs =
            env_positive_u64("JUNO_REAPER_INTERVAL_SECS", DEFAULT_REAPER_INTERVAL_SECS)?;
        let probe_timeout_secs =
            env_positive_u64("JUNO_PROBE_TIMEOUT_SECS", DEFAULT_PROBE_TIMEOUT_SECS)?;
        let poison_retention_hours =
            env_positive_u64("JUNO_POISON_RETENTION_HOURS", DEFAULT_POISON_RETENTION_HOURS)?;
        let overview_refresh_secs =
            env_positive_u64("JUNO_OVERVIEW_REFRESH_SECS", DEFAULT_OVERVIEW_REFRESH_SECS)?;
        Ok(Self {
            bind_addr,
            metrics_bind,
            reaper: ReaperConfig {
                tick_interval: Duration::from_secs(reaper_interval_secs),
                probe_timeout: Duration::from_secs(probe_timeout_secs),
                poison_retention: Duration::from_secs(poison_retention_hours * 3600),
            },
            overview_refresh: Duration::from_secs(overview_refresh_secs),
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("JUNO_CP_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read JUNO_CP_CONFIG: {path}"))?;
            let override_cfg: ControlPlaneConfigOverride = serde_yaml::from_str(&contents)
                .with_context(|| "parse control plane config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.reaper_interval_secs {
                anyhow::ensure!(value > 0, "reaper_interval_secs must be positive");
                config.reaper.tick_interval = Duration::from_secs(value);
            }
            if let Some(value) = override_cfg.probe_timeout_secs {
                anyhow::ensure!(value > 0, "probe_timeout_secs must be positive");
                config.reaper.probe_timeout = Duration::from_secs(value);
            }
            if let Some(value) = override_cfg.poison_retention_hours {
                anyhow::ensure!(value > 0, "poison_retention_hours must be positive");
                config.reaper.poison_retention = Duration::from_secs(value * 3600);
            }
            if let Some(value) = override_cfg.overview_refresh_secs {
                anyhow::ensure!(value > 0, "overview_refresh_secs must be positive");
                config.overview_refresh = Duration::from_secs(value);
            }
        }
        Ok(config)
    }
}

fn env_positive_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(value) => {
            let parsed: u64 = value.parse().with_context(|| format!("parse {key}"))?;
            anyhow::ensure!(parsed > 0, "{key} must be positive");
            Ok(parsed)
        }
        Err(_) => Ok(default),
    }
}
