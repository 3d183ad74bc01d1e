// SPDX-License-Identifier: Apache-2.0

use curbmap_query::{BoundingBox, Geofence};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Target region the deployment serves. Defaults cover the São Paulo
/// metropolitan box.
#[derive(Debug, Clone)]
pub struct RegionConfig {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub token: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            north: -23.35,
            south: -24.01,
            east: -46.36,
            west: -46.83,
            token: "são paulo".to_string(),
        }
    }
}

impl RegionConfig {
    #[must_use]
    pub fn geofence(&self) -> Geofence {
        Geofence::new(
            BoundingBox {
                north: self.north,
                south: self.south,
                east: self.east,
                west: self.west,
            },
            self.token.clone(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub provider_base_url: String,
    pub provider_api_key: String,
    pub provider_timeout: Duration,
    pub region: RegionConfig,
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_path: PathBuf::from("curbmap.sqlite3"),
            provider_base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            provider_api_key: String::new(),
            provider_timeout: Duration::from_secs(3),
            region: RegionConfig::default(),
            default_limit: curbmap_api::DEFAULT_LIMIT,
            max_limit: curbmap_api::MAX_LIMIT,
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let region_defaults = RegionConfig::default();
        Self {
            bind_addr: env_string("CURBMAP_BIND_ADDR", &defaults.bind_addr),
            database_path: PathBuf::from(env_string(
                "CURBMAP_DB_PATH",
                &defaults.database_path.to_string_lossy(),
            )),
            provider_base_url: env_string(
                "CURBMAP_PROVIDER_BASE_URL",
                &defaults.provider_base_url,
            ),
            provider_api_key: env_string("CURBMAP_PROVIDER_API_KEY", ""),
            provider_timeout: env_duration_ms("CURBMAP_PROVIDER_TIMEOUT_MS", 3_000),
            region: RegionConfig {
                north: env_f64("CURBMAP_REGION_NORTH", region_defaults.north),
                south: env_f64("CURBMAP_REGION_SOUTH", region_defaults.south),
                east: env_f64("CURBMAP_REGION_EAST", region_defaults.east),
                west: env_f64("CURBMAP_REGION_WEST", region_defaults.west),
                token: env_string("CURBMAP_REGION_TOKEN", &region_defaults.token),
            },
            default_limit: env_u64("CURBMAP_DEFAULT_LIMIT", defaults.default_limit),
            max_limit: env_u64("CURBMAP_MAX_LIMIT", defaults.max_limit),
        }
    }
}
