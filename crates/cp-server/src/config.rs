//! Configuration loading and management.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use cp_core::VehicleSpec;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Port the service listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 12345;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind: SocketAddr,

    /// Fleet loaded at startup, before any `PUT /cars`.
    pub seed_fleet: Vec<VehicleSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            seed_fleet: default_seed_fleet(),
        }
    }
}

/// The boot fleet: a 5, a 4, a 2 and a 6 seater.
fn default_seed_fleet() -> Vec<VehicleSpec> {
    [(1, 5), (4, 4), (3, 2), (2, 6)]
        .into_iter()
        .filter_map(|(id, seats)| VehicleSpec::new(id, seats).ok())
        .collect()
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CARPOOL_*)
        figment = figment.merge(Env::prefixed("CARPOOL_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for carpool.
///
/// On Linux: `~/.config/carpool`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("carpool"))
}
