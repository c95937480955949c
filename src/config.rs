//! Server configuration.
//!
//! Values are layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config`)
//! 3. `IMAGE_UPLOADER_*` environment variables
//! 4. Command line flags

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "IMAGE_UPLOADER";
const DEFAULT_BIND: &str = "127.0.0.1:5000";
/// Matches the request body ceiling most web frameworks ship with.
const DEFAULT_MAX_UPLOAD_BYTES: i64 = 30_000_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,
    /// Root for `uploads/` and `images.json`.
    pub data_dir: PathBuf,
    /// Maximum accepted request body size for uploads.
    pub max_upload_bytes: usize,
    /// When set, logs are also written to a daily rolling file here.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> crate::error::Result<Self> {
        Self::load_with_env(file, overrides, None)
    }

    /// `env` replaces the process environment when set.
    fn load_with_env(
        file: Option<&Path>,
        overrides: &Overrides,
        env: Option<config::Map<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("bind", DEFAULT_BIND)?
            .set_default("data_dir", default_data_dir().to_string_lossy().to_string())?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("bind", overrides.bind.map(|bind| bind.to_string()))?
            .set_override_option(
                "data_dir",
                overrides
                    .data_dir
                    .as_ref()
                    .map(|dir| dir.to_string_lossy().to_string()),
            )?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("image-uploader"))
        .unwrap_or_else(|| PathBuf::from("data"))
}
