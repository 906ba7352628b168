use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use super::types::CaptureSettings;
use crate::error_handling::types::ConfigError;

/// Application configuration for the gallery service.
///
/// Every field can be set from the command line or from the environment;
/// the env name is listed per field. `validate` must be called before the
/// values are used.
///
/// # Fields Overview
///
/// - `bind_address` / `port`: where the HTTP API listens
/// - `database_path`: SQLite file holding the persisted gallery
/// - `upload_endpoint` / `upload_api_key`: blob-storage provider the
///   encoded GIFs are pushed to
/// - `upload_domain`: provider domain used to build display URLs
/// - `capture`: default capture parameters for new recordings
#[derive(Parser, Debug, Clone)]
pub struct Config {
    /// Network address to bind the server to.
    ///
    /// # Command Line
    /// Use `--bind-address <ADDRESS>` to set this value from the CLI
    #[arg(long, default_value = "127.0.0.1", env = "GIFBOOTH_BIND_ADDRESS")]
    pub bind_address: String,

    /// TCP port for the HTTP API.
    ///
    /// Should not be an IANA-reserved port, so in the range 1024-65535.
    ///
    /// # Command Line
    /// Use `--port <PORT>` to set this value from the CLI
    #[arg(long, default_value_t = 3000, env = "GIFBOOTH_PORT")]
    pub port: u16,

    /// File system path of the SQLite database.
    ///
    /// Created on first use, parent directories included.
    ///
    /// # Command Line
    /// Use `--database-path <PATH>` to set this value from the CLI
    #[arg(long, default_value = "gifs.db", env = "GIFBOOTH_DATABASE")]
    pub database_path: PathBuf,

    /// Upload endpoint of the blob-storage provider.
    ///
    /// # Command Line
    /// Use `--upload-endpoint <URL>` to set this value from the CLI
    #[arg(long, env = "UPLOAD_ENDPOINT")]
    pub upload_endpoint: String,

    /// API key sent with every upload.
    ///
    /// # Command Line
    /// Use `--upload-api-key <KEY>` to set this value from the CLI
    #[arg(long, env = "UPLOAD_API_KEY")]
    pub upload_api_key: String,

    /// Provider domain whose object URLs get a display form.
    ///
    /// # Command Line
    /// Use `--upload-domain <DOMAIN>` to set this value from the CLI
    #[arg(long, env = "UPLOAD_DOMAIN")]
    pub upload_domain: Option<String>,

    #[command(flatten)]
    pub capture: CaptureSettings,
}

impl Config {
    /// Checks ranges and formats, returning the parsed bind address.
    pub fn validate(&self) -> Result<IpAddr, ConfigError> {
        let addr: IpAddr = self.bind_address.parse().map_err(|_| {
            ConfigError::BadIPFormatting(format!("{} is not a valid IP", self.bind_address))
        })?;
        if self.port < 1024 {
            return Err(ConfigError::NotInRange(format!(
                "port {} is reserved, use 1024-65535",
                self.port
            )));
        }
        if self.upload_endpoint.trim().is_empty() {
            return Err(ConfigError::MissingValue("upload endpoint".into()));
        }
        if !(1..=10).contains(&self.capture.quality) {
            return Err(ConfigError::NotInRange(format!(
                "quality {} outside the 1-10 scale",
                self.capture.quality
            )));
        }
        if !(1..=60).contains(&self.capture.frame_rate) {
            return Err(ConfigError::NotInRange(format!(
                "frame rate {} outside 1-60",
                self.capture.frame_rate
            )));
        }
        Ok(addr)
    }
}
