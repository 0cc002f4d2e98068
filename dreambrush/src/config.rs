use std::path::PathBuf;

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};

/// Process-wide configuration, read once in `main` and passed down. The
/// component code never touches the environment itself.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub sd_host: String,
    pub sd_port: u16,
    pub output_root: PathBuf,
}

pub const DEFAULT_SD_HOST: &str = "127.0.0.1";
pub const DEFAULT_SD_PORT: u16 = 7860;

impl Config {
    pub fn from_env() -> Result<Self> {
        let gemini_api_key =
            std::env::var("GEMINI_API_KEY").map_err(|_| eyre!("GEMINI_API_KEY not set"))?;

        let sd_host = std::env::var("SD_HOST").unwrap_or_else(|_| DEFAULT_SD_HOST.into());
        let sd_port = match std::env::var("SD_PORT") {
            Ok(port) => port.parse().context("parsing SD_PORT")?,
            Err(_) => DEFAULT_SD_PORT,
        };

        Ok(Self {
            gemini_api_key,
            sd_host,
            sd_port,
            output_root: PathBuf::from("generated"),
        })
    }
}
