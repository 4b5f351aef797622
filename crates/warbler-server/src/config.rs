use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

const DEV_SECRET: &str = "dev-secret-change-me";

pub struct Config {
    pub db_path: PathBuf,
    pub secret_key: String,
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
}

impl Config {
    /// Reads `WARBLER_*` variables, falling back to development defaults.
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("WARBLER_SECRET_KEY").unwrap_or_else(|_| {
            warn!("WARBLER_SECRET_KEY not set, using the development secret");
            DEV_SECRET.into()
        });
        let db_path = std::env::var("WARBLER_DB_PATH").unwrap_or_else(|_| "warbler.db".into());
        let host = std::env::var("WARBLER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("WARBLER_PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .context("WARBLER_PORT must be a port number")?;
        let static_dir = std::env::var("WARBLER_STATIC_DIR").unwrap_or_else(|_| "static".into());

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            db_path: PathBuf::from(db_path),
            secret_key,
            addr,
            static_dir: PathBuf::from(static_dir),
        })
    }
}
