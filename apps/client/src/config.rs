use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_ENDPOINT_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REPORT_FILE: &str = "JyotishAI_Astrology_Report.pdf";

/// Client configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base location of the prediction service, e.g. `http://127.0.0.1:5000`.
    pub endpoint_base: String,
    pub export_dir: PathBuf,
    pub report_file: String,
    /// No timeout when unset: a hung request keeps the session busy.
    pub request_timeout: Option<Duration>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let endpoint_base = env_or("JYOTISH_ENDPOINT_BASE", DEFAULT_ENDPOINT_BASE);
        reqwest::Url::parse(&endpoint_base)
            .with_context(|| format!("JYOTISH_ENDPOINT_BASE '{endpoint_base}' is not a valid URL"))?;

        let report_file = env_or("JYOTISH_REPORT_FILE", DEFAULT_REPORT_FILE);
        if report_file.trim().is_empty() {
            bail!("JYOTISH_REPORT_FILE must not be empty");
        }

        Ok(Config {
            endpoint_base,
            export_dir: PathBuf::from(env_or("JYOTISH_EXPORT_DIR", ".")),
            report_file,
            request_timeout: parse_timeout(std::env::var("JYOTISH_REQUEST_TIMEOUT_SECS").ok())?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Where the exported report lands.
    pub fn report_path(&self) -> PathBuf {
        self.export_dir.join(&self.report_file)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_timeout(raw: Option<String>) -> Result<Option<Duration>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .context("JYOTISH_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;
    if secs == 0 {
        bail!("JYOTISH_REQUEST_TIMEOUT_SECS must be greater than zero");
    }
    Ok(Some(Duration::from_secs(secs)))
}
