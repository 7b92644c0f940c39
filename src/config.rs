use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};

use crate::{remote::HostId, session::PlannerConfig};

const SCHEMA_FILE_NAME: &str = "weft.schema.json";

mod defaults {
    use std::path::PathBuf;

    pub(super) fn snapshot_timeout_ms() -> u64 {
        10_000
    }

    pub(super) fn query_timeout_ms() -> u64 {
        10_000
    }

    pub(super) fn request_timeout_ms() -> u64 {
        30_000
    }

    pub(super) fn log_dir() -> PathBuf {
        PathBuf::from("./logs/weft")
    }

    pub(super) fn log_filter() -> String {
        "info".to_string()
    }

    pub(super) fn retention_days() -> usize {
        14
    }

    pub(super) fn yes() -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(default = "defaults::snapshot_timeout_ms")]
    pub snapshot_timeout_ms: u64,
    #[serde(default = "defaults::query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            snapshot_timeout_ms: defaults::snapshot_timeout_ms(),
            query_timeout_ms: defaults::query_timeout_ms(),
        }
    }
}

impl PlannerSection {
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            snapshot_timeout: Duration::from_millis(self.snapshot_timeout_ms),
            query_timeout: Duration::from_millis(self.query_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteHost {
    pub id: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSection {
    #[serde(default)]
    pub hosts: Vec<RemoteHost>,
    #[serde(default = "defaults::request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            request_timeout_ms: defaults::request_timeout_ms(),
        }
    }
}

impl RemoteSection {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn host_ids(&self) -> Vec<HostId> {
        self.hosts.iter().map(|host| HostId::new(&host.id)).collect()
    }

    pub fn base_urls(&self) -> BTreeMap<HostId, String> {
        self.hosts
            .iter()
            .map(|host| (HostId::new(&host.id), host.base_url.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "defaults::log_dir")]
    pub dir: PathBuf,
    #[serde(default = "defaults::log_filter")]
    pub filter: String,
    #[serde(default = "LogRotation::daily")]
    pub rotation: LogRotation,
    #[serde(default = "defaults::retention_days")]
    pub retention_days: usize,
    #[serde(default = "defaults::yes")]
    pub stderr_warnings: bool,
}

impl LogRotation {
    fn daily() -> Self {
        LogRotation::Daily
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            dir: defaults::log_dir(),
            filter: defaults::log_filter(),
            rotation: LogRotation::Daily,
            retention_days: defaults::retention_days(),
            stderr_warnings: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let raw: serde_json::Value = json5::from_str(&text)
            .with_context(|| format!("config file {} is not valid JSON5", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        check_schema(&raw, &schema_location(base, &raw)?)?;

        let mut config: Config = serde_json::from_value(raw)
            .with_context(|| format!("config file {} has an unexpected shape", path.display()))?;
        config.finish(base)?;
        Ok(config)
    }

    fn finish(&mut self, base: &Path) -> Result<()> {
        if self.planner.snapshot_timeout_ms == 0 || self.planner.query_timeout_ms == 0 {
            bail!("planner timeouts must be positive");
        }
        if self.logging.retention_days == 0 {
            bail!("logging.retention_days must be at least 1");
        }
        if self.logging.dir.is_relative() {
            self.logging.dir = base.join(&self.logging.dir);
        }
        Ok(())
    }
}

fn schema_location(base: &Path, raw: &serde_json::Value) -> Result<PathBuf> {
    if let Some(declared) = raw.get("$schema").and_then(serde_json::Value::as_str) {
        let declared = PathBuf::from(declared);
        if declared.is_relative() {
            return Ok(base.join(declared));
        }
        return Ok(declared);
    }
    let fallback = base.join(SCHEMA_FILE_NAME);
    if fallback.is_file() {
        return Ok(fallback);
    }
    bail!("no $schema entry in the config and no {SCHEMA_FILE_NAME} next to it")
}

fn check_schema(raw: &serde_json::Value, schema_path: &Path) -> Result<()> {
    let schema_text = fs::read_to_string(schema_path)
        .with_context(|| format!("cannot read schema {}", schema_path.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&schema_text)
        .with_context(|| format!("schema {} is not valid JSON", schema_path.display()))?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("schema {} does not compile: {err}", schema_path.display()))?;

    if let Err(violations) = compiled.validate(raw) {
        let mut report = String::new();
        for violation in violations {
            if !report.is_empty() {
                report.push_str("; ");
            }
            report.push_str(&violation.to_string());
        }
        bail!("config rejected by schema: {report}");
    }
    Ok(())
}
