use crate::error::Result;
use crate::processors::JoinMode;
use crate::utils::constants::{
    COMPRESSION_SNAPPY, CONFIG_ENV_PREFIX, CONFIG_FILE_STEM, DEFAULT_END_TIME,
    DEFAULT_SNAPSHOT_TOLERANCE_MINUTES, DEFAULT_SPAN_MINUTES, DEFAULT_START_TIME,
    DEFAULT_STEP_MINUTES, DEFAULT_TOLERANCE_MINUTES,
};
use crate::utils::time::{checked_minutes, non_negative_minutes, parse_instant};
use chrono::{Duration, NaiveDateTime};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Frame and window settings shared by every subcommand.
///
/// Sources, lowest precedence first: built-in defaults, a config file
/// (`--config`, else `eclipse-obs.{toml,yaml,json}` if present), then
/// `ECLIPSE_OBS_*` environment variables. Command-line flags are applied on
/// top by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    pub start: String,
    pub end: String,

    #[validate(range(min = 1))]
    pub step_minutes: i64,

    #[validate(range(min = 0))]
    pub span_minutes: i64,

    #[validate(range(min = 0))]
    pub tolerance_minutes: i64,

    #[validate(range(min = 0))]
    pub snapshot_tolerance_minutes: i64,

    pub join_mode: JoinMode,

    pub compression: String,

    #[validate(range(min = 1))]
    pub max_workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_TIME.to_string(),
            end: DEFAULT_END_TIME.to_string(),
            step_minutes: DEFAULT_STEP_MINUTES,
            span_minutes: DEFAULT_SPAN_MINUTES,
            tolerance_minutes: DEFAULT_TOLERANCE_MINUTES,
            snapshot_tolerance_minutes: DEFAULT_SNAPSHOT_TOLERANCE_MINUTES,
            join_mode: JoinMode::default(),
            compression: COMPRESSION_SNAPPY.to_string(),
            max_workers: num_cpus::get(),
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("start", defaults.start.as_str())?
            .set_default("end", defaults.end.as_str())?
            .set_default("step_minutes", defaults.step_minutes)?
            .set_default("span_minutes", defaults.span_minutes)?
            .set_default("tolerance_minutes", defaults.tolerance_minutes)?
            .set_default(
                "snapshot_tolerance_minutes",
                defaults.snapshot_tolerance_minutes,
            )?
            .set_default("join_mode", defaults.join_mode.to_string())?
            .set_default("compression", defaults.compression.as_str())?
            .set_default("max_workers", defaults.max_workers as i64)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(CONFIG_FILE_STEM).required(false)),
        };

        let config: AppConfig = builder
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn start_time(&self) -> Result<NaiveDateTime> {
        parse_instant(&self.start)
    }

    pub fn end_time(&self) -> Result<NaiveDateTime> {
        parse_instant(&self.end)
    }

    pub fn step(&self) -> Result<Duration> {
        checked_minutes("step", self.step_minutes)
    }

    pub fn span(&self) -> Result<Duration> {
        non_negative_minutes("span", self.span_minutes)
    }

    pub fn tolerance(&self) -> Result<Duration> {
        non_negative_minutes("tolerance", self.tolerance_minutes)
    }

    pub fn snapshot_tolerance(&self) -> Result<Duration> {
        non_negative_minutes("snapshot tolerance", self.snapshot_tolerance_minutes)
    }
}
