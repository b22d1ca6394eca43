use derive_builder::Builder;
use std::{env, path::PathBuf};
use thiserror::Error;

pub const LINK_COUNT: usize = 1_000;
pub const BACKGROUND_LINKS: usize = 3_000;
pub const SAMPLE_SIZE: usize = 10;

/// Settings shared by every benchmark.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct BenchConfig {
    /// Links created, updated or deleted by the write workloads.
    #[builder(default = "LINK_COUNT")]
    pub link_count: usize,
    /// Point links created untimed at the start of every iteration.
    #[builder(default = "BACKGROUND_LINKS")]
    pub background_links: usize,
    /// Directory holding the files of the non-volatile stores.
    #[builder(default = "PathBuf::from(\".\")")]
    pub data_dir: PathBuf,
    #[builder(default = "SAMPLE_SIZE")]
    pub sample_size: usize,
    /// Leave the Neo4j backends out instead of failing when no server is up.
    #[builder(default = "false")]
    pub skip_neo4j: bool,
    #[builder(default = "\"united.links\".to_string()")]
    pub united_file: String,
    #[builder(default = "\"split_data.links\".to_string()")]
    pub split_data_file: String,
    #[builder(default = "\"split_index.links\".to_string()")]
    pub split_index_file: String,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be a boolean, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
    #[error("Builder error: {0}")]
    Builder(#[from] BenchConfigBuilderError),
}

impl BenchConfig {
    /// Reads `BENCHMARK_LINK_COUNT`, `BENCHMARK_BACKGROUND_LINKS`,
    /// `BENCHMARK_DATA_DIR` and `BENCHMARK_SKIP_NEO4J` on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = BenchConfigBuilder::default();
        if let Some(value) = var("BENCHMARK_LINK_COUNT") {
            builder.link_count(parse_count("BENCHMARK_LINK_COUNT", value)?);
        }
        if let Some(value) = var("BENCHMARK_BACKGROUND_LINKS") {
            builder.background_links(parse_count("BENCHMARK_BACKGROUND_LINKS", value)?);
        }
        if let Some(value) = var("BENCHMARK_DATA_DIR") {
            builder.data_dir(value);
        }
        if let Some(value) = var("BENCHMARK_SKIP_NEO4J") {
            builder.skip_neo4j(parse_flag("BENCHMARK_SKIP_NEO4J", value)?);
        }
        Ok(builder.build()?)
    }

    pub fn united_path(&self) -> PathBuf {
        self.data_dir.join(&self.united_file)
    }

    /// Data and index file of the split store.
    pub fn split_paths(&self) -> (PathBuf, PathBuf) {
        (
            self.data_dir.join(&self.split_data_file),
            self.data_dir.join(&self.split_index_file),
        )
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            link_count: LINK_COUNT,
            background_links: BACKGROUND_LINKS,
            data_dir: PathBuf::from("."),
            sample_size: SAMPLE_SIZE,
            skip_neo4j: false,
            united_file: "united.links".to_string(),
            split_data_file: "split_data.links".to_string(),
            split_index_file: "split_index.links".to_string(),
        }
    }
}

fn parse_count(name: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}
