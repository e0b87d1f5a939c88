//! Planner configuration

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Smallest footer cache, whatever the number of input files
pub const MIN_FOOTER_CACHE_SIZE: usize = 100;

pub const FOOTER_PARALLELISM_ENV: &str = "PARQUET_PLANNER_FOOTER_PARALLELISM";
pub const MIN_FOOTER_CACHE_SIZE_ENV: &str = "PARQUET_PLANNER_MIN_FOOTER_CACHE_SIZE";

/// One footer reader thread per CPU
pub fn default_footer_parallelism() -> usize {
    num_cpus::get().max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Threads reading footers concurrently
    pub footer_parallelism: usize,
    /// Lower bound of the footer cache capacity
    pub min_footer_cache_size: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            footer_parallelism: default_footer_parallelism(),
            min_footer_cache_size: MIN_FOOTER_CACHE_SIZE,
        }
    }
}

impl PlannerConfig {
    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder::new()
    }

    /// Defaults overridden by `PARQUET_PLANNER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = PlannerConfigBuilder::new();
        if let Some(value) = lookup(FOOTER_PARALLELISM_ENV) {
            builder = builder.with_footer_parallelism(parse_count(FOOTER_PARALLELISM_ENV, &value)?);
        }
        if let Some(value) = lookup(MIN_FOOTER_CACHE_SIZE_ENV) {
            builder =
                builder.with_min_footer_cache_size(parse_count(MIN_FOOTER_CACHE_SIZE_ENV, &value)?);
        }
        builder.build()
    }

    pub fn validate(&self) -> Result<()> {
        if self.footer_parallelism == 0 {
            return Err(PlannerError::config("footer_parallelism must be at least 1"));
        }
        if self.min_footer_cache_size == 0 {
            return Err(PlannerError::config("min_footer_cache_size must be at least 1"));
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|e| {
        PlannerError::config(format!("{}='{}' is not a valid count: {}", key, value, e))
    })
}

/// Builder for a validated [`PlannerConfig`]
#[derive(Debug, Clone, Default)]
pub struct PlannerConfigBuilder {
    footer_parallelism: Option<usize>,
    min_footer_cache_size: Option<usize>,
}

impl PlannerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of footer reader threads
    pub fn with_footer_parallelism(mut self, threads: usize) -> Self {
        self.footer_parallelism = Some(threads);
        self
    }

    /// Set the lower bound of the footer cache capacity
    pub fn with_min_footer_cache_size(mut self, size: usize) -> Self {
        self.min_footer_cache_size = Some(size);
        self
    }

    pub fn build(self) -> Result<PlannerConfig> {
        let config = PlannerConfig {
            footer_parallelism: self
                .footer_parallelism
                .unwrap_or_else(default_footer_parallelism),
            min_footer_cache_size: self.min_footer_cache_size.unwrap_or(MIN_FOOTER_CACHE_SIZE),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.min_footer_cache_size, MIN_FOOTER_CACHE_SIZE);
        assert!(config.footer_parallelism >= 1);
        assert_eq!(PlannerConfig::builder().build().unwrap(), config);
    }

    #[test]
    fn test_builder_validates() {
        let err = PlannerConfig::builder()
            .with_footer_parallelism(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));

        let config = PlannerConfig::builder()
            .with_footer_parallelism(3)
            .with_min_footer_cache_size(10)
            .build()
            .unwrap();
        assert_eq!(config.footer_parallelism, 3);
        assert_eq!(config.min_footer_cache_size, 10);
    }

    #[test]
    fn test_from_lookup() {
        let config = PlannerConfig::from_lookup(lookup(&[
            (FOOTER_PARALLELISM_ENV, "6"),
            (MIN_FOOTER_CACHE_SIZE_ENV, " 500 "),
        ]))
        .unwrap();
        assert_eq!(config.footer_parallelism, 6);
        assert_eq!(config.min_footer_cache_size, 500);

        let err = PlannerConfig::from_lookup(lookup(&[(FOOTER_PARALLELISM_ENV, "many")]))
            .unwrap_err();
        assert!(err.to_string().contains(FOOTER_PARALLELISM_ENV));

        let config = PlannerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_serde_defaults_missing_fields() {
        let config: PlannerConfig = serde_json::from_str(r#"{"footer_parallelism": 2}"#).unwrap();
        assert_eq!(config.footer_parallelism, 2);
        assert_eq!(config.min_footer_cache_size, MIN_FOOTER_CACHE_SIZE);
    }
}
