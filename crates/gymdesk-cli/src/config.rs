// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gymdesk_app::ScreenKind;
use gymdesk_view::DEFAULT_SEARCH_LATENCY;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "gymdesk";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LATENCY: &str = "300ms";
const DEFAULT_SEED: u64 = 42;
const DEFAULT_ROWS: i64 = 25;
const MAX_ROWS: i64 = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub demo: Demo,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            search: Search::default(),
            ui: Ui::default(),
            demo: Demo::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
    pub latency: Option<String>,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            latency: Some(DEFAULT_LATENCY.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub default_screen: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            default_screen: Some(ScreenKind::Employees.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Demo {
    pub seed: Option<u64>,
    pub rows: Option<i64>,
}

impl Default for Demo {
    fn default() -> Self {
        Self {
            seed: Some(DEFAULT_SEED),
            rows: Some(DEFAULT_ROWS),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("GYMDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set GYMDESK_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` at the top",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(latency) = &self.search.latency {
            parse_duration(latency)
                .with_context(|| format!("search.latency in {}", path.display()))?;
        }

        if let Some(screen) = &self.ui.default_screen
            && ScreenKind::parse(screen).is_none()
        {
            bail!(
                "ui.default_screen in {} must be one of {}, got {:?}",
                path.display(),
                screen_names(),
                screen
            );
        }

        if let Some(rows) = self.demo.rows
            && !(1..=MAX_ROWS).contains(&rows)
        {
            bail!(
                "demo.rows in {} must be between 1 and {MAX_ROWS}, got {rows}",
                path.display()
            );
        }

        Ok(())
    }

    pub fn search_latency(&self) -> Result<Duration> {
        match &self.search.latency {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_SEARCH_LATENCY),
        }
    }

    pub fn default_screen(&self) -> ScreenKind {
        self.ui
            .default_screen
            .as_deref()
            .and_then(ScreenKind::parse)
            .unwrap_or(ScreenKind::Employees)
    }

    pub fn demo_seed(&self) -> u64 {
        self.demo.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn demo_rows(&self) -> usize {
        self.demo.rows.unwrap_or(DEFAULT_ROWS).clamp(1, MAX_ROWS) as usize
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# gymdesk config\n# Place this file at: {}\n\nversion = 1\n\n[search]\n# Delay before a search result is applied (<N>ms, <N>s or <N>m)\nlatency = \"{DEFAULT_LATENCY}\"\n\n[ui]\n# One of: {}\ndefault_screen = \"employees\"\n\n[demo]\nseed = {DEFAULT_SEED}\nrows = {DEFAULT_ROWS}\n",
            path.display(),
            screen_names(),
        )
    }
}

fn screen_names() -> String {
    ScreenKind::ALL
        .iter()
        .map(|screen| screen.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 300ms or 1s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use gymdesk_app::ScreenKind;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.search_latency()?, Duration::from_millis(300));
        assert_eq!(config.default_screen(), ScreenKind::Employees);
        assert_eq!(config.demo_rows(), 25);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\ndefault_screen = \"members\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        assert!(error.to_string().contains("version = 1"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[search]\nlatency = \"50ms\"\n[ui]\ndefault_screen = \"audit_log\"\n[demo]\nseed = 7\nrows = 12\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.search_latency()?, Duration::from_millis(50));
        assert_eq!(config.default_screen(), ScreenKind::AuditLog);
        assert_eq!(config.demo_seed(), 7);
        assert_eq!(config.demo_rows(), 12);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 3\n")?;
        let error = Config::load(&path).expect_err("v3 config should fail");
        assert!(error.to_string().contains("unsupported config version 3"));
        Ok(())
    }

    #[test]
    fn unknown_default_screen_names_the_key() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\ndefault_screen = \"billing\"\n")?;
        let error = Config::load(&path).expect_err("unknown screen should fail");
        let message = error.to_string();
        assert!(message.contains("ui.default_screen"), "{message}");
        assert!(message.contains("billing"), "{message}");
        Ok(())
    }

    #[test]
    fn demo_rows_must_be_positive() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[demo]\nrows = 0\n")?;
        let error = Config::load(&path).expect_err("zero rows should fail");
        assert!(error.to_string().contains("demo.rows"));
        Ok(())
    }

    #[test]
    fn bad_latency_is_reported_with_its_key() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[search]\nlatency = \"soon\"\n")?;
        let error = Config::load(&path).expect_err("bad latency should fail");
        let message = format!("{error:#}");
        assert!(message.contains("search.latency"), "{message}");
        assert!(message.contains("invalid duration"), "{message}");
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("GYMDESK_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("GYMDESK_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("GYMDESK_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("gymdesk/config.toml"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("0ms")?, Duration::ZERO);
        assert_eq!(parse_duration("300ms")?, Duration::from_millis(300));
        assert_eq!(parse_duration("2s")?, Duration::from_secs(2));
        assert_eq!(parse_duration("1m")?, Duration::from_secs(60));
        assert!(parse_duration("fast").is_err());
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;

        let config = Config::load(&path)?;
        assert_eq!(config.demo_seed(), 42);
        assert_eq!(config.default_screen(), ScreenKind::Employees);
        Ok(())
    }
}
