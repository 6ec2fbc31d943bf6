//! Service configuration management

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use metric_simulator::SimulatorConfig;
use panel_selector::PanelKey;

/// Environment variable naming a configuration file
pub const CONFIG_PATH_ENV: &str = "LIVE_DEMO_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// MetricSimulator configuration
    pub simulator: SimulatorConfig,

    /// Service-level configuration
    pub service: ServiceSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Panel shown at startup
    pub initial_panel: PanelKey,

    /// Seed for reproducible metric sequences (entropy when unset)
    pub seed: Option<u64>,

    /// Read panel commands from stdin
    pub read_commands: bool,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json, compact)
    pub format: String,

    /// Log file path (if None, logs to stdout)
    pub file: Option<PathBuf>,
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics
    pub enabled: bool,

    /// Listen address of the Prometheus endpoint
    pub listen_addr: SocketAddr,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            initial_panel: panel_selector::DEFAULT_PANEL,
            seed: None,
            read_commands: true,
            shutdown_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string(), file: None }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: false, listen_addr: SocketAddr::from(([127, 0, 0, 1], 9090)) }
    }
}

/// Command-line overrides, the last configuration layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub interval_ms: Option<u64>,
    pub panel: Option<PanelKey>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub no_stdin: bool,
}

impl ConfigOverrides {
    /// Apply every override that is set
    pub fn apply(&self, config: &mut ServiceConfig) {
        if let Some(seed) = self.seed {
            config.service.seed = Some(seed);
        }
        if let Some(interval_ms) = self.interval_ms {
            config.simulator.interval_ms = interval_ms;
        }
        if let Some(panel) = self.panel {
            config.service.initial_panel = panel;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if self.no_stdin {
            config.service.read_commands = false;
        }
    }
}

/// Load configuration: defaults, then the TOML file, then environment variables, then
/// `overrides`. The result is validated once, after every layer is applied.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ServiceConfig> {
    load_layered(path, |key| std::env::var(key).ok(), overrides)
}

/// Same as [`load_config`] with environment variables read through `lookup`
pub fn load_layered<F>(
    path: Option<&Path>,
    lookup: F,
    overrides: &ConfigOverrides,
) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let env_path = lookup(CONFIG_PATH_ENV).map(PathBuf::from);

    let mut config = match path.map(Path::to_path_buf).or(env_path) {
        Some(config_file) => {
            tracing::debug!("Loading configuration from file: {:?}", config_file);
            load_from_file(&config_file)?
        }
        None => ServiceConfig::default(),
    };

    apply_env(&mut config, lookup)?;
    overrides.apply(&mut config);

    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {path:?}"))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse configuration file: {path:?}"))
}

/// Apply `LIVE_DEMO_*` overrides using `lookup` to read variables
pub fn apply_env<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup("LIVE_DEMO_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("LIVE_DEMO_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(interval) = lookup("LIVE_DEMO_INTERVAL_MS") {
        config.simulator.interval_ms = interval
            .parse()
            .with_context(|| format!("Invalid LIVE_DEMO_INTERVAL_MS: {interval}"))?;
    }

    if let Some(seed) = lookup("LIVE_DEMO_SEED") {
        config.service.seed =
            Some(seed.parse().with_context(|| format!("Invalid LIVE_DEMO_SEED: {seed}"))?);
    }

    if let Some(panel) = lookup("LIVE_DEMO_INITIAL_PANEL") {
        config.service.initial_panel = panel.parse()?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    config.simulator.validate()?;

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.logging.level.trim().is_empty() {
        return Err(anyhow!("Log level must not be empty"));
    }

    if config.metrics.enabled && config.metrics.listen_addr.port() == 0 {
        return Err(anyhow!("Invalid metrics port: {}", config.metrics.listen_addr));
    }

    Ok(())
}

/// Save configuration to a TOML file
pub fn save_config(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write configuration file: {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.initial_panel, PanelKey::Rtls);
        assert_eq!(config.simulator.interval_ms, 4000);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        let lookup = lookup_from(&[
            ("LIVE_DEMO_LOG_LEVEL", "debug"),
            ("LIVE_DEMO_LOG_FORMAT", "json"),
            ("LIVE_DEMO_INTERVAL_MS", "250"),
            ("LIVE_DEMO_SEED", "99"),
            ("LIVE_DEMO_INITIAL_PANEL", "analytics"),
        ]);

        apply_env(&mut config, lookup).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.simulator.interval_ms, 250);
        assert_eq!(config.service.seed, Some(99));
        assert_eq!(config.service.initial_panel, PanelKey::Analytics);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let mut config = ServiceConfig::default();
        assert!(apply_env(&mut config, lookup_from(&[("LIVE_DEMO_SEED", "abc")])).is_err());
        assert!(apply_env(&mut config, lookup_from(&[("LIVE_DEMO_INITIAL_PANEL", "lobby")]))
            .is_err());
    }

    #[test]
    fn test_validation_rejects_bad_format() {
        let mut config = ServiceConfig::default();
        config.logging.format = "xml".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_checks_simulator() {
        let mut config = ServiceConfig::default();
        config.simulator.interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live-demo.toml");

        let mut config = ServiceConfig::default();
        config.service.seed = Some(7);
        config.service.initial_panel = PanelKey::Mapping;
        config.simulator.interval_ms = 1000;

        save_config(&config, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live-demo.toml");
        std::fs::write(
            &path,
            "[service]\ninitial_panel = \"scheduling\"\n\n[simulator]\ninterval_ms = 500\n",
        )
        .unwrap();

        let loaded = load_layered(Some(&path), lookup_from(&[]), &ConfigOverrides::default())
            .unwrap();
        assert_eq!(loaded.service.initial_panel, PanelKey::Scheduling);
        assert_eq!(loaded.simulator.interval_ms, 500);
        assert_eq!(loaded.logging, LoggingConfig::default());
    }

    #[test]
    fn test_overrides_replace_invalid_env_values() {
        let lookup = lookup_from(&[
            ("LIVE_DEMO_LOG_FORMAT", "xml"),
            ("LIVE_DEMO_INTERVAL_MS", "0"),
        ]);
        let overrides = ConfigOverrides {
            interval_ms: Some(100),
            log_format: Some("json".to_string()),
            ..Default::default()
        };

        let config = load_layered(None, lookup, &overrides).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.simulator.interval_ms, 100);
    }

    #[test]
    fn test_invalid_env_values_fail_without_overrides() {
        let lookup = lookup_from(&[("LIVE_DEMO_LOG_FORMAT", "xml")]);
        assert!(load_layered(None, &lookup, &ConfigOverrides::default()).is_err());

        let overrides = ConfigOverrides { interval_ms: Some(0), ..Default::default() };
        assert!(load_layered(None, lookup_from(&[]), &overrides).is_err());
    }

    #[test]
    fn test_overrides_win_over_file_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live-demo.toml");
        std::fs::write(&path, "[service]\nseed = 1\ninitial_panel = \"mapping\"\n").unwrap();

        let lookup = lookup_from(&[
            (CONFIG_PATH_ENV, path.to_str().unwrap()),
            ("LIVE_DEMO_SEED", "2"),
        ]);
        let overrides = ConfigOverrides {
            seed: Some(3),
            panel: Some(PanelKey::Analytics),
            no_stdin: true,
            ..Default::default()
        };

        let config = load_layered(None, lookup, &overrides).unwrap();
        assert_eq!(config.service.seed, Some(3));
        assert_eq!(config.service.initial_panel, PanelKey::Analytics);
        assert!(!config.service.read_commands);
    }
}
