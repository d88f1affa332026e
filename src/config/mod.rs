mod init;
mod schema;

pub use init::write_default_config;
pub use schema::{ColumnsConfig, Config, OutputConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::table::ColumnAliases;
use crate::tariff::TariffSchedule;

/// Get the config directory path (~/.config/freight-audit/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("freight-audit"))
}

/// Get the default config file path (~/.config/freight-audit/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path and
///   falls back to built-in defaults when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        None => match get_config_path() {
            Ok(p) if p.exists() => p,
            _ => {
                tracing::debug!("no config file, using built-in defaults");
                return Ok(Config::default());
            }
        },
    };

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

/// Validated, ready-to-use settings derived from a [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub schedule: TariffSchedule,
    pub aliases: ColumnAliases,
    pub output: OutputConfig,
}

impl Config {
    /// Validate every section and build the runtime settings.
    /// Returns all validation errors at once (not just the first).
    pub fn resolve(&self) -> Result<Settings, Vec<String>> {
        let mut errors = Vec::new();

        let schedule = match &self.tariff {
            Some(tariff) => TariffSchedule::from_config(tariff)
                .map_err(|e| errors.extend(e))
                .ok(),
            None => Some(TariffSchedule::default()),
        };
        let aliases = ColumnAliases::with_extra(&self.columns.aliases)
            .map_err(|e| errors.extend(e))
            .ok();
        if let Err(e) = self.output.validate() {
            errors.extend(e);
        }

        match (schedule, aliases) {
            (Some(schedule), Some(aliases)) if errors.is_empty() => Ok(Settings {
                schedule,
                aliases,
                output: self.output.clone(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_config_resolves() {
        let settings = Config::default().resolve().unwrap();
        assert_eq!(settings.schedule, TariffSchedule::default());
        assert_eq!(settings.output.suffix, "_processed");
    }

    #[test]
    fn test_resolve_collects_errors_from_all_sections() {
        let mut tariff = TariffSchedule::default().to_config();
        tariff.overage.pop();
        let mut aliases = BTreeMap::new();
        aliases.insert("Envio".to_string(), "Shipment".to_string());

        let config = Config {
            tariff: Some(tariff),
            columns: ColumnsConfig { aliases },
            output: OutputConfig {
                sheet_summary: "Processed Data".to_string(),
                ..OutputConfig::default()
            },
        };
        let errors = config.resolve().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("tariff.overage"));
        assert!(errors[1].contains("columns.aliases.Envio"));
        assert!(errors[2].contains("must differ"));
    }

    #[test]
    fn test_invalid_sheet_name_rejected_at_startup() {
        let yaml = "output:\n  sheet_processed: \"Datos: procesados [marzo 2024]\"\n";
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        let errors = config.resolve().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("output.sheet_processed"));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = load_config(Some(PathBuf::from("/nonexistent/freight-audit.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "output:\n  suffix: \"_audit\"\n").unwrap();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.output.suffix, "_audit");
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "output: [not, a, map]\n").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
