use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};
use crate::tariff::TariffSchedule;

/// The config written by `init`: every section spelled out with the
/// built-in values so operators have something to edit.
pub fn default_config() -> Config {
    Config {
        tariff: Some(TariffSchedule::default().to_config()),
        ..Config::default()
    }
}

/// Write the default config file.
///
/// If `path` is None, the default config path is used. An existing file is
/// only replaced when `force` is set. Returns the path written.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    let yaml = serde_saphyr::to_string(&default_config())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    write_atomic(&config_path, yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), "config written");
    Ok(config_path)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = AtomicWriteFile::open(path)?;
    file.write_all(bytes)?;
    file.commit()
}
