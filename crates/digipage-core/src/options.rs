use crate::constants::*;
use crate::types::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Station configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationConfig {
    // Folders
    pub scan_folder: PathBuf,
    pub todays_books_folder: PathBuf,
    pub backup_folder: PathBuf,
    pub completed_log_file: PathBuf,

    // Routing: three-digit city code -> archive root
    pub city_paths: BTreeMap<String, PathBuf>,

    // Workflow
    pub scanner_mode: ScannerMode,

    // File stability probe
    pub stability_timeout_ms: u64,
    pub stability_poll_ms: u64,

    // Passed through to the viewer's pixmap cache
    pub caching_enabled: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            scan_folder: PathBuf::new(),
            todays_books_folder: PathBuf::new(),
            backup_folder: PathBuf::from(DEFAULT_BACKUP_DIR),
            completed_log_file: PathBuf::from(DEFAULT_LOG_FILE),
            city_paths: BTreeMap::new(),
            scanner_mode: ScannerMode::DualScan,
            stability_timeout_ms: DEFAULT_STABILITY_TIMEOUT.as_millis() as u64,
            stability_poll_ms: DEFAULT_STABILITY_INTERVAL.as_millis() as u64,
            caching_enabled: true,
        }
    }
}

impl StationConfig {
    /// Load configuration from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config = serde_json::from_slice(&bytes)
            .map_err(|e| StationError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StationError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Check that the folders exist and the routing table is well formed
    pub fn validate(&self) -> Result<()> {
        check_folder("Scan folder", &self.scan_folder)?;
        check_folder("Today's books folder", &self.todays_books_folder)?;

        for code in self.city_paths.keys() {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_digit()) {
                return Err(StationError::Config(format!(
                    "City code must be three digits: {:?}",
                    code
                )));
            }
        }

        if self.stability_poll_ms == 0 {
            return Err(StationError::Config(
                "Stability poll interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            timeout: Duration::from_millis(self.stability_timeout_ms),
            interval: Duration::from_millis(self.stability_poll_ms),
        }
    }

    /// Scan folder of the split products in single-split mode
    pub fn final_folder(&self) -> PathBuf {
        self.scan_folder.join(FINAL_DIR)
    }
}

fn check_folder(label: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(StationError::Config(format!("{} is not set", label)));
    }
    if !path.is_dir() {
        return Err(StationError::Config(format!(
            "{} does not exist: {}",
            label,
            path.display()
        )));
    }
    Ok(())
}

/// Timing of the file stability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_STABILITY_TIMEOUT,
            interval: DEFAULT_STABILITY_INTERVAL,
        }
    }
}
