//! Worker configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use hoopshot_tracker::ShotTrackerConfig;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Maximum detection logs processed concurrently
    pub max_concurrent_jobs: usize,
    /// Directory receiving `<stem>.shots.json` results
    pub output_dir: PathBuf,
    /// Optional JSON file overriding tracker thresholds
    pub tracker_config_path: Option<PathBuf>,
    /// Prometheus listener; metrics are not exported when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            output_dir: PathBuf::from("./shots"),
            tracker_config_path: None,
            metrics_addr: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_jobs: lookup("WORKER_MAX_JOBS")
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_concurrent_jobs),
            output_dir: lookup("WORKER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            tracker_config_path: lookup("WORKER_TRACKER_CONFIG")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            metrics_addr: lookup("METRICS_ADDR").and_then(|s| s.parse().ok()),
        }
    }

    /// Load the tracker config, falling back to defaults when no path is set.
    pub fn load_tracker_config(&self) -> WorkerResult<ShotTrackerConfig> {
        let Some(path) = &self.tracker_config_path else {
            return Ok(ShotTrackerConfig::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|e| {
            WorkerError::config_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        ShotTrackerConfig::from_json(&raw).map_err(|e| {
            WorkerError::config_error(format!("invalid tracker config {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = WorkerConfig::from_lookup(|_| None);
        assert_eq!(config, WorkerConfig::default());
    }

    #[test]
    fn test_reads_variables() {
        let config = WorkerConfig::from_lookup(lookup_from(&[
            ("WORKER_MAX_JOBS", "8"),
            ("WORKER_OUTPUT_DIR", "/data/out"),
            ("WORKER_TRACKER_CONFIG", "/etc/hoopshot.json"),
            ("METRICS_ADDR", "0.0.0.0:9000"),
        ]));

        assert_eq!(config.max_concurrent_jobs, 8);
        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.tracker_config_path, Some(PathBuf::from("/etc/hoopshot.json")));
        assert_eq!(config.metrics_addr, Some("0.0.0.0:9000".parse().unwrap()));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = WorkerConfig::from_lookup(lookup_from(&[
            ("WORKER_MAX_JOBS", "0"),
            ("METRICS_ADDR", "not-an-addr"),
        ]));
        assert_eq!(config.max_concurrent_jobs, 2);
        assert!(config.metrics_addr.is_none());
    }

    #[test]
    fn test_load_tracker_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"finalize_every_frames": 5, "scoring": {{"rebound_margin_px": 10.0}}}}"#)
            .unwrap();

        let config = WorkerConfig {
            tracker_config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let tracker = config.load_tracker_config().unwrap();
        assert_eq!(tracker.finalize_every_frames, 5);
        assert_eq!(tracker.scoring.rebound_margin_px, 10.0);
        assert_eq!(tracker.region, ShotTrackerConfig::default().region);
    }

    #[test]
    fn test_load_tracker_config_errors() {
        let missing = WorkerConfig {
            tracker_config_path: Some(PathBuf::from("/nonexistent/hoopshot.json")),
            ..Default::default()
        };
        assert!(matches!(missing.load_tracker_config(), Err(WorkerError::ConfigError(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"finalize_every_frames": 0}}"#).unwrap();
        let invalid = WorkerConfig {
            tracker_config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(invalid.load_tracker_config(), Err(WorkerError::ConfigError(_))));
    }
}
