use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "ClinAssign";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DB_PATH_VAR: &str = "CLINASSIGN_DB_PATH";
pub const BIND_ADDR_VAR: &str = "CLINASSIGN_BIND_ADDR";
pub const SWEEP_INTERVAL_VAR: &str = "CLINASSIGN_SWEEP_INTERVAL_SECS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinassign=info,clinassign_lib=info,tower_http=warn"
}

/// Get the application data directory
/// ~/ClinAssign/ on all platforms. Falls back to the working directory when
/// no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database file.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("clinassign.db")
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Zero disables the periodic sweep.
    pub sweep_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            sweep_interval: Duration::ZERO,
        }
    }
}

impl ServiceConfig {
    /// Read from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(BIND_ADDR_VAR) {
            match raw.trim().parse::<SocketAddr>() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(
                    var = BIND_ADDR_VAR,
                    value = %raw,
                    error = %e,
                    "Invalid bind address, using default"
                ),
            }
        }

        if let Some(raw) = lookup(SWEEP_INTERVAL_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.sweep_interval = Duration::from_secs(secs),
                Err(e) => tracing::warn!(
                    var = SWEEP_INTERVAL_VAR,
                    value = %raw,
                    error = %e,
                    "Invalid sweep interval, sweep disabled"
                ),
            }
        }

        config
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("ClinAssign"));
    }

    #[test]
    fn default_db_under_app_data() {
        let db = default_db_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("clinassign.db"));
    }

    #[test]
    fn default_bind_is_port_8000_on_all_interfaces() {
        assert_eq!(default_bind_addr().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ServiceConfig::from_lookup(|_| None);
        assert_eq!(config, ServiceConfig::default());
        assert!(config.sweep_interval.is_zero());
    }

    #[test]
    fn reads_all_variables() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/grading.db"),
            (BIND_ADDR_VAR, "127.0.0.1:9100"),
            (SWEEP_INTERVAL_VAR, "300"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/tmp/grading.db"));
        assert_eq!(config.bind_addr.port(), 9100);
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "  "),
            (BIND_ADDR_VAR, "not an address"),
            (SWEEP_INTERVAL_VAR, "-5"),
        ]));
        assert_eq!(config, ServiceConfig::default());
    }
}
