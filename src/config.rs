use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::auth::Cookie;
use crate::error::{DashqError, Result};

pub const DEFAULT_WORKERS: usize = 5;
pub const MAX_WORKERS: usize = 50;
pub const DEFAULT_MAX_REQUESTS: usize = 100;
pub const DEFAULT_DEST_DIR: &str = "dashboards";

/// Settings as read from a configuration file or the command line.
///
/// Every field is optional so that sources can be layered: values from the
/// command line override values from a file, which override the defaults
/// applied by [`Config::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Upstream base URL (e.g. `https://metrics.example.com`)
    pub upstream: Option<String>,

    /// Cookie header value used to authenticate against the upstream
    pub cookie: Option<String>,

    /// Maximum number of dashboards to process, 0 means unlimited
    pub limit: Option<usize>,

    /// Number of concurrent dashboard workers
    pub workers: Option<usize>,

    /// Directory receiving one JSON file per dashboard
    pub dest: Option<PathBuf>,

    /// Cap on in-flight upstream requests across all workers
    pub max_requests: Option<usize>,

    /// Pretty-print written artifacts
    pub pretty: Option<bool>,
}

impl Settings {
    /// Load settings from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./dashq.toml
    /// 3. ./dashq.json
    /// 4. ./dashq.yaml
    /// 5. ./dashq.yml
    ///
    /// Returns empty settings if no file is found.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                log::warn!("Config file not found: {}, using defaults", path.display());
                return Ok(Self::default());
            }
            return Self::load_from_path(path);
        }

        let candidates = ["dashq.toml", "dashq.json", "dashq.yaml", "dashq.yml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let settings = match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        log::debug!("Loaded config from: {}", path.display());

        Ok(settings)
    }

    /// Layer `overrides` on top of `self`; any value set in `overrides` wins.
    #[must_use]
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            upstream: overrides.upstream.or(self.upstream),
            cookie: overrides.cookie.or(self.cookie),
            limit: overrides.limit.or(self.limit),
            workers: overrides.workers.or(self.workers),
            dest: overrides.dest.or(self.dest),
            max_requests: overrides.max_requests.or(self.max_requests),
            pretty: overrides.pretty.or(self.pretty),
        }
    }
}

/// Validated runtime configuration shared by every pipeline component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream base URL without a trailing slash
    pub upstream: String,
    pub cookie: Cookie,
    /// `None` processes every listed dashboard
    pub limit: Option<usize>,
    pub workers: usize,
    pub dest_dir: PathBuf,
    pub max_requests: usize,
    pub pretty: bool,
}

impl Config {
    /// Apply defaults and validate layered settings.
    ///
    /// # Errors
    ///
    /// Returns [`DashqError::Config`] if the upstream or cookie is missing,
    /// the upstream is not an absolute URL, or the worker or request
    /// limits are out of range.
    pub fn resolve(settings: Settings) -> Result<Self> {
        let upstream = settings
            .upstream
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| DashqError::Config("upstream must be set".into()))?;

        let cookie = settings
            .cookie
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DashqError::Config("cookie must be set".into()))?;

        let workers = settings.workers.unwrap_or(DEFAULT_WORKERS);
        if workers > MAX_WORKERS {
            return Err(DashqError::Config(format!(
                "workers must be at most {MAX_WORKERS} (got {workers})"
            )));
        }
        if workers == 0 {
            return Err(DashqError::Config("workers must be at least 1".into()));
        }

        let max_requests = settings.max_requests.unwrap_or(DEFAULT_MAX_REQUESTS);
        if max_requests == 0 {
            return Err(DashqError::Config("max-requests must be at least 1".into()));
        }

        let upstream = upstream.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&upstream)
            .map_err(|e| DashqError::Config(format!("Invalid upstream URL: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(DashqError::Config(format!(
                "Invalid upstream URL: {upstream} cannot be used as a base"
            )));
        }

        Ok(Self {
            upstream,
            cookie: Cookie::from(cookie),
            limit: settings.limit.filter(|l| *l > 0),
            workers,
            dest_dir: settings
                .dest
                .unwrap_or_else(|| Path::new(".").join(DEFAULT_DEST_DIR)),
            max_requests,
            pretty: settings.pretty.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn minimal() -> Settings {
        Settings {
            upstream: Some("https://metrics.example.com".to_string()),
            cookie: Some("session=abc".to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let config = Config::resolve(minimal()).unwrap();
        assert_eq!(config.upstream, "https://metrics.example.com");
        assert_eq!(config.cookie.as_str(), "session=abc");
        assert_eq!(config.workers, 5);
        assert_eq!(config.limit, None);
        assert_eq!(config.dest_dir, Path::new(".").join("dashboards"));
        assert_eq!(config.max_requests, 100);
        assert!(!config.pretty);
    }

    #[test]
    fn test_resolve_missing_upstream() {
        let settings = Settings {
            upstream: None,
            ..minimal()
        };
        let err = Config::resolve(settings).unwrap_err();
        assert!(matches!(err, DashqError::Config(_)));
        assert!(err.to_string().contains("upstream must be set"));
    }

    #[test]
    fn test_resolve_missing_cookie() {
        let settings = Settings {
            cookie: Some(String::new()),
            ..minimal()
        };
        let err = Config::resolve(settings).unwrap_err();
        assert!(err.to_string().contains("cookie must be set"));
    }

    #[test]
    fn test_resolve_rejects_too_many_workers() {
        let settings = Settings {
            workers: Some(51),
            ..minimal()
        };
        let err = Config::resolve(settings).unwrap_err();
        assert!(err.to_string().contains("at most 50"));

        let settings = Settings {
            workers: Some(50),
            ..minimal()
        };
        assert_eq!(Config::resolve(settings).unwrap().workers, 50);
    }

    #[test]
    fn test_resolve_rejects_zero_workers() {
        let settings = Settings {
            workers: Some(0),
            ..minimal()
        };
        assert!(Config::resolve(settings).is_err());
    }

    #[test]
    fn test_resolve_zero_limit_is_unlimited() {
        let settings = Settings {
            limit: Some(0),
            ..minimal()
        };
        assert_eq!(Config::resolve(settings).unwrap().limit, None);

        let settings = Settings {
            limit: Some(2),
            ..minimal()
        };
        assert_eq!(Config::resolve(settings).unwrap().limit, Some(2));
    }

    #[test]
    fn test_resolve_trims_trailing_slash() {
        let settings = Settings {
            upstream: Some("http://localhost:8086/".to_string()),
            ..minimal()
        };
        assert_eq!(
            Config::resolve(settings).unwrap().upstream,
            "http://localhost:8086"
        );
    }

    #[test]
    fn test_resolve_rejects_relative_upstream() {
        let settings = Settings {
            upstream: Some("not a url".to_string()),
            ..minimal()
        };
        let err = Config::resolve(settings).unwrap_err();
        assert!(err.to_string().contains("Invalid upstream URL"));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = Settings {
            upstream: Some("https://file.example.com".to_string()),
            cookie: Some("from-file".to_string()),
            workers: Some(10),
            pretty: Some(true),
            ..Settings::default()
        };
        let cli = Settings {
            cookie: Some("from-cli".to_string()),
            workers: Some(2),
            ..Settings::default()
        };

        let merged = file.merge(cli);
        assert_eq!(merged.upstream.as_deref(), Some("https://file.example.com"));
        assert_eq!(merged.cookie.as_deref(), Some("from-cli"));
        assert_eq!(merged.workers, Some(2));
        assert_eq!(merged.pretty, Some(true));
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
upstream = "https://metrics.example.com"
cookie = "session=toml"
limit = 10
workers = 8
dest = "/tmp/dashq-out"
max-requests = 20
pretty = true
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let settings = Settings::load(Some(temp_file.path())).unwrap();
        assert_eq!(settings.upstream.as_deref(), Some("https://metrics.example.com"));
        assert_eq!(settings.cookie.as_deref(), Some("session=toml"));
        assert_eq!(settings.limit, Some(10));
        assert_eq!(settings.workers, Some(8));
        assert_eq!(settings.dest, Some(PathBuf::from("/tmp/dashq-out")));
        assert_eq!(settings.max_requests, Some(20));
        assert_eq!(settings.pretty, Some(true));
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "upstream": "https://json.example.com",
  "max-requests": 4
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let settings = Settings::load(Some(temp_file.path())).unwrap();
        assert_eq!(settings.upstream.as_deref(), Some("https://json.example.com"));
        assert_eq!(settings.max_requests, Some(4));
        assert!(settings.cookie.is_none());
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(temp_file, "workers: 12\nlimit: 3\n").unwrap();

        let settings = Settings::load(Some(temp_file.path())).unwrap();
        assert_eq!(settings.workers, Some(12));
        assert_eq!(settings.limit, Some(3));
    }

    #[test]
    fn test_load_invalid_config_fails() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "workers = [not valid").unwrap();

        assert!(Settings::load(Some(temp_file.path())).is_err());
    }

    #[test]
    fn test_load_nonexistent_config() {
        let settings = Settings::load(Some(Path::new("nonexistent-dashq.toml"))).unwrap();
        assert!(settings.upstream.is_none());
        assert!(settings.workers.is_none());
    }
}
