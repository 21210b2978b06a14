//! Configuration management for todo-merger
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (TODO_MERGER_*)
//! 3. Config file (~/.config/todo-merger/config.toml)
//! 4. Default values
//!
//! The config file carries API tokens, so on Unix it must not be readable
//! by group or others (chmod 600).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Service};

/// Default port of the dashboard server
pub const DEFAULT_PORT: u16 = 8636;

/// Web server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port the dashboard listens on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Issue cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long fetched issues stay fresh before the next request refetches
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
        }
    }
}

/// One configured GitHub or GitLab account
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    /// Which service this account talks to
    pub service: Service,

    /// Base URL, required for GitLab (self-hosted instances differ)
    pub url: Option<String>,

    /// API token for the account
    pub token: String,
}

/// The personal todo repository used for creating new issues
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TodoRepoConfig {
    /// Name of the account (key in `[accounts]`) the repo lives under
    pub account: String,

    /// Repository in `owner/repo` (GitHub) or `group/project` (GitLab) form
    pub repo: String,

    /// Render label chips in their service-side colors
    #[serde(default)]
    pub colored_labels: bool,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Web server configuration
    pub server: ServerConfig,

    /// Issue cache configuration
    pub cache: CacheConfig,

    /// Configured accounts, keyed by a user-chosen name
    pub accounts: BTreeMap<String, AccountConfig>,

    /// Optional personal todo repository
    pub todo_repo: Option<TodoRepoConfig>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file with permission checking
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        // Check file permissions on Unix: the file contains tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Config file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        // Trim whitespace from tokens
        for account in config.accounts.values_mut() {
            account.token = account.token.trim().to_string();
        }

        config.validate()?;

        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/todo-merger/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("todo-merger").join("config.toml"))
    }

    /// Check account and todo-repo invariants
    ///
    /// Startup is the right time to find out a section is unusable, not the
    /// first fetch.
    pub fn validate(&self) -> Result<()> {
        for (name, account) in &self.accounts {
            if account.token.is_empty() {
                return Err(Error::Config(format!(
                    "Account '{}' has no token configured",
                    name
                )));
            }
            if account.service == Service::Gitlab && account.url.is_none() {
                return Err(Error::Config(format!(
                    "Account '{}' is a gitlab service but has no 'url' defined",
                    name
                )));
            }
        }

        if let Some(todo_repo) = &self.todo_repo {
            if !self.accounts.contains_key(&todo_repo.account) {
                return Err(Error::Config(format!(
                    "todo_repo references unknown account '{}'",
                    todo_repo.account
                )));
            }
            if todo_repo.repo.is_empty() {
                return Err(Error::Config("todo_repo has an empty 'repo'".to_string()));
            }
        }

        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - TODO_MERGER_PORT: Port the dashboard listens on
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("TODO_MERGER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.server.port = port;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(config_file: Option<PathBuf>, port: Option<u16>) -> Result<Self> {
        let config = match config_file {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load()?,
        };

        Ok(config.with_env_overrides().with_cli_overrides(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
[server]
port = 9000

[cache]
timeout = "5m"

[accounts.work-github]
service = "github"
token = "ghp_xxxx"

[accounts.work-gitlab]
service = "gitlab"
url = "https://gitlab.example.com"
token = "glpat-xxxx"

[todo_repo]
account = "work-gitlab"
repo = "me/personal-todos"
colored_labels = true
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.cache.timeout, Duration::from_secs(600));
        assert!(config.accounts.is_empty());
        assert!(config.todo_repo.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cache.timeout, Duration::from_secs(300));
        assert_eq!(config.accounts.len(), 2);

        let github = &config.accounts["work-github"];
        assert_eq!(github.service, Service::Github);
        assert!(github.url.is_none());

        let todo_repo = config.todo_repo.unwrap();
        assert_eq!(todo_repo.account, "work-gitlab");
        assert!(todo_repo.colored_labels);

        let parsed: Config = toml::from_str(FULL_CONFIG).unwrap();
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[accounts.gh]
service = "github"
token = "ghp_x"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.cache.timeout, Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gitlab_requires_url() {
        let toml = r#"
[accounts.gl]
service = "gitlab"
token = "glpat-x"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no 'url'"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let toml = r#"
[accounts.gh]
service = "github"
token = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_todo_repo_unknown_account() {
        let toml = r#"
[accounts.gh]
service = "github"
token = "ghp_x"

[todo_repo]
account = "nope"
repo = "me/todos"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown account"));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(Some(1234));
        assert_eq!(config.server.port, 1234);
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", FULL_CONFIG).unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Config::load_from_file(&file.path().to_path_buf());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", FULL_CONFIG).unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let config = Config::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.server.port, 9000);
    }
}
