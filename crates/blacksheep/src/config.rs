use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[discord]
token = ""  # Set via DISCORD_TOKEN env var; bot tokens need the "Bot " prefix
api_base = "https://discord.com/api/v10"

[scrape]
save_directory = "~/blacksheep"  # one subdirectory per server
max_concurrent_channels = 4
download_timeout_secs = 15
request_timeout_secs = 30

[logging]
level = "info"  # trace, debug, info, warn, error
json = false
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    pub token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    blacksheep_discord::DEFAULT_API_BASE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScrapeConfig {
    pub save_directory: String,
    #[serde(default = "default_max_concurrent_channels")]
    pub max_concurrent_channels: usize,
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_concurrent_channels() -> usize {
    4
}

fn default_download_timeout() -> u64 {
    15
}

fn default_request_timeout() -> u64 {
    30
}

impl ScrapeConfig {
    /// Save directory with a leading `~` expanded
    pub fn save_root(&self) -> PathBuf {
        expand_tilde(&self.save_directory, dirs::home_dir().as_deref())
    }
}

fn expand_tilde(path: &str, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    pub scrape: ScrapeConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: <config dir>/blacksheep/blacksheep.toml
    fn global_config_path() -> anyhow::Result<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(base.join("blacksheep").join("blacksheep.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::global_config_path()?;

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).with_context(|| {
                    format!("Failed to create config directory {}", config_dir.display())
                })?;
                eprintln!("Created config directory: {}", config_dir.display());
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())
                .with_context(|| format!("Failed to write {}", config_path.display()))?;
            eprintln!("Created default config: {}", config_path.display());
            eprintln!("Please edit this file or set environment variables.");
        }

        Ok(config_path)
    }

    /// Load configuration with layered approach:
    /// 1. Global config: <config dir>/blacksheep/blacksheep.toml (auto-created if missing)
    /// 2. Local override: ./blacksheep.toml (optional)
    /// 3. Environment variables (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let global_config_path = Self::ensure_global_config()?;

        let mut config_builder = config::Config::builder()
            .add_source(config::File::from(global_config_path.clone()))
            .add_source(config::File::with_name("blacksheep").required(false))
            .add_source(config::Environment::with_prefix("BLACKSHEEP").separator("__"));

        if let Ok(token) = env::var("DISCORD_TOKEN") {
            config_builder = config_builder.set_override("discord.token", token)?;
        }

        let config: Self = config_builder.build()?.try_deserialize()?;
        config.validate(&global_config_path)?;
        Ok(config)
    }

    fn validate(&self, global_config_path: &Path) -> anyhow::Result<()> {
        if self.discord.token.trim().is_empty() {
            bail!(
                "No token configured. Set DISCORD_TOKEN or edit {}",
                global_config_path.display()
            );
        }
        if self.scrape.save_directory.trim().is_empty() {
            bail!(
                "scrape.save_directory is empty in {}",
                global_config_path.display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("template must parse");
        assert_eq!(config.discord.token, "");
        assert_eq!(config.discord.api_base, "https://discord.com/api/v10");
        assert_eq!(config.scrape.max_concurrent_channels, 4);
        assert_eq!(config.scrape.download_timeout_secs, 15);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let err = config
            .validate(Path::new("/tmp/blacksheep.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("DISCORD_TOKEN"));
    }

    #[test]
    fn test_optional_keys_default() {
        let toml_str = r#"
            [discord]
            token = "abc"

            [scrape]
            save_directory = "/data"

            [logging]
            level = "debug"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.discord.api_base, blacksheep_discord::DEFAULT_API_BASE);
        assert_eq!(config.scrape.request_timeout_secs, 30);
        assert!(config.validate(Path::new("x")).is_ok());
    }

    #[test]
    fn test_tilde_expansion() {
        let home = Path::new("/home/tira");
        assert_eq!(
            expand_tilde("~/blacksheep", Some(home)),
            PathBuf::from("/home/tira/blacksheep")
        );
        assert_eq!(expand_tilde("~", Some(home)), PathBuf::from("/home/tira"));
        assert_eq!(expand_tilde("~other/x", Some(home)), PathBuf::from("~other/x"));
        assert_eq!(expand_tilde("/srv/out", Some(home)), PathBuf::from("/srv/out"));
        assert_eq!(expand_tilde("~/x", None), PathBuf::from("~/x"));
    }
}
