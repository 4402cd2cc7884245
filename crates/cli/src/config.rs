use chat::GameCard;
use proto::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name looked up in the working directory.
const LOCAL_CONFIG_FILE: &str = "gamechat.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where clients send questions.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Relay server settings (`gamechat serve`).
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini provider settings used by the relay.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Native chat state file.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Message rendering options.
    #[serde(default)]
    pub render: RenderConfig,

    /// Carousel cards in display order.
    #[serde(default = "default_games")]
    pub games: Vec<GameCard>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay: RelayConfig::default(),
            server: ServerConfig::default(),
            gemini: GeminiConfig::default(),
            storage: StorageConfig::default(),
            render: RenderConfig::default(),
            games: default_games(),
        }
    }
}

fn default_games() -> Vec<GameCard> {
    [
        "Elden Ring",
        "Dark Souls III",
        "Hollow Knight",
        "The Legend of Zelda: Breath of the Wild",
        "Stardew Valley",
    ]
    .into_iter()
    .map(GameCard::new)
    .collect()
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

/// Relay client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Endpoint URL the clients POST to.
    #[serde(default = "default_relay_url")]
    pub url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8787/api/chat".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RelayConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Relay server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins: `*` or a comma-separated list.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// Directory served for unmatched paths (the browser widget).
    #[serde(default)]
    pub static_dir: String,
}

fn default_port() -> u16 {
    8787
}

fn default_cors_origins() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origins: default_cors_origins(),
            static_dir: String::new(),
        }
    }
}

/// Gemini provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; usually supplied via `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    /// Model id.
    #[serde(default = "default_model")]
    pub model: String,
    /// API base URL.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    relay::DEFAULT_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    relay::GEMINI_BASE_URL.to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

impl GeminiConfig {
    /// Returns the API key or a missing-field error.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingField(
                "gemini.api_key (or GEMINI_API_KEY)".to_string(),
            ));
        }
        Ok(key)
    }
}

/// Chat state storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON key-value file. `~` is expanded.
    #[serde(default = "default_state_path")]
    pub path: String,
}

fn default_state_path() -> String {
    home_dir()
        .join(".gamechat")
        .join("state.json")
        .to_string_lossy()
        .to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

impl StorageConfig {
    /// State file path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        match self.path.strip_prefix('~') {
            Some(rest) => home_dir().join(rest.trim_start_matches('/')),
            None => PathBuf::from(&self.path),
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Interpret lightweight markup in bot replies.
    #[serde(default = "default_markup")]
    pub markup: bool,
}

fn default_markup() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            markup: default_markup(),
        }
    }
}

impl Config {
    /// Loads configuration from explicit path, fallback locations, and env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(|p| p.to_path_buf()).or_else(|| {
            let cwd = std::env::current_dir().ok()?.join(LOCAL_CONFIG_FILE);
            if cwd.exists() {
                return Some(cwd);
            }
            let home_config = home_dir().join(".gamechat").join("config.toml");
            if home_config.exists() {
                return Some(home_config);
            }
            None
        });
        debug!(path = ?config_path, "Config file resolved");

        let mut config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(|e| ConfigError::Toml(e.to_string()))?
        } else {
            Config::default()
        };

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini.api_key = key;
        }
        if let Ok(model) = std::env::var("GAMECHAT_MODEL") {
            config.gemini.model = model;
        }
        if let Ok(url) = std::env::var("GAMECHAT_RELAY_URL") {
            config.relay.url = url;
        }
        if let Ok(port) = std::env::var("GAMECHAT_PORT") {
            config.server.port = port.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                field: "GAMECHAT_PORT".to_string(),
                reason: e.to_string(),
            })?;
        }
        if let Ok(path) = std::env::var("GAMECHAT_STATE_PATH") {
            config.storage.path = path;
        }

        config.validate()?;
        debug!(
            relay = %config.relay.url,
            port = config.server.port,
            model = %config.gemini.model,
            games = config.games.len(),
            "Config loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.url.trim().is_empty() {
            return Err(ConfigError::MissingField("relay.url".to_string()));
        }
        if self.relay.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "relay.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(card) = self.games.iter().find(|g| g.title.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "games.title".to_string(),
                reason: format!("empty title (game = {:?})", card.game),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{remove_env_var, set_env_var, with_home, with_locked_env};

    const ENV_KEYS: [&str; 5] = [
        "GEMINI_API_KEY",
        "GAMECHAT_MODEL",
        "GAMECHAT_RELAY_URL",
        "GAMECHAT_PORT",
        "GAMECHAT_STATE_PATH",
    ];

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write config");
    }

    fn clear_env() {
        for key in ENV_KEYS {
            remove_env_var(key);
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let cfg = Config::default();
        assert_eq!(cfg.relay.url, "http://127.0.0.1:8787/api/chat");
        assert_eq!(cfg.relay.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.server.port, 8787);
        assert_eq!(cfg.server.cors_origins, "*");
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
        assert!(cfg.render.markup);
        assert_eq!(cfg.games.len(), 5);
        assert_eq!(cfg.games[0].game.as_deref(), Some("Elden Ring"));
        assert!(cfg.storage.path.ends_with("state.json"));
    }

    #[test]
    fn load_reads_explicit_file_path() {
        with_locked_env(|| {
            clear_env();
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("gamechat.toml");
            write_file(
                &config_path,
                r#"
[relay]
url = "https://relay.example.com/api/chat"
timeout_secs = 5

[server]
port = 9000
cors_origins = "https://a.example, https://b.example"
static_dir = "./public"

[gemini]
api_key = "from_file"
model = "gemini-2.0-pro"

[storage]
path = "/tmp/gamechat-test/state.json"

[render]
markup = false

[[games]]
title = "Celeste"

[[games]]
title = "Mystery Card"
game = "Outer Wilds"
"#,
            );
            let cfg = Config::load(Some(&config_path)).expect("config should parse");
            assert_eq!(cfg.relay.url, "https://relay.example.com/api/chat");
            assert_eq!(cfg.relay.timeout_secs, 5);
            assert_eq!(cfg.server.port, 9000);
            assert_eq!(cfg.server.static_dir, "./public");
            assert_eq!(cfg.gemini.api_key, "from_file");
            assert_eq!(cfg.gemini.model, "gemini-2.0-pro");
            assert_eq!(cfg.gemini.base_url, relay::GEMINI_BASE_URL);
            assert_eq!(
                cfg.storage.resolved_path(),
                PathBuf::from("/tmp/gamechat-test/state.json")
            );
            assert!(!cfg.render.markup);
            assert_eq!(cfg.games.len(), 2);
            assert_eq!(cfg.games[0].game, None);
            assert_eq!(cfg.games[1].game.as_deref(), Some("Outer Wilds"));
        });
    }

    #[test]
    fn load_without_games_section_uses_builtin_cards() {
        with_locked_env(|| {
            clear_env();
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("gamechat.toml");
            write_file(&config_path, "[render]\nmarkup = true\n");
            let cfg = Config::load(Some(&config_path)).expect("config load");
            assert_eq!(cfg.games, default_games());
        });
    }

    #[test]
    fn load_returns_toml_error_for_invalid_content() {
        with_locked_env(|| {
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("gamechat.toml");
            write_file(&config_path, "[relay\nurl = 3");
            let err = Config::load(Some(&config_path)).expect_err("invalid toml");
            assert!(matches!(err, ConfigError::Toml(_)));
        });
    }

    #[test]
    fn load_rejects_zero_timeout() {
        with_locked_env(|| {
            clear_env();
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("gamechat.toml");
            write_file(&config_path, "[relay]\ntimeout_secs = 0\n");
            let err = Config::load(Some(&config_path)).expect_err("zero timeout");
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        });
    }

    #[test]
    fn load_applies_env_overrides() {
        with_locked_env(|| {
            set_env_var("GEMINI_API_KEY", "env-key");
            set_env_var("GAMECHAT_MODEL", "env-model");
            set_env_var("GAMECHAT_RELAY_URL", "http://relay.local/api/chat");
            set_env_var("GAMECHAT_PORT", "9191");
            set_env_var("GAMECHAT_STATE_PATH", "/tmp/env-state.json");

            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("gamechat.toml");
            write_file(&config_path, "[gemini]\napi_key = \"file-key\"\n");

            let cfg = Config::load(Some(&config_path)).expect("config load");
            assert_eq!(cfg.gemini.api_key, "env-key");
            assert_eq!(cfg.gemini.model, "env-model");
            assert_eq!(cfg.relay.url, "http://relay.local/api/chat");
            assert_eq!(cfg.server.port, 9191);
            assert_eq!(cfg.storage.path, "/tmp/env-state.json");

            clear_env();
        });
    }

    #[test]
    fn load_rejects_non_numeric_port_override() {
        with_locked_env(|| {
            clear_env();
            set_env_var("GAMECHAT_PORT", "eighty");
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("gamechat.toml");
            write_file(&config_path, "");
            let err = Config::load(Some(&config_path)).expect_err("bad port");
            assert!(err.to_string().contains("GAMECHAT_PORT"));
            clear_env();
        });
    }

    #[test]
    fn load_falls_back_to_home_config() {
        with_locked_env(|| {
            clear_env();
            let tmp = tempfile::tempdir().expect("tempdir");
            write_file(
                &tmp.path().join(".gamechat").join("config.toml"),
                "[server]\nport = 7001\n",
            );

            let cwd_has_local = std::env::current_dir()
                .map(|d| d.join(LOCAL_CONFIG_FILE).exists())
                .unwrap_or(false);
            let cfg = with_home(tmp.path(), || Config::load(None)).expect("config load");
            if !cwd_has_local {
                assert_eq!(cfg.server.port, 7001);
            }
        });
    }

    #[test]
    fn require_api_key_reports_missing_field() {
        let cfg = GeminiConfig::default();
        let err = cfg.require_api_key().expect_err("no key");
        assert!(matches!(err, ConfigError::MissingField(_)));

        let cfg = GeminiConfig {
            api_key: "  k  ".to_string(),
            ..GeminiConfig::default()
        };
        assert_eq!(cfg.require_api_key().unwrap(), "k");
    }

    #[test]
    fn storage_path_expands_tilde() {
        with_locked_env(|| {
            let storage = StorageConfig {
                path: "~/.gamechat/state.json".to_string(),
            };
            let resolved = with_home(Path::new("/home/tester"), || storage.resolved_path());
            assert_eq!(
                resolved,
                PathBuf::from("/home/tester/.gamechat/state.json")
            );
        });
    }
}
