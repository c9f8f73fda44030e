use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub server: ServerSettings,
    #[serde(default)]
    pub matchmaking: MatchmakingSettings,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        println!("Loading configuration for RUN_MODE: {}", &run_mode);

        let s = Config::builder()
            // Load environment-specific file (e.g., development.toml, production.toml)
            .add_source(
                File::with_name(&format!("config/{}", run_mode))
                    .format(FileFormat::Toml)
                    .required(true),
            )
            // Add environment variables (e.g., APP_SERVER__PORT=8000)
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatchmakingSettings {
    /// 이 접두사로 시작하는 이름은 로그인 거부 (빈 문자열이면 검사 안 함)
    pub reserved_name_prefix: String,
    /// startgame 에 gameType 이 없을 때 쓰는 게임 타입
    pub default_game_type: String,
    pub heartbeat_interval_seconds: u64,
    pub heartbeat_timeout: u64,
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            reserved_name_prefix: "x".to_string(),
            default_game_type: "default".to_string(),
            heartbeat_interval_seconds: 5,
            heartbeat_timeout: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub max_chained_events: usize,
    /// 고정하면 게임 시드는 `seed + game_id` 가 된다.
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_chained_events: 10_000,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    pub metrics_auth_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub directory: String,
    pub filename: String,
}
