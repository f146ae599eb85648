use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Redis 连接配置
///
/// 字段名与上层系统传入的配置保持一致。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_host")]
    pub redis_host: String,
    #[serde(default = "default_port")]
    pub redis_port: u16,
    #[serde(default)]
    pub redis_auth: Option<String>,
    #[serde(default)]
    pub db: Option<i64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6379
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            redis_host: default_host(),
            redis_port: default_port(),
            redis_auth: None,
            db: None,
        }
    }
}

impl RedisConfig {
    pub fn new(host: &str, port: u16) -> Self {
        RedisConfig {
            redis_host: host.to_string(),
            redis_port: port,
            ..Default::default()
        }
    }

    pub fn with_auth(mut self, secret: &str) -> Self {
        self.redis_auth = Some(secret.to_string());
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = Some(db);
        self
    }

    /// 不带认证信息和库号的连接地址，认证和选库在连接建立后单独执行
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_file: String,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub redis: RedisConfig,
    pub logging: LoggingConfig,
}

const DEFAULT_CONFIG: &str = r#"[redis]
# Redis 主机地址
redis_host = "localhost"
# Redis 端口
redis_port = 6379
# 认证密码，不需要时保持注释
# redis_auth = "secret"
# 连接建立后选择的库号
# db = 0

[logging]
# 日志文件路径
log_file = "logs/persistence.log"
# 日志级别: "error", "warn", "info", "debug", "trace"
level = "info"
"#;

impl Settings {
    /// 从 config/default.toml 加载配置，文件不存在时写入默认配置
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = "config";
        let default_config_path = Path::new(config_dir).join("default.toml");

        // 确保配置目录存在
        if !Path::new(config_dir).exists() {
            fs::create_dir_all(config_dir).map_err(|e| {
                ConfigError::Message(format!("无法创建配置目录: {}", e))
            })?;
        }

        if !default_config_path.exists() {
            let mut file = fs::File::create(&default_config_path).map_err(|e| {
                ConfigError::Message(format!("无法创建配置文件: {}", e))
            })?;

            file.write_all(DEFAULT_CONFIG.as_bytes()).map_err(|e| {
                ConfigError::Message(format!("无法写入配置文件: {}", e))
            })?;
        }

        Self::from_file(&default_config_path)
    }

    /// 从指定文件加载配置，环境变量 PERSIST__<SECTION>__<KEY> 可覆盖文件中的值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .add_source(Environment::with_prefix("PERSIST").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
