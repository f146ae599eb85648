use persist_common::config::{RedisConfig, Settings};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, Builder, NamedTempFile};

fn toml_file() -> NamedTempFile {
    Builder::new().suffix(".toml").tempfile().unwrap()
}

#[test]
fn test_redis_config_defaults() {
    let config = RedisConfig::default();
    assert_eq!(config.redis_host, "localhost");
    assert_eq!(config.redis_port, 6379);
    assert_eq!(config.redis_auth, None);
    assert_eq!(config.db, None);
    assert_eq!(config.url(), "redis://localhost:6379/");

    let config = RedisConfig::new("10.0.0.5", 6380).with_auth("secret").with_db(3);
    assert_eq!(config.redis_auth.as_deref(), Some("secret"));
    assert_eq!(config.db, Some(3));
    // 认证信息不出现在地址中
    assert_eq!(config.url(), "redis://10.0.0.5:6380/");
}

#[test]
fn test_config_from_file() {
    let mut file = toml_file();
    writeln!(
        file,
        r#"[redis]
redis_host = "cache.internal"
redis_port = 6380
redis_auth = "secret"
db = 2

[logging]
log_file = "logs/test.log"
level = "debug"
"#
    )
    .unwrap();

    let settings = Settings::from_file(file.path()).unwrap();
    assert_eq!(
        settings.redis,
        RedisConfig::new("cache.internal", 6380).with_auth("secret").with_db(2)
    );
    assert_eq!(settings.logging.log_file, "logs/test.log");
}

#[test]
fn test_config_partial_redis_section() {
    // 未给出的字段使用默认值
    let mut file = toml_file();
    writeln!(
        file,
        r#"[redis]
redis_port = 7000

[logging]
log_file = "logs/test.log"
level = "info"
"#
    )
    .unwrap();

    let settings = Settings::from_file(file.path()).unwrap();
    assert_eq!(settings.redis.redis_host, "localhost");
    assert_eq!(settings.redis.redis_port, 7000);
    assert_eq!(settings.redis.redis_auth, None);
}

#[test]
fn test_config_missing_file() {
    let dir = tempdir().unwrap();
    assert!(Settings::from_file(&dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_environment_overrides() {
    let mut file = toml_file();
    writeln!(
        file,
        r#"[redis]
redis_host = "localhost"

[logging]
log_file = "logs/test.log"
level = "info"
"#
    )
    .unwrap();

    std::env::set_var("PERSIST__LOGGING__LEVEL", "trace");
    let settings = Settings::from_file(file.path());
    std::env::remove_var("PERSIST__LOGGING__LEVEL");

    assert_eq!(settings.unwrap().logging.level, "trace");
}

#[test]
fn test_config_defaults_creation() {
    // 备份原始配置文件（如果存在）
    let default_config_path = Path::new("config/default.toml");
    let backup_path = Path::new("config/default.toml.bak");

    let had_existing = default_config_path.exists();
    if had_existing {
        fs::copy(default_config_path, backup_path).unwrap();
        fs::remove_file(default_config_path).unwrap();
    }

    // 测试自动创建配置文件
    let config = Settings::new().unwrap();
    assert!(default_config_path.exists());

    // 验证默认配置值
    assert_eq!(config.redis, RedisConfig::default());
    assert_eq!(config.logging.log_file, "logs/persistence.log");

    // 恢复原始配置文件
    if had_existing {
        fs::remove_file(default_config_path).unwrap();
        fs::rename(backup_path, default_config_path).unwrap();
    }
}
