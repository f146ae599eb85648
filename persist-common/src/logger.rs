use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, TestLogger, WriteLogger};
use std::fs::OpenOptions;
use std::path::Path;

use crate::error::{PersistError, PersistResult};

/// 解析日志级别，无法识别时使用 info
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

pub fn init_logger(log_file: &str, level: &str) -> PersistResult<()> {
    // 确保日志目录存在
    if let Some(parent) = Path::new(log_file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| PersistError::Io(format!("无法打开日志文件 {}: {}", log_file, e)))?;

    let level_filter = parse_level(level);

    // 同时输出到终端和文件
    CombinedLogger::init(vec![
        TermLogger::new(
            level_filter,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(level_filter, Config::default(), file),
    ])
    .map_err(|e: SetLoggerError| PersistError::Config(format!("日志系统已初始化: {}", e)))
}

/// 测试用日志，输出交给测试框架捕获；重复调用无副作用
pub fn init_test_logger() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}
