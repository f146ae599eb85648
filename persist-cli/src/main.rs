mod cli;
mod commands;

use std::path::Path;
use std::process;

use clap::ArgMatches;
use log::{error, info};
use persist_common::config::{RedisConfig, Settings};
use persist_common::logger;
use persist_common::Persistence;

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let matches = cli::build().get_matches();

    // 加载配置
    let loaded = match matches.get_one::<String>("config") {
        Some(path) => Settings::from_file(Path::new(path)),
        None => Settings::new(),
    };
    let settings = match loaded {
        Ok(s) => s,
        Err(e) => {
            eprintln!("加载配置失败: {}", e);
            process::exit(1);
        }
    };

    // 初始化日志
    if let Err(e) = logger::init_logger(&settings.logging.log_file, &settings.logging.level) {
        eprintln!("初始化日志失败: {}", e);
        process::exit(1);
    }

    // 命令行参数优先，否则使用配置文件
    let config = redis_config(&matches, settings.redis);
    info!("Redis 配置: 主机={}, 端口={}, 库={:?}", config.redis_host, config.redis_port, config.db);

    let persistence = Persistence::redis(config);
    let outcome = commands::run(&persistence, &matches).await;
    persistence.disconnect().await;

    if let Err(e) = outcome {
        error!("命令执行失败: {}", e);
        process::exit(1);
    }
}

fn redis_config(matches: &ArgMatches, mut config: RedisConfig) -> RedisConfig {
    if let Some(host) = matches.get_one::<String>("host") {
        config.redis_host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.redis_port = *port;
    }
    if let Some(secret) = matches.get_one::<String>("auth") {
        config.redis_auth = Some(secret.clone());
    }
    if let Some(db) = matches.get_one::<i64>("db") {
        config.db = Some(*db);
    }
    config
}
