use clap::{value_parser, Arg, Command};

/// 构建命令行定义
pub fn build() -> Command {
    Command::new("persist-cli")
        .version("0.1.0")
        .about("检查和维护 Redis 持久化层中的数据")
        .arg(
            Arg::new("host")
                .short('H')
                .long("host")
                .value_name("HOST")
                .help("Redis 主机地址")
                .global(true)
                .num_args(1),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Redis 端口")
                .global(true)
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new("auth")
                .long("auth")
                .value_name("SECRET")
                .help("认证密码")
                .global(true)
                .num_args(1),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("INDEX")
                .help("连接建立后选择的库号")
                .global(true)
                .value_parser(value_parser!(i64)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，默认 config/default.toml")
                .global(true)
                .num_args(1),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("keys")
                .about("列出匹配模式的键")
                .arg(Arg::new("pattern").default_value("*")),
        )
        .subcommand(
            Command::new("del")
                .about("删除一个键")
                .arg(Arg::new("key").required(true)),
        )
        .subcommand(
            Command::new("del-wildcard")
                .about("删除所有匹配模式的键")
                .arg(Arg::new("pattern").required(true)),
        )
        .subcommand(
            Command::new("read")
                .about("读取有序日志中最新的记录，可同时执行保留策略")
                .arg(Arg::new("key").required(true))
                .arg(
                    Arg::new("max-count")
                        .long("max-count")
                        .value_name("N")
                        .help("只保留最新的 N 条")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("max-age")
                        .long("max-age")
                        .value_name("SECONDS")
                        .help("删除早于 SECONDS 秒的记录")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("hgetall")
                .about("读取哈希的全部字段")
                .arg(Arg::new("hash").required(true)),
        )
        .subcommand(
            Command::new("ttl")
                .about("查看键的剩余生存时间")
                .arg(Arg::new("key").required(true)),
        )
        .subcommand(
            Command::new("expire")
                .about("设置键的过期时间")
                .arg(Arg::new("key").required(true))
                .arg(
                    Arg::new("seconds")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("incrby")
                .about("整数自增")
                .arg(Arg::new("key").required(true))
                .arg(
                    Arg::new("delta")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("publish")
                .about("发布消息，消息不是合法 JSON 时按字符串发送")
                .arg(Arg::new("channel").required(true))
                .arg(Arg::new("message").required(true)),
        )
}
