use clap::ArgMatches;
use persist_common::{PersistError, PersistResult, Persistence, RetentionPolicy};
use serde_json::Value;

/// 执行子命令，结果输出到标准输出
pub async fn run(persistence: &Persistence, matches: &ArgMatches) -> PersistResult<()> {
    match matches.subcommand() {
        Some(("keys", sub)) => {
            for key in persistence.keys(arg(sub, "pattern")?).await? {
                println!("{}", key);
            }
        }
        Some(("del", sub)) => {
            println!("(integer) {}", persistence.del(arg(sub, "key")?).await?);
        }
        Some(("del-wildcard", sub)) => {
            println!("(integer) {}", persistence.del_wildcard(arg(sub, "pattern")?).await?);
        }
        Some(("read", sub)) => {
            let mut policy = RetentionPolicy::default();
            if let Some(count) = sub.get_one::<u64>("max-count") {
                policy = policy.with_max_count(*count);
            }
            if let Some(seconds) = sub.get_one::<u64>("max-age") {
                policy = policy.with_max_age_seconds(*seconds);
            }
            let policy = (!policy.is_empty()).then_some(policy);

            let entries = persistence
                .read_ordered_with_scores(arg(sub, "key")?, policy.as_ref())
                .await?;
            for entry in entries {
                println!("{}\t{}", entry.score, entry.member);
            }
        }
        Some(("hgetall", sub)) => {
            let record = persistence.read_hash_all::<Value>(arg(sub, "hash")?).await?;
            let mut fields: Vec<_> = record.into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            for (field, value) in fields {
                println!("{}\t{}", field, value);
            }
        }
        Some(("ttl", sub)) => {
            println!("(integer) {}", persistence.ttl(arg(sub, "key")?).await?);
        }
        Some(("expire", sub)) => {
            persistence.expire(arg(sub, "key")?, number(sub, "seconds")?).await;
        }
        Some(("incrby", sub)) => {
            persistence.incrby(arg(sub, "key")?, number(sub, "delta")?).await;
        }
        Some(("publish", sub)) => {
            let message = message_value(arg(sub, "message")?);
            let receivers = persistence.publish(arg(sub, "channel")?, &message).await?;
            println!("(integer) {}", receivers);
        }
        Some((name, _)) => {
            return Err(PersistError::Config(format!("未知命令: {}", name)));
        }
        None => {
            return Err(PersistError::Config("缺少子命令".to_string()));
        }
    }
    Ok(())
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> PersistResult<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| PersistError::Config(format!("缺少参数: {}", name)))
}

fn number(matches: &ArgMatches, name: &str) -> PersistResult<i64> {
    matches
        .get_one::<i64>(name)
        .copied()
        .ok_or_else(|| PersistError::Config(format!("缺少参数: {}", name)))
}

// 合法 JSON 原样发布，否则作为字符串
fn message_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_value() {
        assert_eq!(message_value(r#"{"a":1}"#), serde_json::json!({"a": 1}));
        assert_eq!(message_value("hello"), Value::String("hello".to_string()));
        assert_eq!(message_value("42"), serde_json::json!(42));
    }
}
