use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use redis::aio::MultiplexedConnection;
use redis::{RedisError, RedisResult};

use super::{Backend, Connector, Reply, Transaction, TxCommand};
use crate::config::RedisConfig;
use crate::error::{PersistError, PersistResult};

/// 基于 redis crate 多路复用连接的后端
pub struct RedisBackend {
    connection: MultiplexedConnection,
    connected: Arc<AtomicBool>,
}

impl RedisBackend {
    pub fn new(connection: MultiplexedConnection) -> Self {
        RedisBackend {
            connection,
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    fn conn(&self) -> PersistResult<MultiplexedConnection> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(PersistError::Disconnected);
        }
        Ok(self.connection.clone())
    }

    // 连接层面的错误意味着后端断开，之后由连接管理器重新建立连接
    fn track<T>(&self, result: RedisResult<T>) -> PersistResult<T> {
        result.map_err(|e: RedisError| {
            if e.is_connection_dropped() || e.is_io_error() {
                warn!("Redis 连接已断开: {}", e);
                self.connected.store(false, Ordering::SeqCst);
            }
            PersistError::from(e)
        })
    }
}

/// 解析 ZRANGE WITHSCORES 返回的成员/分数交替序列
///
/// 成员逐个按 UTF-8 解码，无法解码的成员视为损坏，记录日志后跳过。
fn parse_scored_members(key: &str, flat: Vec<Vec<u8>>) -> PersistResult<Vec<(String, i64)>> {
    if flat.len() % 2 != 0 {
        return Err(PersistError::UnexpectedReply(format!(
            "WITHSCORES 应答长度为奇数: {}",
            flat.len()
        )));
    }

    let mut entries = Vec::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let (Some(member), Some(score)) = (iter.next(), iter.next()) {
        let score = String::from_utf8_lossy(&score);
        let score = score
            .parse::<f64>()
            .map_err(|e| PersistError::UnexpectedReply(format!("无效的分数 '{}': {}", score, e)))?;
        match String::from_utf8(member) {
            Ok(member) => entries.push((member, score as i64)),
            Err(e) => error!("Redis 中的有序记录已损坏 [{}][{}]: {}", key, score as i64, e),
        }
    }
    Ok(entries)
}

/// 逐个字段按 UTF-8 解码哈希值，无法解码的字段记录日志后跳过
fn decode_hash_fields(hash: &str, raw: HashMap<String, Vec<u8>>) -> HashMap<String, String> {
    let mut fields = HashMap::with_capacity(raw.len());
    for (field, bytes) in raw {
        match String::from_utf8(bytes) {
            Ok(value) => {
                fields.insert(field, value);
            }
            Err(e) => error!("Redis 中的键值已损坏 [{}][{}]: {}", hash, field, e),
        }
    }
    fields
}

#[async_trait]
impl Backend for RedisBackend {
    async fn auth(&self, secret: &str) -> PersistResult<()> {
        let mut con = self.conn()?;
        let result: RedisResult<()> = redis::cmd("AUTH").arg(secret).query_async(&mut con).await;
        self.track(result).map_err(|e| match e {
            PersistError::Backend(msg) => PersistError::Auth(msg),
            other => other,
        })
    }

    async fn select(&self, db: i64) -> PersistResult<()> {
        let mut con = self.conn()?;
        let result: RedisResult<()> = redis::cmd("SELECT").arg(db).query_async(&mut con).await;
        self.track(result)
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> PersistResult<usize> {
        let mut con = self.conn()?;
        let result: RedisResult<usize> = redis::cmd("ZADD")
            .arg(key)
            .arg(score)
            .arg(member)
            .query_async(&mut con)
            .await;
        self.track(result)
    }

    async fn exec(&self, transaction: Transaction) -> PersistResult<Vec<Reply>> {
        if transaction.is_empty() {
            return Ok(Vec::new());
        }
        debug!("MULTI/EXEC: {} 条命令", transaction.len());
        let commands = transaction.into_commands();

        let mut pipe = redis::pipe();
        pipe.atomic();
        for command in &commands {
            match command {
                TxCommand::ZRemRangeByRank { key, start, stop } => {
                    pipe.cmd("ZREMRANGEBYRANK").arg(key).arg(*start).arg(*stop);
                }
                TxCommand::ZRemRangeByScore { key, min, max } => {
                    pipe.cmd("ZREMRANGEBYSCORE").arg(key).arg(*min).arg(*max);
                }
                TxCommand::ZRangeWithScores { key, start, stop } => {
                    pipe.cmd("ZRANGE").arg(key).arg(*start).arg(*stop).arg("WITHSCORES");
                }
            }
        }

        let mut con = self.conn()?;
        let result: RedisResult<Vec<redis::Value>> = pipe.query_async(&mut con).await;
        let values = self.track(result)?;

        if values.len() != commands.len() {
            return Err(PersistError::UnexpectedReply(format!(
                "事务返回 {} 条应答，期望 {} 条",
                values.len(),
                commands.len()
            )));
        }

        let mut replies = Vec::with_capacity(values.len());
        for (command, value) in commands.iter().zip(values.iter()) {
            let reply = match command {
                TxCommand::ZRemRangeByRank { .. } | TxCommand::ZRemRangeByScore { .. } => {
                    Reply::Removed(redis::from_redis_value::<usize>(value)?)
                }
                TxCommand::ZRangeWithScores { key, .. } => {
                    let flat = redis::from_redis_value::<Vec<Vec<u8>>>(value)?;
                    Reply::Entries(parse_scored_members(key, flat)?)
                }
            };
            replies.push(reply);
        }
        Ok(replies)
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> PersistResult<bool> {
        let mut con = self.conn()?;
        let result: RedisResult<usize> = redis::cmd("HSET")
            .arg(hash)
            .arg(field)
            .arg(value)
            .query_async(&mut con)
            .await;
        self.track(result).map(|added| added > 0)
    }

    async fn hdel(&self, hash: &str, field: &str) -> PersistResult<bool> {
        let mut con = self.conn()?;
        let result: RedisResult<usize> = redis::cmd("HDEL").arg(hash).arg(field).query_async(&mut con).await;
        self.track(result).map(|removed| removed > 0)
    }

    async fn hgetall(&self, hash: &str) -> PersistResult<HashMap<String, String>> {
        let mut con = self.conn()?;
        let result: RedisResult<HashMap<String, Vec<u8>>> =
            redis::cmd("HGETALL").arg(hash).query_async(&mut con).await;
        self.track(result).map(|raw| decode_hash_fields(hash, raw))
    }

    async fn del(&self, key: &str) -> PersistResult<usize> {
        let mut con = self.conn()?;
        let result: RedisResult<usize> = redis::cmd("DEL").arg(key).query_async(&mut con).await;
        self.track(result)
    }

    async fn keys(&self, pattern: &str) -> PersistResult<Vec<String>> {
        let mut con = self.conn()?;
        let result: RedisResult<Vec<String>> = redis::cmd("KEYS").arg(pattern).query_async(&mut con).await;
        self.track(result)
    }

    async fn expire(&self, key: &str, seconds: i64) -> PersistResult<bool> {
        let mut con = self.conn()?;
        let result: RedisResult<bool> = redis::cmd("EXPIRE").arg(key).arg(seconds).query_async(&mut con).await;
        self.track(result)
    }

    async fn ttl(&self, key: &str) -> PersistResult<i64> {
        let mut con = self.conn()?;
        let result: RedisResult<i64> = redis::cmd("TTL").arg(key).query_async(&mut con).await;
        self.track(result)
    }

    async fn incrby(&self, key: &str, delta: i64) -> PersistResult<i64> {
        let mut con = self.conn()?;
        let result: RedisResult<i64> = redis::cmd("INCRBY").arg(key).arg(delta).query_async(&mut con).await;
        self.track(result)
    }

    async fn publish(&self, channel: &str, message: &str) -> PersistResult<usize> {
        let mut con = self.conn()?;
        let result: RedisResult<usize> = redis::cmd("PUBLISH")
            .arg(channel)
            .arg(message)
            .query_async(&mut con)
            .await;
        self.track(result)
    }

    async fn quit(&self) -> PersistResult<()> {
        // 先标记断开，避免 QUIT 之后还有命令复用这个连接
        if !self.connected.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        let mut con = self.connection.clone();
        let result: RedisResult<()> = redis::cmd("QUIT").query_async(&mut con).await;
        match result {
            Ok(()) => Ok(()),
            // 服务端在应答 QUIT 后直接关闭连接，此时的断开不算错误
            Err(e) if e.is_connection_dropped() || e.is_io_error() => {
                debug!("QUIT 后连接关闭: {}", e);
                Ok(())
            }
            Err(e) => Err(PersistError::from(e)),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// 通过 TCP 建立 Redis 连接
#[derive(Debug, Clone, Default)]
pub struct RedisConnector;

impl RedisConnector {
    pub fn new() -> Self {
        RedisConnector
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn connect(&self, config: &RedisConfig) -> PersistResult<Arc<dyn Backend>> {
        let url = config.url();
        let client = redis::Client::open(url.as_str())
            .map_err(|e| PersistError::Config(format!("无效的 Redis 地址 {}: {}", url, e)))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| PersistError::Connection(format!("无法连接到 {}: {}", url, e)))?;

        info!("已连接到 Redis: {}", url);
        Ok(Arc::new(RedisBackend::new(connection)))
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_hash_fields, parse_scored_members};
    use crate::error::PersistError;
    use redis::Value;
    use std::collections::HashMap;

    fn bytes(items: &[&[u8]]) -> Vec<Vec<u8>> {
        items.iter().map(|item| item.to_vec()).collect()
    }

    #[test]
    fn test_parse_scored_members() {
        let flat = bytes(&[b"{\"a\":1}", b"1700000000000", b"{\"a\":2}", b"1.70000000001e12"]);
        let entries = parse_scored_members("log", flat).unwrap();
        assert_eq!(
            entries,
            vec![
                ("{\"a\":1}".to_string(), 1_700_000_000_000),
                ("{\"a\":2}".to_string(), 1_700_000_000_010),
            ]
        );
    }

    #[test]
    fn test_parse_scored_members_rejects_odd_reply() {
        let result = parse_scored_members("log", bytes(&[b"lonely"]));
        assert!(matches!(result, Err(PersistError::UnexpectedReply(_))));
    }

    #[test]
    fn test_non_utf8_member_is_skipped() {
        let reply = Value::Bulk(vec![
            Value::Data(b"\"ok\"".to_vec()),
            Value::Data(b"1".to_vec()),
            Value::Data(vec![0xff, 0xfe]),
            Value::Data(b"2".to_vec()),
        ]);
        let flat = redis::from_redis_value::<Vec<Vec<u8>>>(&reply).unwrap();
        let entries = parse_scored_members("log", flat).unwrap();
        assert_eq!(entries, vec![("\"ok\"".to_string(), 1)]);
    }

    #[test]
    fn test_non_utf8_hash_field_is_skipped() {
        let reply = Value::Bulk(vec![
            Value::Data(b"good".to_vec()),
            Value::Data(b"{\"a\":1}".to_vec()),
            Value::Data(b"bad".to_vec()),
            Value::Data(vec![0xff, 0xfe]),
        ]);
        let raw = redis::from_redis_value::<HashMap<String, Vec<u8>>>(&reply).unwrap();
        let fields = decode_hash_fields("devices", raw);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["good"], "{\"a\":1}");
    }
}
