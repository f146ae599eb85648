mod memory;
mod redis_backend;
mod transaction;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RedisConfig;
use crate::error::PersistResult;

pub use memory::{MemoryBackend, MemoryConnector, MemoryServer};
pub use redis_backend::{RedisBackend, RedisConnector};
pub use transaction::{Reply, Transaction, TxCommand};

/// Redis 兼容后端的单个连接
///
/// 只包含持久化层实际用到的命令。
#[async_trait]
pub trait Backend: Send + Sync {
    /// 认证 (AUTH)
    async fn auth(&self, secret: &str) -> PersistResult<()>;

    /// 选择库 (SELECT)
    async fn select(&self, db: i64) -> PersistResult<()>;

    /// 添加有序集合成员 (ZADD)，返回新增成员数
    async fn zadd(&self, key: &str, score: i64, member: &str) -> PersistResult<usize>;

    /// 原子执行事务 (MULTI/EXEC)，应答顺序与命令顺序一致
    async fn exec(&self, transaction: Transaction) -> PersistResult<Vec<Reply>>;

    /// 设置哈希字段 (HSET)，字段为新建时返回 true
    async fn hset(&self, hash: &str, field: &str, value: &str) -> PersistResult<bool>;

    /// 删除哈希字段 (HDEL)
    async fn hdel(&self, hash: &str, field: &str) -> PersistResult<bool>;

    /// 获取哈希全部字段 (HGETALL)，键不存在时为空
    async fn hgetall(&self, hash: &str) -> PersistResult<HashMap<String, String>>;

    /// 删除键 (DEL)，返回删除的键数
    async fn del(&self, key: &str) -> PersistResult<usize>;

    /// 按模式列出键 (KEYS)
    async fn keys(&self, pattern: &str) -> PersistResult<Vec<String>>;

    /// 设置过期时间 (EXPIRE)
    async fn expire(&self, key: &str, seconds: i64) -> PersistResult<bool>;

    /// 剩余生存时间 (TTL)：-2 键不存在，-1 永不过期
    async fn ttl(&self, key: &str) -> PersistResult<i64>;

    /// 整数自增 (INCRBY)
    async fn incrby(&self, key: &str, delta: i64) -> PersistResult<i64>;

    /// 发布消息 (PUBLISH)，返回收到消息的订阅者数量
    async fn publish(&self, channel: &str, message: &str) -> PersistResult<usize>;

    /// 优雅关闭连接 (QUIT)
    async fn quit(&self) -> PersistResult<()>;

    /// 连接是否仍然可用
    fn is_connected(&self) -> bool;
}

/// 负责建立新的原始连接，认证和选库由连接管理器完成
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &RedisConfig) -> PersistResult<Arc<dyn Backend>>;
}
