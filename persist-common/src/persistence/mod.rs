//! 持久化层对外接口
//!
//! 错误分两种处理方式：
//! - 读取、枚举、策略裁剪失败时返回 `Err`，调用方视为本次操作失败；
//! - 尽力而为的写入（哈希写入/删除、expire、incrby、select）只记录日志，调用方收不到错误。
//!
//! 任何操作都不重试。

mod hash;
mod keys;
mod ordered;
mod pubsub;

use std::sync::Arc;

use log::error;
use serde::Serialize;

use crate::backend::{Backend, MemoryConnector, MemoryServer};
use crate::config::RedisConfig;
use crate::connection::ConnectionManager;
use crate::error::{PersistError, PersistResult};

pub use ordered::{OrderedEntry, SYNC_WINDOW};

/// 持久化层入口，所有操作都通过同一个连接管理器获取连接
#[derive(Clone)]
pub struct Persistence {
    connections: Arc<ConnectionManager>,
}

impl Persistence {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Persistence { connections }
    }

    /// 连接到 Redis
    pub fn redis(config: RedisConfig) -> Self {
        Self::new(Arc::new(ConnectionManager::redis(config)))
    }

    /// 连接到进程内的内存服务端
    pub fn memory(server: MemoryServer, config: RedisConfig) -> Self {
        let connector = Arc::new(MemoryConnector::new(server));
        Self::new(Arc::new(ConnectionManager::new(config, connector)))
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// 替换之后建立连接时使用的配置
    pub fn set_config(&self, config: RedisConfig) {
        self.connections.set_config(config);
    }

    /// 关闭连接，没有连接时同样正常返回
    pub async fn disconnect(&self) {
        self.connections.disconnect().await;
    }

    async fn redis_conn(&self) -> PersistResult<Arc<dyn Backend>> {
        self.connections.get_connection().await
    }
}

/// 序列化存储和发布的值
pub(crate) fn serialize<T: Serialize + ?Sized>(value: &T) -> PersistResult<String> {
    serde_json::to_string(value).map_err(|e| PersistError::Serialization(e.to_string()))
}

/// 尽力而为操作的统一错误处理：只记录日志
pub(crate) fn log_failure<T>(operation: &str, result: PersistResult<T>) {
    if let Err(e) = result {
        error!("{} 失败: {}", operation, e);
    }
}
