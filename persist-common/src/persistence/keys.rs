use futures::future::join_all;
use log::{debug, info, warn};

use super::{log_failure, Persistence};
use crate::error::PersistResult;

impl Persistence {
    /// 删除单个键，返回删除数量
    pub async fn del(&self, key: &str) -> PersistResult<usize> {
        info!("deleting {}", key);
        self.redis_conn().await?.del(key).await
    }

    /// 删除所有匹配模式的键
    ///
    /// 各个键的删除并发执行，全部完成后才返回；没有匹配的键时立即返回。
    /// 单个键删除失败只记录日志，返回实际删除的键数。
    pub async fn del_wildcard(&self, pattern: &str) -> PersistResult<usize> {
        let keys = self.keys(pattern).await?;
        if keys.is_empty() {
            debug!("没有匹配 {} 的键", pattern);
            return Ok(0);
        }

        // 每个删除任务恰好产生一个结果，成功或失败都计入
        let results = join_all(keys.iter().map(|key| self.del(key))).await;

        let mut deleted = 0;
        for (key, result) in keys.iter().zip(results) {
            match result {
                Ok(count) => deleted += count,
                Err(e) => warn!("删除键 {} 失败: {}", key, e),
            }
        }
        info!("按模式 {} 删除了 {}/{} 个键", pattern, deleted, keys.len());
        Ok(deleted)
    }

    /// 列出匹配模式的键
    pub async fn keys(&self, pattern: &str) -> PersistResult<Vec<String>> {
        self.redis_conn().await?.keys(pattern).await
    }

    /// 设置过期时间，失败只记录日志
    pub async fn expire(&self, key: &str, seconds: i64) {
        let result = match self.redis_conn().await {
            Ok(conn) => conn.expire(key, seconds).await,
            Err(e) => Err(e),
        };
        log_failure(&format!("EXPIRE {} {}", key, seconds), result);
    }

    /// 剩余生存时间：-2 键不存在，-1 永不过期
    pub async fn ttl(&self, key: &str) -> PersistResult<i64> {
        self.redis_conn().await?.ttl(key).await
    }

    /// 整数自增，失败只记录日志
    pub async fn incrby(&self, key: &str, delta: i64) {
        let result = match self.redis_conn().await {
            Ok(conn) => conn.incrby(key, delta).await,
            Err(e) => Err(e),
        };
        log_failure(&format!("INCRBY {} {}", key, delta), result);
    }

    /// 在共享连接上切换库，失败只记录日志
    pub async fn select(&self, index: i64) {
        let result = match self.redis_conn().await {
            Ok(conn) => conn.select(index).await,
            Err(e) => Err(e),
        };
        log_failure(&format!("SELECT {}", index), result);
    }
}
