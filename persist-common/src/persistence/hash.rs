use std::collections::HashMap;

use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{log_failure, serialize, Persistence};
use crate::error::PersistResult;

impl Persistence {
    /// 写入哈希字段，失败只记录日志
    pub async fn persist_hash<T: Serialize + ?Sized>(&self, hash: &str, field: &str, value: &T) {
        let result = match serialize(value) {
            Ok(value) => {
                info!("persistHash: {} {} {}", hash, field, value);
                match self.redis_conn().await {
                    Ok(conn) => conn.hset(hash, field, &value).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };
        log_failure(&format!("HSET {} {}", hash, field), result);
    }

    /// 删除哈希字段，失败只记录日志
    pub async fn delete_hash(&self, hash: &str, field: &str) {
        info!("deleteHash: {} {}", hash, field);
        let result = match self.redis_conn().await {
            Ok(conn) => conn.hdel(hash, field).await,
            Err(e) => Err(e),
        };
        log_failure(&format!("HDEL {} {}", hash, field), result);
    }

    /// 读取哈希的全部字段并逐个反序列化
    ///
    /// 无法反序列化的字段视为损坏：记录日志并从结果中去掉，其余字段照常返回。
    pub async fn read_hash_all<T: DeserializeOwned>(&self, hash: &str) -> PersistResult<HashMap<String, T>> {
        let replies = self.redis_conn().await?.hgetall(hash).await?;

        let mut record = HashMap::with_capacity(replies.len());
        for (field, raw) in replies {
            match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    record.insert(field, value);
                }
                Err(e) => {
                    error!("Redis 中的键值已损坏 [{}][{}]: {}", hash, field, e);
                }
            }
        }
        Ok(record)
    }
}
