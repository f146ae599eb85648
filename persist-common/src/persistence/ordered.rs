use chrono::Utc;
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{serialize, Persistence};
use crate::backend::{Reply, Transaction, TxCommand};
use crate::error::{PersistError, PersistResult};
use crate::retention::{apply_policy, RetentionPolicy};

/// 每次读取最多返回的条目数（最新的若干条）
pub const SYNC_WINDOW: usize = 100;

/// 有序日志中的一条记录
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedEntry {
    /// 序列化后的值
    pub member: String,
    /// 写入时间（毫秒时间戳）
    pub score: i64,
}

impl OrderedEntry {
    /// 反序列化成员
    pub fn value<T: DeserializeOwned>(&self) -> PersistResult<T> {
        serde_json::from_str(&self.member).map_err(|e| PersistError::Deserialization(e.to_string()))
    }
}

impl Persistence {
    /// 追加到 key 的有序日志，分数为当前毫秒时间戳，返回新增条目数
    ///
    /// 同一毫秒内的多次写入分数相同，它们之间的顺序由后端决定。
    pub async fn persist_ordered<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PersistResult<usize> {
        let member = serialize(value)?;
        let score = Utc::now().timestamp_millis();
        self.redis_conn().await?.zadd(key, score, &member).await
    }

    /// 读取最新的 100 条记录（按分数升序，带分数）
    ///
    /// 给出策略时，裁剪命令与读取放在同一个事务里执行，读取结果总是裁剪之后的状态。
    /// 成员保持序列化形式，需要反序列化时使用 [`Persistence::read_ordered_values`]。
    pub async fn read_ordered_with_scores(
        &self,
        key: &str,
        policy: Option<&RetentionPolicy>,
    ) -> PersistResult<Vec<OrderedEntry>> {
        let mut transaction = Transaction::new();
        if let Some(policy) = policy {
            apply_policy(&mut transaction, key, policy);
        }
        let window = SYNC_WINDOW as isize;
        let read_index = transaction.add_command(TxCommand::ZRangeWithScores {
            key: key.to_string(),
            start: -window,
            stop: -1,
        });
        let commands = transaction.commands().to_vec();

        let replies = self.redis_conn().await?.exec(transaction).await?;
        if replies.len() != commands.len() {
            return Err(PersistError::UnexpectedReply(format!(
                "事务返回 {} 条应答，期望 {} 条",
                replies.len(),
                commands.len()
            )));
        }

        let mut entries = None;
        for (index, (command, reply)) in commands.iter().zip(replies).enumerate() {
            match reply {
                Reply::Removed(removed) => {
                    info!("执行保留策略 {} ({}): 删除 {} 条", command.name(), command.key(), removed);
                }
                Reply::Entries(items) if index == read_index => entries = Some(items),
                Reply::Entries(_) => {
                    return Err(PersistError::UnexpectedReply(format!("{} 返回了条目列表", command.name())));
                }
            }
        }

        let entries = entries
            .ok_or_else(|| PersistError::UnexpectedReply(format!("{} 没有返回条目列表", key)))?;
        info!("{} 有 {} 条待同步", key, entries.len());

        Ok(entries
            .into_iter()
            .map(|(member, score)| OrderedEntry { member, score })
            .collect())
    }

    /// 与 [`Persistence::read_ordered_with_scores`] 相同，但反序列化每条记录
    ///
    /// 无法反序列化的记录记录日志后跳过。
    pub async fn read_ordered_values<T: DeserializeOwned>(
        &self,
        key: &str,
        policy: Option<&RetentionPolicy>,
    ) -> PersistResult<Vec<(T, i64)>> {
        let entries = self.read_ordered_with_scores(key, policy).await?;
        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.value::<T>() {
                Ok(value) => values.push((value, entry.score)),
                Err(e) => error!("Redis 中的有序记录已损坏 [{}][{}]: {}", key, entry.score, e),
            }
        }
        Ok(values)
    }
}
