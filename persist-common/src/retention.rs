//! 有序日志的保留策略

use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::backend::{Transaction, TxCommand};

/// 保留策略，两项可以同时生效，互不影响
///
/// 与上层系统的 JSON 格式一致：`{"maxCount": 100, "maxAgeSeconds": 3600}`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    /// 只保留分数最高的 N 条
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u64>,
    /// 删除早于 now - maxAgeSeconds 的条目
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<u64>,
}

impl RetentionPolicy {
    pub fn keep_latest(count: u64) -> Self {
        RetentionPolicy {
            max_count: Some(count),
            max_age_seconds: None,
        }
    }

    pub fn keep_seconds(seconds: u64) -> Self {
        RetentionPolicy {
            max_count: None,
            max_age_seconds: Some(seconds),
        }
    }

    pub fn with_max_count(mut self, count: u64) -> Self {
        self.max_count = Some(count);
        self
    }

    pub fn with_max_age_seconds(mut self, seconds: u64) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    // 0 与未设置等价
    fn effective_max_count(&self) -> Option<u64> {
        self.max_count.filter(|count| *count > 0)
    }

    fn effective_max_age(&self) -> Option<u64> {
        self.max_age_seconds.filter(|seconds| *seconds > 0)
    }

    /// 策略是否会产生裁剪命令
    pub fn is_empty(&self) -> bool {
        self.effective_max_count().is_none() && self.effective_max_age().is_none()
    }
}

/// 将裁剪命令加入事务，不执行事务
pub fn apply_policy(transaction: &mut Transaction, key: &str, policy: &RetentionPolicy) {
    apply_policy_at(transaction, key, policy, Utc::now().timestamp_millis());
}

/// 以给定的当前时间（毫秒）计算按时间裁剪的分界
pub fn apply_policy_at(transaction: &mut Transaction, key: &str, policy: &RetentionPolicy, now_ms: i64) {
    if let Some(max_count) = policy.effective_max_count() {
        // 保留排名最后的 max_count 个，删除 [0, -max_count-1]
        let stop = -(max_count.min(isize::MAX as u64) as isize) - 1;
        debug!("保留最多 {} 条 ({}): ZREMRANGEBYRANK 0 {}", max_count, key, stop);
        transaction.add_command(TxCommand::ZRemRangeByRank {
            key: key.to_string(),
            start: 0,
            stop,
        });
    }

    if let Some(max_age) = policy.effective_max_age() {
        let max_age_ms = i64::try_from(max_age).unwrap_or(i64::MAX).saturating_mul(1000);
        let max_score = now_ms.saturating_sub(max_age_ms);
        debug!("保留最近 {} 秒 ({}): 删除分数 <= {}", max_age, key, max_score);
        transaction.add_command(TxCommand::ZRemRangeByScore {
            key: key.to_string(),
            min: 0,
            max: max_score,
        });
    }
}
