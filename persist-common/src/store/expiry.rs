use std::collections::HashMap;

use chrono::Utc;

/// 过期时间管理器，记录每个键的绝对过期时间（毫秒时间戳）
#[derive(Debug, Clone, Default)]
pub struct ExpiryManager {
    expire_times: HashMap<String, i64>,
}

impl ExpiryManager {
    pub fn new() -> Self {
        Self {
            expire_times: HashMap::new(),
        }
    }

    fn current_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// 设置键在指定秒数后过期
    pub fn set_expire(&mut self, key: &str, seconds: i64) {
        let expire_time = Self::current_millis() + seconds.saturating_mul(1000);
        self.expire_times.insert(key.to_string(), expire_time);
    }

    /// 检查键是否已过期
    pub fn is_expired(&self, key: &str) -> bool {
        match self.expire_times.get(key) {
            Some(expire_time) => Self::current_millis() >= *expire_time,
            None => false,
        }
    }

    /// 剩余生存时间（秒，四舍五入，与 Redis TTL 一致），未设置过期时间时为 None
    pub fn remaining_seconds(&self, key: &str) -> Option<i64> {
        self.expire_times.get(key).map(|expire_time| {
            let remaining = (*expire_time - Self::current_millis()).max(0);
            (remaining + 500) / 1000
        })
    }

    /// 找出所有已过期的键
    pub fn find_expired_keys(&self) -> Vec<String> {
        let current_time = Self::current_millis();

        self.expire_times
            .iter()
            .filter(|(_, expire_time)| current_time >= **expire_time)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// 删除键的过期设置
    pub fn remove_key(&mut self, key: &str) -> bool {
        self.expire_times.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.expire_times.clear();
    }
}
