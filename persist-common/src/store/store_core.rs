use std::collections::HashMap;

use super::data_types::DataType;
use super::expiry::ExpiryManager;
use super::hash_ops::HashHandler;
use super::pattern::glob_match;
use super::string_ops::StringHandler;
use super::zset_ops::ZSetHandler;
use crate::error::PersistResult;

/// 单个库的内存数据
///
/// 键在访问时惰性过期，与 Redis 的语义一致。
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub(crate) data: HashMap<String, DataType>,
    expiry_manager: ExpiryManager,
}

impl Store {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            expiry_manager: ExpiryManager::new(),
        }
    }

    /// 清理过期键，返回清理数量
    pub fn clean_expired_keys(&mut self) -> usize {
        let expired_keys = self.expiry_manager.find_expired_keys();
        for key in &expired_keys {
            self.data.remove(key);
            self.expiry_manager.remove_key(key);
        }
        expired_keys.len()
    }

    fn expire_if_needed(&mut self, key: &str) {
        if self.expiry_manager.is_expired(key) {
            self.data.remove(key);
            self.expiry_manager.remove_key(key);
        }
    }

    // 容器被清空后键消失，过期设置也随之失效
    fn forget_if_gone(&mut self, key: &str) {
        if !self.data.contains_key(key) {
            self.expiry_manager.remove_key(key);
        }
    }

    pub fn exists(&mut self, key: &str) -> bool {
        self.expire_if_needed(key);
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn del(&mut self, key: &str) -> bool {
        self.expire_if_needed(key);
        self.expiry_manager.remove_key(key);
        self.data.remove(key).is_some()
    }

    /// 列出匹配模式的键，按字典序返回
    pub fn keys(&mut self, pattern: &str) -> Vec<String> {
        self.clean_expired_keys();
        let mut keys: Vec<String> = self
            .data
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// 设置过期时间，非正数立即删除键
    pub fn expire(&mut self, key: &str, seconds: i64) -> bool {
        if !self.exists(key) {
            return false;
        }
        if seconds <= 0 {
            self.del(key);
        } else {
            self.expiry_manager.set_expire(key, seconds);
        }
        true
    }

    /// -2 表示键不存在，-1 表示永不过期
    pub fn ttl(&mut self, key: &str) -> i64 {
        if !self.exists(key) {
            return -2;
        }
        self.expiry_manager.remaining_seconds(key).unwrap_or(-1)
    }

    pub fn incrby(&mut self, key: &str, delta: i64) -> PersistResult<i64> {
        self.expire_if_needed(key);
        StringHandler::incrby_internal(&mut self.data, key, delta)
    }

    pub fn hset(&mut self, key: &str, field: &str, value: &str) -> PersistResult<bool> {
        self.expire_if_needed(key);
        HashHandler::hset_internal(&mut self.data, key, field, value)
    }

    pub fn hdel(&mut self, key: &str, field: &str) -> PersistResult<bool> {
        self.expire_if_needed(key);
        let removed = HashHandler::hdel_internal(&mut self.data, key, field)?;
        self.forget_if_gone(key);
        Ok(removed)
    }

    pub fn hgetall(&mut self, key: &str) -> PersistResult<HashMap<String, String>> {
        self.expire_if_needed(key);
        HashHandler::hgetall_internal(&self.data, key)
    }

    pub fn zadd(&mut self, key: &str, score: i64, member: &str) -> PersistResult<usize> {
        self.expire_if_needed(key);
        ZSetHandler::zadd_internal(&mut self.data, key, score, member)
    }

    pub fn zrange_withscores(&mut self, key: &str, start: isize, stop: isize) -> PersistResult<Vec<(String, i64)>> {
        self.expire_if_needed(key);
        ZSetHandler::zrange_internal(&self.data, key, start, stop)
    }

    pub fn zremrangebyrank(&mut self, key: &str, start: isize, stop: isize) -> PersistResult<usize> {
        self.expire_if_needed(key);
        let removed = ZSetHandler::zremrangebyrank_internal(&mut self.data, key, start, stop)?;
        self.forget_if_gone(key);
        Ok(removed)
    }

    pub fn zremrangebyscore(&mut self, key: &str, min: i64, max: i64) -> PersistResult<usize> {
        self.expire_if_needed(key);
        let removed = ZSetHandler::zremrangebyscore_internal(&mut self.data, key, min, max)?;
        self.forget_if_gone(key);
        Ok(removed)
    }

    /// 清空当前库
    pub fn flush(&mut self) {
        self.data.clear();
        self.expiry_manager.clear();
    }
}
