use std::collections::HashMap;

use super::data_types::{type_mismatch, DataType};
use crate::error::PersistResult;

pub struct HashHandler;

impl HashHandler {
    /// 设置哈希字段，字段为新建时返回 true
    pub fn hset_internal(
        data: &mut HashMap<String, DataType>,
        key: &str,
        field: &str,
        value: &str,
    ) -> PersistResult<bool> {
        match data.get_mut(key) {
            Some(DataType::Hash(hash)) => Ok(hash.insert(field.to_string(), value.to_string()).is_none()),
            Some(other) => Err(type_mismatch(key, "hash", other)),
            None => {
                let mut new_hash = HashMap::new();
                new_hash.insert(field.to_string(), value.to_string());
                data.insert(key.to_string(), DataType::Hash(new_hash));
                Ok(true)
            }
        }
    }

    /// 删除哈希字段，最后一个字段删除后键一并删除
    pub fn hdel_internal(
        data: &mut HashMap<String, DataType>,
        key: &str,
        field: &str,
    ) -> PersistResult<bool> {
        let removed = match data.get_mut(key) {
            Some(DataType::Hash(hash)) => hash.remove(field).is_some(),
            Some(other) => return Err(type_mismatch(key, "hash", other)),
            None => return Ok(false),
        };

        if data.get(key).map_or(false, DataType::is_empty_container) {
            data.remove(key);
        }
        Ok(removed)
    }

    /// 获取所有哈希字段和值，键不存在时返回空表
    pub fn hgetall_internal(
        data: &HashMap<String, DataType>,
        key: &str,
    ) -> PersistResult<HashMap<String, String>> {
        match data.get(key) {
            Some(DataType::Hash(hash)) => Ok(hash.clone()),
            Some(other) => Err(type_mismatch(key, "hash", other)),
            None => Ok(HashMap::new()),
        }
    }
}
