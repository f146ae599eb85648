use std::collections::HashMap;

use super::data_types::{type_mismatch, DataType};
use crate::error::{PersistError, PersistResult};

pub struct StringHandler;

impl StringHandler {
    /// 整数自增，键不存在时从 0 开始
    pub fn incrby_internal(
        data: &mut HashMap<String, DataType>,
        key: &str,
        delta: i64,
    ) -> PersistResult<i64> {
        let current = match data.get(key) {
            Some(DataType::String(value)) => value.parse::<i64>().map_err(|_| {
                PersistError::Backend("ERR value is not an integer or out of range".to_string())
            })?,
            Some(other) => return Err(type_mismatch(key, "string", other)),
            None => 0,
        };

        let next = current.checked_add(delta).ok_or_else(|| {
            PersistError::Backend("ERR increment or decrement would overflow".to_string())
        })?;
        data.insert(key.to_string(), DataType::String(next.to_string()));
        Ok(next)
    }
}
