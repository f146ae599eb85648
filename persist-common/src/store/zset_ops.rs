use std::collections::HashMap;

use super::data_types::{type_mismatch, DataType, SortedSet};
use crate::error::PersistResult;

pub struct ZSetHandler;

impl ZSetHandler {
    /// 添加或更新成员，返回新增成员数
    pub fn zadd_internal(
        data: &mut HashMap<String, DataType>,
        key: &str,
        score: i64,
        member: &str,
    ) -> PersistResult<usize> {
        match data.get_mut(key) {
            Some(DataType::SortedSet(set)) => Ok(usize::from(set.insert(score, member.to_string()))),
            Some(other) => Err(type_mismatch(key, "zset", other)),
            None => {
                let mut set = SortedSet::new();
                set.insert(score, member.to_string());
                data.insert(key.to_string(), DataType::SortedSet(set));
                Ok(1)
            }
        }
    }

    /// 按排名读取成员及分数
    pub fn zrange_internal(
        data: &HashMap<String, DataType>,
        key: &str,
        start: isize,
        stop: isize,
    ) -> PersistResult<Vec<(String, i64)>> {
        match data.get(key) {
            Some(DataType::SortedSet(set)) => Ok(set.range_by_rank(start, stop)),
            Some(other) => Err(type_mismatch(key, "zset", other)),
            None => Ok(Vec::new()),
        }
    }

    /// 按排名删除
    pub fn zremrangebyrank_internal(
        data: &mut HashMap<String, DataType>,
        key: &str,
        start: isize,
        stop: isize,
    ) -> PersistResult<usize> {
        let removed = match data.get_mut(key) {
            Some(DataType::SortedSet(set)) => set.remove_range_by_rank(start, stop),
            Some(other) => return Err(type_mismatch(key, "zset", other)),
            None => return Ok(0),
        };
        Self::drop_if_empty(data, key);
        Ok(removed)
    }

    /// 按分数闭区间删除
    pub fn zremrangebyscore_internal(
        data: &mut HashMap<String, DataType>,
        key: &str,
        min: i64,
        max: i64,
    ) -> PersistResult<usize> {
        let removed = match data.get_mut(key) {
            Some(DataType::SortedSet(set)) => set.remove_range_by_score(min, max),
            Some(other) => return Err(type_mismatch(key, "zset", other)),
            None => return Ok(0),
        };
        Self::drop_if_empty(data, key);
        Ok(removed)
    }

    fn drop_if_empty(data: &mut HashMap<String, DataType>, key: &str) {
        if data.get(key).map_or(false, DataType::is_empty_container) {
            data.remove(key);
        }
    }
}
