use std::collections::HashMap;

use crate::error::PersistError;

/// 有序集合，按 (分数, 成员) 升序保存，成员唯一
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedSet {
    entries: Vec<(i64, String)>,
}

impl SortedSet {
    pub fn new() -> Self {
        SortedSet { entries: Vec::new() }
    }

    /// 插入或更新成员分数，成员为新增时返回 true
    pub fn insert(&mut self, score: i64, member: String) -> bool {
        let existed = match self.entries.iter().position(|(_, m)| *m == member) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        };

        let position = self
            .entries
            .partition_point(|(s, m)| (*s, m.as_str()) < (score, member.as_str()));
        self.entries.insert(position, (score, member));
        !existed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按排名区间取成员及分数，排名规则同 Redis（支持负数下标）
    pub fn range_by_rank(&self, start: isize, stop: isize) -> Vec<(String, i64)> {
        match normalize_range(self.entries.len(), start, stop) {
            Some((from, to)) => self.entries[from..=to]
                .iter()
                .map(|(score, member)| (member.clone(), *score))
                .collect(),
            None => Vec::new(),
        }
    }

    /// 按排名区间删除，返回删除数量
    pub fn remove_range_by_rank(&mut self, start: isize, stop: isize) -> usize {
        match normalize_range(self.entries.len(), start, stop) {
            Some((from, to)) => self.entries.drain(from..=to).count(),
            None => 0,
        }
    }

    /// 删除分数在闭区间 [min, max] 内的成员，返回删除数量
    pub fn remove_range_by_score(&mut self, min: i64, max: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(score, _)| *score < min || *score > max);
        before - self.entries.len()
    }
}

/// 将 Redis 风格的起止下标换算为闭区间，区间为空时返回 None
pub fn normalize_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// 存储系统中支持的数据类型
#[derive(Debug, Clone)]
pub enum DataType {
    /// 字符串类型
    String(String),
    /// 哈希表类型
    Hash(HashMap<String, String>),
    /// 有序集合类型
    SortedSet(SortedSet),
}

impl DataType {
    /// 获取数据类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::String(_) => "string",
            DataType::Hash(_) => "hash",
            DataType::SortedSet(_) => "zset",
        }
    }

    /// 容器类型在元素全部删除后键随之消失
    pub fn is_empty_container(&self) -> bool {
        match self {
            DataType::String(_) => false,
            DataType::Hash(hash) => hash.is_empty(),
            DataType::SortedSet(set) => set.is_empty(),
        }
    }
}

/// 构造类型不匹配错误
pub fn type_mismatch(key: &str, expected: &str, found: &DataType) -> PersistError {
    PersistError::TypeMismatch {
        key: key.to_string(),
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}
