use persist_common::backend::{Reply, Transaction, TxCommand};
use persist_common::error::PersistError;
use persist_common::store::{normalize_range, SortedSet, Store, StoreTransactionExt};
use std::thread::sleep;
use std::time::Duration;

#[test]
fn test_sorted_set_ordering() {
    let mut set = SortedSet::new();

    // 新成员返回 true，按分数升序
    assert!(set.insert(30, "c".to_string()));
    assert!(set.insert(10, "a".to_string()));
    assert!(set.insert(20, "b".to_string()));
    assert_eq!(set.len(), 3);

    let items = set.range_by_rank(0, -1);
    assert_eq!(
        items,
        vec![("a".to_string(), 10), ("b".to_string(), 20), ("c".to_string(), 30)]
    );

    // 重复成员只更新分数
    assert!(!set.insert(40, "a".to_string()));
    assert_eq!(set.len(), 3);
    assert_eq!(set.range_by_rank(-1, -1), vec![("a".to_string(), 40)]);

    // 分数相同时按成员排序
    set.insert(20, "aa".to_string());
    let members: Vec<String> = set.range_by_rank(0, -1).into_iter().map(|(m, _)| m).collect();
    assert_eq!(members, vec!["aa", "b", "c", "a"]);
}

#[test]
fn test_rank_ranges() {
    // 与 Redis 相同的下标换算
    assert_eq!(normalize_range(5, 0, -1), Some((0, 4)));
    assert_eq!(normalize_range(5, -100, -1), Some((0, 4)));
    assert_eq!(normalize_range(5, 0, 100), Some((0, 4)));
    assert_eq!(normalize_range(5, 0, -6), None);
    assert_eq!(normalize_range(5, 3, 1), None);
    assert_eq!(normalize_range(0, 0, -1), None);

    let mut set = SortedSet::new();
    for score in 1..=5 {
        set.insert(score, format!("m{}", score));
    }

    // 保留最新 2 条：删除 [0, -3]
    assert_eq!(set.remove_range_by_rank(0, -3), 3);
    assert_eq!(set.range_by_rank(0, -1), vec![("m4".to_string(), 4), ("m5".to_string(), 5)]);

    // 元素不足时不删除
    assert_eq!(set.remove_range_by_rank(0, -11), 0);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_remove_by_score_is_inclusive() {
    let mut set = SortedSet::new();
    for score in [100, 200, 300] {
        set.insert(score, score.to_string());
    }
    assert_eq!(set.remove_range_by_score(0, 200), 2);
    assert_eq!(set.range_by_rank(0, -1), vec![("300".to_string(), 300)]);
}

#[test]
fn test_hash_operations() {
    let mut store = Store::new();

    // 测试设置字段
    assert!(store.hset("hash1", "field1", "value1").unwrap());
    assert!(!store.hset("hash1", "field1", "value2").unwrap());
    assert!(store.hset("hash1", "field2", "value3").unwrap());

    let record = store.hgetall("hash1").unwrap();
    assert_eq!(record.len(), 2);
    assert_eq!(record["field1"], "value2");

    // 测试删除字段
    assert!(store.hdel("hash1", "field1").unwrap());
    assert!(!store.hdel("hash1", "field1").unwrap());

    // 删除最后一个字段后键消失
    assert!(store.hdel("hash1", "field2").unwrap());
    assert!(!store.exists("hash1"));
    assert!(store.hgetall("hash1").unwrap().is_empty());
}

#[test]
fn test_type_mismatch() {
    let mut store = Store::new();
    store.incrby("counter", 1).unwrap();

    let err = store.hset("counter", "f", "v").unwrap_err();
    assert_eq!(
        err,
        PersistError::TypeMismatch {
            key: "counter".to_string(),
            expected: "hash".to_string(),
            found: "string".to_string(),
        }
    );
    assert!(store.zadd("counter", 1, "m").is_err());

    store.hset("hash1", "f", "v").unwrap();
    assert!(store.incrby("hash1", 1).is_err());
}

#[test]
fn test_incrby() {
    let mut store = Store::new();
    assert_eq!(store.incrby("counter", 5).unwrap(), 5);
    assert_eq!(store.incrby("counter", -7).unwrap(), -2);
}

#[test]
fn test_keys_and_del() {
    let mut store = Store::new();
    store.incrby("user:1", 1).unwrap();
    store.incrby("user:2", 1).unwrap();
    store.hset("session:1", "f", "v").unwrap();

    assert_eq!(store.keys("user:*"), vec!["user:1", "user:2"]);
    assert_eq!(store.keys("*").len(), 3);
    assert!(store.keys("nothing*").is_empty());

    assert!(store.del("user:1"));
    assert!(!store.del("user:1"));
    assert_eq!(store.keys("user:?"), vec!["user:2"]);

    // 测试清空
    store.expire("user:2", 100);
    store.flush();
    assert!(store.is_empty());
    assert_eq!(store.ttl("user:2"), -2);
}

#[test]
fn test_expiry() {
    let mut store = Store::new();

    // 测试不存在的键
    assert_eq!(store.ttl("missing"), -2);
    assert!(!store.expire("missing", 10));

    store.incrby("key1", 1).unwrap();
    assert_eq!(store.ttl("key1"), -1);

    assert!(store.expire("key1", 10));
    let ttl = store.ttl("key1");
    assert!(ttl > 0 && ttl <= 10);

    // 测试非正数立即删除
    assert!(store.expire("key1", 0));
    assert!(!store.exists("key1"));

    // 测试过期后自动删除
    store.incrby("key2", 1).unwrap();
    store.expire("key2", 1);
    sleep(Duration::from_millis(1100));
    assert!(!store.exists("key2"));
    assert_eq!(store.ttl("key2"), -2);
    assert!(store.keys("*").is_empty());
}

#[test]
fn test_ttl_rounds_to_nearest_second() {
    let mut store = Store::new();
    store.incrby("key1", 1).unwrap();
    store.expire("key1", 2);
    assert_eq!(store.ttl("key1"), 2);

    // 剩余不足半秒时与 Redis 一样报告 0，键仍然存在
    sleep(Duration::from_millis(1600));
    assert_eq!(store.ttl("key1"), 0);
    assert!(store.exists("key1"));
}

#[test]
fn test_transaction_applies_in_order() {
    let mut store = Store::new();
    for score in 1..=5 {
        store.zadd("log", score, &format!("m{}", score)).unwrap();
    }

    let mut tx = Transaction::new();
    tx.add_command(TxCommand::ZRemRangeByRank {
        key: "log".to_string(),
        start: 0,
        stop: -4,
    });
    tx.add_command(TxCommand::ZRemRangeByScore {
        key: "log".to_string(),
        min: 0,
        max: 3,
    });
    tx.add_command(TxCommand::ZRangeWithScores {
        key: "log".to_string(),
        start: -100,
        stop: -1,
    });

    let replies = store.apply_transaction(&tx).unwrap();
    assert_eq!(
        replies,
        vec![
            Reply::Removed(2),
            Reply::Removed(1),
            Reply::Entries(vec![("m4".to_string(), 4), ("m5".to_string(), 5)]),
        ]
    );
}

#[test]
fn test_transaction_runs_every_command_before_reporting_error() {
    let mut store = Store::new();
    store.hset("hash1", "f", "v").unwrap();
    store.zadd("log", 1, "a").unwrap();
    store.zadd("log", 2, "b").unwrap();

    let mut tx = Transaction::new();
    tx.add_command(TxCommand::ZRangeWithScores {
        key: "hash1".to_string(),
        start: 0,
        stop: -1,
    });
    tx.add_command(TxCommand::ZRemRangeByRank {
        key: "log".to_string(),
        start: 0,
        stop: -2,
    });

    assert!(store.apply_transaction(&tx).is_err());
    // 出错命令之后的命令照常执行
    assert_eq!(store.zrange_withscores("log", 0, -1).unwrap(), vec![("b".to_string(), 2)]);
}
