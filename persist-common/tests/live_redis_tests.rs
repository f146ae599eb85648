//! 需要本地 Redis: cargo test -- --ignored

use persist_common::config::RedisConfig;
use persist_common::logger::init_test_logger;
use persist_common::{Persistence, RetentionPolicy};
use serde_json::{json, Value};
use std::collections::HashMap;

#[tokio::test]
#[ignore]
async fn test_live_redis_round_trip() {
    init_test_logger();
    let persistence = Persistence::redis(RedisConfig::new("127.0.0.1", 6379).with_db(15));
    persistence.del_wildcard("persist-test:*").await.unwrap();

    for n in 0..5 {
        persistence.persist_ordered("persist-test:log", &json!({ "n": n })).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    let entries = persistence
        .read_ordered_values::<Value>("persist-test:log", Some(&RetentionPolicy::keep_latest(2)))
        .await
        .unwrap();
    let values: Vec<Value> = entries.into_iter().map(|(value, _)| value).collect();
    assert_eq!(values, vec![json!({"n": 3}), json!({"n": 4})]);

    persistence.persist_hash("persist-test:hash", "f", &json!([1, 2])).await;
    let record: HashMap<String, Value> = persistence.read_hash_all("persist-test:hash").await.unwrap();
    assert_eq!(record["f"], json!([1, 2]));

    persistence.incrby("persist-test:counter", 3).await;
    persistence.expire("persist-test:counter", 60).await;
    assert!(persistence.ttl("persist-test:counter").await.unwrap() > 0);

    assert_eq!(persistence.del_wildcard("persist-test:*").await.unwrap(), 3);
    persistence.disconnect().await;
}
