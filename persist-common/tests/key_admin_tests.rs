use persist_common::backend::MemoryServer;
use persist_common::config::RedisConfig;
use persist_common::logger::init_test_logger;
use persist_common::Persistence;

fn setup() -> (MemoryServer, Persistence) {
    init_test_logger();
    let server = MemoryServer::new();
    let persistence = Persistence::memory(server.clone(), RedisConfig::default());
    (server, persistence)
}

#[tokio::test]
async fn test_del() {
    let (_server, persistence) = setup();
    persistence.incrby("counter", 1).await;

    assert_eq!(persistence.del("counter").await.unwrap(), 1);
    assert_eq!(persistence.del("counter").await.unwrap(), 0);
}

#[tokio::test]
async fn test_del_wildcard_without_matches() {
    let (server, persistence) = setup();
    persistence.incrby("session:1", 1).await;

    assert_eq!(persistence.del_wildcard("user:*").await.unwrap(), 0);
    assert_eq!(server.dbsize(0), 1);
}

#[tokio::test]
async fn test_del_wildcard_deletes_every_match() {
    let (server, persistence) = setup();
    for id in 0..25 {
        persistence.persist_hash(&format!("user:{}", id), "name", &id).await;
    }
    persistence.incrby("session:1", 1).await;

    assert_eq!(persistence.del_wildcard("user:*").await.unwrap(), 25);
    assert!(persistence.keys("user:*").await.unwrap().is_empty());
    assert_eq!(persistence.keys("*").await.unwrap(), vec!["session:1"]);
    assert_eq!(server.dbsize(0), 1);
}

#[tokio::test]
async fn test_keys_pattern() {
    let (_server, persistence) = setup();
    for key in ["a:1", "a:2", "a:10", "b:1"] {
        persistence.incrby(key, 1).await;
    }

    assert_eq!(persistence.keys("a:?").await.unwrap(), vec!["a:1", "a:2"]);
    assert_eq!(persistence.keys("[ab]:1").await.unwrap(), vec!["a:1", "b:1"]);
    assert_eq!(persistence.keys("*").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_expire_and_ttl() {
    let (_server, persistence) = setup();

    assert_eq!(persistence.ttl("missing").await.unwrap(), -2);

    persistence.incrby("counter", 1).await;
    assert_eq!(persistence.ttl("counter").await.unwrap(), -1);

    persistence.expire("counter", 100).await;
    let ttl = persistence.ttl("counter").await.unwrap();
    assert!(ttl > 90 && ttl <= 100);

    // 不存在的键不会出错
    persistence.expire("missing", 100).await;
    assert_eq!(persistence.ttl("missing").await.unwrap(), -2);
}

#[tokio::test]
async fn test_incrby() {
    let (server, persistence) = setup();

    persistence.incrby("counter", 5).await;
    persistence.incrby("counter", -2).await;
    let value = server.with_database(0, |store| store.incrby("counter", 0).unwrap());
    assert_eq!(value, 3);

    // 类型不匹配只记录日志
    persistence.persist_hash("hash", "f", "v").await;
    persistence.incrby("hash", 1).await;
    assert_eq!(server.dbsize(0), 2);
}

#[tokio::test]
async fn test_select_switches_database() {
    let (server, persistence) = setup();

    persistence.incrby("counter", 1).await;
    persistence.select(4).await;
    persistence.incrby("counter", 1).await;
    persistence.incrby("other", 1).await;

    assert_eq!(server.dbsize(0), 1);
    assert_eq!(server.dbsize(4), 2);

    // 超出范围只记录日志，仍停留在原来的库
    persistence.select(100).await;
    persistence.incrby("third", 1).await;
    assert_eq!(server.dbsize(4), 3);

    server.flushall();
    assert_eq!(server.dbsize(0), 0);
    assert_eq!(server.dbsize(4), 0);
}

#[tokio::test]
async fn test_operations_fail_without_server() {
    let (server, persistence) = setup();
    server.set_available(false);

    assert!(persistence.del("k").await.is_err());
    assert!(persistence.del_wildcard("*").await.is_err());
    assert!(persistence.keys("*").await.is_err());
    assert!(persistence.ttl("k").await.is_err());

    // 尽力而为的操作不返回错误
    persistence.expire("k", 10).await;
    persistence.incrby("k", 1).await;
    persistence.select(1).await;
}
