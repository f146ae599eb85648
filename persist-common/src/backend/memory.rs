use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::broadcast;

use super::{Backend, Connector, Reply, Transaction};
use crate::config::RedisConfig;
use crate::error::{PersistError, PersistResult};
use crate::store::{Store, StoreTransactionExt};

/// 与 Redis 默认配置相同的库数量
const DATABASE_COUNT: i64 = 16;
const CHANNEL_CAPACITY: usize = 64;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ServerState {
    databases: Mutex<HashMap<i64, Store>>,
    channels: Mutex<HashMap<String, broadcast::Sender<String>>>,
    requirepass: Mutex<Option<String>>,
    connect_delay: Mutex<Option<Duration>>,
    available: AtomicBool,
    connects: AtomicUsize,
    // 递增后，之前建立的连接全部视为断开
    epoch: AtomicU64,
}

/// 进程内的 Redis 兼容服务端
///
/// 多个连接共享同一份数据，断开重连后数据仍在，和真实服务端一样。
#[derive(Clone)]
pub struct MemoryServer {
    state: Arc<ServerState>,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    pub fn new() -> Self {
        MemoryServer {
            state: Arc::new(ServerState {
                databases: Mutex::new(HashMap::new()),
                channels: Mutex::new(HashMap::new()),
                requirepass: Mutex::new(None),
                connect_delay: Mutex::new(None),
                available: AtomicBool::new(true),
                connects: AtomicUsize::new(0),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// 要求连接先认证 (requirepass)
    pub fn set_password(&self, password: Option<&str>) {
        *lock(&self.state.requirepass) = password.map(str::to_string);
    }

    /// 建立连接时的人为延迟
    pub fn set_connect_delay(&self, delay: Option<Duration>) {
        *lock(&self.state.connect_delay) = delay;
    }

    /// 不可用时新连接会被拒绝
    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    /// 断开所有现有连接
    pub fn drop_connections(&self) {
        self.state.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// 累计建立的连接数
    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// 订阅频道
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        let mut channels = lock(&self.state.channels);
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 指定库中的键数量
    pub fn dbsize(&self, db: i64) -> usize {
        lock(&self.state.databases).get(&db).map_or(0, Store::len)
    }

    /// 在指定库上直接执行操作
    pub fn with_database<T>(&self, db: i64, f: impl FnOnce(&mut Store) -> T) -> T {
        let mut databases = lock(&self.state.databases);
        f(databases.entry(db).or_default())
    }

    /// 清空所有库
    pub fn flushall(&self) {
        lock(&self.state.databases).clear();
    }

    fn password(&self) -> Option<String> {
        lock(&self.state.requirepass).clone()
    }

    fn publish(&self, channel: &str, message: &str) -> usize {
        let channels = lock(&self.state.channels);
        match channels.get(channel) {
            // 没有订阅者时 send 返回错误，投递数为 0
            Some(sender) => sender.send(message.to_string()).unwrap_or(0),
            None => 0,
        }
    }
}

/// 内存服务端上的单个连接
pub struct MemoryBackend {
    server: MemoryServer,
    db: AtomicI64,
    authenticated: AtomicBool,
    connected: AtomicBool,
    epoch: u64,
}

impl MemoryBackend {
    pub fn new(server: MemoryServer) -> Self {
        let epoch = server.state.epoch.load(Ordering::SeqCst);
        MemoryBackend {
            server,
            db: AtomicI64::new(0),
            authenticated: AtomicBool::new(false),
            connected: AtomicBool::new(true),
            epoch,
        }
    }

    /// 当前选择的库
    pub fn current_db(&self) -> i64 {
        self.db.load(Ordering::SeqCst)
    }

    fn check(&self) -> PersistResult<()> {
        if !self.is_connected() {
            return Err(PersistError::Disconnected);
        }
        if self.server.password().is_some() && !self.authenticated.load(Ordering::SeqCst) {
            return Err(PersistError::Auth("NOAUTH Authentication required.".to_string()));
        }
        Ok(())
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut Store) -> PersistResult<T>) -> PersistResult<T> {
        self.check()?;
        self.server.with_database(self.current_db(), f)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn auth(&self, secret: &str) -> PersistResult<()> {
        if !self.is_connected() {
            return Err(PersistError::Disconnected);
        }
        match self.server.password() {
            Some(password) if password == secret => {
                self.authenticated.store(true, Ordering::SeqCst);
                Ok(())
            }
            Some(_) => Err(PersistError::Auth(
                "WRONGPASS invalid username-password pair".to_string(),
            )),
            None => Err(PersistError::Auth(
                "ERR AUTH called without any password configured".to_string(),
            )),
        }
    }

    async fn select(&self, db: i64) -> PersistResult<()> {
        self.check()?;
        if !(0..DATABASE_COUNT).contains(&db) {
            return Err(PersistError::Backend("ERR DB index is out of range".to_string()));
        }
        self.db.store(db, Ordering::SeqCst);
        Ok(())
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> PersistResult<usize> {
        self.with_store(|store| store.zadd(key, score, member))
    }

    async fn exec(&self, transaction: Transaction) -> PersistResult<Vec<Reply>> {
        // 整个事务在同一把锁内执行
        self.with_store(|store| store.apply_transaction(&transaction))
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> PersistResult<bool> {
        self.with_store(|store| store.hset(hash, field, value))
    }

    async fn hdel(&self, hash: &str, field: &str) -> PersistResult<bool> {
        self.with_store(|store| store.hdel(hash, field))
    }

    async fn hgetall(&self, hash: &str) -> PersistResult<HashMap<String, String>> {
        self.with_store(|store| store.hgetall(hash))
    }

    async fn del(&self, key: &str) -> PersistResult<usize> {
        self.with_store(|store| Ok(usize::from(store.del(key))))
    }

    async fn keys(&self, pattern: &str) -> PersistResult<Vec<String>> {
        self.with_store(|store| Ok(store.keys(pattern)))
    }

    async fn expire(&self, key: &str, seconds: i64) -> PersistResult<bool> {
        self.with_store(|store| Ok(store.expire(key, seconds)))
    }

    async fn ttl(&self, key: &str) -> PersistResult<i64> {
        self.with_store(|store| Ok(store.ttl(key)))
    }

    async fn incrby(&self, key: &str, delta: i64) -> PersistResult<i64> {
        self.with_store(|store| store.incrby(key, delta))
    }

    async fn publish(&self, channel: &str, message: &str) -> PersistResult<usize> {
        self.check()?;
        Ok(self.server.publish(channel, message))
    }

    async fn quit(&self) -> PersistResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
            && self.server.state.epoch.load(Ordering::SeqCst) == self.epoch
    }
}

/// 为内存服务端建立连接
#[derive(Clone, Default)]
pub struct MemoryConnector {
    server: MemoryServer,
}

impl MemoryConnector {
    pub fn new(server: MemoryServer) -> Self {
        MemoryConnector { server }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, config: &RedisConfig) -> PersistResult<Arc<dyn Backend>> {
        if !self.server.state.available.load(Ordering::SeqCst) {
            return Err(PersistError::Connection(format!(
                "无法连接到 {}: Connection refused",
                config.url()
            )));
        }

        let count = self.server.state.connects.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("内存后端建立第 {} 个连接: {}", count, config.url());

        let delay = *lock(&self.server.state.connect_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(Arc::new(MemoryBackend::new(self.server.clone())))
    }
}
