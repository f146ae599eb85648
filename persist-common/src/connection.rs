use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{error, info, warn};
use tokio::sync::Mutex;

use crate::backend::{Backend, Connector, RedisConnector};
use crate::config::RedisConfig;
use crate::error::PersistResult;

type ConnectFuture = Shared<BoxFuture<'static, PersistResult<Arc<dyn Backend>>>>;

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Ready => write!(f, "ready"),
        }
    }
}

enum Slot {
    Disconnected,
    Connecting { attempt: u64, future: ConnectFuture },
    Ready(Arc<dyn Backend>),
}

struct Inner {
    slot: Slot,
    // 每次发起连接递增，用于识别完成的是哪一次连接
    attempts: u64,
}

/// 管理唯一的共享后端连接
///
/// 第一次使用时才建立连接；连接建立期间的并发调用共享同一个进行中的连接，
/// 不会触发第二次建立。建立连接时先认证再选库，全部完成后才进入 Ready。
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    config: RwLock<RedisConfig>,
    inner: Mutex<Inner>,
}

impl ConnectionManager {
    pub fn new(config: RedisConfig, connector: Arc<dyn Connector>) -> Self {
        ConnectionManager {
            connector,
            config: RwLock::new(config),
            inner: Mutex::new(Inner {
                slot: Slot::Disconnected,
                attempts: 0,
            }),
        }
    }

    /// 使用 Redis TCP 连接
    pub fn redis(config: RedisConfig) -> Self {
        Self::new(config, Arc::new(RedisConnector::new()))
    }

    /// 替换之后建立连接时使用的配置，已存在的连接不受影响
    pub fn set_config(&self, config: RedisConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn config(&self) -> RedisConfig {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// 当前连接状态
    pub async fn state(&self) -> ConnectionState {
        let inner = self.inner.lock().await;
        match &inner.slot {
            Slot::Disconnected => ConnectionState::Disconnected,
            Slot::Connecting { .. } => ConnectionState::Connecting,
            Slot::Ready(backend) if backend.is_connected() => ConnectionState::Ready,
            Slot::Ready(_) => ConnectionState::Disconnected,
        }
    }

    /// 获取共享连接，不存在时建立
    pub async fn get_connection(&self) -> PersistResult<Arc<dyn Backend>> {
        let (attempt, future) = {
            let mut inner = self.inner.lock().await;
            let pending = match &inner.slot {
                Slot::Ready(backend) if backend.is_connected() => return Ok(Arc::clone(backend)),
                Slot::Connecting { attempt, future } => Some((*attempt, future.clone())),
                Slot::Ready(_) | Slot::Disconnected => None,
            };

            if let Some((attempt, future)) = pending {
                drop(inner);
                info!("连接正在建立中，不重复初始化");
                return self.finish(attempt, future).await;
            }

            if matches!(inner.slot, Slot::Ready(_)) {
                warn!("后端连接已断开，重新建立连接");
            }

            inner.attempts += 1;
            let attempt = inner.attempts;
            let future = Self::connect(Arc::clone(&self.connector), self.config()).boxed().shared();
            inner.slot = Slot::Connecting {
                attempt,
                future: future.clone(),
            };
            info!("创建新的 Redis 连接");
            (attempt, future)
        };

        self.finish(attempt, future).await
    }

    // 等待连接完成，并且只在状态仍属于这次连接时更新状态
    async fn finish(&self, attempt: u64, future: ConnectFuture) -> PersistResult<Arc<dyn Backend>> {
        let result = future.await;

        let mut inner = self.inner.lock().await;
        let owned = matches!(&inner.slot, Slot::Connecting { attempt: current, .. } if *current == attempt);
        if owned {
            inner.slot = match &result {
                Ok(backend) => Slot::Ready(Arc::clone(backend)),
                Err(e) => {
                    error!("建立 Redis 连接失败: {}", e);
                    Slot::Disconnected
                }
            };
        }
        result
    }

    async fn connect(connector: Arc<dyn Connector>, config: RedisConfig) -> PersistResult<Arc<dyn Backend>> {
        let backend = connector.connect(&config).await?;

        if let Some(secret) = &config.redis_auth {
            backend.auth(secret).await?;
        }
        if let Some(db) = config.db {
            backend.select(db).await?;
        }

        info!("Redis 连接就绪: {}", config.url());
        Ok(backend)
    }

    /// 关闭现有连接；无论是否存在连接都会正常返回
    pub async fn disconnect(&self) {
        let slot = {
            let mut inner = self.inner.lock().await;
            std::mem::replace(&mut inner.slot, Slot::Disconnected)
        };

        let backend = match slot {
            Slot::Ready(backend) => Some(backend),
            Slot::Connecting { future, .. } => future.await.ok(),
            Slot::Disconnected => None,
        };

        if let Some(backend) = backend {
            match backend.quit().await {
                Ok(()) => info!("已关闭 Redis 连接"),
                Err(e) => error!("关闭 Redis 连接时出错: {}", e),
            }
        }

        // 与其他异步操作一致，返回前让出一次调度
        tokio::task::yield_now().await;
    }
}
